#![allow(missing_docs)]
use crate::{ctrl::Ctrl, Adler32, FlatTable, GroupProbe, KeyHasher, LinearProbe, Probe, StdHasher};
use indexmap::IndexMap;
use rand::prelude::*;
use std::{fmt::Debug, hash::Hash};

struct CheckedTable<K, V, S, P> {
    dut: FlatTable<K, V, S, P>,
    ref_map: IndexMap<K, V>,
}

impl<K, V, S, P> CheckedTable<K, V, S, P>
where
    K: Hash + Eq + Clone + Debug,
    V: Eq + Clone + Debug,
    S: KeyHasher<K> + Default,
    P: Probe,
{
    fn new() -> Self {
        CheckedTable {
            dut: FlatTable::new(),
            ref_map: IndexMap::new(),
        }
    }
    fn len(&self) -> usize {
        self.ref_map.len()
    }
    fn get(&self, key: &K) -> Option<&V> {
        let ref_result = self.ref_map.get(key);
        let dut_result = self.dut.get(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ref_result = self.ref_map.insert(key.clone(), value.clone());
        let dut_result = self.dut.insert(key, value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn vacate(&mut self, key: &K) -> Option<(K, V)> {
        let ref_result = self.ref_map.swap_remove_entry(key);
        let dut_result = self.dut.vacate(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.dut.len(), self.ref_map.len());
        for (key, value) in self.ref_map.iter() {
            assert_eq!(self.dut.get(key), Some(value));
        }
    }
    /// NB: `random_likelihood` is **not** a probability, see the weights used below.
    fn present_or_random_key<R: Rng + SeedableRng>(
        &self,
        random_likelihood: f64,
        rng: &mut R,
        mut rand_k: impl FnMut(&mut R) -> K,
    ) -> K {
        debug_assert!(random_likelihood >= 0.0);
        if self.len() == 0 || rng.gen_range(0.0..1.0 + random_likelihood) >= 1.0 {
            rand_k(rng)
        } else {
            self.ref_map.keys().choose(rng).unwrap().clone()
        }
    }
}

macro_rules! weighted_choose {
    ($rng:expr, $($name:ident: $weight:expr => $body:expr),+) => {
        {
            enum Branches { $( $name,  )* }
            let weights = [$((Branches::$name, $weight)),+];
            match weights.choose_weighted($rng, |x| x.1).unwrap().0 {
                $(Branches::$name => $body),*
            }
        }
    }
}

fn test_suite<K, V, S, P, R>(
    mut rand_k: impl FnMut(&mut R) -> K,
    mut rand_v: impl FnMut(&mut R) -> V,
) where
    K: Hash + Eq + Clone + Debug,
    V: Eq + Clone + Debug,
    S: KeyHasher<K> + Default,
    P: Probe,
    R: Rng + SeedableRng,
{
    let mut table: CheckedTable<K, V, S, P> = CheckedTable::new();
    let mut rng = R::seed_from_u64(39);
    let mut max_size = 0;
    let mut max_capacity = table.dut.capacity();
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Insert: 2.0 => {
                let k = table.present_or_random_key(6.0, &mut rng, &mut rand_k);
                let v = rand_v(&mut rng);
                let result = table.insert(k.clone(), v.clone());
                if verbosity > 0 {
                    println!("inserting {k:?}: {v:?} -> {result:?}");
                }
            },
            Get: 1.0 => {
                let k = table.present_or_random_key(1.0, &mut rng, &mut rand_k);
                let result = table.get(&k);
                if verbosity > 0 {
                    println!("getting {k:?} -> {result:?}");
                }
            },
            Vacate: 0.2 => {
                let k = table.present_or_random_key(0.5, &mut rng, &mut rand_k);
                let result = table.vacate(&k);
                if verbosity > 0 {
                    println!("vacating {k:?} -> {result:?}");
                }
            },
            Check: 0.15 => {
                table.check();
            }
        };
        assert!(table.dut.capacity() >= max_capacity, "capacity shrank");
        max_capacity = table.dut.capacity();
        max_size = std::cmp::max(max_size, table.len());
    }
    table.check();
    println!("max size {max_size}, capacity {max_capacity}");
}

fn rand_bytes<R: Rng>(rng: &mut R) -> Vec<u8> {
    let len = rng.gen_range(0..12);
    (0..len).map(|_| rng.gen_range(b'a'..=b'f')).collect()
}

#[test]
fn test_suite_bytes_i32_linear() {
    test_suite::<Vec<u8>, i32, Adler32, LinearProbe, rand_pcg::Pcg64>(rand_bytes, |rng| {
        rng.gen()
    });
}

#[test]
fn test_suite_bytes_i32_grouped() {
    test_suite::<Vec<u8>, i32, Adler32, GroupProbe, rand_pcg::Pcg64>(rand_bytes, |rng| {
        rng.gen()
    });
}

#[test]
fn test_suite_string_string() {
    test_suite::<String, String, Adler32, LinearProbe, rand_pcg::Pcg64>(
        |rng| {
            let len = rng.gen_range(0..16);
            String::from_iter((0..len).map(|_| rng.gen_range('!'..'~')))
        },
        |rng| {
            let len = rng.gen_range(8..32);
            String::from_iter((0..len).map(|_| rng.gen_range('!'..'~')))
        },
    );
}

#[test]
fn test_suite_usize_usize_grouped() {
    test_suite::<usize, usize, StdHasher, GroupProbe, rand_pcg::Pcg64>(
        |rng| rng.gen::<usize>() >> rng.gen_range(0..usize::BITS),
        |rng| rng.gen(),
    );
}

#[test]
fn test_suite_boxed_usize_boxed_usize() {
    test_suite::<Box<usize>, Box<usize>, StdHasher, LinearProbe, rand_pcg::Pcg64>(
        |rng| Box::new(rng.gen::<usize>() >> rng.gen_range(0..usize::BITS)),
        |rng| Box::new(rng.gen()),
    );
}

#[test]
fn test_growth_doubles_capacity() {
    let mut table: FlatTable<String, i32> = FlatTable::new();
    let mut capacities = vec![table.capacity()];
    for i in 0..20 {
        table.insert(format!("key{i}"), i);
        if capacities.last() != Some(&table.capacity()) {
            capacities.push(table.capacity());
        }
        table.check();
    }
    assert_eq!(capacities, [10, 20, 40]);
    for i in 0..20 {
        assert_eq!(table.find(format!("key{i}").as_str()), Some(i));
    }
}

#[test]
fn test_grouped_growth_keeps_power_of_two_groups() {
    let mut table: FlatTable<u32, u32, StdHasher, GroupProbe> = FlatTable::new();
    assert_eq!(table.capacity(), 16);
    for i in 0..1000 {
        table.insert(i, i * 3);
    }
    assert!(table.capacity().is_power_of_two());
    assert!(table.load() <= crate::LOAD_FACTOR);
    table.check();
    assert!((0..1000).all(|i| table.find(&i) == Some(i * 3)));
}

#[test]
fn test_tombstones_keep_probe_sequences_intact() {
    // A constant hasher puts every key on the same probe sequence.
    #[derive(Default)]
    struct Collide;
    impl KeyHasher<&'static str> for Collide {
        fn hash_key(&self, _key: &&'static str) -> u64 {
            (0x1234 << 7) | 0x55
        }
    }

    let mut table: FlatTable<&'static str, i32, Collide> = FlatTable::with_capacity(16);
    for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
        table.insert(key, i as i32);
    }
    table.check();

    assert_eq!(table.vacate(&"b"), Some(("b", 1)));
    assert_eq!(
        table.ctrl().iter().filter(|&&ctrl| ctrl == Ctrl::DELETED).count(),
        1
    );
    assert_eq!(table.get(&"c"), Some(&2));
    assert_eq!(table.get(&"d"), Some(&3));
    assert_eq!(table.get(&"b"), None);

    // Re-inserting an existing key past the tombstone updates it in place.
    assert_eq!(table.insert("d", 30), Some(3));
    assert_eq!(table.len(), 3);

    // A new key reuses the tombstone.
    assert_eq!(table.insert("e", 4), None);
    assert_eq!(
        table.ctrl().iter().filter(|&&ctrl| ctrl == Ctrl::DELETED).count(),
        0
    );
    table.check();
}

#[test]
fn test_lookup_in_full_table_terminates() {
    let mut table: FlatTable<Vec<u8>, i32> = FlatTable::with_capacity(2);
    table.insert(b"one".to_vec(), 1);
    table.insert(b"two".to_vec(), 2);
    assert_eq!(table.capacity(), 2);
    assert!(table.ctrl().iter().all(|ctrl| ctrl.is_full()));
    assert_eq!(table.find(&b"three"[..]), None);
    assert_eq!(table.find(&b"two"[..]), Some(2));

    table.insert(b"three".to_vec(), 3);
    assert_eq!(table.capacity(), 4);
    table.check();
}

#[test]
fn test_reserve_avoids_growth() {
    let mut table: FlatTable<usize, usize, StdHasher> = FlatTable::new();
    table.reserve(100);
    let capacity = table.capacity();
    assert_eq!(capacity, 160);
    for i in 0..100 {
        table.insert(i, i);
    }
    assert_eq!(table.capacity(), capacity);
    table.check();
}

#[test]
fn test_rehash_never_shrinks() {
    let mut table: FlatTable<Vec<u8>, i32> = (0..8usize)
        .map(|i| (vec![i as u8; i], i as i32))
        .collect();
    let capacity = table.capacity();
    table.rehash(1);
    assert_eq!(table.capacity(), capacity);
    table.check();
    table.rehash(capacity * 4);
    assert_eq!(table.capacity(), capacity * 4);
    table.check();
    assert!((0..8).all(|i| table.find(&vec![i as u8; i as usize][..]) == Some(i)));
}

#[test]
fn test_clone_is_independent() {
    let mut table: FlatTable<String, String> = FlatTable::new();
    table.insert("adam".into(), "10".into());
    table.insert("eve".into(), "23".into());
    let clone = table.clone();
    table.insert("adam".into(), "11".into());
    assert_eq!(clone.get("adam").map(String::as_str), Some("10"));
    assert_eq!(table.get("adam").map(String::as_str), Some("11"));
    clone.check();
}

#[test]
fn test_huge_capacity_is_an_error() {
    assert_eq!(
        FlatTable::<u64, u64, StdHasher>::try_with_capacity(usize::MAX).map(|table| table.len()),
        Err(crate::TryReserveError::CapacityOverflow)
    );
    assert!(FlatTable::<u64, u64, StdHasher, GroupProbe>::try_with_capacity(usize::MAX).is_err());
}

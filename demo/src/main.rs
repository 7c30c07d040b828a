#![allow(missing_docs)]

use std::{ffi::OsString, path::Path};

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use flat_table::{ByteMap, FlatTable, GroupedByteMap, Probe};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Additional entries to insert, one `key<TAB>value` pair per line.
    input: Option<OsString>,
    /// Keys to look up after inserting all entries.
    #[arg(short, long)]
    lookup: Vec<String>,
    /// Compare control bytes in groups of 16 instead of probing slot by slot.
    #[arg(long)]
    grouped: bool,
}

const SAMPLE_DATA: &[(&str, i32)] = &[
    ("Hello, World!", 1),
    ("foo", 2),
    ("bar", 4),
    ("spam", 5),
    ("bacon", 6),
    ("eggs", 7),
    ("Goodbye, World!", 8),
    ("Modern C++ is awesome", 9),
    ("Modern Effective C++ is awesome", 11),
    ("Twitch TV", 13),
    ("Afreeca TV", 15),
    ("Youtube", 20),
];

const DEFAULT_LOOKUPS: &[&str] = &["foo", "Afreeca TV", "Youtube"];

fn parse_entries(path: &Path) -> color_eyre::Result<Vec<(Vec<u8>, i32)>> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let mut entries = vec![];
    for (line_number, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.rsplit_once('\t').ok_or_else(|| {
            eyre!("{}:{}: expected `key<TAB>value`", path.display(), line_number + 1)
        })?;
        let value = value.trim().parse::<i32>().wrap_err_with(|| {
            format!("{}:{}: invalid value {value:?}", path.display(), line_number + 1)
        })?;
        entries.push((key.as_bytes().to_vec(), value));
    }
    Ok(entries)
}

fn run<P: Probe>(
    mut table: FlatTable<Vec<u8>, i32, flat_table::Adler32, P>,
    entries: Vec<(Vec<u8>, i32)>,
    lookups: &[String],
) {
    for (key, value) in entries {
        let key_text = String::from_utf8_lossy(&key).into_owned();
        if let Some(previous) = table.insert(key, value) {
            log::info!("updated {key_text:?}: {previous} -> {value}");
        }
    }
    log::info!(
        "{} entries in {} slots (load {:.3})",
        table.len(),
        table.capacity(),
        table.load()
    );

    for key in lookups {
        match table.find(key.as_bytes()) {
            Some(value) => println!("{key} == {value}"),
            None => println!("{key} == <absent>"),
        }
    }
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    flat_table_logger::setup();

    let mut entries: Vec<(Vec<u8>, i32)> = SAMPLE_DATA
        .iter()
        .map(|&(key, value)| (key.as_bytes().to_vec(), value))
        .collect();

    if let Some(input) = &args.input {
        let extra = parse_entries(Path::new(input))?;
        log::info!("read {} entries from {}", extra.len(), Path::new(input).display());
        entries.extend(extra);
    }

    let lookups = if args.lookup.is_empty() {
        DEFAULT_LOOKUPS.iter().map(|key| key.to_string()).collect()
    } else {
        args.lookup.clone()
    };

    if args.grouped {
        run(GroupedByteMap::new(), entries, &lookups);
    } else {
        run(ByteMap::new(), entries, &lookups);
    }

    Ok(())
}

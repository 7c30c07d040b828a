//! Default logging setup for flat table binaries
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

use std::{io::Write, sync::Mutex, time::Instant};

use env_logger::fmt::Formatter;
use log::Record;

/// Environment variable holding the log filter, e.g. `FLAT_TABLE_LOG=flat_table=debug`.
pub const FILTER_ENV: &str = "FLAT_TABLE_LOG";

/// Environment variable selecting whether log output is coloured (`auto`, `always` or `never`).
pub const STYLE_ENV: &str = "FLAT_TABLE_LOG_STYLE";

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

struct LineFormat {
    start_time: Instant,
    last_target: Mutex<String>,
}

impl LineFormat {
    fn new() -> Self {
        LineFormat {
            start_time: Instant::now(),
            last_target: Mutex::new(String::new()),
        }
    }

    /// Writes a header line whenever the target differs from the previous record's, followed by
    /// the record itself.
    fn write(&self, buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
        let timestamp = self.start_time.elapsed();
        let level = record.level();
        let target = record.target();

        // A poisoned lock only means another thread panicked while logging.
        let mut last_target = self
            .last_target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);

            writeln!(
                buf,
                "{} {}",
                format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
                format_args!("{style}{target}{style:#}", style = TARGET_STYLE)
            )?;
        }
        writeln!(
            buf,
            "{} {} {}",
            format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
            format_args!(
                "{style}{level:<5}{style:#}",
                style = buf.default_level_style(level),
            ),
            record.args(),
        )
    }
}

fn builder() -> env_logger::Builder {
    let format = LineFormat::new();
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(FILTER_ENV, "info")
            .write_style(STYLE_ENV),
    );
    builder.format(move |buf, record| format.write(buf, record));
    builder
}

/// Perform the default logging setup used by flat table binaries
///
/// # Panics
/// Panics if a global logger was already installed.
pub fn setup() {
    builder().init();
}

/// Like [`setup`], but returns an error instead of panicking if a global logger was already
/// installed.
pub fn try_setup() -> Result<(), log::SetLoggerError> {
    builder().try_init()
}

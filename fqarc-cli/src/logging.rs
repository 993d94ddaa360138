use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

use crate::PROGRESS_BAR;

/// Messages from other crates are only shown from this level up.
const DEPENDENCY_LEVEL: Level = Level::Warn;

struct Logger;

impl Logger {
    fn is_own_target(target: &str) -> bool {
        target.starts_with("fqarc")
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let level = metadata.level();
        level <= log::max_level()
            && (Self::is_own_target(metadata.target()) || level <= DEPENDENCY_LEVEL)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} {:<5} [{}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}

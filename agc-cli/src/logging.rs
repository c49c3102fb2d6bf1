use std::fmt::Arguments;

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, SetLoggerError};
use log::{Metadata, Record};

use crate::PROGRESS_BAR;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = format_message(Local::now(), record.level(), record.target(), record.args());

            if PROGRESS_BAR.is_hidden() {
                eprintln!("{}", msg);
            } else {
                PROGRESS_BAR.println(msg);
            }
        }
    }

    fn flush(&self) {}
}

fn format_message(time: DateTime<Local>, level: Level, target: &str, args: &Arguments) -> String {
    format!(
        "{} [{:<5}] [{}] {}",
        time.format(TIME_FORMAT),
        level,
        target,
        args
    )
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}

//! In-memory `log` backend feeding the event log pane
//!
//! The TUI owns stdout while it runs, so records are buffered instead of
//! printed. Only the most recent [`MAX_LINES`] records are kept.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const MAX_LINES: usize = 500;

static LOGGER: EventLogger = EventLogger {
    lines: Mutex::new(VecDeque::new()),
};

/// A formatted log record
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: Level,
    pub text: String,
}

#[derive(Debug)]
pub struct EventLogger {
    lines: Mutex<VecDeque<LogLine>>,
}

impl EventLogger {
    /// Install the logger as the global `log` backend
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }

    /// Copy of the buffered lines, oldest first
    pub fn lines() -> Vec<LogLine> {
        match LOGGER.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl Log for EventLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = LogLine {
            level: record.level(),
            text: format!("[{}] {}", record.level(), record.args()),
        };
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        if lines.len() == MAX_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    fn flush(&self) {}
}

use std::{
    io::{IsTerminal, Write, stderr},
    sync::OnceLock,
    time::Instant,
};

use ansi_rgb::{Foreground, red, yellow};
use anyhow::{Result, anyhow};
use log::{Level, LevelFilter, Log, Metadata, Record};
use rgb::{RGB8, Rgb};

fn level_to_rgb(level: Level) -> RGB8 {
    match level {
        Level::Error => red(),
        Level::Warn => yellow(),
        Level::Info => Rgb::new(0x00, 0xBC, 0x12),
        Level::Debug => Rgb::new(0x16, 0x85, 0xA9),
        Level::Trace => Rgb::new(128, 128, 128),
    }
}

fn level_icon(level: Level) -> &'static str {
    match level {
        Level::Error => "💥",
        Level::Warn => "⚠️",
        Level::Info => "💡",
        Level::Debug => "🐛",
        Level::Trace => "🔍",
    }
}

pub struct Logger {
    start: Instant,
    color: bool,
}

impl Logger {
    fn line(&self, record: &Record) -> String {
        format!(
            "{} {:.3?} [{path}:{line}] {args}",
            level_icon(record.level()),
            self.start.elapsed(),
            path = record.target(),
            line = record.line().unwrap_or(0),
            args = record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.line(record);
        let mut err = stderr().lock();
        let _ = if self.color {
            writeln!(err, "{}", line.fg(level_to_rgb(record.level())))
        } else {
            writeln!(err, "{line}")
        };
    }

    fn flush(&self) {
        let _ = stderr().flush();
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Installs the stderr logger. Colors are used only on a terminal.
pub fn init(level: LevelFilter) -> Result<()> {
    let logger = LOGGER.get_or_init(|| Logger {
        start: Instant::now(),
        color: stderr().is_terminal(),
    });
    log::set_logger(logger).map_err(|e| anyhow!("{e}"))?;
    log::set_max_level(level);
    Ok(())
}

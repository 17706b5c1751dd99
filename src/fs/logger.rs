//! File-based logger for the V5 Brain.
//!
//! This module implements the [`log`] crate's logging facade. Every record is
//! printed to the console and appended to a log file on the SD card, so
//! sensor errors reported by the odometry task can be read after a match.
//!
//! # Usage
//!
//! Initialize the logger once at the start of your program:
//!
//! ```ignore
//! use antaeus_odom::fs::logger;
//! use log::LevelFilter;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     logger::init(LevelFilter::Info).expect("Logger init failed");
//!     // or pick the file yourself
//!     // logger::init_with_file(LevelFilter::Debug, "match3.txt")
//! }
//! ```
//!
//! # Log Output
//!
//! ```text
//! INFO  [1s 2ms] antaeus_odom::odom::tracker - Odometry Calibration: all sensors calibrated (0)
//! WARN  [4s 310ms] antaeus_odom::odom::tracker - Vertical Tracking Wheel 0 Error: device is disconnected
//! ```

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::format_duration;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use vexide::time::user_uptime;

/// The file written by [`init`].
pub const DEFAULT_LOG_FILE: &str = "odom_log.txt";

/// A logger writing to the console and a file.
pub struct OdomLogger {
    /// `None` if the file could not be opened (e.g. no SD card).
    file:    Mutex<Option<BufWriter<std::fs::File>>>,
    started: Instant,
}

impl OdomLogger {
    fn open(path: &str) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .ok()
            .map(BufWriter::new);

        Self {
            file:    Mutex::new(file),
            started: Instant::now(),
        }
    }

    fn uptime(&self) -> Duration {
        if cfg!(target_os = "vexos") {
            user_uptime()
        } else {
            self.started.elapsed()
        }
    }
}

/// Formats one log line. Uptime is truncated to milliseconds.
fn format_line(
    level: Level,
    uptime: Duration,
    target: &str,
    message: &std::fmt::Arguments,
) -> String {
    let uptime = Duration::from_millis(uptime.as_millis() as u64);
    format!("{:<5} [{}] {} - {}\n", level, format_duration(uptime), target, message)
}

impl log::Log for OdomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), self.uptime(), record.target(), record.args());
        print!("{}", line);

        if let Ok(mut file) = self.file.lock() {
            if let Some(writer) = file.as_mut() {
                let _ = writer.write_all(line.as_bytes());
                if record.level() <= Level::Warn {
                    let _ = writer.flush();
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            if let Some(writer) = file.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<OdomLogger> = OnceLock::new();

/// Initializes the logger, writing to [`DEFAULT_LOG_FILE`].
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    init_with_file(level, DEFAULT_LOG_FILE)
}

/// Initializes the logger, writing to `path` on the SD card.
///
/// The file is truncated. Records below `level` are dropped.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init_with_file(level: LevelFilter, path: &str) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| OdomLogger::open(path));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

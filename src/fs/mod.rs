//! Filesystem utilities for the V5 Brain.
//!
//! # Logging
//!
//! The `logger` submodule writes every [`log`] record to the console and to
//! a file on the SD card. Odometry reports sensor errors and calibration
//! results through `log`, so initializing the logger is the way to see them.
//!
//! # Example
//!
//! ```ignore
//! use antaeus_odom::fs::logger;
//! use log::LevelFilter;
//!
//! logger::init(LevelFilter::Info).expect("Failed to initialize logger");
//! ```

/// File-based logging for the V5 Brain.
pub mod logger;

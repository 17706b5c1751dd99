//! # Antaeus Odom
//!
//! Position tracking for VEX V5 robots, built on [Vexide](https://vexide.dev).
//! It estimates where a differential drive robot is on the field from any
//! mix of tracking wheels and inertial sensors:
//!
//! - **Any sensor set**: zero, one or many IMUs and tracking wheels per axis.
//! - **Graceful degradation**: sensors that fail to calibrate are retried,
//!   replaced, or worked around, and the result is reported as a status code.
//! - **Arc integration**: movement within a tick is treated as an arc, so
//!   curved paths don't drift.
//! - **Logging**: A file-based logger for debugging and telemetry.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use antaeus_odom::{
//!     odom::{
//!         devices::{TrackingSensor, TrackingWheel, V5Imu},
//!         tracker::TrackingWheelOdometry,
//!     },
//!     shared,
//! };
//! use vexide::prelude::*;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let imu = shared(V5Imu::new(InertialSensor::new(peripherals.port_10)));
//!     let vertical = TrackingWheel::new(
//!         shared(TrackingSensor::rotation(
//!             RotationSensor::new(peripherals.port_5, Direction::Forward),
//!             false,
//!         )),
//!         2.75,
//!         0.0,
//!     );
//!
//!     let mut odom = TrackingWheelOdometry::new(vec![imu], vec![vertical], vec![]);
//!     odom.calibrate(Duration::from_secs(3)).await;
//!
//!     loop {
//!         let pose = odom.pose();
//!         println!("x: {:.2} y: {:.2} t: {:.1}", pose.x, pose.y, pose.t.as_degrees());
//!         vexide::time::sleep(Duration::from_millis(100)).await;
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`odom`]: Sensors, calibration and pose tracking.
//! - [`fs`]: Filesystem utilities including logging.

use std::{cell::RefCell, rc::Rc};

/// Filesystem utilities module.
///
/// Contains logging functionality for recording odometry telemetry and
/// sensor errors to a file on the V5 Brain's SD card.
pub mod fs;

/// Odometry module.
///
/// Provides [`TrackingWheelOdometry`](odom::tracker::TrackingWheelOdometry),
/// the sensor traits it consumes, and the calibration policy that decides
/// which sensors it trusts.
pub mod odom;

/// Wraps a device so it can be shared with odometry.
pub fn shared<T>(t: T) -> Rc<RefCell<T>> { Rc::new(RefCell::new(t)) }

//! Tracking wheel odometry for robot position estimation.
//!
//! This module estimates the robot's (x, y) position and heading on the field
//! from any combination of tracking wheels and inertial sensors, including
//! none at all. Missing or broken sensors reduce accuracy but never stop
//! tracking.
//!
//! # Module Structure
//!
//! - **[`devices`]**: Sensor capabilities, tracking wheels and [`Pose`](devices::Pose).
//! - **[`calibration`]**: Sensor calibration and the fallback policy.
//! - **[`algorithm`]**: The per-tick pose update.
//! - **[`tracker`]**: [`TrackingWheelOdometry`](tracker::TrackingWheelOdometry),
//!   which owns the pose and the tracking task.
//! - **[`config`]**: Tick rate and calibration timing.
//!
//! # How It Works
//!
//! Every tick, each tracking wheel reports how far it rolled and each IMU
//! how far it turned. The heading change is the mean of the IMUs (or, if
//! none calibrated, the difference between two horizontal wheels). Each
//! wheel's travel is corrected for the arc it sweeps while the robot turns,
//! wheels on the same axis are averaged, and the resulting local movement
//! is treated as an arc and rotated into the field frame.
//!
//! # Hardware
//!
//! - **Vertical tracking wheels**: Measure forward/backward movement.
//! - **Horizontal tracking wheels**: Measure sideways movement. Two of them
//!   can measure heading.
//! - **Inertial sensors (IMUs)**: Measure heading.
//!
//! # Example
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
//! // Two IMUs, one vertical wheel, no horizontal wheel: heading is the
//! // mean of the IMUs and local x is assumed to be 0
//! let imu1 = shared(V5Imu::new(InertialSensor::new(peripherals.port_1)));
//! let imu2 = shared(V5Imu::new(InertialSensor::new(peripherals.port_2)));
//! let vertical = TrackingWheel::new(
//!     shared(TrackingSensor::rotation(
//!         RotationSensor::new(peripherals.port_3, Direction::Forward),
//!         false,
//!     )),
//!     2.75,
//!     2.0,
//! );
//!
//! let mut odom = TrackingWheelOdometry::new(vec![imu1, imu2], vec![vertical], vec![]);
//! odom.calibrate(Duration::from_secs(2)).await;
//! ```

/// The per-tick pose update.
pub mod algorithm;

/// Sensor calibration and the fallback policy.
pub mod calibration;

/// Odometry settings.
pub mod config;

/// Sensor capabilities, tracking wheels and position types.
pub mod devices;

/// Main odometry tracking controller.
pub mod tracker;

#[cfg(test)]
mod testing;

//! Tuning values for odometry.

use std::time::Duration;

use super::algorithm::HeadingFusion;

/// Period of the tracking task.
pub const TICK_PERIOD: Duration = Duration::from_millis(10);

/// How often calibration checks whether the IMUs are done.
pub const CALIBRATION_POLL: Duration = Duration::from_millis(10);

/// Calibration budget used by
/// [`calibrate_default`](super::tracker::TrackingWheelOdometry::calibrate_default).
pub const CALIBRATION_TIME: Duration = Duration::from_secs(3);

/// Odometry settings.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use antaeus_odom::odom::{algorithm::HeadingFusion, config::OdomConfig};
///
/// let config = OdomConfig {
///     tick_period: Duration::from_millis(5),
///     heading_fusion: HeadingFusion::Median,
///     ..OdomConfig::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdomConfig {
    /// Time between pose updates.
    pub tick_period:      Duration,
    /// Time between IMU status checks during calibration.
    pub calibration_poll: Duration,
    /// Default calibration budget.
    pub calibration_time: Duration,
    /// How readings from several IMUs are combined.
    pub heading_fusion:   HeadingFusion,
}

impl Default for OdomConfig {
    fn default() -> Self {
        Self {
            tick_period:      TICK_PERIOD,
            calibration_poll: CALIBRATION_POLL,
            calibration_time: CALIBRATION_TIME,
            heading_fusion:   HeadingFusion::Mean,
        }
    }
}

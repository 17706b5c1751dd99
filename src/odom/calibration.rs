//! Sensor calibration and the fallback policy.
//!
//! Calibration decides which sensors odometry will trust. Every inertial
//! sensor and tracking wheel gets a chance to calibrate, failures get one
//! retry, and whatever is left decides how each axis is tracked:
//!
//! | Axis     | Preferred             | Fallback                        | Last resort |
//! |----------|-----------------------|---------------------------------|-------------|
//! | heading  | mean of working IMUs  | two horizontal wheels           | frozen      |
//! | local y  | vertical wheels       |                                 | assumed 0   |
//! | local x  | horizontal wheels     |                                 | assumed 0   |
//!
//! The result of all of this is reported as a [`CalibrationStatus`]. A
//! degraded status is not an error: odometry keeps running with whatever is
//! available.

use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use log::{debug, warn};

use super::devices::{SharedImu, TrackingWheel};

/// Two horizontal wheels closer together than this (in inches) can't be used
/// to measure heading.
pub const MIN_PAIR_SEPARATION: f64 = 1e-3;

/// How calibration went, from best to worst.
///
/// The numeric [`code`](CalibrationStatus::code) is ordered by severity, and
/// so is the enum itself: `a < b` means `a` is the better outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CalibrationStatus {
    /// Every sensor calibrated on the first try.
    Ok               = 0,
    /// A sensor failed once but calibrated on the retry.
    Retried          = 1,
    /// A sensor failed, and another sensor of the same kind is used instead.
    Substituted      = 2,
    /// No inertial sensor works, so heading comes from two tracking wheels.
    AlternateHeading = 3,
    /// The local x and/or y axis has no working wheel and is assumed still.
    AxisUntracked    = 4,
    /// Nothing can measure heading, so it stays where it was last set.
    HeadingUntracked = 5,
}

impl CalibrationStatus {
    /// The numeric status code, 0 (best) through 5 (worst).
    pub fn code(self) -> u8 { self as u8 }

    /// The more severe of two statuses.
    pub fn worst(self, other: Self) -> Self { self.max(other) }

    /// Whether odometry runs with reduced accuracy.
    pub fn is_degraded(self) -> bool { self >= Self::Substituted }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "all sensors calibrated",
            Self::Retried => "calibrated after a retry",
            Self::Substituted => "using a substitute sensor",
            Self::AlternateHeading => "tracking heading with tracking wheels",
            Self::AxisUntracked => "a local axis can't be tracked",
            Self::HeadingUntracked => "heading can't be tracked",
        };
        write!(f, "{} ({})", text, self.code())
    }
}

/// The calibration result for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorOutcome {
    /// Calibrated on the first attempt.
    Ready,
    /// Calibrated on the second attempt.
    Retried,
    /// Did not calibrate. The sensor is ignored until the next calibration.
    Failed,
}

impl SensorOutcome {
    /// Whether the sensor can be used for tracking.
    pub fn is_usable(self) -> bool { self != Self::Failed }
}

/// Calibration results for every configured sensor, index-aligned with the
/// sensors given to the odometry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcomes {
    pub imus:       Vec<SensorOutcome>,
    pub vertical:   Vec<SensorOutcome>,
    pub horizontal: Vec<SensorOutcome>,
}

/// Where heading changes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadingSource {
    /// The listed inertial sensors, fused every tick.
    Imus(Vec<usize>),
    /// Two horizontal tracking wheels with different offsets.
    WheelPair { a: usize, b: usize },
    /// Heading is frozen.
    Untracked,
}

/// Which sensors odometry uses after calibration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingPlan {
    /// Indices of the vertical wheels used for local y.
    pub vertical:   Vec<usize>,
    /// Indices of the horizontal wheels used for local x.
    pub horizontal: Vec<usize>,
    /// How heading is measured.
    pub heading:    HeadingSource,
    /// The worst thing that happened while getting here.
    pub status:     CalibrationStatus,
}

impl TrackingPlan {
    /// Builds the plan for a set of calibration outcomes.
    ///
    /// `horizontal_offsets` are the offsets of every configured horizontal
    /// wheel, used to find a wheel pair for heading.
    pub fn resolve(outcomes: &Outcomes, horizontal_offsets: &[f64]) -> Self {
        let mut status = CalibrationStatus::Ok;
        let mut all = outcomes
            .imus
            .iter()
            .chain(&outcomes.vertical)
            .chain(&outcomes.horizontal);
        if all.any(|o| *o == SensorOutcome::Retried) {
            status = status.worst(CalibrationStatus::Retried);
        }

        let vertical = usable(&outcomes.vertical);
        let horizontal = usable(&outcomes.horizontal);
        let axes = [(&vertical, &outcomes.vertical), (&horizontal, &outcomes.horizontal)];
        for (active, configured) in axes {
            if active.is_empty() {
                status = status.worst(CalibrationStatus::AxisUntracked);
            } else if active.len() < configured.len() {
                status = status.worst(CalibrationStatus::Substituted);
            }
        }

        let imus = usable(&outcomes.imus);
        let heading = if !imus.is_empty() {
            if imus.len() < outcomes.imus.len() {
                status = status.worst(CalibrationStatus::Substituted);
            }
            HeadingSource::Imus(imus)
        } else if let Some((a, b)) = widest_pair(&horizontal, horizontal_offsets) {
            status = status.worst(CalibrationStatus::AlternateHeading);
            HeadingSource::WheelPair { a, b }
        } else {
            status = status.worst(CalibrationStatus::HeadingUntracked);
            HeadingSource::Untracked
        };

        Self {
            vertical,
            horizontal,
            heading,
            status,
        }
    }
}

fn usable(outcomes: &[SensorOutcome]) -> Vec<usize> {
    outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_usable())
        .map(|(i, _)| i)
        .collect()
}

/// The two active wheels furthest apart, if they are far enough apart to
/// resolve rotation.
fn widest_pair(active: &[usize], offsets: &[f64]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (n, &a) in active.iter().enumerate() {
        for &b in &active[n + 1..] {
            let separation = (offsets[a] - offsets[b]).abs();
            if separation > best.map_or(MIN_PAIR_SEPARATION, |(_, _, s)| s) {
                best = Some((a, b, separation));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Calibration attempts per sensor: the first one plus one retry.
const MAX_ATTEMPTS: u8 = 2;

/// Calibrates every sensor within `budget` and reports how each one did.
///
/// Inertial sensors calibrate together until they settle or the budget runs
/// out. A sensor that reports an error is triggered again right away, once,
/// while the others keep calibrating. One that is still calibrating at the
/// deadline has failed. `pause` is awaited between status polls so other
/// tasks keep running.
pub(crate) async fn calibrate_sensors<P, F>(
    imus: &[SharedImu],
    vertical: &[TrackingWheel],
    horizontal: &[TrackingWheel],
    budget: Duration,
    poll: Duration,
    mut pause: P,
) -> Outcomes
where
    P: FnMut(Duration) -> F,
    F: Future<Output = ()>,
{
    let deadline = Instant::now() + budget;

    let outcomes_v = calibrate_wheels(vertical, "Vertical");
    let outcomes_h = calibrate_wheels(horizontal, "Horizontal");
    let outcomes_imu = calibrate_imus(imus, deadline, poll, &mut pause).await;

    for (i, outcome) in outcomes_imu.iter().enumerate() {
        if *outcome == SensorOutcome::Failed {
            warn!("IMU {} failed to calibrate", i);
        }
    }

    Outcomes {
        imus:       outcomes_imu,
        vertical:   outcomes_v,
        horizontal: outcomes_h,
    }
}

/// Triggers calibration on every IMU and polls them until they settle or
/// `deadline` passes.
async fn calibrate_imus<P, F>(
    imus: &[SharedImu],
    deadline: Instant,
    poll: Duration,
    pause: &mut P,
) -> Vec<SensorOutcome>
where
    P: FnMut(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut outcomes = vec![SensorOutcome::Failed; imus.len()];
    let mut attempts = vec![0; imus.len()];
    let mut pending: Vec<usize> = (0..imus.len())
        .filter(|&i| trigger(&imus[i], i, &mut attempts[i]))
        .collect();

    loop {
        pending.retain(|&i| {
            let calibrating = imus[i].borrow_mut().is_calibrating();
            match calibrating {
                Ok(true) => true,
                Ok(false) => {
                    outcomes[i] = if attempts[i] == 1 {
                        SensorOutcome::Ready
                    } else {
                        SensorOutcome::Retried
                    };
                    false
                }
                Err(e) => {
                    warn!("IMU {} Calibration Error: {}", i, e);
                    trigger(&imus[i], i, &mut attempts[i])
                }
            }
        });

        let now = Instant::now();
        if pending.is_empty() || now >= deadline {
            break;
        }
        pause(poll.min(deadline - now)).await;
    }

    for i in pending {
        warn!("IMU {} still calibrating at the deadline", i);
    }
    outcomes
}

/// Starts calibrating one IMU, using up its remaining attempts if the
/// trigger fails. Returns whether calibration is running.
fn trigger(imu: &SharedImu, i: usize, attempts: &mut u8) -> bool {
    while *attempts < MAX_ATTEMPTS {
        *attempts += 1;
        if *attempts > 1 {
            debug!("Retrying calibration of IMU {}", i);
        }
        match imu.borrow_mut().calibrate() {
            Ok(()) => return true,
            Err(e) => warn!("IMU {} Calibration Error: {}", i, e),
        }
    }
    false
}

fn calibrate_wheels(wheels: &[TrackingWheel], label: &str) -> Vec<SensorOutcome> {
    wheels
        .iter()
        .enumerate()
        .map(|(i, wheel)| {
            let Err(e) = wheel.calibrate() else {
                return SensorOutcome::Ready;
            };
            warn!("{} Tracking Wheel {} Calibration Error: {}", label, i, e);
            match wheel.calibrate() {
                Ok(()) => SensorOutcome::Retried,
                Err(e) => {
                    warn!("{} Tracking Wheel {} Calibration Error: {}", label, i, e);
                    SensorOutcome::Failed
                }
            }
        })
        .collect()
}

//! The per-tick pose update.
//!
//! Everything here is pure: sensor readings go in, a new pose comes out.
//! The math follows the arc method from
//! <http://thepilons.ca/wp-content/uploads/2018/10/Tracking.pdf>, generalized
//! to any number of wheels per axis.

use vexide::math::Angle;

use super::{
    calibration::{HeadingSource, TrackingPlan},
    devices::Pose,
};

/// Heading changes smaller than this (in radians) are integrated as a straight
/// line.
pub const ARC_EPSILON: f64 = 1e-9;

/// How the heading deltas of several inertial sensors are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingFusion {
    /// Arithmetic mean of every readable sensor.
    #[default]
    Mean,
    /// Median of every readable sensor. Ignores a single bad sensor when
    /// three or more are present.
    Median,
}

impl HeadingFusion {
    /// Combines per-sensor heading deltas. `None` if there are none.
    pub fn fuse(self, deltas: &[f64]) -> Option<f64> {
        if deltas.is_empty() {
            return None;
        }
        match self {
            HeadingFusion::Mean => Some(deltas.iter().sum::<f64>() / deltas.len() as f64),
            HeadingFusion::Median => {
                let mut sorted = deltas.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
                } else {
                    Some(sorted[mid])
                }
            }
        }
    }
}

/// Offsets of the configured wheels and the fusion rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Layout {
    pub vertical:   Vec<f64>,
    pub horizontal: Vec<f64>,
    pub fusion:     HeadingFusion,
}

/// One raw reading per configured sensor. IMUs are in radians, wheels in
/// inches. `None` means the sensor couldn't be read.
///
/// A sensor only produces a delta when it was read on both sides of a tick,
/// so one that comes back after an outage starts measuring from its first
/// new reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Readings {
    pub imus:       Vec<Option<f64>>,
    pub vertical:   Vec<Option<f64>>,
    pub horizontal: Vec<Option<f64>>,
}

fn delta(prev: &[Option<f64>], now: &[Option<f64>], i: usize) -> Option<f64> {
    Some(now.get(i).copied()?? - prev.get(i).copied()??)
}

/// The heading change since the previous readings, in radians.
pub(crate) fn heading_delta(
    plan: &TrackingPlan,
    layout: &Layout,
    prev: &Readings,
    now: &Readings,
) -> f64 {
    match &plan.heading {
        HeadingSource::Imus(active) => {
            let deltas: Vec<f64> = active
                .iter()
                .filter_map(|&i| delta(&prev.imus, &now.imus, i))
                .collect();
            layout.fusion.fuse(&deltas).unwrap_or(0.0)
        }
        HeadingSource::WheelPair { a, b } => {
            let da = delta(&prev.horizontal, &now.horizontal, *a);
            let db = delta(&prev.horizontal, &now.horizontal, *b);
            match (da, db) {
                (Some(da), Some(db)) => (da - db) / (layout.horizontal[*a] - layout.horizontal[*b]),
                _ => 0.0,
            }
        }
        HeadingSource::Untracked => 0.0,
    }
}

/// Average travel along one local axis, with each wheel's share of the
/// rotation removed. Zero if no wheel could be read.
pub(crate) fn local_travel(
    active: &[usize],
    offsets: &[f64],
    prev: &[Option<f64>],
    now: &[Option<f64>],
    delta_t: f64,
) -> f64 {
    let (sum, count) = active
        .iter()
        .filter_map(|&i| delta(prev, now, i).map(|d| d - offsets[i] * delta_t))
        .fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Ratio of chord length to arc length for an arc spanning `delta_t` radians.
pub(crate) fn chord_factor(delta_t: f64) -> f64 {
    if delta_t.abs() < ARC_EPSILON {
        1.0
    } else {
        2.0 * (delta_t / 2.0).sin() / delta_t
    }
}

/// Rotates a local (right, forward) vector into the field frame for a robot
/// facing `heading` radians clockwise from +y.
pub(crate) fn rotate_vec(x: f64, y: f64, heading: f64) -> (f64, f64) {
    let (sin, cos) = heading.sin_cos();
    (x * cos + y * sin, -x * sin + y * cos)
}

/// Moves `pose` by a local displacement that happened while the heading
/// changed by `delta_t` radians.
pub(crate) fn integrate(pose: Pose, local_x: f64, local_y: f64, delta_t: f64) -> Pose {
    let factor = chord_factor(delta_t);
    let heading = pose.t.as_radians();
    let avg_t = heading + delta_t / 2.0;
    let (global_dx, global_dy) = rotate_vec(local_x * factor, local_y * factor, avg_t);
    Pose::new(pose.x + global_dx, pose.y + global_dy, Angle::from_radians(heading + delta_t))
}

/// Computes the pose after one tick.
pub(crate) fn step(
    pose: Pose,
    plan: &TrackingPlan,
    layout: &Layout,
    prev: &Readings,
    now: &Readings,
) -> Pose {
    let delta_t = heading_delta(plan, layout, prev, now);
    let local_x = local_travel(
        &plan.horizontal,
        &layout.horizontal,
        &prev.horizontal,
        &now.horizontal,
        delta_t,
    );
    let local_y =
        local_travel(&plan.vertical, &layout.vertical, &prev.vertical, &now.vertical, delta_t);
    if delta_t == 0.0 {
        // Keep the heading bit-for-bit when nothing can measure it.
        let (global_dx, global_dy) = rotate_vec(local_x, local_y, pose.t.as_radians());
        return Pose::new(pose.x + global_dx, pose.y + global_dy, pose.t);
    }
    integrate(pose, local_x, local_y, delta_t)
}

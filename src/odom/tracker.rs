//! Odometry tracking controller.
//!
//! This module provides [`TrackingWheelOdometry`], which owns the estimated
//! pose and the background task that keeps it up to date.
//!
//! # Concurrency
//!
//! vexide runs every task on one thread and only switches tasks at `.await`
//! points. The pose, the previous sensor readings and the tracking plan live
//! in one `RefCell`, and no code holds that borrow across an `.await`. Each
//! tick and each [`set_pose`](TrackingWheelOdometry::set_pose) is therefore
//! one indivisible update: readers never see a half-written pose.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use antaeus_odom::{odom::{devices::*, tracker::TrackingWheelOdometry}, shared};
//! use vexide::prelude::*;
//!
//! let imu = shared(V5Imu::new(InertialSensor::new(peripherals.port_10)));
//! let vertical = TrackingWheel::new(
//!     shared(TrackingSensor::rotation(
//!         RotationSensor::new(peripherals.port_5, Direction::Forward),
//!         false,
//!     )),
//!     2.75,
//!     0.5,
//! );
//!
//! let mut odom = TrackingWheelOdometry::new(vec![imu], vec![vertical], vec![]);
//! let status = odom.calibrate(Duration::from_secs(2)).await;
//! println!("Calibration: {}", status);
//!
//! let pose = odom.pose();
//! ```

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
    time::Duration,
};

use log::{debug, info, warn};
use vexide::{
    math::Angle,
    task::{Task, spawn},
    time::sleep,
};

use super::{
    algorithm::{Layout, Readings, step},
    calibration::{CalibrationStatus, TrackingPlan, calibrate_sensors},
    config::OdomConfig,
    devices::{DeviceError, Pose, SharedImu, TrackingWheel},
};

/// The sensors odometry reads from. Fixed at construction.
struct Sensors {
    imus:       Vec<SharedImu>,
    vertical:   Vec<TrackingWheel>,
    horizontal: Vec<TrackingWheel>,
    layout:     Layout,
    /// Which sensors failed their last read.
    faults:     Faults,
}

struct Faults {
    imus:       Vec<Cell<bool>>,
    vertical:   Vec<Cell<bool>>,
    horizontal: Vec<Cell<bool>>,
}

impl Sensors {
    /// Reads every sensor. Sensors that fail are left out, and logged when
    /// they stop or start responding.
    fn read(&self) -> Readings {
        let imus = self
            .imus
            .iter()
            .zip(&self.faults.imus)
            .enumerate()
            .map(|(i, (imu, faulted))| {
                let reading = imu.borrow().rotation().map(|angle| angle.as_radians());
                report(reading, faulted, "IMU", i)
            })
            .collect();
        Readings {
            imus,
            vertical: read_wheels(&self.vertical, &self.faults.vertical, "Vertical Tracking Wheel"),
            horizontal: read_wheels(
                &self.horizontal,
                &self.faults.horizontal,
                "Horizontal Tracking Wheel",
            ),
        }
    }
}

fn read_wheels(wheels: &[TrackingWheel], faults: &[Cell<bool>], name: &str) -> Vec<Option<f64>> {
    wheels
        .iter()
        .zip(faults)
        .enumerate()
        .map(|(i, (wheel, faulted))| {
            report(wheel.distance(), faulted, name, i)
        })
        .collect()
}

/// A change in whether a sensor can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Lost,
    Restored,
}

fn link_change(faulted: &Cell<bool>, readable: bool) -> Option<Link> {
    match (faulted.replace(!readable), readable) {
        (false, false) => Some(Link::Lost),
        (true, true) => Some(Link::Restored),
        _ => None,
    }
}

/// Unwraps one sensor reading. A sensor that stays unreadable is only
/// logged on the tick it went down.
fn report<T>(
    reading: Result<T, DeviceError>,
    faulted: &Cell<bool>,
    name: &str,
    i: usize,
) -> Option<T> {
    match (link_change(faulted, reading.is_ok()), reading) {
        (Some(Link::Restored), Ok(value)) => {
            info!("{} {} Reconnected", name, i);
            Some(value)
        }
        (_, Ok(value)) => Some(value),
        (Some(Link::Lost), Err(e)) => {
            warn!("{} {} Error: {}", name, i, e);
            None
        }
        (_, Err(_)) => None,
    }
}

/// Everything that changes while tracking.
struct OdomState {
    pose:        Pose,
    /// Readings from the previous tick.
    previous:    Readings,
    /// `None` until the first calibration finishes.
    plan:        Option<TrackingPlan>,
    /// Set while sensors are being calibrated. Ticks only refresh `previous`.
    calibrating: bool,
}

/// One tick of the tracking loop.
fn update(sensors: &Sensors, state: &RefCell<OdomState>) {
    let readings = sensors.read();
    let mut guard = state.borrow_mut();
    let state = &mut *guard;
    if let (Some(plan), false) = (&state.plan, state.calibrating) {
        state.pose = step(state.pose, plan, &sensors.layout, &state.previous, &readings);
    }
    state.previous = readings;
}

async fn odom_loop(sensors: Rc<Sensors>, state: Rc<RefCell<OdomState>>, period: Duration) {
    info!("Odometry Tracking Started");
    loop {
        update(&sensors, &state);
        sleep(period).await;
    }
}

/// Tracks the pose of a differential drive robot from any number of IMUs,
/// vertical tracking wheels and horizontal tracking wheels, including none.
///
/// Nothing is tracked until [`calibrate`](Self::calibrate) has run once.
/// Dropping the odometry stops its task.
pub struct TrackingWheelOdometry {
    sensors: Rc<Sensors>,
    state:   Rc<RefCell<OdomState>>,
    config:  OdomConfig,
    task:    Option<Task<()>>,
}

impl TrackingWheelOdometry {
    /// Creates odometry at the origin with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `imus` - Inertial sensors. Their readings are fused for heading.
    /// * `vertical` - Wheels rolling forward/backward, used for local y.
    /// * `horizontal` - Wheels rolling sideways, used for local x. Two of
    ///   them can stand in for the IMUs.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Heading from two horizontal wheels, no IMU
    /// let odom = TrackingWheelOdometry::new(vec![], vec![vertical], vec![front, back]);
    /// ```
    pub fn new(
        imus: Vec<SharedImu>,
        vertical: Vec<TrackingWheel>,
        horizontal: Vec<TrackingWheel>,
    ) -> Self {
        Self::with_config(imus, vertical, horizontal, OdomConfig::default())
    }

    /// Creates odometry at the origin with a custom configuration.
    pub fn with_config(
        imus: Vec<SharedImu>,
        vertical: Vec<TrackingWheel>,
        horizontal: Vec<TrackingWheel>,
        config: OdomConfig,
    ) -> Self {
        let layout = Layout {
            vertical:   vertical.iter().map(TrackingWheel::offset).collect(),
            horizontal: horizontal.iter().map(TrackingWheel::offset).collect(),
            fusion:     config.heading_fusion,
        };
        let faults = Faults {
            imus:       vec![Cell::new(false); imus.len()],
            vertical:   vec![Cell::new(false); vertical.len()],
            horizontal: vec![Cell::new(false); horizontal.len()],
        };
        let sensors = Sensors {
            imus,
            vertical,
            horizontal,
            layout,
            faults,
        };
        let state = OdomState {
            pose:        Pose::origin(),
            previous:    sensors.read(),
            plan:        None,
            calibrating: false,
        };
        Self {
            sensors: Rc::new(sensors),
            state: Rc::new(RefCell::new(state)),
            config,
            task: None,
        }
    }

    /// Creates odometry starting at a specific pose.
    pub fn from_pose(
        imus: Vec<SharedImu>,
        vertical: Vec<TrackingWheel>,
        horizontal: Vec<TrackingWheel>,
        pose: Pose,
    ) -> Self {
        let odom = Self::new(imus, vertical, horizontal);
        odom.state.borrow_mut().pose = pose;
        odom
    }

    /// Calibrates the sensors and starts tracking.
    ///
    /// Returns once every sensor is calibrated or `max_calibration_time` has
    /// passed, whichever comes first. The returned status says which
    /// sensors odometry ended up using; see [`CalibrationStatus`].
    ///
    /// Calling this again recalibrates. The pose is held still while that
    /// happens, and the tracking task keeps running rather than being
    /// started twice.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let status = odom.calibrate(Duration::from_secs(2)).await;
    /// if status.is_degraded() {
    ///     warn!("Odometry is degraded: {}", status);
    /// }
    /// ```
    pub async fn calibrate(&mut self, max_calibration_time: Duration) -> CalibrationStatus {
        let status = self.calibrate_with(max_calibration_time, sleep).await;
        self.start();
        status
    }

    /// Calibrates with the configured budget (3 seconds by default).
    pub async fn calibrate_default(&mut self) -> CalibrationStatus {
        self.calibrate(self.config.calibration_time).await
    }

    async fn calibrate_with<P, F>(&mut self, budget: Duration, pause: P) -> CalibrationStatus
    where
        P: FnMut(Duration) -> F,
        F: Future<Output = ()>,
    {
        self.state.borrow_mut().calibrating = true;
        let sensors = &self.sensors;
        let outcomes = calibrate_sensors(
            &sensors.imus,
            &sensors.vertical,
            &sensors.horizontal,
            budget,
            self.config.calibration_poll,
            pause,
        )
        .await;
        let plan = TrackingPlan::resolve(&outcomes, &sensors.layout.horizontal);
        debug!("Calibration outcomes: {:?}", outcomes);
        debug!("Tracking plan: {:?}", plan);

        let status = plan.status;
        let readings = sensors.read();
        {
            let mut state = self.state.borrow_mut();
            state.previous = readings;
            state.plan = Some(plan);
            state.calibrating = false;
        }

        if status.is_degraded() {
            warn!("Odometry Calibration: {}", status);
        } else {
            info!("Odometry Calibration: {}", status);
        }
        status
    }

    /// Spawns the tracking task unless it is already running.
    ///
    /// Spawning needs the vexide executor, so this only runs on the brain.
    /// Host tests drive ticks through `tick` instead.
    fn start(&mut self) {
        if self.task.is_none() {
            let sensors = self.sensors.clone();
            let state = self.state.clone();
            self.task = Some(spawn(odom_loop(sensors, state, self.config.tick_period)));
        }
    }

    /// Whether the tracking task is running.
    pub fn is_running(&self) -> bool { self.task.is_some() }

    /// The estimated pose.
    pub fn pose(&self) -> Pose { self.state.borrow().pose }

    /// Replaces the estimated pose.
    ///
    /// Sensor travel since the last tick is discarded, so the next tick
    /// measures from this moment.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Starting tile, facing right
    /// odom.set_pose(Pose::new(15.0, -12.0, Angle::from_degrees(90.0)));
    /// ```
    pub fn set_pose(&self, pose: Pose) {
        let readings = self.sensors.read();
        let mut state = self.state.borrow_mut();
        state.previous = readings;
        state.pose = pose;
    }

    /// Moves the pose back to the origin with heading 0.
    pub fn reset_origin(&self) { self.set_pose(Pose::new(0.0, 0.0, Angle::from_radians(0.0))); }

    /// The result of the last calibration, or `None` before the first one.
    pub fn status(&self) -> Option<CalibrationStatus> {
        self.state.borrow().plan.as_ref().map(|plan| plan.status)
    }

    /// The sensors chosen by the last calibration.
    pub fn plan(&self) -> Option<TrackingPlan> { self.state.borrow().plan.clone() }

    /// The configuration in use.
    pub fn config(&self) -> &OdomConfig { &self.config }

    #[cfg(test)]
    fn tick(&self) { update(&self.sensors, &self.state); }
}

impl Drop for TrackingWheelOdometry {
    fn drop(&mut self) {
        // The executor is single threaded, so the task is parked at its
        // sleep while this runs. Dropping it cancels it before the sensor
        // handles go away.
        if let Some(task) = self.task.take() {
            drop(task);
            info!("Odometry Tracking Stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        odom::{
            calibration::HeadingSource,
            testing::{MockEncoder, MockImu, block_on},
        },
        shared,
    };

    const TOLERANCE: f64 = 1e-9;

    fn calibrate(odom: &mut TrackingWheelOdometry) -> CalibrationStatus {
        block_on(odom.calibrate_with(Duration::from_millis(200), |_| async {}))
    }

    fn wheel(encoder: &Rc<RefCell<MockEncoder>>, diameter: f64, offset: f64) -> TrackingWheel {
        TrackingWheel::new(encoder.clone(), diameter, offset)
    }

    fn imu(imu: &Rc<RefCell<MockImu>>) -> SharedImu { imu.clone() }

    #[test]
    fn nothing_moves_before_calibration() {
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let odom = TrackingWheelOdometry::new(vec![], vec![wheel(&encoder, 2.0, 0.0)], vec![]);
        encoder.borrow_mut().roll_to(10.0, 2.0);
        odom.tick();
        assert_eq!(odom.pose(), Pose::origin());
        assert_eq!(odom.status(), None);
        assert!(!odom.is_running());
    }

    #[test]
    fn set_pose_round_trips() {
        let odom = TrackingWheelOdometry::new(vec![], vec![], vec![]);
        for pose in [
            Pose::new(15.0, -12.0, Angle::from_degrees(90.0)),
            Pose::new(-0.5, 1e6, Angle::from_radians(-7.25)),
            Pose::new(0.0, 0.0, Angle::from_degrees(720.0)),
        ] {
            odom.set_pose(pose);
            assert_eq!(odom.pose(), pose);
        }
        odom.reset_origin();
        assert_eq!(odom.pose(), Pose::origin());
    }

    #[test]
    fn from_pose_starts_there() {
        let start = Pose::new(1.0, 2.0, Angle::from_degrees(45.0));
        let odom = TrackingWheelOdometry::from_pose(vec![], vec![], vec![], start);
        assert_eq!(odom.pose(), start);
    }

    #[test]
    fn two_imus_and_offset_wheel_end_to_end() {
        let imu_a = shared(MockImu::at_degrees(0.0));
        let imu_b = shared(MockImu::at_degrees(0.0));
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![imu(&imu_a), imu(&imu_b)],
            vec![wheel(&encoder, 2.0, -2.0)],
            vec![],
        );
        assert_eq!(calibrate(&mut odom), CalibrationStatus::AxisUntracked);

        imu_a.borrow_mut().rotation = Angle::from_degrees(10.0);
        imu_b.borrow_mut().rotation = Angle::from_degrees(12.0);
        encoder.borrow_mut().roll_to(1.0, 2.0);
        odom.tick();

        let pose = odom.pose();
        assert!((pose.t.as_degrees() - 11.0).abs() < 1e-9);
        assert!((pose.x - 0.132444).abs() < 1e-5);
        assert!((pose.y - 1.375486).abs() < 1e-5);
    }

    #[test]
    fn heading_frozen_without_heading_sensors() {
        let left = shared(MockEncoder::at_degrees(0.0));
        let right = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![],
            vec![wheel(&left, 2.75, 5.0), wheel(&right, 2.75, -5.0)],
            vec![],
        );
        assert_eq!(calibrate(&mut odom), CalibrationStatus::HeadingUntracked);
        let heading = Angle::from_degrees(33.0);
        odom.set_pose(Pose::new(0.0, 0.0, heading));

        for (l, r) in [(1.0, -1.0), (4.0, 2.0), (-3.0, 7.5), (0.0, 0.0)] {
            left.borrow_mut().roll_to(l, 2.75);
            right.borrow_mut().roll_to(r, 2.75);
            odom.tick();
            assert_eq!(odom.pose().t, heading);
        }
    }

    #[test]
    fn straight_line_distance() {
        let heading = shared(MockImu::at_degrees(0.0));
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let wheels = vec![wheel(&encoder, 3.25, 0.0)];
        let mut odom = TrackingWheelOdometry::new(vec![imu(&heading)], wheels, vec![]);
        calibrate(&mut odom);
        // The IMU reads 0 but the field pose says 90: driving goes along +x
        odom.set_pose(Pose::new(0.0, 0.0, Angle::from_degrees(90.0)));

        for step in 1..=48 {
            encoder.borrow_mut().roll_to(0.5 * step as f64, 3.25);
            odom.tick();
        }
        let pose = odom.pose();
        assert!((pose.x - 24.0).abs() < 1e-6);
        assert!(pose.y.abs() < 1e-6);
    }

    #[test]
    fn set_pose_discards_travel_since_last_tick() {
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![imu(&shared(MockImu::at_degrees(0.0)))],
            vec![wheel(&encoder, 2.0, 0.0)],
            vec![],
        );
        calibrate(&mut odom);
        encoder.borrow_mut().roll_to(5.0, 2.0);
        let target = Pose::new(10.0, 10.0, Angle::from_radians(0.0));
        odom.set_pose(target);
        odom.tick();
        assert_eq!(odom.pose(), target);
    }

    #[test]
    fn set_pose_keeps_heading_reference() {
        let heading = shared(MockImu::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(vec![imu(&heading)], vec![], vec![]);
        calibrate(&mut odom);
        heading.borrow_mut().rotation = Angle::from_degrees(45.0);
        odom.tick();
        odom.set_pose(Pose::new(0.0, 0.0, Angle::from_degrees(180.0)));
        odom.tick();
        assert!((odom.pose().t.as_degrees() - 180.0).abs() < TOLERANCE);
        heading.borrow_mut().rotation = Angle::from_degrees(55.0);
        odom.tick();
        assert!((odom.pose().t.as_degrees() - 190.0).abs() < 1e-9);
    }

    #[test]
    fn interleaved_set_pose_is_never_torn() {
        let heading = shared(MockImu::at_degrees(0.0));
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let wheels = vec![wheel(&encoder, 2.0, 0.0)];
        let mut odom = TrackingWheelOdometry::new(vec![imu(&heading)], wheels, vec![]);
        calibrate(&mut odom);

        for n in 1..=20 {
            let set = Pose::new(n as f64, -(n as f64), Angle::from_degrees(n as f64));
            odom.set_pose(set);
            assert_eq!(odom.pose(), set);
            encoder.borrow_mut().roll_to(n as f64, 2.0);
            heading.borrow_mut().rotation = Angle::from_degrees(n as f64 * 3.0);
            odom.tick();
            let pose = odom.pose();
            // Every field moved together from `set`: heading by the IMU's 3°
            // and position by one inch along the average heading
            let avg = (n as f64 + 1.5).to_radians();
            assert!((pose.t.as_degrees() - (n as f64 + 3.0)).abs() < 1e-9);
            let chord = 2.0 * (1.5f64.to_radians()).sin() / 3f64.to_radians();
            assert!((pose.x - (set.x + chord * avg.sin())).abs() < 1e-9);
            assert!((pose.y - (set.y + chord * avg.cos())).abs() < 1e-9);
        }
    }

    #[test]
    fn recalibration_reuses_plan_and_ignores_resets() {
        let encoder = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![imu(&shared(MockImu::at_degrees(0.0)))],
            vec![wheel(&encoder, 2.0, 0.0)],
            vec![wheel(&shared(MockEncoder::at_degrees(0.0)), 2.0, 0.0)],
        );
        assert_eq!(calibrate(&mut odom), CalibrationStatus::Ok);
        // Only `calibrate` spawns the task
        assert!(!odom.is_running());
        encoder.borrow_mut().roll_to(6.0, 2.0);
        odom.tick();
        let before = odom.pose();
        assert!((before.y - 6.0).abs() < TOLERANCE);

        // Recalibration zeroes the encoder. That must not read as travel.
        assert_eq!(calibrate(&mut odom), CalibrationStatus::Ok);
        odom.tick();
        assert_eq!(odom.pose(), before);
        assert_eq!(odom.plan().map(|p| p.heading), Some(HeadingSource::Imus(vec![0])));
    }

    #[test]
    fn unreadable_wheel_contributes_nothing() {
        let good = shared(MockEncoder::at_degrees(0.0));
        let flaky = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![imu(&shared(MockImu::at_degrees(0.0)))],
            vec![wheel(&good, 2.0, 0.0), wheel(&flaky, 2.0, 0.0)],
            vec![],
        );
        calibrate(&mut odom);
        good.borrow_mut().roll_to(2.0, 2.0);
        flaky.borrow_mut().readable = false;
        odom.tick();
        assert!((odom.pose().y - 2.0).abs() < TOLERANCE);

        // Back online: its first reading only re-seeds it
        good.borrow_mut().roll_to(3.0, 2.0);
        {
            let mut flaky = flaky.borrow_mut();
            flaky.readable = true;
            flaky.roll_to(3.0, 2.0);
        }
        odom.tick();
        assert!((odom.pose().y - 3.0).abs() < TOLERANCE);

        good.borrow_mut().roll_to(4.0, 2.0);
        flaky.borrow_mut().roll_to(4.0, 2.0);
        odom.tick();
        assert!((odom.pose().y - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn imu_outage_does_not_double_count_heading() {
        let imu_a = shared(MockImu::at_degrees(0.0));
        let imu_b = shared(MockImu::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(vec![imu(&imu_a), imu(&imu_b)], vec![], vec![]);
        calibrate(&mut odom);

        imu_a.borrow_mut().rotation = Angle::from_degrees(10.0);
        imu_b.borrow_mut().rotation = Angle::from_degrees(10.0);
        imu_b.borrow_mut().readable = false;
        odom.tick();
        assert!((odom.pose().t.as_degrees() - 10.0).abs() < TOLERANCE);

        imu_a.borrow_mut().rotation = Angle::from_degrees(20.0);
        {
            let mut imu_b = imu_b.borrow_mut();
            imu_b.readable = true;
            imu_b.rotation = Angle::from_degrees(20.0);
        }
        odom.tick();
        assert!((odom.pose().t.as_degrees() - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn read_errors_are_logged_once_per_outage() {
        let faulted = Cell::new(false);
        let changes: Vec<_> = [false, false, false, true, true, false]
            .into_iter()
            .map(|readable| link_change(&faulted, readable))
            .collect();
        assert_eq!(changes, vec![
            Some(Link::Lost),
            None,
            None,
            Some(Link::Restored),
            None,
            Some(Link::Lost)
        ]);

        let down: Result<f64, _> = Err(DeviceError::Disconnected);
        assert_eq!(report(down, &faulted, "IMU", 0), None);
        assert_eq!(report(Ok(1.5), &faulted, "IMU", 0), Some(1.5));
        assert!(!faulted.get());
    }

    #[test]
    fn wheel_pair_heading_after_imu_failure() {
        let mut broken = MockImu::at_degrees(0.0);
        broken.fail_triggers = 2;
        let front = shared(MockEncoder::at_degrees(0.0));
        let back = shared(MockEncoder::at_degrees(0.0));
        let mut odom = TrackingWheelOdometry::new(
            vec![imu(&shared(broken))],
            vec![wheel(&shared(MockEncoder::at_degrees(0.0)), 2.0, 0.0)],
            vec![wheel(&front, 2.0, 4.0), wheel(&back, 2.0, -2.0)],
        );
        assert_eq!(calibrate(&mut odom), CalibrationStatus::AlternateHeading);
        // Spin 0.5 rad clockwise in place
        front.borrow_mut().roll_to(2.0, 2.0);
        back.borrow_mut().roll_to(-1.0, 2.0);
        odom.tick();
        let pose = odom.pose();
        assert!((pose.t.as_radians() - 0.5).abs() < TOLERANCE);
        assert!(pose.x.abs() < TOLERANCE && pose.y.abs() < TOLERANCE);
    }
}

//! Sensor capabilities, tracking wheel geometry and position types.
//!
//! Odometry never talks to hardware directly. It consumes two capabilities:
//!
//! - **[`Encoder`]**: anything that reports an angular position, such as a
//!   V5 rotation sensor or a 3-wire optical shaft encoder.
//! - **[`Imu`]**: anything that reports an accumulated heading and can be
//!   calibrated, such as the V5 inertial sensor.
//!
//! Adapters for the vexide devices are provided ([`TrackingSensor`] and
//! [`V5Imu`]). Anything else can be used
//! by implementing the traits.
//!
//! # Conventions
//!
//! - Lengths are in inches.
//! - Headings grow clockwise, matching the V5 inertial sensor.
//! - A vertical wheel's offset is positive to the **left** of the turning
//!   center; a horizontal wheel's offset is positive to the **front**.
//!
//! # Example
//!
//! ```ignore
//! use antaeus_odom::odom::devices::{TrackingSensor, TrackingWheel};
//! use antaeus_odom::shared;
//! use vexide::prelude::*;
//!
//! // Rotation sensor on port 5, 2.75" wheel, 1.5" left of center
//! let sensor = shared(TrackingSensor::rotation(
//!     RotationSensor::new(peripherals.port_5, Direction::Forward),
//!     false,
//! ));
//! let vertical = TrackingWheel::new(sensor, 2.75, 1.5);
//! ```

use std::{
    cell::RefCell,
    fmt::Display,
    future::Future,
    pin::pin,
    rc::Rc,
    task::{Context, Poll, Waker},
    time::Instant,
};

use thiserror::Error;
use vexide::{
    adi::encoder::AdiOpticalEncoder,
    math::Angle,
    smart::{
        imu::{InertialSensor, InertialStatus},
        rotation::RotationSensor,
    },
};

/// Shared handle to an encoder.
///
/// The caller keeps its own clone if it needs the device elsewhere. The
/// odometry holds its clones until it is dropped.
pub type SharedEncoder = Rc<RefCell<dyn Encoder>>;

/// Shared handle to an inertial sensor.
pub type SharedImu = Rc<RefCell<dyn Imu>>;

/// An error reported by a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Nothing is plugged into the port.
    #[error("device is disconnected")]
    Disconnected,
    /// The device is connected but can't report a value yet.
    #[error("device is not ready")]
    NotReady,
    /// An error forwarded from the device driver.
    #[error("port error: {0}")]
    Port(String),
}

impl DeviceError {
    /// Wraps a driver error.
    pub fn port(error: impl Display) -> Self { Self::Port(error.to_string()) }
}

/// A rotary encoder that can be used by a [`TrackingWheel`].
pub trait Encoder {
    /// The current angular position of the encoder shaft.
    fn position(&self) -> Result<Angle, DeviceError>;

    /// Zeroes the encoder. This is the encoder's calibration step.
    fn reset_position(&mut self) -> Result<(), DeviceError>;

    /// Whether readings from [`position`](Encoder::position) must be negated.
    fn is_reversed(&self) -> bool { false }
}

/// An inertial sensor used as a heading source.
pub trait Imu {
    /// Accumulated clockwise rotation since calibration. Not wrapped.
    fn rotation(&self) -> Result<Angle, DeviceError>;

    /// Starts calibrating and returns immediately.
    fn calibrate(&mut self) -> Result<(), DeviceError>;

    /// Whether a calibration started by [`calibrate`](Imu::calibrate) is still
    /// running.
    fn is_calibrating(&mut self) -> Result<bool, DeviceError>;
}

/// A V5 inertial sensor used as an [`Imu`].
///
/// VEXos only accepts a calibration request once the sensor has reported
/// its first status, and it raises the `CALIBRATING` flag a little after
/// the request. This adapter walks through those phases on every
/// [`is_calibrating`](Imu::is_calibrating) call, so it only reports a
/// finished calibration after the flag has been seen set and then cleared.
///
/// # Example
///
/// ```ignore
/// use antaeus_odom::{odom::devices::V5Imu, shared};
/// use vexide::prelude::*;
///
/// let imu = shared(V5Imu::new(InertialSensor::new(peripherals.port_10)));
/// ```
pub struct V5Imu {
    sensor: InertialSensor,
    phase:  CalibrationPhase,
}

impl V5Imu {
    /// Wraps an inertial sensor.
    pub fn new(sensor: InertialSensor) -> Self {
        Self {
            sensor,
            phase: CalibrationPhase::Idle,
        }
    }

    /// The underlying sensor.
    pub fn sensor(&self) -> &InertialSensor { &self.sensor }

    /// Issues the calibration request.
    ///
    /// Only called once the sensor reports a status without `CALIBRATING`,
    /// which is exactly when the first poll of vexide's calibrate future
    /// sends the reset. The sensor keeps calibrating after the future is
    /// dropped.
    fn request_reset(&mut self) -> Result<(), DeviceError> {
        let mut calibration = pin!(self.sensor.calibrate());
        let mut cx = Context::from_waker(Waker::noop());
        match calibration.as_mut().poll(&mut cx) {
            Poll::Ready(Err(e)) => Err(DeviceError::port(e)),
            Poll::Ready(Ok(())) | Poll::Pending => Ok(()),
        }
    }
}

impl Imu for V5Imu {
    fn rotation(&self) -> Result<Angle, DeviceError> {
        self.sensor.rotation().map_err(DeviceError::port)
    }

    fn calibrate(&mut self) -> Result<(), DeviceError> {
        self.sensor.status().map_err(DeviceError::port)?;
        self.phase = CalibrationPhase::Status { since: Instant::now() };
        Ok(())
    }

    fn is_calibrating(&mut self) -> Result<bool, DeviceError> {
        let now = Instant::now();
        let observed = self.sensor.status().map_err(DeviceError::port);
        let next = observed.and_then(|status| self.phase.advance(status, now));
        let next = match next {
            Ok(CalibrationPhase::Trigger) => {
                self.request_reset().map(|()| CalibrationPhase::Start { since: now })
            }
            next => next,
        };
        match next {
            Ok(phase) => {
                self.phase = phase;
                Ok(phase != CalibrationPhase::Idle)
            }
            Err(e) => {
                self.phase = CalibrationPhase::Idle;
                Err(e)
            }
        }
    }
}

/// Where a [`V5Imu`] calibration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CalibrationPhase {
    /// Not calibrating.
    Idle,
    /// Waiting for VEXos to report any status at all.
    Status { since: Instant },
    /// Ready for the calibration request.
    Trigger,
    /// Request sent, waiting for `CALIBRATING` to be set.
    Start { since: Instant },
    /// Waiting for `CALIBRATING` to clear.
    End,
}

impl CalibrationPhase {
    /// The phase after observing `status` at `now`.
    ///
    /// Errors with [`DeviceError::NotReady`] if the sensor never reports a
    /// status or never starts calibrating within
    /// [`InertialSensor::CALIBRATION_START_TIMEOUT`].
    pub(crate) fn advance(
        self,
        status: InertialStatus,
        now: Instant,
    ) -> Result<Self, DeviceError> {
        let calibrating = status.contains(InertialStatus::CALIBRATING);
        let waited = |since: Instant, phase: Self| {
            if now.duration_since(since) > InertialSensor::CALIBRATION_START_TIMEOUT {
                Err(DeviceError::NotReady)
            } else {
                Ok(phase)
            }
        };
        match self {
            Self::Idle => Ok(Self::Idle),
            // VEXos may already be calibrating on its own after power-up
            Self::Status { .. } | Self::Trigger if calibrating => Ok(Self::End),
            Self::Status { since } if status.is_empty() => waited(since, self),
            Self::Status { .. } | Self::Trigger => Ok(Self::Trigger),
            Self::Start { .. } if calibrating => Ok(Self::End),
            Self::Start { since } => waited(since, self),
            Self::End if calibrating => Ok(Self::End),
            Self::End => Ok(Self::Idle),
        }
    }
}

/// The encoder hardware behind a [`TrackingSensor`].
pub enum TrackingDevice {
    /// An ADI (3-wire) optical shaft encoder.
    AdiOpticalEncoder(AdiOpticalEncoder),
    /// A V5 rotation sensor.
    RotationSensor(RotationSensor),
}

/// A vexide encoder with an explicit direction.
///
/// # Example
///
/// ```ignore
/// use antaeus_odom::odom::devices::TrackingSensor;
/// use vexide::prelude::*;
///
/// let sensor = TrackingSensor::optical(
///     AdiOpticalEncoder::new(peripherals.adi_a, peripherals.adi_b),
///     true,
/// );
/// ```
pub struct TrackingSensor {
    device:   TrackingDevice,
    reversed: bool,
}

impl TrackingSensor {
    /// Creates a tracking sensor from a V5 rotation sensor.
    pub fn rotation(sensor: RotationSensor, reversed: bool) -> Self {
        Self {
            device: TrackingDevice::RotationSensor(sensor),
            reversed,
        }
    }

    /// Creates a tracking sensor from an ADI optical encoder.
    pub fn optical(encoder: AdiOpticalEncoder, reversed: bool) -> Self {
        Self {
            device: TrackingDevice::AdiOpticalEncoder(encoder),
            reversed,
        }
    }

    /// The underlying device.
    pub fn device(&self) -> &TrackingDevice { &self.device }
}

impl Encoder for TrackingSensor {
    fn position(&self) -> Result<Angle, DeviceError> {
        match &self.device {
            TrackingDevice::AdiOpticalEncoder(encoder) => {
                encoder.position().map_err(DeviceError::port)
            }
            TrackingDevice::RotationSensor(sensor) => sensor.position().map_err(DeviceError::port),
        }
    }

    fn reset_position(&mut self) -> Result<(), DeviceError> {
        match &mut self.device {
            TrackingDevice::AdiOpticalEncoder(encoder) => {
                encoder.reset_position().map_err(DeviceError::port)
            }
            TrackingDevice::RotationSensor(sensor) => {
                sensor.reset_position().map_err(DeviceError::port)
            }
        }
    }

    fn is_reversed(&self) -> bool { self.reversed }
}

/// An unpowered wheel with an encoder, used to measure travel along one axis.
///
/// Vertical wheels roll forward and backward and measure local y. Horizontal
/// wheels roll sideways and measure local x.
///
/// The wheel is immutable once built.
#[derive(Clone)]
pub struct TrackingWheel {
    encoder:    SharedEncoder,
    diameter:   f64,
    offset:     f64,
    gear_ratio: f64,
}

impl TrackingWheel {
    /// Creates a tracking wheel with the encoder mounted directly on the
    /// wheel's axle.
    ///
    /// # Arguments
    ///
    /// * `encoder` - The encoder measuring the wheel.
    /// * `diameter` - The wheel diameter in inches. Must be positive.
    /// * `offset` - Distance from the turning center in inches. Left-positive
    ///   for vertical wheels, front-positive for horizontal wheels.
    pub fn new(encoder: SharedEncoder, diameter: f64, offset: f64) -> Self {
        debug_assert!(diameter > 0.0, "tracking wheel diameter must be positive");
        Self {
            encoder,
            diameter,
            offset,
            gear_ratio: 1.0,
        }
    }

    /// Sets the external gearing between the encoder and the wheel.
    ///
    /// # Arguments
    ///
    /// * `driven_gear` - The number of teeth on the wheel-side gear.
    /// * `driving_gear` - The number of teeth on the encoder-side gear.
    pub fn with_gearing(mut self, driven_gear: f64, driving_gear: f64) -> Self {
        debug_assert!(driven_gear > 0.0 && driving_gear > 0.0);
        self.gear_ratio = driving_gear / driven_gear;
        self
    }

    /// The wheel diameter in inches.
    pub fn diameter(&self) -> f64 { self.diameter }

    /// The signed offset from the turning center in inches.
    pub fn offset(&self) -> f64 { self.offset }

    /// Wheel turns per encoder turn.
    pub fn gear_ratio(&self) -> f64 { self.gear_ratio }

    /// Converts an encoder reading into the distance rolled by the wheel.
    pub fn distance_from(&self, position: Angle) -> f64 {
        let distance = position.as_radians() * self.gear_ratio * (self.diameter / 2.0);
        if self.encoder.borrow().is_reversed() {
            -distance
        } else {
            distance
        }
    }

    /// Reads the encoder and returns the distance rolled in inches.
    pub fn distance(&self) -> Result<f64, DeviceError> {
        let position = self.encoder.borrow().position()?;
        Ok(self.distance_from(position))
    }

    /// Zeroes the encoder and checks that it can be read back.
    pub(crate) fn calibrate(&self) -> Result<(), DeviceError> {
        let mut encoder = self.encoder.borrow_mut();
        encoder.reset_position()?;
        encoder.position().map(|_| ())
    }
}

/// A 2D position with heading.
///
/// `x` and `y` are in inches in the field frame. `t` is the heading,
/// clockwise from the field's +y axis. The heading is not wrapped: after two
/// full clockwise turns from 0 it reads 720°.
///
/// # Example
///
/// ```ignore
/// use antaeus_odom::odom::devices::Pose;
/// use vexide::math::Angle;
///
/// let pose = Pose::new(15.0, -12.0, Angle::from_degrees(90.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// The x-coordinate in inches.
    pub x: f64,
    /// The y-coordinate in inches.
    pub y: f64,
    /// The heading angle.
    pub t: Angle,
}

impl Pose {
    /// Creates a new Pose with the specified position and heading.
    pub fn new(x: f64, y: f64, t: Angle) -> Self { Self { x, y, t } }

    /// Creates a Pose at the origin (0, 0) with heading 0.
    pub fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            t: Angle::from_radians(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{f64::consts::PI, time::Duration};

    use super::*;
    use crate::{odom::testing::MockEncoder, shared};

    #[test]
    fn distance_uses_radius() {
        let wheel = TrackingWheel::new(shared(MockEncoder::at_degrees(360.0)), 2.75, 0.0);
        let expected = 2.75 * PI;
        assert!((wheel.distance().unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn reversed_encoder_negates_distance() {
        let mut encoder = MockEncoder::at_degrees(90.0);
        encoder.reversed = true;
        let wheel = TrackingWheel::new(shared(encoder), 2.0, 0.0);
        assert!((wheel.distance().unwrap() + PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn gearing_scales_distance() {
        // 36 tooth wheel gear driven by a 12 tooth encoder gear
        let wheel = TrackingWheel::new(shared(MockEncoder::at_degrees(360.0)), 2.0, 0.0)
            .with_gearing(36.0, 12.0);
        assert!((wheel.gear_ratio() - 1.0 / 3.0).abs() < 1e-12);
        assert!((wheel.distance().unwrap() - 2.0 * PI / 3.0).abs() < 1e-10);
    }

    #[test]
    fn unreadable_encoder_reports_error() {
        let mut encoder = MockEncoder::at_degrees(0.0);
        encoder.readable = false;
        let wheel = TrackingWheel::new(shared(encoder), 2.0, 1.0);
        assert_eq!(wheel.distance(), Err(DeviceError::Disconnected));
    }

    #[test]
    fn calibrate_zeroes_encoder() {
        let encoder = shared(MockEncoder::at_degrees(123.0));
        let wheel = TrackingWheel::new(encoder.clone(), 2.0, 0.0);
        wheel.calibrate().unwrap();
        assert_eq!(wheel.distance().unwrap(), 0.0);
    }

    #[test]
    fn imu_finishes_only_after_flag_is_seen_set_and_cleared() {
        let t0 = Instant::now();
        let at = |ms| t0 + Duration::from_millis(ms);
        let none = InertialStatus::empty();
        let busy = InertialStatus::CALIBRATING;

        let mut phase = CalibrationPhase::Status { since: t0 };
        // No packet from VEXos yet
        phase = phase.advance(none, at(5)).unwrap();
        assert_eq!(phase, CalibrationPhase::Status { since: t0 });
        phase = phase.advance(InertialStatus::AUTO_CALIBRATED, at(10)).unwrap();
        assert_eq!(phase, CalibrationPhase::Trigger);

        // The flag lags the request
        phase = CalibrationPhase::Start { since: at(10) };
        for ms in [20, 30, 40] {
            phase = phase.advance(none, at(ms)).unwrap();
            assert_eq!(phase, CalibrationPhase::Start { since: at(10) });
        }
        phase = phase.advance(busy, at(50)).unwrap();
        assert_eq!(phase, CalibrationPhase::End);
        phase = phase.advance(busy, at(1500)).unwrap();
        assert_eq!(phase, CalibrationPhase::End);
        phase = phase.advance(none, at(2000)).unwrap();
        assert_eq!(phase, CalibrationPhase::Idle);
    }

    #[test]
    fn imu_already_calibrating_is_waited_on() {
        let t0 = Instant::now();
        let phase = CalibrationPhase::Status { since: t0 };
        assert_eq!(phase.advance(InertialStatus::CALIBRATING, t0), Ok(CalibrationPhase::End));
        assert_eq!(
            CalibrationPhase::Idle.advance(InertialStatus::CALIBRATING, t0),
            Ok(CalibrationPhase::Idle)
        );
    }

    #[test]
    fn imu_that_never_starts_times_out() {
        let t0 = Instant::now();
        let late = t0 + InertialSensor::CALIBRATION_START_TIMEOUT + Duration::from_millis(1);
        let silent = CalibrationPhase::Status { since: t0 };
        assert_eq!(silent.advance(InertialStatus::empty(), late), Err(DeviceError::NotReady));
        let ignored = CalibrationPhase::Start { since: t0 };
        assert_eq!(ignored.advance(InertialStatus::empty(), late), Err(DeviceError::NotReady));
    }

    #[test]
    fn origin_is_zero() {
        let origin = Pose::origin();
        assert_eq!(origin, Pose::new(0.0, 0.0, Angle::from_radians(0.0)));
    }
}

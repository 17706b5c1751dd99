//! Scripted sensors and a minimal executor for unit tests.

use std::{
    future::Future,
    pin::pin,
    task::{Context, Poll, Waker},
};

use vexide::math::Angle;

use super::devices::{DeviceError, Encoder, Imu};

/// An encoder whose reading is set by the test.
pub struct MockEncoder {
    pub position:    Angle,
    pub reversed:    bool,
    pub readable:    bool,
    /// Number of upcoming resets that fail.
    pub fail_resets: usize,
}

impl MockEncoder {
    pub fn at_degrees(degrees: f64) -> Self {
        Self {
            position:    Angle::from_degrees(degrees),
            reversed:    false,
            readable:    true,
            fail_resets: 0,
        }
    }

    /// Sets the shaft angle that rolls a wheel of `diameter` by `inches`.
    pub fn roll_to(&mut self, inches: f64, diameter: f64) {
        self.position = Angle::from_radians(inches / (diameter / 2.0));
    }
}

impl Encoder for MockEncoder {
    fn position(&self) -> Result<Angle, DeviceError> {
        if self.readable {
            Ok(self.position)
        } else {
            Err(DeviceError::Disconnected)
        }
    }

    fn reset_position(&mut self) -> Result<(), DeviceError> {
        if self.fail_resets > 0 {
            self.fail_resets -= 1;
            return Err(DeviceError::NotReady);
        }
        self.position = Angle::from_radians(0.0);
        Ok(())
    }

    fn is_reversed(&self) -> bool { self.reversed }
}

/// An inertial sensor with scripted calibration behavior.
pub struct MockImu {
    pub rotation:      Angle,
    pub readable:      bool,
    /// Number of upcoming calibration triggers that fail.
    pub fail_triggers: usize,
    /// Number of upcoming status polls that fail.
    pub fail_polls:    usize,
    /// Number of status polls that report "still calibrating" after a trigger.
    pub busy_polls:    usize,
    busy:              usize,
    pub triggers:      usize,
}

impl MockImu {
    pub fn at_degrees(degrees: f64) -> Self {
        Self {
            rotation:      Angle::from_degrees(degrees),
            readable:      true,
            fail_triggers: 0,
            fail_polls:    0,
            busy_polls:    2,
            busy:          0,
            triggers:      0,
        }
    }

    pub fn never_settles() -> Self {
        Self {
            busy_polls: usize::MAX,
            ..Self::at_degrees(0.0)
        }
    }
}

impl Imu for MockImu {
    fn rotation(&self) -> Result<Angle, DeviceError> {
        if self.readable {
            Ok(self.rotation)
        } else {
            Err(DeviceError::Disconnected)
        }
    }

    fn calibrate(&mut self) -> Result<(), DeviceError> {
        self.triggers += 1;
        if self.fail_triggers > 0 {
            self.fail_triggers -= 1;
            return Err(DeviceError::NotReady);
        }
        self.busy = self.busy_polls;
        Ok(())
    }

    fn is_calibrating(&mut self) -> Result<bool, DeviceError> {
        if self.fail_polls > 0 {
            self.fail_polls -= 1;
            return Err(DeviceError::Disconnected);
        }
        if self.busy > 0 {
            self.busy -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Drives a future to completion on the current thread.
///
/// Only suitable for futures that never wait on a real waker, which holds
/// for calibration when it is given an immediate pause function.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

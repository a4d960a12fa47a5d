#![no_std]
#![allow(deprecated)]

use core::ops::{Add, Div, Mul, Sub};

mod axis;
mod calibrate;
pub mod config;
mod dispatch;
mod protocol;
mod relay;
mod soil;
mod state;
mod switch;

pub use axis::{steps_from_revs, Axis, Profile};
pub use calibrate::CalibrationError;
pub use dispatch::Gantry;
pub use protocol::{Command, DecodeError, LineBuffer, Response};
pub use relay::{PumpChannel, Relays};
pub use soil::{percent, SoilSensors};
pub use state::{CalPhase, SystemState};
pub use switch::Debouncer;

pub fn remap<T: Copy + Add<T, Output = T> + Sub<T, Output = T> + Mul<T, Output = T> + Div<T, Output = T>>(val: T, in_l: T, in_h: T, out_l: T, out_h: T) -> T {
    ((val - in_l) * (out_h - out_l) / (in_h - in_l)) + out_l
}

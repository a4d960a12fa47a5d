//! Compile-time configuration for the gantry. None of this is runtime
//! tunable; recalibration only rediscovers travel lengths.

use crate::axis::Profile;

/// Rate at which the main loop ticks and `Axis::advance` is called.
/// The axis speed integrator assumes this value; see `axis.rs`.
pub const TICK_HZ: u32 = 1000;

/// Full steps per leadscrew revolution (1/8 microstepping on a 200 step
/// motor).
pub const STEPS_PER_REV: u32 = 1600;

/// Steps to back away from the home switch after it triggers, so the
/// measured length starts from a released switch.
pub const HOME_CLEARANCE_STEPS: i32 = 200;

/// Upper bound on travel during homing and measuring. A limit switch that
/// has not triggered within this many steps is treated as a calibration
/// failure instead of driving into the frame forever.
pub const MAX_TRAVEL_STEPS: i32 = 120_000;

/// Settle interval for limit switch debouncing, in ticks (10 ms at 1 kHz).
pub const DEBOUNCE_TICKS: u32 = 10;

/// Raw ADC readings for bone-dry soil and saturated soil.
pub const SOIL_RAW_DRY: u16 = 3200;
pub const SOIL_RAW_WET: u16 = 1200;

/// Floor of the acceleration ramp, steps per second.
pub const MIN_SPEED: u32 = 50;

/// Slow constant-speed profile used while seeking limit switches.
pub const CALIBRATION_PROFILE: Profile = Profile {
    max_speed: 200,
    accel: 0,
};

/// Fast accelerating profile used once travel lengths are known.
pub const OPERATIONAL_PROFILE: Profile = Profile {
    max_speed: 800,
    accel: 1600,
};

/// Pot slot positions as fractions of the calibrated travel per axis,
/// indexed by slot id 1..=9. A 3x3 bed, slot 1 nearest home.
pub const SLOTS: [(f32, f32); 9] = [
    (0.10, 0.12),
    (0.50, 0.12),
    (0.90, 0.12),
    (0.10, 0.50),
    (0.50, 0.50),
    (0.90, 0.50),
    (0.10, 0.88),
    (0.50, 0.88),
    (0.90, 0.88),
];

/// Longest accepted request line and largest emitted response line.
pub const MAX_LINE: usize = 128;

//! Travel-length discovery. Each axis is homed and measured in turn, X
//! fully before Y; the whole sequence blocks the command loop and is the
//! only place that does.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::timer::{CountDown, Periodic};

use crate::axis::Axis;
use crate::config::{
    CALIBRATION_PROFILE, HOME_CLEARANCE_STEPS, MAX_TRAVEL_STEPS, OPERATIONAL_PROFILE,
};
use crate::state::{CalPhase, SystemState};
use crate::switch::Debouncer;

#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum CalibrationError {
    /// A limit switch did not trigger within the travel bound, or the end
    /// switch was already closed at the start of the measuring run.
    Timeout,
}

/// Runs the full homing/measuring sequence and records the outcome in
/// `state`. On success both axes sit at zero with their travel limits set
/// and the operational profile active.
pub fn run<XE, XD, XP, XH, XL, YE, YD, YP, YH, YL, TIM>(
    x: &mut Axis<XE, XD, XP>,
    x_home: &mut Debouncer<XH>,
    x_end: &mut Debouncer<XL>,
    y: &mut Axis<YE, YD, YP>,
    y_home: &mut Debouncer<YH>,
    y_end: &mut Debouncer<YL>,
    timer: &mut TIM,
    state: &mut SystemState,
) -> Result<(), CalibrationError>
where
    XE: OutputPin,
    XD: OutputPin,
    XP: OutputPin,
    XH: InputPin,
    XL: InputPin,
    YE: OutputPin,
    YD: OutputPin,
    YP: OutputPin,
    YH: InputPin,
    YL: InputPin,
    TIM: CountDown + Periodic,
{
    // Calibration owns the loop from here; any in-flight targets are void.
    x.halt();
    y.halt();

    state.calibration = CalPhase::HomingX;
    home_axis(x, x_home, timer).map_err(|e| fail(state, e))?;

    state.calibration = CalPhase::MeasuringX;
    measure_axis(x, x_end, timer).map_err(|e| fail(state, e))?;

    state.calibration = CalPhase::HomingY;
    home_axis(y, y_home, timer).map_err(|e| fail(state, e))?;

    state.calibration = CalPhase::MeasuringY;
    measure_axis(y, y_end, timer).map_err(|e| fail(state, e))?;

    state.calibration = CalPhase::Done;
    x.set_profile(OPERATIONAL_PROFILE);
    y.set_profile(OPERATIONAL_PROFILE);
    Ok(())
}

fn fail(state: &mut SystemState, e: CalibrationError) -> CalibrationError {
    state.calibration = CalPhase::Failed;
    e
}

/// Drives toward the home switch, zeroes, then backs off far enough to
/// release the switch and zeroes again at the released point.
fn home_axis<ENA, DIR, PUL, SW, TIM>(
    axis: &mut Axis<ENA, DIR, PUL>,
    home: &mut Debouncer<SW>,
    timer: &mut TIM,
) -> Result<(), CalibrationError>
where
    ENA: OutputPin,
    DIR: OutputPin,
    PUL: OutputPin,
    SW: InputPin,
    TIM: CountDown + Periodic,
{
    axis.clear_limit();
    axis.set_profile(CALIBRATION_PROFILE);
    axis.enable();

    axis.move_to(axis.position() - MAX_TRAVEL_STEPS);
    seek(axis, home, timer)?;
    axis.halt();
    axis.zero();

    axis.move_to(HOME_CLEARANCE_STEPS);
    run_to_idle(axis, timer);
    axis.zero();
    Ok(())
}

/// Drives toward the end switch, records the distance covered as the usable
/// travel, and parks back at zero.
fn measure_axis<ENA, DIR, PUL, SW, TIM>(
    axis: &mut Axis<ENA, DIR, PUL>,
    end: &mut Debouncer<SW>,
    timer: &mut TIM,
) -> Result<i32, CalibrationError>
where
    ENA: OutputPin,
    DIR: OutputPin,
    PUL: OutputPin,
    SW: InputPin,
    TIM: CountDown + Periodic,
{
    axis.move_to(MAX_TRAVEL_STEPS);
    seek(axis, end, timer)?;
    axis.halt();
    let length = axis.position();
    if length == 0 {
        // End switch closed before any travel: a wiring fault, not a bed.
        return Err(CalibrationError::Timeout);
    }

    axis.move_to(0);
    run_to_idle(axis, timer);

    axis.set_limit(length);
    Ok(length)
}

fn seek<ENA, DIR, PUL, SW, TIM>(
    axis: &mut Axis<ENA, DIR, PUL>,
    switch: &mut Debouncer<SW>,
    timer: &mut TIM,
) -> Result<(), CalibrationError>
where
    ENA: OutputPin,
    DIR: OutputPin,
    PUL: OutputPin,
    SW: InputPin,
    TIM: CountDown + Periodic,
{
    while !switch.is_pressed(timer) {
        if axis.distance_remaining() == 0 {
            return Err(CalibrationError::Timeout);
        }
        nb::block!(timer.wait()).ok();
        axis.advance();
    }
    Ok(())
}

fn run_to_idle<ENA, DIR, PUL, TIM>(axis: &mut Axis<ENA, DIR, PUL>, timer: &mut TIM)
where
    ENA: OutputPin,
    DIR: OutputPin,
    PUL: OutputPin,
    TIM: CountDown + Periodic,
{
    while axis.distance_remaining() != 0 {
        nb::block!(timer.wait()).ok();
        axis.advance();
    }
}

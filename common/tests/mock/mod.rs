//! Mock hardware for host tests: a simulated carriage per axis driven by
//! the step/dir pins, trip-point limit switches, recording relay coils and
//! a fixed-reading ADC.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::timer::{CountDown, Periodic};

use common::config::CALIBRATION_PROFILE;
use common::{Axis, Debouncer, Gantry, Relays, SoilSensors};

pub struct NullPin;

impl OutputPin for NullPin {
    fn set_low(&mut self) {}
    fn set_high(&mut self) {}
}

/// Latches the commanded direction level.
pub struct DirPin(pub Rc<Cell<bool>>);

impl OutputPin for DirPin {
    fn set_low(&mut self) {
        self.0.set(false);
    }
    fn set_high(&mut self) {
        self.0.set(true);
    }
}

/// Moves the simulated carriage one step per rising edge, in whichever
/// direction is latched on the dir pin.
pub struct StepPin {
    pub dir: Rc<Cell<bool>>,
    pub pos: Rc<Cell<i32>>,
}

impl OutputPin for StepPin {
    fn set_low(&mut self) {}
    fn set_high(&mut self) {
        let delta = if self.dir.get() { 1 } else { -1 };
        self.pos.set(self.pos.get() + delta);
    }
}

/// Active-low switch that closes once the carriage passes its trip point.
pub struct TripPin {
    pub pos: Rc<Cell<i32>>,
    pub trip: i32,
    pub above: bool,
}

impl InputPin for TripPin {
    fn is_high(&self) -> bool {
        !self.is_low()
    }
    fn is_low(&self) -> bool {
        if self.above {
            self.pos.get() >= self.trip
        } else {
            self.pos.get() <= self.trip
        }
    }
}

/// Records the driven coil level (true = high = coil released).
pub struct LevelPin(pub Rc<Cell<bool>>);

impl OutputPin for LevelPin {
    fn set_low(&mut self) {
        self.0.set(false);
    }
    fn set_high(&mut self) {
        self.0.set(true);
    }
}

/// A tick timer that never makes anyone wait.
pub struct InstantTimer;

impl CountDown for InstantTimer {
    type Time = u32;
    fn start<T: Into<u32>>(&mut self, _count: T) {}
    fn wait(&mut self) -> nb::Result<(), void::Void> {
        Ok(())
    }
}

impl Periodic for InstantTimer {}

pub struct MockAdc {
    pub raw: [u16; 3],
}

pub struct AdcPin<const C: u8>;

impl<const C: u8> Channel<MockAdc> for AdcPin<C> {
    type ID = u8;
    fn channel() -> u8 {
        C
    }
}

impl<const C: u8> OneShot<MockAdc, u16, AdcPin<C>> for MockAdc {
    type Error = ();
    fn read(&mut self, _pin: &mut AdcPin<C>) -> nb::Result<u16, ()> {
        Ok(self.raw[C as usize])
    }
}

pub type MockGantry = Gantry<
    NullPin,
    DirPin,
    StepPin,
    TripPin,
    TripPin,
    NullPin,
    DirPin,
    StepPin,
    TripPin,
    TripPin,
    LevelPin,
    LevelPin,
    AdcPin<0>,
    AdcPin<1>,
    AdcPin<2>,
>;

pub struct Rig {
    pub pos_x: Rc<Cell<i32>>,
    pub pos_y: Rc<Cell<i32>>,
    pub water_coil: Rc<Cell<bool>>,
    pub fert_coil: Rc<Cell<bool>>,
    pub gantry: MockGantry,
    pub adc: MockAdc,
}

/// Builds a simulated bed. Switch trip points are in physical steps
/// relative to wherever the carriage starts.
pub fn rig(home_x: i32, end_x: i32, home_y: i32, end_y: i32) -> Rig {
    let pos_x = Rc::new(Cell::new(0));
    let pos_y = Rc::new(Cell::new(0));
    let dir_x = Rc::new(Cell::new(false));
    let dir_y = Rc::new(Cell::new(false));
    let water_coil = Rc::new(Cell::new(false));
    let fert_coil = Rc::new(Cell::new(false));

    let x = Axis::new(
        NullPin,
        DirPin(dir_x.clone()),
        StepPin {
            dir: dir_x,
            pos: pos_x.clone(),
        },
        CALIBRATION_PROFILE,
    );
    let y = Axis::new(
        NullPin,
        DirPin(dir_y.clone()),
        StepPin {
            dir: dir_y,
            pos: pos_y.clone(),
        },
        CALIBRATION_PROFILE,
    );

    let gantry = Gantry::new(
        x,
        y,
        Debouncer::new(TripPin {
            pos: pos_x.clone(),
            trip: home_x,
            above: false,
        }),
        Debouncer::new(TripPin {
            pos: pos_x.clone(),
            trip: end_x,
            above: true,
        }),
        Debouncer::new(TripPin {
            pos: pos_y.clone(),
            trip: home_y,
            above: false,
        }),
        Debouncer::new(TripPin {
            pos: pos_y.clone(),
            trip: end_y,
            above: true,
        }),
        Relays::new(LevelPin(water_coil.clone()), LevelPin(fert_coil.clone())),
        SoilSensors::new(AdcPin::<0>, AdcPin::<1>, AdcPin::<2>),
    );

    Rig {
        pos_x,
        pos_y,
        water_coil,
        fert_coil,
        gantry,
        adc: MockAdc {
            raw: [3200, 2200, 1200],
        },
    }
}

/// A bed that calibrates to travel lengths of 1800 (X) and 2200 (Y).
pub fn calibrated_rig() -> Rig {
    let mut r = rig(-500, 1500, -200, 2200);
    r.gantry
        .calibrate(&mut InstantTimer)
        .expect("calibration on the mock bed");
    r
}

//! Command routing. The dispatcher is stateless: it validates a decoded
//! command against `SystemState` and forwards to the owning component; one
//! request always produces exactly one response.

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::timer::{CountDown, Periodic};

use crate::axis::{steps_from_revs, Axis};
use crate::calibrate::{self, CalibrationError};
use crate::config::SLOTS;
use crate::protocol::{Command, Response};
use crate::relay::{PumpChannel, Relays};
use crate::soil::SoilSensors;
use crate::state::{CalPhase, SystemState};
use crate::switch::Debouncer;

/// Everything the dispatcher routes to: both axes with their limit
/// switches, the pump relays, the soil probes and the system state record.
pub struct Gantry<XE, XD, XP, XH, XL, YE, YD, YP, YH, YL, WP, FP, S1, S2, S3> {
    pub x: Axis<XE, XD, XP>,
    pub y: Axis<YE, YD, YP>,
    pub x_home: Debouncer<XH>,
    pub x_end: Debouncer<XL>,
    pub y_home: Debouncer<YH>,
    pub y_end: Debouncer<YL>,
    pub relays: Relays<WP, FP>,
    pub soil: SoilSensors<S1, S2, S3>,
    pub state: SystemState,
}

impl<XE, XD, XP, XH, XL, YE, YD, YP, YH, YL, WP, FP, S1, S2, S3>
    Gantry<XE, XD, XP, XH, XL, YE, YD, YP, YH, YL, WP, FP, S1, S2, S3>
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
    WP: OutputPin,
    FP: OutputPin,
{
    pub fn new(
        x: Axis<XE, XD, XP>,
        y: Axis<YE, YD, YP>,
        x_home: Debouncer<XH>,
        x_end: Debouncer<XL>,
        y_home: Debouncer<YH>,
        y_end: Debouncer<YL>,
        relays: Relays<WP, FP>,
        soil: SoilSensors<S1, S2, S3>,
    ) -> Self {
        Gantry {
            x,
            y,
            x_home,
            x_end,
            y_home,
            y_end,
            relays,
            soil,
            state: SystemState::new(),
        }
    }

    /// Runs the homing/measuring sequence. Blocks until both axes finish
    /// or one of them fails its travel bound.
    pub fn calibrate<TIM: CountDown + Periodic>(
        &mut self,
        timer: &mut TIM,
    ) -> Result<(), CalibrationError> {
        calibrate::run(
            &mut self.x,
            &mut self.x_home,
            &mut self.x_end,
            &mut self.y,
            &mut self.y_home,
            &mut self.y_end,
            timer,
            &mut self.state,
        )
    }

    /// One scheduler tick of motion on both axes.
    pub fn advance(&mut self) {
        self.x.advance();
        self.y.advance();
    }

    /// Routes one command. `adc` and `timer` are borrowed for the verbs
    /// that need them (`status` and `recalibrate`).
    pub fn dispatch<AdcDev, ADC, TIM>(
        &mut self,
        command: &Command,
        adc: &mut ADC,
        timer: &mut TIM,
    ) -> Response
    where
        ADC: OneShot<AdcDev, u16, S1> + OneShot<AdcDev, u16, S2> + OneShot<AdcDev, u16, S3>,
        S1: Channel<AdcDev>,
        S2: Channel<AdcDev>,
        S3: Channel<AdcDev>,
        TIM: CountDown + Periodic,
    {
        match command {
            Command::Tree { id } => self.goto_slot(*id),
            Command::Pump { kind } => match kind.as_str() {
                "water" => Response::Pump {
                    pump: "water",
                    state: self.relays.toggle(PumpChannel::Water),
                },
                "fert" => Response::Pump {
                    pump: "fert",
                    state: self.relays.toggle(PumpChannel::Fertilizer),
                },
                _ => Response::error("Invalid pump type"),
            },
            Command::Status => Response::Status {
                run: self.running(),
                soil: self.soil.read_all(adc),
                p_water: self.relays.water_on(),
                p_fert: self.relays.fert_on(),
            },
            Command::Home => {
                // Allowed before calibration, like `move`.
                self.x.move_to(0);
                self.y.move_to(0);
                Response::Plain { status: "homing" }
            }
            Command::Recalibrate => {
                self.state.calibration = CalPhase::Uncalibrated;
                match self.calibrate(timer) {
                    Ok(()) => Response::Plain {
                        status: "calibrated",
                    },
                    Err(CalibrationError::Timeout) => Response::error("Calibration timeout"),
                }
            }
            Command::Move { revs_x, revs_y } => {
                let steps_x = steps_from_revs(*revs_x);
                let steps_y = steps_from_revs(*revs_y);
                self.x.move_relative(steps_x);
                self.y.move_relative(steps_y);
                Response::Move {
                    status: "moving",
                    steps_x,
                    steps_y,
                }
            }
        }
    }

    fn goto_slot(&mut self, id: i32) -> Response {
        if !self.state.calibrated() {
            return Response::error("Not calibrated");
        }
        if !(1..=9).contains(&id) {
            return Response::error("Invalid tree id");
        }

        let (frac_x, frac_y) = SLOTS[(id - 1) as usize];
        self.x.move_to(slot_target(self.x.limit().unwrap_or(0), frac_x));
        self.y.move_to(slot_target(self.y.limit().unwrap_or(0), frac_y));
        self.state.current_tree = id as u8;
        Response::Tree {
            status: "moving",
            tree: id as u8,
        }
    }

    fn running(&self) -> bool {
        self.x.distance_remaining() != 0 || self.y.distance_remaining() != 0
    }
}

/// Nearest whole step to a fraction of the calibrated travel.
fn slot_target(length: i32, fraction: f32) -> i32 {
    (length as f32 * fraction + 0.5) as i32
}

use embedded_hal::digital::OutputPin;

/// Pump selector for the relay pair.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum PumpChannel {
    Water,
    Fertilizer,
}

/// The two pump relays. Coils are wired active low; the logical state
/// tracks the pump, not the pin level.
pub struct Relays<W, F> {
    water: W,
    fert: F,
    water_on: bool,
    fert_on: bool,
}

impl<W: OutputPin, F: OutputPin> Relays<W, F> {
    /// Takes the coil pins and forces both pumps off.
    pub fn new(mut water: W, mut fert: F) -> Self {
        water.set_high();
        fert.set_high();
        Relays {
            water,
            fert,
            water_on: false,
            fert_on: false,
        }
    }

    /// Flips one channel and returns its new logical state. Toggling twice
    /// restores the original state.
    pub fn toggle(&mut self, channel: PumpChannel) -> bool {
        match channel {
            PumpChannel::Water => {
                self.water_on = !self.water_on;
                drive(&mut self.water, self.water_on);
                self.water_on
            }
            PumpChannel::Fertilizer => {
                self.fert_on = !self.fert_on;
                drive(&mut self.fert, self.fert_on);
                self.fert_on
            }
        }
    }

    pub fn water_on(&self) -> bool {
        self.water_on
    }

    pub fn fert_on(&self) -> bool {
        self.fert_on
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool) {
    if on {
        pin.set_low();
    } else {
        pin.set_high();
    }
}

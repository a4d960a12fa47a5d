use embedded_hal::digital::InputPin;
use embedded_hal::timer::{CountDown, Periodic};

use crate::config::DEBOUNCE_TICKS;

/// Debounced endpoint switch on a pull-up input; pressed reads low.
pub struct Debouncer<PIN> {
    pin: PIN,
}

impl<PIN: InputPin> Debouncer<PIN> {
    pub fn new(pin: PIN) -> Self {
        Debouncer { pin }
    }

    /// Samples the switch; an active first sample must still be active
    /// after the settle interval to count. Blocks on the tick timer, so
    /// this is only for the calibration path, never the per-tick loop.
    pub fn is_pressed<TIM: CountDown + Periodic>(&mut self, timer: &mut TIM) -> bool {
        if self.pin.is_high() {
            return false;
        }
        for _ in 0..DEBOUNCE_TICKS {
            nb::block!(timer.wait()).ok();
        }
        self.pin.is_low()
    }
}

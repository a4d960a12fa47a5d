use core::cell::Cell;
use cortex_m::interrupt::{self, Mutex};

/// Single-slot handoff from the USART interrupt to the main loop. The loop
/// drains it every tick, far faster than complete lines can arrive, so a
/// full slot means the sender drops rather than reorders.
pub struct Mailbox<T> {
    slot: Mutex<Cell<Option<T>>>,
}

impl<T> Mailbox<T> {
    pub const fn new() -> Self {
        Mailbox {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    pub fn post(&self, value: T) -> Result<(), T> {
        interrupt::free(|cs| {
            let slot = self.slot.borrow(cs);
            match slot.replace(Some(value)) {
                None => Ok(()),
                Some(pending) => {
                    // Keep the older value; it arrived first.
                    match slot.replace(Some(pending)) {
                        Some(rejected) => Err(rejected),
                        None => Ok(()),
                    }
                }
            }
        })
    }

    pub fn take(&self) -> Option<T> {
        interrupt::free(|cs| self.slot.borrow(cs).replace(None))
    }
}

#![no_std]
#![no_main]
#![allow(deprecated)]

extern crate panic_halt;

#[macro_use]
extern crate cortex_m_semihosting;

use cortex_m_rt::entry;

use stm32f1::stm32f103::interrupt;
use stm32f1xx_hal::adc::Adc;
use stm32f1xx_hal::pac;
use stm32f1xx_hal::pac::USART1;
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::serial::{Event, Rx, Serial};
use stm32f1xx_hal::timer::Timer;

use core::cell::Cell;
use cortex_m::interrupt::Mutex;

use common::config::CALIBRATION_PROFILE;
use common::{
    Axis, Command, Debouncer, DecodeError, Gantry, LineBuffer, Relays, Response, SoilSensors,
};

mod mailbox;
use mailbox::Mailbox;

static COMMANDS: Mailbox<Result<Command, DecodeError>> = Mailbox::new();
static RX: Mutex<Cell<Option<Rx<USART1>>>> = Mutex::new(Cell::new(None));

#[entry]
fn main() -> ! {
    // Get access to the core peripherals from the cortex-m crate
    let _cp = cortex_m::Peripherals::take().unwrap();
    // Get access to the device specific peripherals from the peripheral access crate
    let dp = pac::Peripherals::take().unwrap();

    // Take ownership over the raw flash and rcc devices and convert them into the corresponding
    // HAL structs
    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let mut afio = dp.AFIO.constrain(&mut rcc.apb2);

    let clocks = rcc.cfgr.freeze(&mut flash.acr);

    let mut gpioa = dp.GPIOA.split(&mut rcc.apb2);
    let mut gpiob = dp.GPIOB.split(&mut rcc.apb2);

    let mut serial = {
        let pin_tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
        let pin_rx = gpioa.pa10;
        Serial::usart1(
            dp.USART1,
            (pin_tx, pin_rx),
            &mut afio.mapr,
            115_200.bps(),
            clocks,
            &mut rcc.apb2,
        )
    };
    serial.listen(Event::Rxne);
    let (mut tx, rx) = serial.split();
    cortex_m::interrupt::free(|cs| {
        RX.borrow(cs).replace(Some(rx));
    });

    let mut adc = Adc::adc1(dp.ADC1, &mut rcc.apb2);

    let x = {
        let ena = gpiob.pb3.into_push_pull_output(&mut gpiob.crl);
        let dir = gpiob.pb4.into_push_pull_output(&mut gpiob.crl);
        let pul = gpiob.pb5.into_push_pull_output(&mut gpiob.crl);
        Axis::new(ena, dir, pul, CALIBRATION_PROFILE)
    };

    let y = {
        let ena = gpiob.pb6.into_push_pull_output(&mut gpiob.crl);
        let dir = gpiob.pb7.into_push_pull_output(&mut gpiob.crl);
        let pul = gpiob.pb8.into_push_pull_output(&mut gpiob.crh);
        Axis::new(ena, dir, pul, CALIBRATION_PROFILE)
    };

    let relays = {
        let water = gpiob.pb0.into_push_pull_output(&mut gpiob.crl);
        let fert = gpiob.pb1.into_push_pull_output(&mut gpiob.crl);
        Relays::new(water, fert)
    };

    let soil = {
        let probe1 = gpioa.pa0.into_analog(&mut gpioa.crl);
        let probe2 = gpioa.pa1.into_analog(&mut gpioa.crl);
        let probe3 = gpioa.pa4.into_analog(&mut gpioa.crl);
        SoilSensors::new(probe1, probe2, probe3)
    };

    let mut gantry = Gantry::new(
        x,
        y,
        Debouncer::new(gpiob.pb12.into_pull_up_input(&mut gpiob.crh)),
        Debouncer::new(gpiob.pb13.into_pull_up_input(&mut gpiob.crh)),
        Debouncer::new(gpiob.pb14.into_pull_up_input(&mut gpiob.crh)),
        Debouncer::new(gpiob.pb15.into_pull_up_input(&mut gpiob.crh)),
        relays,
        soil,
    );

    let mut tick = Timer::tim2(dp.TIM2, 1000.hz(), clocks, &mut rcc.apb1);

    // Travel lengths are rediscovered on every boot.
    hprintln!("calibrating").ok();
    match gantry.calibrate(&mut tick) {
        Ok(()) => hprintln!(
            "calibrated x={} y={}",
            gantry.x.limit().unwrap_or(0),
            gantry.y.limit().unwrap_or(0)
        )
        .ok(),
        Err(e) => hprintln!("calibration failed: {:?}", e).ok(),
    };

    loop {
        nb::block!(tick.wait()).ok();

        if let Some(decoded) = COMMANDS.take() {
            let response = match decoded {
                Ok(command) => gantry.dispatch(&command, &mut adc, &mut tick),
                Err(e) => Response::error(e.message()),
            };
            response.send(&mut tx);
        }

        gantry.advance();
    }
}

#[interrupt]
fn USART1() {
    static mut RX_LOCAL: Option<Rx<USART1>> = None;
    static mut LINE: LineBuffer = LineBuffer::new();

    if RX_LOCAL.is_none() {
        cortex_m::interrupt::free(|cs| {
            *RX_LOCAL = RX.borrow(cs).replace(None);
        });
    }

    if let Some(rx) = RX_LOCAL.as_mut() {
        while let Some(decoded) = LINE.recv(rx) {
            COMMANDS.post(decoded).ok();
        }
    }
}

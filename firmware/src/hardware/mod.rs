//! Board bring-up. Everything in here runs once from `init`; any failure is
//! fatal.

use cortex_m::peripheral::{DCB, DWT, SYST};
use hal::gpio::{OpenDrain, Output, PinState, Speed, PC13, PC14};
use hal::pac;
use hal::prelude::*;
use hal::rcc::Clocks;
use hal::serial::{self, config::StopBits, Tx};
use stm32f4xx_hal as hal;
use superloop::config::{BoardConfig, ClockTree, SerialConfig};

pub mod timer;

use timer::ActuatorTimer;

/// Status LED, active low.
pub type StatusLed = PC13<Output<OpenDrain>>;
/// Toggled by the superloop heartbeat.
pub type HeartbeatPin = PC14<Output>;
/// Transmit half of USART1 on PA9.
pub type Link = Tx<pac::USART1>;

pub struct Hardware {
    pub actuator_timer: ActuatorTimer,
    pub led: StatusLed,
    pub heartbeat: HeartbeatPin,
    pub link: Link,
}

/// Clock gates the HAL does not open on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Peripheral {
    Tim2,
}

pub fn enable_peripheral(rcc: &pac::RCC, id: Peripheral) {
    match id {
        Peripheral::Tim2 => rcc.apb1enr.modify(|_, w| w.tim2en().enabled()),
    }
}

/// HSE through the PLL to the core clock. Consumes the RCC.
pub fn configure_clock_tree(rcc: pac::RCC, tree: &ClockTree) -> Clocks {
    let clocks = rcc.constrain().cfgr.use_hse(tree.hse).sysclk(tree.sysclk).freeze();
    defmt::assert_eq!(clocks.sysclk(), tree.sysclk, "PLL did not lock on the core clock");
    clocks
}

/// Free running core clock counter used to timestamp tick activations.
pub fn enable_cycle_counter(dcb: &mut DCB, dwt: &mut DWT) {
    dcb.enable_trace();
    dwt.enable_cycle_counter();
}

/// USART1, transmit only, no flow control.
pub fn configure_link(
    usart: pac::USART1,
    tx: hal::gpio::PA9,
    config: &SerialConfig,
    clocks: &Clocks,
) -> Link {
    defmt::assert!(config.data_bits == 8 && config.stop_bits == 1);
    let config = serial::Config::default()
        .baudrate(config.baudrate.bps())
        .wordlength_8()
        .parity_none()
        .stopbits(StopBits::STOP1);
    usart.tx(tx.into_alternate::<7>(), config, clocks).unwrap()
}

/// Status LED on PC13: open drain, low speed, off (high) until the first
/// actuator update.
pub fn configure_status_led(pin: hal::gpio::PC13) -> StatusLed {
    let mut led = pin.into_open_drain_output_in_state(PinState::High);
    led.set_speed(Speed::Low);
    led
}

pub fn setup(
    device: pac::Peripherals,
    syst: &mut SYST,
    dcb: &mut DCB,
    dwt: &mut DWT,
    board: &BoardConfig,
) -> Hardware {
    enable_peripheral(&device.RCC, Peripheral::Tim2);
    let clocks = configure_clock_tree(device.RCC, &board.clocks);
    defmt::info!("clocks: sysclk {} timclk1 {}", clocks.sysclk(), clocks.timclk1());

    enable_cycle_counter(dcb, dwt);

    let gpioa = device.GPIOA.split();
    let gpioc = device.GPIOC.split();
    let led = configure_status_led(gpioc.pc13);
    let heartbeat = gpioc.pc14.into_push_pull_output_in_state(PinState::Low);
    let link = configure_link(device.USART1, gpioa.pa9, &board.serial, &clocks);

    let actuator_timer =
        ActuatorTimer::start(device.TIM2, clocks.timclk1(), board.actuator_rate).unwrap();
    timer::start_systick(syst, &board.clocks).unwrap();

    Hardware {
        actuator_timer,
        led,
        heartbeat,
        link,
    }
}

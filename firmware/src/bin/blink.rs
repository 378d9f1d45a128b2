//! Status LED blinking from the idle loop, paced by the tick counter alone.
#![no_main]
#![no_std]

use rtic::app;
use sl_mcu_f407 as _; // global logger + panicking-behavior + memory layout

#[app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {
    use cortex_m::peripheral::DWT;
    use sl_mcu_f407::hardware::{self, timer, StatusLed};
    use sl_mcu_f407::TICKS;
    use stm32f4xx_hal::prelude::*;
    use superloop::config::SL_MCU_F407;
    use superloop::schedule::ScheduledAction;
    use superloop::tick::Cadence;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        cadence: Cadence,
        led: StatusLed,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        defmt::info!("init");
        let board = SL_MCU_F407;
        let mut core = cx.core;

        hardware::configure_clock_tree(cx.device.RCC, &board.clocks);
        hardware::enable_cycle_counter(&mut core.DCB, &mut core.DWT);
        let led = hardware::configure_status_led(cx.device.GPIOC.split().pc13);
        timer::start_systick(&mut core.SYST, &board.clocks).unwrap();

        (
            Shared {},
            Local {
                cadence: Cadence::new(board.clocks.cycles_per_tick()),
                led,
            },
        )
    }

    #[idle(local = [led])]
    fn idle(cx: idle::Context) -> ! {
        let blink = SL_MCU_F407.heartbeat;
        let mut action = ScheduledAction::from_timing(blink);
        defmt::info!("blinking every {}", blink.period);
        loop {
            let now = TICKS.now();
            if action.poll(now) {
                cx.local.led.toggle();
                defmt::trace!("toggle #{} at {}", action.fired(), now);
            }
        }
    }

    #[task(binds = SysTick, priority = 1, local = [cadence])]
    fn tick(cx: tick::Context) {
        let since_reload = timer::cycles_since_reload(&SL_MCU_F407.clocks);
        let periods = cx.local.cadence.periods(DWT::cycle_count(), since_reload);
        TICKS.advance(periods);
    }
}

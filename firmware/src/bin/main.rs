#![no_main]
#![no_std]

use rtic::app;
use sl_mcu_f407 as _; // global logger + panicking-behavior + memory layout

#[app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {
    use cortex_m::peripheral::DWT;
    use sl_mcu_f407::hardware::timer::{self, ActuatorTimer};
    use sl_mcu_f407::hardware::{self, HeartbeatPin, Link, StatusLed};
    use sl_mcu_f407::TICKS;
    use superloop::actuator::PeriodicActuator;
    use superloop::config::SL_MCU_F407;
    use superloop::report::Reporter;
    use superloop::schedule::{ScheduledAction, Superloop};
    use superloop::sink::CharacterSink;
    use superloop::tick::Cadence;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        cadence: Cadence,
        actuator: PeriodicActuator<ActuatorTimer, StatusLed>,
        heartbeat: HeartbeatPin,
        link: Link,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        defmt::info!("init");
        let board = SL_MCU_F407;
        let mut core = cx.core;

        let hardware = hardware::setup(
            cx.device,
            &mut core.SYST,
            &mut core.DCB,
            &mut core.DWT,
            &board,
        );

        (
            Shared {},
            Local {
                cadence: Cadence::new(board.clocks.cycles_per_tick()),
                actuator: PeriodicActuator::new(hardware.actuator_timer, hardware.led),
                heartbeat: hardware.heartbeat,
                link: hardware.link,
            },
        )
    }

    #[idle(local = [heartbeat, link])]
    fn idle(cx: idle::Context) -> ! {
        let idle::LocalResources {
            heartbeat, link, ..
        } = cx.local;

        let mut reporter = Reporter::new(CharacterSink::new(link));
        reporter.banner();

        let board = SL_MCU_F407;
        let mut mainloop = Superloop::new(
            &TICKS,
            ScheduledAction::from_timing(board.heartbeat),
            |_| heartbeat.toggle(),
            ScheduledAction::from_timing(board.report),
            reporter,
        );

        defmt::info!("idle");
        let mut missed = 0;
        loop {
            let pass = mainloop.poll();
            let Some(iterations) = pass.reported else {
                continue;
            };
            defmt::debug!(
                "report {}: loop = {}, dropped lines = {}",
                pass.now,
                iterations,
                mainloop.reporter().dropped()
            );
            let stats = TICKS.snapshot();
            if stats.missed != missed {
                defmt::warn!("{} tick(s) missed, {} total", stats.missed - missed, stats.missed);
                missed = stats.missed;
            }
        }
    }

    #[task(binds = SysTick, priority = 2, local = [cadence])]
    fn tick(cx: tick::Context) {
        let since_reload = timer::cycles_since_reload(&SL_MCU_F407.clocks);
        let periods = cx.local.cadence.periods(DWT::cycle_count(), since_reload);
        TICKS.advance(periods);
    }

    #[task(binds = TIM2, priority = 1, local = [actuator])]
    fn actuate(cx: actuate::Context) {
        if let Err(e) = cx.local.actuator.on_interrupt() {
            match e {}
        }
    }
}

//! On-board checks: `cargo test` from this directory with the probe attached.
#![no_std]
#![no_main]

use sl_mcu_f407 as _; // global logger + panicking-behavior + memory layout

#[cortex_m_rt::exception]
fn SysTick() {
    sl_mcu_f407::TICKS.on_interrupt();
}

#[defmt_test::tests]
mod tests {
    use cortex_m::peripheral::DWT;
    use defmt::{assert, assert_eq};
    use sl_mcu_f407::hardware::{self, Hardware};
    use sl_mcu_f407::TICKS;
    use stm32f4xx_hal::pac;
    use superloop::config::SL_MCU_F407;
    use superloop::sink::CharacterSink;
    use superloop::{Duration, SinkError};

    fn wait(span: Duration) {
        let until = TICKS.now() + span;
        while TICKS.now() < until {}
    }

    #[init]
    fn init() -> Hardware {
        let mut core = cortex_m::Peripherals::take().unwrap();
        let device = pac::Peripherals::take().unwrap();
        hardware::setup(device, &mut core.SYST, &mut core.DCB, &mut core.DWT, &SL_MCU_F407)
    }

    #[test]
    fn tick_matches_the_core_clock() {
        let cycles_per_tick = SL_MCU_F407.clocks.cycles_per_tick();
        wait(Duration::millis(1));
        let (start, c0) = (TICKS.now(), DWT::cycle_count());
        wait(Duration::millis(100));
        let cycles = DWT::cycle_count().wrapping_sub(c0);
        let ticks = (TICKS.now() - start).ticks();

        assert_eq!(ticks, 100);
        let expected = 100 * cycles_per_tick;
        assert!(cycles.abs_diff(expected) < cycles_per_tick, "{} cycles", cycles);
        assert_eq!(TICKS.missed(), 0);
    }

    #[test]
    fn actuator_timer_raises_updates(hw: &mut Hardware) {
        use superloop::actuator::InterruptSource;

        const CC1IF: u32 = 1 << 1;

        // 2 Hz: at least one update within 600 ms. CCR1 is 0, so the
        // counter also raises CC1IF each time it restarts.
        wait(Duration::millis(600));
        assert!(hw.actuator_timer.is_pending());
        assert!(hw.actuator_timer.status() & CC1IF != 0);

        hw.actuator_timer.acknowledge();
        assert!(!hw.actuator_timer.is_pending());
        // other flags are left alone
        assert!(hw.actuator_timer.status() & CC1IF != 0);
    }

    #[test]
    fn sink_writes_to_usart1(hw: &mut Hardware) {
        let mut sink = CharacterSink::new(&mut hw.link);
        assert_eq!(sink.send(b"target test\n"), Ok(12));
        assert_eq!(sink.send_to(2, b"stderr\n"), Ok(7));
        assert_eq!(sink.send_to(3, b"x"), Err(SinkError::UnsupportedStream(3)));
    }
}

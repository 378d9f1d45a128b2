use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use fugit::HertzU32;
use superloop::actuator::InterruptSource;
use superloop::config::{periodic_divider, ClockTree};
use superloop::{ConfigError, TICK_HZ};

use super::hal::pac;

/// SysTick on the external reference (AHB/8), one interrupt per tick.
pub fn start_systick(syst: &mut SYST, tree: &ClockTree) -> Result<(), ConfigError> {
    let reload = tree.systick_reload(TICK_HZ)?;
    syst.set_clock_source(SystClkSource::External);
    syst.set_reload(reload);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
    defmt::info!("systick: reload {}", reload);
    Ok(())
}

/// Core cycles since the last SysTick reload. Meant for the SysTick handler,
/// where it is the handler latency.
pub fn cycles_since_reload(tree: &ClockTree) -> u32 {
    let elapsed = SYST::get_reload().saturating_sub(SYST::get_current());
    elapsed * tree.systick_divider
}

/// SR flags are rc_w0: writing 1 leaves a flag alone, so only UIF is cleared.
fn clear_update_flag(tim: &pac::TIM2) {
    tim.sr.write(|w| unsafe { w.bits(!0) }.uif().clear_bit());
}

/// TIM2 running free with only the update interrupt enabled.
pub struct ActuatorTimer {
    tim: pac::TIM2,
}

impl ActuatorTimer {
    /// `timer_clk` is the APB1 timer clock, `rate` the number of update
    /// events per second. The 32 bit auto-reload of TIM2 lets most rates run
    /// without prescaler.
    pub fn start(tim: pac::TIM2, timer_clk: HertzU32, rate: HertzU32) -> Result<Self, ConfigError> {
        let div = periodic_divider(timer_clk, rate, u32::MAX)?;

        tim.cr1.reset();
        tim.psc.write(|w| w.psc().bits(div.prescaler));
        tim.arr.write(|w| w.arr().bits(div.auto_reload));

        // UG loads PSC and ARR and raises UIF, which must not reach the handler
        tim.egr.write(|w| w.ug().set_bit());
        clear_update_flag(&tim);

        tim.dier.write(|w| w.uie().enabled());
        tim.cr1.write(|w| w.ckd().div1().cen().enabled());

        defmt::info!("actuator: psc {} arr {}", div.prescaler, div.auto_reload);
        Ok(Self { tim })
    }

    pub fn is_pending(&self) -> bool {
        self.tim.sr.read().uif().bit_is_set()
    }

    /// Raw TIM2_SR.
    pub fn status(&self) -> u32 {
        self.tim.sr.read().bits()
    }
}

impl InterruptSource for ActuatorTimer {
    fn acknowledge(&mut self) {
        clear_update_flag(&self.tim);
    }
}

//! Compile time board configuration.
//!
//! There is no runtime configuration surface: every rate, divider and
//! schedule offset the firmware uses is derived from [`SL_MCU_F407`].

use fugit::HertzU32;

use crate::{ConfigError, Duration, TICK_HZ};

/// The SysTick reload register is 24 bits wide.
pub const SYSTICK_RELOAD_MAX: u32 = 0x00FF_FFFF;

/// Clock tree feeding the two interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTree {
    /// External crystal
    pub hse: HertzU32,
    /// Core clock after the PLL
    pub sysclk: HertzU32,
    /// Fixed divider between AHB and the SysTick counter (STK_CSR CLKSOURCE = 0)
    pub systick_divider: u32,
}

impl ClockTree {
    /// Clock feeding the SysTick counter.
    pub const fn systick_input(&self) -> u32 {
        self.sysclk.raw() / self.systick_divider
    }

    /// Reload value for `rate_hz` SysTick interrupts per second.
    ///
    /// The counter fires every N input clocks for a reload of N - 1.
    pub const fn systick_reload(&self, rate_hz: u32) -> Result<u32, ConfigError> {
        let input_hz = self.systick_input();
        if rate_hz == 0 || input_hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if input_hz % rate_hz != 0 {
            return Err(ConfigError::InexactRate { input_hz, rate_hz });
        }
        let reload = input_hz / rate_hz - 1;
        if reload > SYSTICK_RELOAD_MAX {
            return Err(ConfigError::ReloadOverflow(reload));
        }
        Ok(reload)
    }

    /// Core clock cycles between two ticks; the DWT cycle counter runs at sysclk.
    pub const fn cycles_per_tick(&self) -> u32 {
        self.sysclk.raw() / TICK_HZ
    }
}

/// Prescaler and auto-reload pair of a general purpose timer.
///
/// The update event fires every `(prescaler + 1) * (auto_reload + 1)` input
/// clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider {
    pub prescaler: u16,
    pub auto_reload: u32,
}

impl Divider {
    /// Input clocks between two update events.
    pub const fn ratio(&self) -> u64 {
        (self.prescaler as u64 + 1) * (self.auto_reload as u64 + 1)
    }
}

/// Split `timer_clk / rate` into a prescaler and an auto-reload value no
/// larger than `max_reload`. The smallest prescaler is chosen so the counter
/// keeps the finest resolution.
pub fn periodic_divider(
    timer_clk: HertzU32,
    rate: HertzU32,
    max_reload: u32,
) -> Result<Divider, ConfigError> {
    let (input_hz, rate_hz) = (timer_clk.raw(), rate.raw());
    if rate_hz == 0 || input_hz == 0 {
        return Err(ConfigError::ZeroRate);
    }
    if input_hz % rate_hz != 0 {
        return Err(ConfigError::InexactRate { input_hz, rate_hz });
    }
    let ratio = input_hz / rate_hz;
    let reload_span = max_reload as u64 + 1;
    let min_psc = (ratio as u64 + reload_span - 1) / reload_span;

    (min_psc.max(1)..=u16::MAX as u64 + 1)
        .find(|psc| ratio as u64 % psc == 0)
        .map(|psc| Divider {
            prescaler: (psc - 1) as u16,
            auto_reload: (ratio as u64 / psc - 1) as u32,
        })
        .ok_or(ConfigError::DividerOutOfRange(ratio))
}

/// USART parameters of the diagnostic link. Transmit only, 8N1, no flow control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baudrate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
}

/// First deadline and period of a superloop action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionTiming {
    pub first: Duration,
    pub period: Duration,
}

/// Everything the firmware needs to know about the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardConfig {
    pub clocks: ClockTree,
    pub serial: SerialConfig,
    /// Update events per second of the actuator timer, one pin toggle each
    pub actuator_rate: HertzU32,
    /// Polled heartbeat toggled from the superloop
    pub heartbeat: ActionTiming,
    /// Diagnostic line on the serial link
    pub report: ActionTiming,
}

/// StreamLine SL_MCU_F407: 16 MHz crystal, 168 MHz core, SysTick on AHB/8.
pub const SL_MCU_F407: BoardConfig = BoardConfig {
    clocks: ClockTree {
        hse: HertzU32::MHz(16),
        sysclk: HertzU32::MHz(168),
        systick_divider: 8,
    },
    serial: SerialConfig {
        baudrate: 2_000_000,
        data_bits: 8,
        stop_bits: 1,
    },
    actuator_rate: HertzU32::Hz(2),
    heartbeat: ActionTiming {
        first: Duration::millis(500),
        period: Duration::millis(500),
    },
    report: ActionTiming {
        first: Duration::millis(1000),
        period: Duration::millis(1000),
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn systick_runs_at_one_khz() {
        let clocks = SL_MCU_F407.clocks;
        assert_eq!(clocks.systick_input(), 21_000_000);
        assert_eq!(clocks.systick_reload(TICK_HZ), Ok(20_999));
        assert_eq!(clocks.cycles_per_tick(), 168_000);
    }

    #[test]
    fn systick_reload_rejects_wide_values() {
        let clocks = SL_MCU_F407.clocks;
        // 21 MHz / 1 Hz needs a 25 bit reload
        assert_eq!(clocks.systick_reload(1), Err(ConfigError::ReloadOverflow(20_999_999)));
        assert_eq!(clocks.systick_reload(0), Err(ConfigError::ZeroRate));
        assert_eq!(
            clocks.systick_reload(7),
            Err(ConfigError::InexactRate { input_hz: 21_000_000, rate_hz: 7 })
        );
    }

    #[test]
    fn divider_fits_a_16_bit_counter() {
        let div = periodic_divider(HertzU32::MHz(84), HertzU32::Hz(2), 0xFFFF).unwrap();
        assert_eq!(div.ratio(), 42_000_000);
        assert!(div.auto_reload <= 0xFFFF);
        // smallest prescaler that divides 42 MHz evenly: 672 = 2^5 * 3 * 7
        assert_eq!(div.prescaler, 671);
        assert_eq!(div.auto_reload, 62_499);
    }

    #[test]
    fn divider_prefers_no_prescaler_on_wide_counters() {
        let div = periodic_divider(HertzU32::MHz(84), HertzU32::Hz(2), u32::MAX).unwrap();
        assert_eq!(div, Divider { prescaler: 0, auto_reload: 41_999_999 });
    }

    #[test]
    fn stopped_clocks_are_rejected() {
        assert_eq!(
            periodic_divider(HertzU32::Hz(0), HertzU32::Hz(2), u32::MAX),
            Err(ConfigError::ZeroRate)
        );
        let clocks = ClockTree {
            sysclk: HertzU32::Hz(0),
            ..SL_MCU_F407.clocks
        };
        assert_eq!(clocks.systick_reload(TICK_HZ), Err(ConfigError::ZeroRate));
    }

    #[test]
    fn divider_out_of_range() {
        let err = periodic_divider(HertzU32::MHz(84), HertzU32::Hz(1), 0xFF).unwrap_err();
        assert_eq!(err, ConfigError::DividerOutOfRange(84_000_000));
    }
}

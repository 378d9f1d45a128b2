//! Timing core of the SL_MCU_F407 firmware.
//!
//! Everything in here is target independent: the interrupt handlers and the
//! idle loop of the firmware crate only forward into these types, which lets
//! the whole timing path run under `cargo test` on the host.
//!
//! * [`tick::TickSource`] - millisecond counter written by the SysTick handler
//! * [`actuator::PeriodicActuator`] - pin toggled by an independent timer
//! * [`sink::CharacterSink`] - blocking byte output with `\n` -> `\r\n`
//! * [`report::Reporter`] - `Tick <s> (loop = <n>)` lines through the sink
//! * [`schedule::Superloop`] - the cooperative polling loop
#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod config;
pub mod error;
pub mod report;
pub mod schedule;
pub mod sink;
pub mod tick;

pub use error::{ConfigError, SinkError};

/// Rate of the tick time base. One tick is one millisecond.
pub const TICK_HZ: u32 = 1_000;

/// A point on the tick time base. Comparisons are wrap aware.
pub type Instant = fugit::TimerInstantU32<TICK_HZ>;

/// A span on the tick time base.
pub type Duration = fugit::TimerDurationU32<TICK_HZ>;

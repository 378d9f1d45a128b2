use core::fmt;

use embedded_hal_nb::serial::ErrorKind;

/// Failures of the character sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Stream identifier outside of input (0), output (1) and error (2)
    UnsupportedStream(i32),
    /// The transmitter reported an error while a byte was in flight
    Link(ErrorKind),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedStream(id) => write!(f, "unsupported stream {}", id),
            Self::Link(kind) => write!(f, "serial link error: {}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::UnsupportedStream(id) => defmt::write!(fmt, "UnsupportedStream({})", id),
            Self::Link(kind) => defmt::write!(fmt, "Link({})", defmt::Debug2Format(kind)),
        }
    }
}

/// Board configuration values that cannot be realised by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A rate of zero Hz was requested, or the input clock is stopped
    ZeroRate,
    /// Input clock is not an integer multiple of the requested rate
    InexactRate { input_hz: u32, rate_hz: u32 },
    /// The SysTick reload value does not fit in 24 bits
    ReloadOverflow(u32),
    /// No prescaler/auto-reload pair can divide the clock that far
    DividerOutOfRange(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRate => write!(f, "rates and input clocks must be non-zero"),
            Self::InexactRate { input_hz, rate_hz } => {
                write!(f, "{} Hz cannot be divided down to exactly {} Hz", input_hz, rate_hz)
            }
            Self::ReloadOverflow(reload) => {
                write!(f, "reload value {} exceeds the 24 bit SysTick counter", reload)
            }
            Self::DividerOutOfRange(ratio) => {
                write!(f, "division ratio {} is out of timer range", ratio)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ZeroRate => defmt::write!(fmt, "ZeroRate"),
            Self::InexactRate { input_hz, rate_hz } => {
                defmt::write!(fmt, "InexactRate({} Hz / {} Hz)", input_hz, rate_hz)
            }
            Self::ReloadOverflow(reload) => defmt::write!(fmt, "ReloadOverflow({})", reload),
            Self::DividerOutOfRange(ratio) => defmt::write!(fmt, "DividerOutOfRange({})", ratio),
        }
    }
}

//! Host stand-ins for the board: a serial wire, a GPIO pin and a timer flag.
#![allow(dead_code)]

use core::convert::Infallible;

use embedded_hal::digital::{self, OutputPin, StatefulOutputPin};
use embedded_hal_nb::serial::{self, ErrorKind};
use superloop::actuator::InterruptSource;

/// Serial transmitter that records every byte it accepts.
#[derive(Debug, Default)]
pub struct Wire {
    pub bytes: Vec<u8>,
    pub broken: bool,
}

impl Wire {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl serial::ErrorType for Wire {
    type Error = ErrorKind;
}

impl serial::Write<u8> for Wire {
    fn write(&mut self, byte: u8) -> nb::Result<(), ErrorKind> {
        if self.broken {
            return Err(nb::Error::Other(ErrorKind::Overrun));
        }
        self.bytes.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), ErrorKind> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Pin {
    pub high: bool,
    pub toggles: u32,
}

impl digital::ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for Pin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }

    fn toggle(&mut self) -> Result<(), Infallible> {
        self.high = !self.high;
        self.toggles += 1;
        Ok(())
    }
}

/// Update interrupt flag of a timer.
#[derive(Debug, Default)]
pub struct Flag {
    pub pending: bool,
}

impl InterruptSource for Flag {
    fn acknowledge(&mut self) {
        self.pending = false;
    }
}

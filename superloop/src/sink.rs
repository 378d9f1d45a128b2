//! Blocking character output onto the serial link.

use core::fmt;

use embedded_hal_nb::serial::{Error as _, Write};

use crate::SinkError;

/// Standard stream identifiers accepted by [`CharacterSink::send_to`].
///
/// All three end up on the same physical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stream {
    Stdin = 0,
    Stdout = 1,
    Stderr = 2,
}

impl TryFrom<i32> for Stream {
    type Error = SinkError;

    fn try_from(id: i32) -> Result<Self, SinkError> {
        match id {
            0 => Ok(Stream::Stdin),
            1 => Ok(Stream::Stdout),
            2 => Ok(Stream::Stderr),
            other => Err(SinkError::UnsupportedStream(other)),
        }
    }
}

/// Byte-at-a-time transmitter with `\n` -> `\r\n` expansion.
///
/// Every byte blocks until the transmitter accepts it; nothing is buffered.
/// The sink is not reentrant and is owned by the cooperative loop, never by
/// an interrupt handler.
pub struct CharacterSink<L> {
    link: L,
}

impl<L: Write<u8>> CharacterSink<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Send `bytes` on the output stream.
    pub fn send(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        self.transmit_all(bytes)
    }

    /// Send `bytes` on stream `id`. Identifiers other than 0, 1 and 2 are
    /// rejected before anything reaches the wire.
    pub fn send_to(&mut self, id: i32, bytes: &[u8]) -> Result<usize, SinkError> {
        Stream::try_from(id)?;
        self.transmit_all(bytes)
    }

    /// Returns the number of input bytes consumed. A NUL byte terminates the
    /// transfer and is neither sent nor counted.
    fn transmit_all(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        let mut sent = 0;
        for &byte in bytes.iter().take_while(|&&b| b != 0) {
            if byte == b'\n' {
                self.transmit(b'\r')?;
            }
            self.transmit(byte)?;
            sent += 1;
        }
        Ok(sent)
    }

    fn transmit(&mut self, byte: u8) -> Result<(), SinkError> {
        nb::block!(self.link.write(byte)).map_err(|e| SinkError::Link(e.kind()))
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn release(self) -> L {
        self.link
    }
}

impl<L: Write<u8>> fmt::Write for CharacterSink<L> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
    }
}

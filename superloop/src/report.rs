//! Diagnostic lines on the serial link.

use core::fmt::Write as _;

use embedded_hal_nb::serial::Write;
use heapless::String;

use crate::sink::CharacterSink;
use crate::Instant;

/// Longest line: `Tick 4294967 (loop = 4294967295)\n` is 33 bytes.
pub const LINE_CAPACITY: usize = 48;

pub type TextLine = String<LINE_CAPACITY>;

/// Printed once after bring-up.
pub const BANNER: &str = "\n\n\nStarting\n";

/// `Tick <elapsed seconds> (loop = <iterations>)\n`
pub fn format_line(now: Instant, iterations: u32) -> TextLine {
    let mut line = TextLine::new();
    // cannot overflow: the widest line fits LINE_CAPACITY
    let _ = write!(
        line,
        "Tick {} (loop = {})\n",
        now.duration_since_epoch().to_secs(),
        iterations
    );
    line
}

/// Formats diagnostics and hands them to the character sink.
///
/// Output is best effort. A failed send is dropped without retry and only
/// shows up in [`Reporter::dropped`].
pub struct Reporter<L> {
    sink: CharacterSink<L>,
    emitted: u32,
    dropped: u32,
}

impl<L: Write<u8>> Reporter<L> {
    pub fn new(sink: CharacterSink<L>) -> Self {
        Self {
            sink,
            emitted: 0,
            dropped: 0,
        }
    }

    pub fn banner(&mut self) {
        self.emit(BANNER.as_bytes());
    }

    pub fn report(&mut self, now: Instant, iterations: u32) {
        let line = format_line(now, iterations);
        self.emit(line.as_bytes());
    }

    fn emit(&mut self, bytes: &[u8]) {
        match self.sink.send(bytes) {
            Ok(_) => self.emitted = self.emitted.wrapping_add(1),
            Err(_) => self.dropped = self.dropped.wrapping_add(1),
        }
    }

    /// Lines handed to the sink successfully, banner included.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn sink(&self) -> &CharacterSink<L> {
        &self.sink
    }

    pub fn release(self) -> CharacterSink<L> {
        self.sink
    }
}

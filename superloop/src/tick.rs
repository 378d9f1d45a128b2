//! Monotonic tick source.
//!
//! The SysTick handler is the only writer. The superloop reads the counter
//! once per pass with a single 32 bit load, which is atomic on the
//! Cortex-M4, so no critical section is needed on the hot path.

use atomic_polyfill::{AtomicU32, Ordering};

use crate::Instant;

/// Something the superloop can ask for the current tick.
pub trait TickClock {
    fn now(&self) -> Instant;
}

impl<T: TickClock + ?Sized> TickClock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Millisecond counter shared between the SysTick handler and the idle loop.
///
/// Meant to live in a `static`:
///
/// ```
/// use superloop::tick::TickSource;
///
/// static TICKS: TickSource = TickSource::new();
///
/// TICKS.on_interrupt();
/// assert_eq!(TICKS.now().ticks(), 1);
/// ```
pub struct TickSource {
    ticks: AtomicU32,
    missed: AtomicU32,
}

/// Consistent view of the counter and the number of missed periods.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickStats {
    pub now: Instant,
    pub missed: u32,
}

impl TickSource {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            missed: AtomicU32::new(0),
        }
    }

    /// One nominal activation.
    #[inline(always)]
    pub fn on_interrupt(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// An activation that covered `periods` tick periods, as measured by a
    /// [`Cadence`]. Every period is credited to the counter, the ones beyond
    /// the first are recorded as missed.
    pub fn advance(&self, periods: u32) {
        let periods = periods.max(1);
        if periods > 1 {
            self.missed.fetch_add(periods - 1, Ordering::Relaxed);
        }
        self.ticks.fetch_add(periods, Ordering::Release);
    }

    pub fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.load(Ordering::Acquire))
    }

    pub fn missed(&self) -> u32 {
        self.missed.load(Ordering::Relaxed)
    }

    /// Read counter and miss count without the handler running in between.
    pub fn snapshot(&self) -> TickStats {
        critical_section::with(|_| TickStats {
            now: self.now(),
            missed: self.missed(),
        })
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock for TickSource {
    fn now(&self) -> Instant {
        TickSource::now(self)
    }
}

/// Converts cycle counter stamps of successive tick activations into elapsed
/// tick periods.
///
/// Each activation is anchored at the counter reload that raised it: the
/// caller passes the handler's stamp together with the cycles that went by
/// since that reload. A late handler therefore still lands on its own
/// boundary and is credited one period. Only when a whole reload went by
/// while the interrupt was pending (its pending bit holds one request) do
/// two boundaries lie more than one period apart.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    cycles_per_tick: u32,
    boundary: Option<u32>,
}

impl Cadence {
    pub const fn new(cycles_per_tick: u32) -> Self {
        Self {
            cycles_per_tick,
            boundary: None,
        }
    }

    /// Periods between the reload behind this activation and the previous
    /// one, never less than one. `since_reload` is the handler latency in
    /// cycles. The cycle counter may wrap between calls.
    pub fn periods(&mut self, stamp: u32, since_reload: u32) -> u32 {
        let boundary = stamp.wrapping_sub(since_reload);
        let Some(last) = self.boundary.replace(boundary) else {
            return 1;
        };
        // boundaries sit whole periods apart, up to the skew between the two
        // counter reads
        let period = self.cycles_per_tick as u64;
        let elapsed = boundary.wrapping_sub(last) as u64;
        ((elapsed + period / 2) / period).max(1) as u32
    }
}

//! Cooperative superloop.
//!
//! A single non-preemptive loop reads the tick counter once per pass and runs
//! whatever is due. Actions run to completion; a slow one delays the others
//! but never blocks the interrupt handlers.

use embedded_hal_nb::serial::Write;

use crate::config::ActionTiming;
use crate::report::Reporter;
use crate::tick::TickClock;
use crate::{Duration, Instant};

/// How a deadline moves on after its action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Catchup {
    /// `deadline += period`. A late action keeps later firings shifted
    /// by the same amount, and a long stall is followed by back to back
    /// firings until the deadline is in the future again.
    #[default]
    FixedPeriod,
    /// `deadline = now + period`. Re-synchronises to the counter, late
    /// firings are dropped.
    Resync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionState {
    Armed,
    Due,
}

/// A `(deadline, period)` pair owned by the superloop.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledAction {
    deadline: Instant,
    period: Duration,
    catchup: Catchup,
    fired: u32,
}

impl ScheduledAction {
    pub const fn new(deadline: Instant, period: Duration, catchup: Catchup) -> Self {
        Self {
            deadline,
            period,
            catchup,
            fired: 0,
        }
    }

    /// First deadline `first` after process start (tick 0).
    pub const fn starting_at(first: Duration, period: Duration) -> Self {
        Self::new(Instant::from_ticks(first.ticks()), period, Catchup::FixedPeriod)
    }

    pub const fn from_timing(timing: ActionTiming) -> Self {
        Self::starting_at(timing.first, timing.period)
    }

    pub const fn with_catchup(mut self, catchup: Catchup) -> Self {
        self.catchup = catchup;
        self
    }

    pub fn state(&self, now: Instant) -> ActionState {
        if now >= self.deadline {
            ActionState::Due
        } else {
            ActionState::Armed
        }
    }

    /// Returns `true` when the action is due at `now`, and re-arms it.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state(now) == ActionState::Armed {
            return false;
        }
        self.deadline = match self.catchup {
            Catchup::FixedPeriod => self.deadline + self.period,
            Catchup::Resync => now + self.period,
        };
        self.fired = self.fired.wrapping_add(1);
        true
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }
}

/// Outcome of one superloop pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pass {
    /// Counter value this pass worked with
    pub now: Instant,
    pub heartbeat: bool,
    /// Iteration count printed by the diagnostic action, if it fired
    pub reported: Option<u32>,
}

/// The cooperative loop: a heartbeat action, a diagnostic report and the
/// iteration counter.
pub struct Superloop<C, L, H> {
    clock: C,
    heartbeat: ScheduledAction,
    on_heartbeat: H,
    report: ScheduledAction,
    reporter: Reporter<L>,
    iterations: u32,
}

impl<C, L, H> Superloop<C, L, H>
where
    C: TickClock,
    L: Write<u8>,
    H: FnMut(Instant),
{
    pub fn new(
        clock: C,
        heartbeat: ScheduledAction,
        on_heartbeat: H,
        report: ScheduledAction,
        reporter: Reporter<L>,
    ) -> Self {
        Self {
            clock,
            heartbeat,
            on_heartbeat,
            report,
            reporter,
            iterations: 0,
        }
    }

    /// One pass: read the counter once, run due actions, count the pass.
    pub fn poll(&mut self) -> Pass {
        let now = self.clock.now();

        let heartbeat = self.heartbeat.poll(now);
        if heartbeat {
            (self.on_heartbeat)(now);
        }

        let reported = if self.report.poll(now) {
            let iterations = self.iterations;
            self.reporter.report(now, iterations);
            self.iterations = 0;
            Some(iterations)
        } else {
            None
        };

        self.iterations = self.iterations.wrapping_add(1);

        Pass {
            now,
            heartbeat,
            reported,
        }
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// Passes since the last report, the reporting pass included.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn heartbeat(&self) -> &ScheduledAction {
        &self.heartbeat
    }

    pub fn report(&self) -> &ScheduledAction {
        &self.report
    }

    pub fn reporter(&self) -> &Reporter<L> {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter<L> {
        &mut self.reporter
    }
}

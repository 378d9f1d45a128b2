//! Pin toggled from an independent hardware timer interrupt.
//!
//! The actuator shares nothing with the tick source or the superloop. It owns
//! its timer and its pin, and only the timer's interrupt handler calls into it.

use embedded_hal::digital::StatefulOutputPin;

/// The interrupt condition of a periodic hardware timer.
pub trait InterruptSource {
    /// Clear the pending condition. If it is left set the interrupt re-enters
    /// as soon as the handler returns.
    fn acknowledge(&mut self);
}

pub struct PeriodicActuator<T, P> {
    source: T,
    pin: P,
    activations: u32,
}

impl<T, P> PeriodicActuator<T, P>
where
    T: InterruptSource,
    P: StatefulOutputPin,
{
    pub fn new(source: T, pin: P) -> Self {
        Self {
            source,
            pin,
            activations: 0,
        }
    }

    /// Handler body: acknowledge the timer, then toggle the pin once.
    pub fn on_interrupt(&mut self) -> Result<(), P::Error> {
        self.source.acknowledge();
        self.activations = self.activations.wrapping_add(1);
        self.pin.toggle()
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn is_asserted(&mut self) -> Result<bool, P::Error> {
        self.pin.is_set_high()
    }

    pub fn release(self) -> (T, P) {
        (self.source, self.pin)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::{ErrorType, OutputPin};

    use super::*;

    #[derive(Default)]
    struct Flag {
        pending: bool,
        cleared: u32,
    }

    impl InterruptSource for Flag {
        fn acknowledge(&mut self) {
            self.pending = false;
            self.cleared += 1;
        }
    }

    struct Pin {
        high: bool,
        writes: u32,
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
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
    }

    fn actuator(high: bool) -> PeriodicActuator<Flag, Pin> {
        PeriodicActuator::new(Flag::default(), Pin { high, writes: 0 })
    }

    #[test]
    fn toggles_once_per_activation() {
        let mut act = actuator(true);
        act.on_interrupt().unwrap();
        assert!(!act.is_asserted().unwrap());
        act.on_interrupt().unwrap();
        assert!(act.is_asserted().unwrap());

        let (_, pin) = act.release();
        assert_eq!(pin.writes, 2);
    }

    #[test]
    fn even_activations_restore_the_initial_state() {
        for initial in [false, true] {
            let mut act = actuator(initial);
            for _ in 0..2 * 37 {
                act.on_interrupt().unwrap();
            }
            assert_eq!(act.is_asserted().unwrap(), initial);
            assert_eq!(act.activations(), 74);
        }
    }

    #[test]
    fn every_activation_is_acknowledged() {
        let mut act = actuator(false);
        for _ in 0..5 {
            act.source.pending = true;
            act.on_interrupt().unwrap();
            assert!(!act.source.pending);
        }
        let (flag, _) = act.release();
        assert_eq!(flag.cleared, 5);
    }
}

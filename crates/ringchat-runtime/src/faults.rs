//! Inbound fault injection
//!
//! Simulates the unreliable medium the protocol is designed for: each
//! inbound datagram is independently dropped with a configured probability,
//! and survivors can be delivered after a random delay. Sits between the
//! socket and the codec; a zeroed injector is a transparent pass-through.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ----------------------------------------------------------------------------
// Fault Injector
// ----------------------------------------------------------------------------

/// Per-datagram loss and delay simulation.
pub struct FaultInjector {
    drop_probability: f64,
    max_delay: Duration,
    rng: StdRng,
}

impl FaultInjector {
    pub fn new(drop_probability: f64, max_delay: Duration) -> Self {
        Self {
            drop_probability: drop_probability.clamp(0.0, 1.0),
            max_delay,
            rng: StdRng::from_entropy(),
        }
    }

    /// Injector that never drops or delays.
    pub fn passthrough() -> Self {
        Self::new(0.0, Duration::ZERO)
    }

    /// Decide whether the current datagram is lost.
    pub fn should_drop(&mut self) -> bool {
        self.drop_probability > 0.0 && self.rng.gen::<f64>() < self.drop_probability
    }

    /// Delivery delay for the current datagram, if delays are configured.
    pub fn delay(&mut self) -> Option<Duration> {
        if self.max_delay.is_zero() {
            return None;
        }
        let millis = self.rng.gen_range(0..=self.max_delay.as_millis() as u64);
        Some(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_never_drops_or_delays() {
        let mut faults = FaultInjector::passthrough();
        for _ in 0..1000 {
            assert!(!faults.should_drop());
            assert!(faults.delay().is_none());
        }
    }

    #[test]
    fn certain_loss_always_drops() {
        let mut faults = FaultInjector::new(1.0, Duration::ZERO);
        for _ in 0..1000 {
            assert!(faults.should_drop());
        }
    }

    #[test]
    fn probability_is_clamped_to_unit_interval() {
        let mut always = FaultInjector::new(7.5, Duration::ZERO);
        assert!(always.should_drop());

        let mut never = FaultInjector::new(-1.0, Duration::ZERO);
        assert!(!never.should_drop());
    }

    #[test]
    fn delay_stays_within_bound() {
        let max = Duration::from_millis(50);
        let mut faults = FaultInjector::new(0.0, max);
        for _ in 0..1000 {
            let delay = faults.delay().unwrap();
            assert!(delay <= max);
        }
    }
}

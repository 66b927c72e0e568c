//! Greeting slot state.
//!
//! # Responsibility
//! - Own the current greeting and the manual-refresh in-flight guard.
//! - Apply timer picks and refresh results with last-write-wins semantics.
//!
//! # Invariants
//! - At most one manual refresh is in flight; `begin_refresh` returns false
//!   while one is outstanding.
//! - `revision` increases by one on every write to the slot.

use crate::greeting::generator::GreetingOutcome;
use crate::greeting::pool::GreetingPool;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct GreetingRotator {
    pool: GreetingPool,
    current: String,
    refresh_in_flight: bool,
    revision: u64,
}

impl GreetingRotator {
    pub fn new(pool: GreetingPool) -> Self {
        let current = pool.first().to_string();
        Self {
            pool,
            current,
            refresh_in_flight: false,
            revision: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn pool(&self) -> &GreetingPool {
        &self.pool
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight
    }

    /// Timer tick: pick a new greeting, avoiding an immediate repeat.
    pub fn rotate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        let next = self.pool.pick(Some(&self.current), rng).to_string();
        self.write(next);
        &self.current
    }

    /// Claims the in-flight guard. Returns false when a refresh is running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refresh_in_flight {
            return false;
        }
        self.refresh_in_flight = true;
        true
    }

    /// Stores a refresh result and releases the guard.
    ///
    /// Generated text also becomes the pool supplement so it can come back
    /// around in later rotations. Fallback text is shown once and dropped.
    pub fn finish_refresh(&mut self, outcome: GreetingOutcome) {
        if let GreetingOutcome::Generated(text) = &outcome {
            self.pool.set_supplement(text.clone());
        }
        self.write(outcome.into_text());
        self.refresh_in_flight = false;
    }

    fn write(&mut self, text: String) {
        self.current = text;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::GreetingRotator;
    use crate::greeting::generator::{GreetingOutcome, FAILURE_FALLBACK};
    use crate::greeting::pool::GreetingPool;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn guard_blocks_second_refresh_until_finished() {
        let mut rotator = GreetingRotator::new(GreetingPool::default());
        assert!(rotator.begin_refresh());
        assert!(!rotator.begin_refresh());
        rotator.finish_refresh(GreetingOutcome::Generated("新的一年".to_string()));
        assert!(!rotator.is_refreshing());
        assert!(rotator.begin_refresh());
    }

    #[test]
    fn timer_and_refresh_are_last_write_wins() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rotator = GreetingRotator::new(GreetingPool::default());
        assert!(rotator.begin_refresh());
        rotator.rotate(&mut rng);
        rotator.finish_refresh(GreetingOutcome::Generated("refresh wins".to_string()));
        assert_eq!(rotator.current(), "refresh wins");
        rotator.rotate(&mut rng);
        assert_ne!(rotator.current(), "refresh wins");
        assert_eq!(rotator.revision(), 3);
    }

    #[test]
    fn fallback_is_shown_but_kept_out_of_the_pool() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut rotator = GreetingRotator::new(GreetingPool::default());
        let base_len = rotator.pool().len();
        assert!(rotator.begin_refresh());
        rotator.finish_refresh(GreetingOutcome::Fallback(FAILURE_FALLBACK));
        assert_eq!(rotator.current(), FAILURE_FALLBACK);
        assert!(!rotator.is_refreshing());
        assert_eq!(rotator.pool().supplement(), None);
        assert_eq!(rotator.pool().len(), base_len);
        for _ in 0..100 {
            assert_ne!(rotator.rotate(&mut rng), FAILURE_FALLBACK);
        }
    }

    #[test]
    fn generated_text_joins_the_pool() {
        let mut rotator = GreetingRotator::new(GreetingPool::default());
        assert!(rotator.begin_refresh());
        rotator.finish_refresh(GreetingOutcome::Generated("星河入杯".to_string()));
        assert_eq!(rotator.pool().supplement(), Some("星河入杯"));
    }
}

//! Celebration trigger.
//!
//! # Responsibility
//! - Latch the countdown's zero-crossing into an explicit two-phase state.
//! - Describe the confetti burst handed to the external animation effect.
//!
//! # Invariants
//! - `Counting -> Celebrating` reports a fire exactly once per crossing.
//! - Observations while `Celebrating` and non-positive never fire again.
//! - `Celebrating -> Counting` is silent.

use serde::{Deserialize, Serialize};

/// Phase of the celebration latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationPhase {
    #[default]
    Counting,
    Celebrating,
}

/// Outcome of feeding one observation into the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelebrationTransition {
    /// Phase unchanged.
    Steady,
    /// Crossed zero; the effect must be invoked once.
    Fired,
    /// Target moved back into the future; nothing to invoke.
    Rearmed,
}

/// Edge-triggered latch over the remaining countdown time.
#[derive(Debug, Clone, Default)]
pub struct CelebrationTrigger {
    phase: CelebrationPhase,
    fire_count: u64,
}

impl CelebrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick's remaining milliseconds.
    pub fn observe(&mut self, remaining_ms: i64) -> CelebrationTransition {
        match (self.phase, remaining_ms <= 0) {
            (CelebrationPhase::Counting, true) => {
                self.phase = CelebrationPhase::Celebrating;
                self.fire_count += 1;
                CelebrationTransition::Fired
            }
            (CelebrationPhase::Celebrating, false) => {
                self.phase = CelebrationPhase::Counting;
                CelebrationTransition::Rearmed
            }
            _ => CelebrationTransition::Steady,
        }
    }

    pub fn phase(&self) -> CelebrationPhase {
        self.phase
    }

    /// Derived celebration flag shown by hosts.
    pub fn is_celebrating(&self) -> bool {
        self.phase == CelebrationPhase::Celebrating
    }

    /// Number of fires since the session started.
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }
}

/// Visual parameters of the confetti burst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfettiParams {
    pub particle_count: u32,
    /// Spread angle in degrees.
    pub spread: u32,
    /// Vertical launch origin as a fraction of viewport height.
    pub origin_y: f32,
    pub colors: Vec<String>,
}

impl Default for ConfettiParams {
    fn default() -> Self {
        Self {
            particle_count: 200,
            spread: 90,
            origin_y: 0.6,
            colors: vec![
                "#d4af37".to_string(),
                "#ffffff".to_string(),
                "#1b3022".to_string(),
            ],
        }
    }
}

/// Fire-and-forget celebration animation owned by the host.
pub trait CelebrationEffect: Send + Sync {
    fn fire(&self, params: &ConfettiParams);
}

impl<F> CelebrationEffect for F
where
    F: Fn(&ConfettiParams) + Send + Sync,
{
    fn fire(&self, params: &ConfettiParams) {
        self(params)
    }
}

#[cfg(test)]
mod tests {
    use super::{CelebrationPhase, CelebrationTransition, CelebrationTrigger, ConfettiParams};

    #[test]
    fn starts_counting() {
        let trigger = CelebrationTrigger::new();
        assert_eq!(trigger.phase(), CelebrationPhase::Counting);
        assert!(!trigger.is_celebrating());
        assert_eq!(trigger.fire_count(), 0);
    }

    #[test]
    fn exact_zero_counts_as_crossing() {
        let mut trigger = CelebrationTrigger::new();
        assert_eq!(trigger.observe(0), CelebrationTransition::Fired);
    }

    #[test]
    fn positive_observation_while_counting_is_steady() {
        let mut trigger = CelebrationTrigger::new();
        assert_eq!(trigger.observe(5_000), CelebrationTransition::Steady);
        assert_eq!(trigger.phase(), CelebrationPhase::Counting);
    }

    #[test]
    fn default_confetti_matches_tavern_palette() {
        let params = ConfettiParams::default();
        assert_eq!(params.particle_count, 200);
        assert_eq!(params.spread, 90);
        assert_eq!(params.colors[0], "#d4af37");
    }
}

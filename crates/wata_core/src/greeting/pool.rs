//! Greeting pool.
//!
//! # Invariants
//! - The base sequence is non-empty and immutable after construction.
//! - At most one runtime supplement joins the rotation; a new one replaces it.

use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Greetings shown before any generated text arrives.
pub const DEFAULT_GREETINGS: &[&str] = &[
    "在理性的微醺中，迎接跨越维度的2026。",
    "如果生活是一场博弈，愿你在新的一年里拥有纳什均衡的智慧。",
    "让昨日的熵增止于今夜，2026是秩序与美感的新起点。",
    "所谓跨年，不过是我们在宇宙刻度上的一次浪漫标注。",
    "在瓦塔，所有的思想都有归处，所有的灵魂都值得干杯。",
    "愿你新年的自由度趋于无穷大，且所有的概率分布都倾向于幸福。",
    "既然时间是流动的盛宴，何不在2026的序章里慷慨赴约？",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreetingPoolError {
    Empty,
}

impl Display for GreetingPoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "greeting pool needs at least one non-blank entry"),
        }
    }
}

impl Error for GreetingPoolError {}

/// Rotation source for the greeting slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingPool {
    base: Vec<String>,
    supplement: Option<String>,
}

impl Default for GreetingPool {
    fn default() -> Self {
        Self {
            base: DEFAULT_GREETINGS.iter().map(|line| line.to_string()).collect(),
            supplement: None,
        }
    }
}

impl GreetingPool {
    /// Builds a pool from caller entries, dropping blank lines.
    pub fn new<I, S>(entries: I) -> Result<Self, GreetingPoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base = entries
            .into_iter()
            .map(Into::into)
            .filter(|entry: &String| !entry.trim().is_empty())
            .collect::<Vec<_>>();
        if base.is_empty() {
            return Err(GreetingPoolError::Empty);
        }
        Ok(Self {
            base,
            supplement: None,
        })
    }

    /// First entry; the greeting shown at session start.
    pub fn first(&self) -> &str {
        &self.base[0]
    }

    /// Replaces the runtime supplement. Duplicates of base entries are ignored.
    pub fn set_supplement(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.base.iter().any(|entry| *entry == text) {
            self.supplement = None;
        } else {
            self.supplement = Some(text);
        }
    }

    pub fn supplement(&self) -> Option<&str> {
        self.supplement.as_deref()
    }

    pub fn len(&self) -> usize {
        self.base.len() + usize::from(self.supplement.is_some())
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn get(&self, index: usize) -> &str {
        match self.base.get(index) {
            Some(entry) => entry,
            None => self.supplement.as_deref().unwrap_or(&self.base[0]),
        }
    }

    /// Picks a uniformly random entry different from `previous` when the pool
    /// has more than one distinct option.
    pub fn pick<R: Rng + ?Sized>(&self, previous: Option<&str>, rng: &mut R) -> &str {
        let candidates = (0..self.len())
            .map(|index| self.get(index))
            .filter(|entry| Some(*entry) != previous)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return self.get(0);
        }
        candidates[rng.gen_range(0..candidates.len())]
    }
}

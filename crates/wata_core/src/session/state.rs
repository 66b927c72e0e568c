//! Session state owner.
//!
//! # Responsibility
//! - Own configuration and every piece of derived UI state for one session.
//! - Expose one reducer-style transition per timer tick or user action.
//!
//! # Invariants
//! - All derived state is written only through these transitions.
//! - A countdown transition reports confetti at most once per crossing.
//! - The photo tick is a no-op unless autoplay is on and `len > 1`.

use crate::celebration::{CelebrationTransition, CelebrationTrigger, ConfettiParams};
use crate::config::{background_preset, ConfigError, SessionConfig};
use crate::countdown::{self, CountdownState};
use crate::greeting::generator::GreetingOutcome;
use crate::greeting::pool::GreetingPool;
use crate::greeting::rotator::GreetingRotator;
use crate::model::photo::Photo;
use crate::model::wish::{Wish, WishId, WishValidationError};
use crate::service::photo_carousel::{GalleryError, PhotoCarousel};
use crate::service::wish_board::WishBoard;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Read model of everything a host renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub countdown: CountdownState,
    pub celebrating: bool,
    pub greeting: String,
    pub greeting_refreshing: bool,
    /// Bumped on every greeting write.
    pub greeting_revision: u64,
    pub current_photo: Option<Photo>,
    /// `None` while the gallery is empty.
    pub photo_index: Option<usize>,
    pub photo_count: usize,
    /// Newest first.
    pub wishes: Vec<Wish>,
    pub config: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct TavernState {
    config: SessionConfig,
    countdown: CountdownState,
    celebration: CelebrationTrigger,
    greeting: GreetingRotator,
    gallery: PhotoCarousel,
    wishes: WishBoard,
    rng: StdRng,
}

impl TavernState {
    /// Creates session state after validating `config`.
    pub fn new(config: SessionConfig, pool: GreetingPool, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            countdown: CountdownState::default(),
            celebration: CelebrationTrigger::new(),
            greeting: GreetingRotator::new(pool),
            gallery: PhotoCarousel::new(),
            wishes: WishBoard::new(),
            rng,
        })
    }

    /// Default greeting pool and an entropy-seeded RNG.
    pub fn with_config(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::new(config, GreetingPool::default(), StdRng::from_entropy())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn countdown(&self) -> CountdownState {
        self.countdown
    }

    pub fn celebration(&self) -> &CelebrationTrigger {
        &self.celebration
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_celebrating()
    }

    pub fn greeting(&self) -> &GreetingRotator {
        &self.greeting
    }

    pub fn gallery(&self) -> &PhotoCarousel {
        &self.gallery
    }

    pub fn wishes(&self) -> &WishBoard {
        &self.wishes
    }

    /// Whether the photo autoplay schedule should be running.
    pub fn photo_autoplay_active(&self) -> bool {
        self.config.autoplay_photos && self.gallery.len() > 1
    }

    /// Countdown tick. Returns confetti parameters on a zero-crossing.
    pub fn on_countdown_tick(&mut self, now_ms: i64) -> Option<ConfettiParams> {
        let target_ms = self.config.target_epoch_ms;
        self.countdown = countdown::tick(now_ms, target_ms);
        match self
            .celebration
            .observe(countdown::remaining_ms(now_ms, target_ms))
        {
            CelebrationTransition::Fired => {
                info!(
                    "event=celebration_fired module=session fire_count={}",
                    self.celebration.fire_count()
                );
                Some(ConfettiParams::default())
            }
            CelebrationTransition::Rearmed => {
                info!("event=celebration_rearmed module=session");
                None
            }
            CelebrationTransition::Steady => None,
        }
    }

    /// Moves the countdown target and recomputes immediately.
    pub fn set_target(&mut self, target_ms: i64, now_ms: i64) -> Option<ConfettiParams> {
        self.config.target_epoch_ms = target_ms;
        self.on_countdown_tick(now_ms)
    }

    /// Greeting timer tick. Returns the new greeting.
    pub fn on_greeting_tick(&mut self) -> &str {
        self.greeting.rotate(&mut self.rng)
    }

    pub fn set_greeting_interval(&mut self, interval_ms: u64) -> Result<(), ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroGreetingInterval);
        }
        self.config.greeting_interval_ms = interval_ms;
        Ok(())
    }

    pub fn begin_greeting_refresh(&mut self) -> bool {
        self.greeting.begin_refresh()
    }

    pub fn finish_greeting_refresh(&mut self, outcome: GreetingOutcome) {
        self.greeting.finish_refresh(outcome);
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.config.autoplay_photos = enabled;
    }

    /// Switches the background to one preset and returns its url.
    pub fn select_background(&mut self, index: usize) -> Result<&str, ConfigError> {
        self.config.background_url = background_preset(index)?.to_string();
        Ok(&self.config.background_url)
    }

    /// Photo autoplay tick. Returns whether the displayed photo changed.
    pub fn on_photo_tick(&mut self) -> bool {
        if !self.config.autoplay_photos {
            return false;
        }
        self.gallery.advance()
    }

    pub fn add_photo(&mut self, photo: Photo) -> Result<(), GalleryError> {
        self.gallery.add(photo)
    }

    pub fn remove_photo(&mut self, id: &str) -> Option<Photo> {
        self.gallery.remove(id)
    }

    pub fn next_photo(&mut self) {
        self.gallery.next();
    }

    pub fn prev_photo(&mut self) {
        self.gallery.prev();
    }

    pub fn jump_to_photo(&mut self, index: usize) -> Result<(), GalleryError> {
        self.gallery.jump_to(index)
    }

    pub fn add_wish(
        &mut self,
        text: impl Into<String>,
        now_ms: i64,
    ) -> Result<WishId, WishValidationError> {
        self.wishes.add(text, now_ms, &mut self.rng)
    }

    pub fn remove_wish(&mut self, id: WishId) -> bool {
        self.wishes.remove(id)
    }

    /// Drops every photo and wish. Callers confirm before invoking.
    pub fn reset_collections(&mut self) {
        info!(
            "event=collections_reset module=session photos={} wishes={}",
            self.gallery.len(),
            self.wishes.len()
        );
        self.gallery.clear();
        self.wishes.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            countdown: self.countdown,
            celebrating: self.is_celebrating(),
            greeting: self.greeting.current().to_string(),
            greeting_refreshing: self.greeting.is_refreshing(),
            greeting_revision: self.greeting.revision(),
            current_photo: self.gallery.current().cloned(),
            photo_index: (!self.gallery.is_empty()).then(|| self.gallery.index()),
            photo_count: self.gallery.len(),
            wishes: self.wishes.wishes().to_vec(),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TavernState;
    use crate::config::{ConfigError, SessionConfig};
    use crate::greeting::pool::GreetingPool;
    use crate::model::photo::Photo;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_with_target(target_ms: i64) -> TavernState {
        let config = SessionConfig {
            target_epoch_ms: target_ms,
            ..SessionConfig::default()
        };
        TavernState::new(config, GreetingPool::default(), StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SessionConfig {
            greeting_interval_ms: 0,
            ..SessionConfig::default()
        };
        let err = TavernState::with_config(config).unwrap_err();
        assert_eq!(err, ConfigError::ZeroGreetingInterval);
    }

    #[test]
    fn photo_tick_respects_autoplay_flag() {
        let mut state = state_with_target(0);
        state.add_photo(Photo::with_id("a", "data:a", "a")).unwrap();
        state.add_photo(Photo::with_id("b", "data:b", "b")).unwrap();
        assert!(state.photo_autoplay_active());

        state.set_autoplay(false);
        assert!(!state.photo_autoplay_active());
        assert!(!state.on_photo_tick());
        assert_eq!(state.gallery().index(), 0);

        state.set_autoplay(true);
        assert!(state.on_photo_tick());
        assert_eq!(state.gallery().index(), 1);
    }

    #[test]
    fn reset_clears_photos_and_wishes_only() {
        let mut state = state_with_target(10_000);
        state.on_countdown_tick(0);
        state.add_photo(Photo::with_id("a", "data:a", "a")).unwrap();
        state.add_wish("平安喜乐", 0).unwrap();

        state.reset_collections();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.photo_count, 0);
        assert_eq!(snapshot.photo_index, None);
        assert!(snapshot.wishes.is_empty());
        assert_eq!(snapshot.countdown.seconds, 10);
    }

    #[test]
    fn snapshot_serializes_with_snake_case_fields() {
        let mut state = state_with_target(61_000);
        state.on_countdown_tick(0);
        state.add_wish("干杯", 0).unwrap();

        let value = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(value["countdown"]["minutes"], 1);
        assert_eq!(value["countdown"]["seconds"], 1);
        assert_eq!(value["celebrating"], false);
        assert_eq!(value["photo_index"], serde_json::Value::Null);
        assert_eq!(value["wishes"][0]["text"], "干杯");
        assert!(value["wishes"][0]["color"].is_string());
        assert_eq!(value["config"]["target_epoch_ms"], 61_000);
    }

    #[test]
    fn select_background_updates_config() {
        let mut state = state_with_target(0);
        let url = state.select_background(2).unwrap().to_string();
        assert_eq!(state.config().background_url, url);
        assert!(state.select_background(9).is_err());
        assert_eq!(state.config().background_url, url);
    }
}

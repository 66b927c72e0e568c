//! Session runtime.
//!
//! # Responsibility
//! - Drive the countdown, greeting and photo schedules against one
//!   `TavernState`.
//! - Perform the manual greeting refresh and photo file imports.
//! - Invoke the celebration effect when the countdown crosses zero.
//!
//! # Invariants
//! - Lock order is schedules, then state. Scheduled jobs lock state only.
//! - The generator call and the celebration effect run outside the state lock.
//! - Scheduled jobs hold a weak handle; dropping every `TavernSession` clone
//!   stops all schedules.

use crate::celebration::{CelebrationEffect, ConfettiParams};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    parse_local_datetime, ConfigError, SessionConfig, COUNTDOWN_TICK_MS, PHOTO_ROTATION_MS,
};
use crate::greeting::generator::{
    resolve_greeting, GreetingGenerator, GreetingOutcome, OfflineGreetingGenerator,
    FAILURE_FALLBACK, REFRESH_TOPIC,
};
use crate::model::photo::Photo;
use crate::model::wish::{WishId, WishValidationError};
use crate::service::photo_carousel::GalleryError;
use crate::service::photo_import::decode_photo_file;
use crate::session::schedule::ScheduledTask;
use crate::session::state::{SessionSnapshot, TavernState};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Errors returned by session actions.
#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    Wish(WishValidationError),
    Gallery(GalleryError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Wish(err) => write!(f, "{err}"),
            Self::Gallery(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Wish(err) => Some(err),
            Self::Gallery(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<WishValidationError> for SessionError {
    fn from(value: WishValidationError) -> Self {
        Self::Wish(value)
    }
}

impl From<GalleryError> for SessionError {
    fn from(value: GalleryError) -> Self {
        Self::Gallery(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// External collaborators of a session.
#[derive(Clone)]
pub struct SessionDeps {
    pub clock: Arc<dyn Clock>,
    pub generator: Arc<dyn GreetingGenerator>,
    pub celebration: Arc<dyn CelebrationEffect>,
}

impl SessionDeps {
    /// Wall clock, no greeting service and a silent celebration effect.
    pub fn offline() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            generator: Arc::new(OfflineGreetingGenerator),
            celebration: Arc::new(|_: &ConfettiParams| {}),
        }
    }
}

struct Schedules {
    countdown: ScheduledTask<i64>,
    greeting: ScheduledTask<u64>,
    photos: ScheduledTask<usize>,
    shut_down: bool,
}

impl Schedules {
    fn new() -> Self {
        Self {
            countdown: ScheduledTask::new("countdown"),
            greeting: ScheduledTask::new("greeting"),
            photos: ScheduledTask::new("photos"),
            shut_down: false,
        }
    }

    fn cancel_all(&mut self) {
        self.countdown.cancel();
        self.greeting.cancel();
        self.photos.cancel();
    }
}

struct Shared {
    state: Mutex<TavernState>,
    schedules: Mutex<Schedules>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn GreetingGenerator>,
    celebration: Arc<dyn CelebrationEffect>,
}

impl Shared {
    async fn countdown_tick(&self) {
        let now_ms = self.clock.now_ms();
        let confetti = self.state.lock().await.on_countdown_tick(now_ms);
        if let Some(params) = confetti {
            self.fire(&params);
        }
    }

    async fn greeting_tick(&self) {
        let mut state = self.state.lock().await;
        state.on_greeting_tick();
        debug!(
            "event=greeting_rotated module=session revision={}",
            state.greeting().revision()
        );
    }

    async fn photo_tick(&self) {
        let mut state = self.state.lock().await;
        if state.on_photo_tick() {
            debug!(
                "event=photo_advanced module=session index={} len={}",
                state.gallery().index(),
                state.gallery().len()
            );
        }
    }

    fn fire(&self, params: &ConfettiParams) {
        info!(
            "event=celebration_effect module=session particles={}",
            params.particle_count
        );
        self.celebration.fire(params);
    }

    /// Brings every schedule in line with the current configuration.
    async fn sync_schedules(self: &Arc<Self>) {
        let mut schedules = self.schedules.lock().await;
        if schedules.shut_down {
            return;
        }
        let (target_ms, interval_ms, photo_key) = {
            let state = self.state.lock().await;
            (
                state.config().target_epoch_ms,
                state.config().greeting_interval_ms,
                state
                    .photo_autoplay_active()
                    .then(|| state.gallery().len()),
            )
        };

        let weak = Arc::downgrade(self);
        schedules.countdown.ensure(
            target_ms,
            Duration::from_millis(COUNTDOWN_TICK_MS),
            move || {
                let weak = weak.clone();
                async move {
                    if let Some(shared) = weak.upgrade() {
                        shared.countdown_tick().await;
                    }
                }
            },
        );

        let weak = Arc::downgrade(self);
        schedules
            .greeting
            .ensure(interval_ms, Duration::from_millis(interval_ms), move || {
                let weak = weak.clone();
                async move {
                    if let Some(shared) = weak.upgrade() {
                        shared.greeting_tick().await;
                    }
                }
            });

        match photo_key {
            Some(len) => {
                let weak = Arc::downgrade(self);
                schedules
                    .photos
                    .ensure(len, Duration::from_millis(PHOTO_ROTATION_MS), move || {
                        let weak = weak.clone();
                        async move {
                            if let Some(shared) = weak.upgrade() {
                                shared.photo_tick().await;
                            }
                        }
                    });
            }
            None => schedules.photos.cancel(),
        }
    }
}

/// Handle to one running tavern session.
///
/// Cloning shares the same session. Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct TavernSession {
    shared: Arc<Shared>,
}

impl TavernSession {
    /// Validates `config`, computes the first countdown and starts schedules.
    pub async fn start(config: SessionConfig, deps: SessionDeps) -> SessionResult<Self> {
        let state = TavernState::with_config(config)?;
        Ok(Self::start_with_state(state, deps).await)
    }

    /// Starts a session over prepared state, e.g. with a seeded RNG.
    pub async fn start_with_state(state: TavernState, deps: SessionDeps) -> Self {
        info!(
            "event=session_start module=session target_epoch_ms={} greeting_interval_ms={} autoplay={}",
            state.config().target_epoch_ms,
            state.config().greeting_interval_ms,
            state.config().autoplay_photos
        );
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            schedules: Mutex::new(Schedules::new()),
            clock: deps.clock,
            generator: deps.generator,
            celebration: deps.celebration,
        });
        shared.countdown_tick().await;
        shared.sync_schedules().await;
        Self { shared }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().await.snapshot()
    }

    /// The generated greeting that has joined the rotation, if any.
    pub async fn greeting_supplement(&self) -> Option<String> {
        let state = self.shared.state.lock().await;
        state.greeting().pool().supplement().map(str::to_string)
    }

    /// Moves the countdown target and recomputes immediately.
    pub async fn set_target_epoch_ms(&self, target_ms: i64) {
        let now_ms = self.shared.clock.now_ms();
        let confetti = self.shared.state.lock().await.set_target(target_ms, now_ms);
        if let Some(params) = confetti {
            self.shared.fire(&params);
        }
        self.shared.sync_schedules().await;
    }

    /// Accepts `YYYY-MM-DDTHH:MM[:SS]` in local time.
    pub async fn set_target_date(&self, value: &str) -> SessionResult<i64> {
        let target_ms = parse_local_datetime(value)?;
        self.set_target_epoch_ms(target_ms).await;
        Ok(target_ms)
    }

    pub async fn set_greeting_interval(&self, interval_ms: u64) -> SessionResult<()> {
        self.shared
            .state
            .lock()
            .await
            .set_greeting_interval(interval_ms)?;
        self.shared.sync_schedules().await;
        Ok(())
    }

    pub async fn set_autoplay(&self, enabled: bool) {
        self.shared.state.lock().await.set_autoplay(enabled);
        self.shared.sync_schedules().await;
    }

    pub async fn select_background(&self, index: usize) -> SessionResult<String> {
        let mut state = self.shared.state.lock().await;
        Ok(state.select_background(index)?.to_string())
    }

    pub async fn add_wish(&self, text: impl Into<String>) -> SessionResult<WishId> {
        let now_ms = self.shared.clock.now_ms();
        self.shared
            .state
            .lock()
            .await
            .add_wish(text, now_ms)
            .map_err(Into::into)
    }

    pub async fn remove_wish(&self, id: WishId) -> bool {
        self.shared.state.lock().await.remove_wish(id)
    }

    pub async fn add_photo(&self, photo: Photo) -> SessionResult<()> {
        self.shared.state.lock().await.add_photo(photo)?;
        self.shared.sync_schedules().await;
        Ok(())
    }

    pub async fn remove_photo(&self, id: &str) -> Option<Photo> {
        let removed = self.shared.state.lock().await.remove_photo(id);
        if removed.is_some() {
            self.shared.sync_schedules().await;
        }
        removed
    }

    pub async fn next_photo(&self) {
        self.shared.state.lock().await.next_photo();
    }

    pub async fn prev_photo(&self) {
        self.shared.state.lock().await.prev_photo();
    }

    pub async fn jump_to_photo(&self, index: usize) -> SessionResult<()> {
        self.shared
            .state
            .lock()
            .await
            .jump_to_photo(index)
            .map_err(Into::into)
    }

    /// Decodes image files concurrently and appends them as they complete.
    ///
    /// Returns the number of photos added. Failures are logged and skipped.
    pub async fn import_photos<I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut decoders = JoinSet::new();
        for path in paths {
            decoders.spawn(decode_photo_file(path));
        }

        let mut added = 0;
        while let Some(joined) = decoders.join_next().await {
            let photo = match joined {
                Ok(Ok(photo)) => photo,
                Ok(Err(err)) => {
                    warn!("event=photo_import module=session status=skipped error={err}");
                    continue;
                }
                Err(err) => {
                    warn!("event=photo_import module=session status=aborted error={err}");
                    continue;
                }
            };
            let label = photo.label.clone();
            match self.shared.state.lock().await.add_photo(photo) {
                Ok(()) => {
                    added += 1;
                    debug!("event=photo_import module=session status=ok label={label}");
                }
                Err(err) => {
                    warn!("event=photo_import module=session status=rejected error={err}");
                }
            }
        }
        info!("event=photo_import_done module=session added={added}");
        if added > 0 {
            self.shared.sync_schedules().await;
        }
        added
    }

    /// Clears photos and wishes. Does nothing unless `confirmed`.
    pub async fn reset_collections(&self, confirmed: bool) -> bool {
        if !confirmed {
            debug!("event=collections_reset module=session status=unconfirmed");
            return false;
        }
        self.shared.state.lock().await.reset_collections();
        self.shared.sync_schedules().await;
        true
    }

    /// Requests a generated greeting.
    ///
    /// Returns `None` when a refresh is already in flight. Generation runs on
    /// its own task, so dropping this future does not strand the guard.
    pub async fn refresh_greeting(&self) -> Option<String> {
        if !self.shared.state.lock().await.begin_greeting_refresh() {
            debug!("event=greeting_refresh module=session status=skipped reason=in_flight");
            return None;
        }
        info!("event=greeting_refresh module=session status=started");

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let outcome = resolve_greeting(&*shared.generator, REFRESH_TOPIC).await;
            let text = outcome.text().to_string();
            shared.state.lock().await.finish_greeting_refresh(outcome);
            text
        });

        match task.await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("event=greeting_refresh module=session status=aborted error={err}");
                self.shared
                    .state
                    .lock()
                    .await
                    .finish_greeting_refresh(GreetingOutcome::Fallback(FAILURE_FALLBACK));
                None
            }
        }
    }

    /// Stops every schedule. Later configuration changes do not restart them.
    pub async fn shutdown(&self) {
        let mut schedules = self.shared.schedules.lock().await;
        schedules.shut_down = true;
        schedules.cancel_all();
        info!("event=session_shutdown module=session");
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionDeps, SessionError, TavernSession};
    use crate::clock::ManualClock;
    use crate::config::{ConfigError, SessionConfig};
    use std::sync::Arc;

    fn deps_at(now_ms: i64) -> SessionDeps {
        SessionDeps {
            clock: Arc::new(ManualClock::new(now_ms)),
            ..SessionDeps::offline()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_computes_first_countdown() {
        let config = SessionConfig {
            target_epoch_ms: 90_061_000,
            ..SessionConfig::default()
        };
        let session = TavernSession::start(config, deps_at(0)).await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.countdown.days, 1);
        assert_eq!(snapshot.countdown.hours, 1);
        assert_eq!(snapshot.countdown.minutes, 1);
        assert_eq!(snapshot.countdown.seconds, 1);
        assert!(!snapshot.celebrating);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected() {
        let session = TavernSession::start(SessionConfig::default(), deps_at(0))
            .await
            .unwrap();
        let err = session.set_greeting_interval(0).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::ZeroGreetingInterval)
        ));
        assert_eq!(
            session.snapshot().await.config.greeting_interval_ms,
            SessionConfig::default().greeting_interval_ms
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_reset_keeps_wishes() {
        let session = TavernSession::start(SessionConfig::default(), deps_at(0))
            .await
            .unwrap();
        session.add_wish("岁岁平安").await.unwrap();
        assert!(!session.reset_collections(false).await);
        assert_eq!(session.snapshot().await.wishes.len(), 1);
        assert!(session.reset_collections(true).await);
        assert!(session.snapshot().await.wishes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn offline_refresh_uses_failure_fallback() {
        let session = TavernSession::start(SessionConfig::default(), deps_at(0))
            .await
            .unwrap();
        let text = session.refresh_greeting().await.unwrap();
        assert_eq!(text, crate::greeting::generator::FAILURE_FALLBACK);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.greeting, text);
        assert!(!snapshot.greeting_refreshing);
    }
}

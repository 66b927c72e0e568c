//! FFI use-case API for the Flutter tavern screen.
//!
//! # Responsibility
//! - Expose session use-cases to Dart via FRB over one process-wide session.
//! - Queue celebration effects until the UI drains them.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures surface as `ok = false` plus a human-readable message.
//! - At most one session is active; starting a new one stops the previous.

use log::warn;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;
use wata_core::config::{format_local_datetime, parse_local_datetime};
use wata_core::model::theme::{ThemeColor, BACKGROUND_PRESETS};
use wata_core::{
    core_version as core_version_inner, generator_from_config, init_logging as init_logging_inner,
    ping as ping_inner, ConfettiParams, GeminiConfig, SessionConfig, SessionDeps,
    SessionSnapshot, SystemClock, TavernSession,
};

static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();
static SESSION: Mutex<Option<TavernSession>> = Mutex::new(None);
static PENDING_CELEBRATIONS: Mutex<Vec<ConfettiItem>> = Mutex::new(Vec::new());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`; `log_dir`: absolute path.
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope for session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created wish or the resolved value, when any.
    pub value: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            value: None,
            message: message.into(),
        }
    }

    fn with_value(message: impl Into<String>, value: String) -> Self {
        Self {
            ok: true,
            value: Some(value),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            message: message.into(),
        }
    }
}

impl From<Result<ActionResponse, String>> for ActionResponse {
    fn from(value: Result<ActionResponse, String>) -> Self {
        value.unwrap_or_else(Self::failure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoItem {
    pub id: String,
    pub data: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishItem {
    pub id: String,
    pub text: String,
    /// Note paper color name (`slate|amber|orange|emerald|stone`).
    pub color: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiItem {
    pub particle_count: u32,
    pub spread: u32,
    pub origin_y: f32,
    pub colors: Vec<String>,
}

impl From<&ConfettiParams> for ConfettiItem {
    fn from(value: &ConfettiParams) -> Self {
        Self {
            particle_count: value.particle_count,
            spread: value.spread,
            origin_y: value.origin_y,
            colors: value.colors.clone(),
        }
    }
}

/// Everything the screen renders in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub celebrating: bool,
    pub greeting: String,
    pub greeting_refreshing: bool,
    pub current_photo: Option<PhotoItem>,
    pub photo_index: Option<u32>,
    pub photo_count: u32,
    pub wishes: Vec<WishItem>,
    /// Target in `datetime-local` shape, empty when not representable.
    pub target_date: String,
    pub greeting_interval_ms: u64,
    pub autoplay_photos: bool,
    pub background_url: String,
}

impl From<SessionSnapshot> for SessionView {
    fn from(value: SessionSnapshot) -> Self {
        Self {
            days: value.countdown.days,
            hours: value.countdown.hours,
            minutes: value.countdown.minutes,
            seconds: value.countdown.seconds,
            celebrating: value.celebrating,
            greeting: value.greeting,
            greeting_refreshing: value.greeting_refreshing,
            current_photo: value.current_photo.map(|photo| PhotoItem {
                caption: photo.caption(),
                id: photo.id,
                data: photo.data,
            }),
            photo_index: value.photo_index.map(saturating_u32),
            photo_count: saturating_u32(value.photo_count),
            wishes: value
                .wishes
                .into_iter()
                .map(|wish| WishItem {
                    id: wish.id.to_string(),
                    text: wish.text,
                    color: wish.color.as_str().to_string(),
                    created_at_ms: wish.created_at_ms,
                })
                .collect(),
            target_date: format_local_datetime(value.config.target_epoch_ms).unwrap_or_default(),
            greeting_interval_ms: value.config.greeting_interval_ms,
            autoplay_photos: value.config.autoplay_photos,
            background_url: value.config.background_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResponse {
    pub ok: bool,
    pub view: Option<SessionView>,
    pub message: String,
}

/// Starts (or restarts) the tavern session.
///
/// Environment `WATA_*` settings apply first; non-`None` arguments override.
///
/// # FFI contract
/// - Sync call; spawns the session timers on the shared runtime.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_start(
    target_date: Option<String>,
    greeting_interval_ms: Option<u64>,
    autoplay_photos: Option<bool>,
) -> ActionResponse {
    start_session(target_date, greeting_interval_ms, autoplay_photos).into()
}

/// Stops the active session's timers and releases it.
#[flutter_rust_bridge::frb(sync)]
pub fn session_stop() -> ActionResponse {
    let previous = lock_recovering(&SESSION).take();
    match (previous, runtime()) {
        (Some(session), Ok(runtime)) => {
            runtime.block_on(session.shutdown());
            ActionResponse::success("Session stopped.")
        }
        (None, _) => ActionResponse::success("No active session."),
        (Some(_), Err(err)) => ActionResponse::failure(err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_snapshot() -> SnapshotResponse {
    match with_session(|runtime, session| Ok(runtime.block_on(session.snapshot()))) {
        Ok(snapshot) => SnapshotResponse {
            ok: true,
            view: Some(snapshot.into()),
            message: String::new(),
        },
        Err(message) => SnapshotResponse {
            ok: false,
            view: None,
            message,
        },
    }
}

/// Sets the countdown target from `YYYY-MM-DDTHH:MM[:SS]` local time.
#[flutter_rust_bridge::frb(sync)]
pub fn set_target_date(value: String) -> ActionResponse {
    with_session(|runtime, session| {
        runtime
            .block_on(session.set_target_date(&value))
            .map(|_| ActionResponse::success("Target updated."))
            .map_err(|err| format!("set_target_date failed: {err}"))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_greeting_interval(interval_ms: u64) -> ActionResponse {
    with_session(|runtime, session| {
        runtime
            .block_on(session.set_greeting_interval(interval_ms))
            .map(|()| ActionResponse::success("Greeting interval updated."))
            .map_err(|err| format!("set_greeting_interval failed: {err}"))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_autoplay(enabled: bool) -> ActionResponse {
    with_session(|runtime, session| {
        runtime.block_on(session.set_autoplay(enabled));
        Ok(ActionResponse::success("Autoplay updated."))
    })
    .into()
}

/// Background preset urls, in selection order.
#[flutter_rust_bridge::frb(sync)]
pub fn background_presets() -> Vec<String> {
    BACKGROUND_PRESETS.iter().map(|url| url.to_string()).collect()
}

/// Accent palette as CSS hex strings.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_accent_colors() -> Vec<String> {
    ThemeColor::all()
        .iter()
        .map(|color| color.hex().to_string())
        .collect()
}

#[flutter_rust_bridge::frb(sync)]
pub fn select_background(index: u32) -> ActionResponse {
    with_session(|runtime, session| {
        runtime
            .block_on(session.select_background(index as usize))
            .map(|url| ActionResponse::with_value("Background updated.", url))
            .map_err(|err| format!("select_background failed: {err}"))
    })
    .into()
}

/// Pins a wish; `value` carries the new wish id.
#[flutter_rust_bridge::frb(sync)]
pub fn add_wish(text: String) -> ActionResponse {
    with_session(|runtime, session| {
        runtime
            .block_on(session.add_wish(text))
            .map(|id| ActionResponse::with_value("Wish added.", id.to_string()))
            .map_err(|err| format!("add_wish failed: {err}"))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn remove_wish(id: String) -> ActionResponse {
    let Ok(id) = Uuid::parse_str(id.trim()) else {
        return ActionResponse::failure(format!("remove_wish failed: invalid id `{id}`"));
    };
    with_session(|runtime, session| {
        let removed = runtime.block_on(session.remove_wish(id));
        Ok(ActionResponse::success(if removed {
            "Wish removed."
        } else {
            "Wish not found."
        }))
    })
    .into()
}

/// Decodes local image files into the gallery.
///
/// # FFI contract
/// - Async call; file reads run on the shared runtime.
/// - Unreadable or non-image files are skipped, not reported as failure.
pub async fn import_photos(paths: Vec<String>) -> ActionResponse {
    let (runtime, session) = match current_session() {
        Ok(pair) => pair,
        Err(message) => return ActionResponse::failure(message),
    };
    let paths = paths.into_iter().map(PathBuf::from).collect::<Vec<_>>();
    let requested = paths.len();
    match runtime
        .spawn(async move { session.import_photos(paths).await })
        .await
    {
        Ok(added) => ActionResponse::with_value(
            format!("Imported {added} of {requested} photo(s)."),
            added.to_string(),
        ),
        Err(err) => ActionResponse::failure(format!("import_photos failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn remove_photo(id: String) -> ActionResponse {
    with_session(|runtime, session| {
        let removed = runtime.block_on(session.remove_photo(&id));
        Ok(ActionResponse::success(if removed.is_some() {
            "Photo removed."
        } else {
            "Photo not found."
        }))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn next_photo() -> ActionResponse {
    with_session(|runtime, session| {
        runtime.block_on(session.next_photo());
        Ok(ActionResponse::success("OK"))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn prev_photo() -> ActionResponse {
    with_session(|runtime, session| {
        runtime.block_on(session.prev_photo());
        Ok(ActionResponse::success("OK"))
    })
    .into()
}

#[flutter_rust_bridge::frb(sync)]
pub fn jump_to_photo(index: u32) -> ActionResponse {
    with_session(|runtime, session| {
        runtime
            .block_on(session.jump_to_photo(index as usize))
            .map(|()| ActionResponse::success("OK"))
            .map_err(|err| format!("jump_to_photo failed: {err}"))
    })
    .into()
}

/// Clears every photo and wish once the user has confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn reset_collections(confirmed: bool) -> ActionResponse {
    with_session(|runtime, session| {
        if runtime.block_on(session.reset_collections(confirmed)) {
            Ok(ActionResponse::success("Photos and wishes cleared."))
        } else {
            Ok(ActionResponse::failure("Reset requires confirmation."))
        }
    })
    .into()
}

/// Drains celebration effects fired since the last call.
#[flutter_rust_bridge::frb(sync)]
pub fn take_celebration_effects() -> Vec<ConfettiItem> {
    std::mem::take(&mut *lock_recovering(&PENDING_CELEBRATIONS))
}

/// Requests a generated greeting; `value` carries the displayed text.
///
/// # FFI contract
/// - Async call; the generator runs on the shared runtime.
/// - A second call while one is in flight returns `ok = false` immediately.
pub async fn refresh_greeting() -> ActionResponse {
    let (runtime, session) = match current_session() {
        Ok(pair) => pair,
        Err(message) => return ActionResponse::failure(message),
    };
    match runtime
        .spawn(async move { session.refresh_greeting().await })
        .await
    {
        Ok(Some(text)) => ActionResponse::with_value("Greeting refreshed.", text),
        Ok(None) => ActionResponse::failure("A greeting refresh is already running."),
        Err(err) => ActionResponse::failure(format!("refresh_greeting failed: {err}")),
    }
}

fn start_session(
    target_date: Option<String>,
    greeting_interval_ms: Option<u64>,
    autoplay_photos: Option<bool>,
) -> Result<ActionResponse, String> {
    let mut config =
        SessionConfig::from_env().map_err(|err| format!("session_start failed: {err}"))?;
    if let Some(value) = target_date {
        config.target_epoch_ms = parse_local_datetime(&value)
            .map_err(|err| format!("session_start failed: {err}"))?;
    }
    if let Some(interval_ms) = greeting_interval_ms {
        config.greeting_interval_ms = interval_ms;
    }
    if let Some(enabled) = autoplay_photos {
        config.autoplay_photos = enabled;
    }

    let runtime = runtime()?;
    let deps = SessionDeps {
        clock: Arc::new(SystemClock),
        generator: generator_from_config(GeminiConfig::from_env()),
        celebration: Arc::new(|params: &ConfettiParams| {
            lock_recovering(&PENDING_CELEBRATIONS).push(ConfettiItem::from(params));
        }),
    };
    let session = runtime
        .block_on(TavernSession::start(config, deps))
        .map_err(|err| format!("session_start failed: {err}"))?;

    let previous = lock_recovering(&SESSION).replace(session);
    if let Some(previous) = previous {
        runtime.block_on(previous.shutdown());
        warn!("event=session_replaced module=ffi");
    }
    Ok(ActionResponse::success("Session started."))
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .enable_all()
                .thread_name("wata-session")
                .build()
                .map_err(|err| format!("failed to start async runtime: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn current_session() -> Result<(&'static Runtime, TavernSession), String> {
    let session = lock_recovering(&SESSION)
        .clone()
        .ok_or_else(|| "no active session; call session_start first".to_string())?;
    Ok((runtime()?, session))
}

fn with_session<T>(
    f: impl FnOnce(&Runtime, TavernSession) -> Result<T, String>,
) -> Result<T, String> {
    let (runtime, session) = current_session()?;
    f(runtime, session)
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        add_wish, core_version, import_photos, init_logging, ping, remove_wish,
        reset_collections, runtime, select_background, session_snapshot, session_start,
        session_stop, set_greeting_interval, take_celebration_effects,
    };
    use std::sync::Mutex;

    static SESSION_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), " ".to_string());
        assert!(error.contains("empty"));
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/wata-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn calls_without_session_fail_softly() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        session_stop();
        let response = add_wish("新年快乐".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("session_start"));
        assert!(!session_snapshot().ok);
    }

    #[test]
    fn wish_lifecycle_through_session() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        assert!(session_start(Some("2099-01-01T00:00".to_string()), None, Some(false)).ok);

        let added = add_wish("  万事胜意  ".to_string());
        assert!(added.ok, "{}", added.message);
        let id = added.value.unwrap();

        let view = session_snapshot().view.unwrap();
        assert_eq!(view.wishes.len(), 1);
        assert_eq!(view.wishes[0].id, id);
        assert_eq!(view.target_date, "2099-01-01T00:00:00");
        assert!(!view.autoplay_photos);

        assert!(!add_wish("   ".to_string()).ok);
        assert!(remove_wish("not-a-uuid".to_string()).message.contains("invalid id"));
        assert_eq!(remove_wish(id.clone()).message, "Wish removed.");
        assert_eq!(remove_wish(id).message, "Wish not found.");

        assert!(!set_greeting_interval(0).ok);
        assert!(!select_background(99).ok);
        assert!(!reset_collections(false).ok);
        assert!(reset_collections(true).ok);
        assert!(session_stop().ok);
    }

    #[test]
    fn past_target_queues_one_celebration() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        take_celebration_effects();
        assert!(session_start(Some("2000-01-01T00:00".to_string()), None, None).ok);

        let effects = take_celebration_effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].particle_count, 200);
        assert!(take_celebration_effects().is_empty());
        assert!(session_snapshot().view.unwrap().celebrating);
        assert!(session_stop().ok);
    }

    #[test]
    fn import_photos_runs_on_the_session_runtime() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let runtime = runtime().unwrap();
        session_stop();
        assert!(!runtime.block_on(import_photos(Vec::new())).ok);

        let dir = tempfile::tempdir().unwrap();
        let lantern = dir.path().join("lantern.png");
        std::fs::write(&lantern, [0x89, b'P', b'N', b'G']).unwrap();
        let paths = vec![
            lantern.to_string_lossy().into_owned(),
            dir.path().join("menu.txt").to_string_lossy().into_owned(),
        ];

        assert!(session_start(Some("2099-01-01T00:00".to_string()), None, None).ok);
        let response = runtime.block_on(import_photos(paths));
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.value.as_deref(), Some("1"));
        assert_eq!(response.message, "Imported 1 of 2 photo(s).");
        assert_eq!(session_snapshot().view.unwrap().photo_count, 1);
        assert!(session_stop().ok);
    }
}

//! Timing and state core of the Wata Tavern New Year screen.
//! Countdown, celebration latch, greeting and photo rotation, wish board.

pub mod celebration;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod greeting;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;

pub use celebration::{CelebrationEffect, CelebrationPhase, CelebrationTrigger, ConfettiParams};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SessionConfig};
pub use countdown::CountdownState;
pub use greeting::generator::{
    generator_from_config, GeminiConfig, GeminiGreetingService, GreetingError,
    GreetingGenerator, GreetingOutcome, OfflineGreetingGenerator,
};
pub use greeting::pool::GreetingPool;
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
    LoggingError,
};
pub use model::photo::Photo;
pub use model::theme::WishColor;
pub use model::wish::{Wish, WishId, WishValidationError};
pub use service::photo_carousel::GalleryError;
pub use service::photo_import::PhotoImportError;
pub use session::runtime::{SessionDeps, SessionError, SessionResult, TavernSession};
pub use session::state::{SessionSnapshot, TavernState};

/// Health check for host bindings.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

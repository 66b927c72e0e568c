//! Terminal host for the tavern countdown.
//!
//! # Responsibility
//! - Map command-line flags onto a `SessionConfig` and start a session.
//! - Print one status frame per second and a banner on celebration.

use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use wata_core::config::parse_local_datetime;
use wata_core::model::theme::{CELEBRATION_HEADLINE, CELEBRATION_MOTTOS, CELEBRATION_TAGLINE};
use wata_core::service::photo_import::list_image_files;
use wata_core::{
    default_log_level, generator_from_config, init_logging, init_stderr_logging, ConfettiParams,
    GeminiConfig, SessionConfig, SessionDeps, SessionSnapshot, SystemClock, TavernSession,
};

#[derive(Debug, Parser)]
#[command(name = "wata", version, about = "Wata Tavern New Year countdown")]
struct Cli {
    /// Countdown target as local `YYYY-MM-DDTHH:MM[:SS]`.
    #[arg(long)]
    target: Option<String>,

    /// Milliseconds between greeting rotations.
    #[arg(long)]
    greeting_interval_ms: Option<u64>,

    /// Directory of images to load into the gallery.
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Keep the gallery on its first photo.
    #[arg(long)]
    no_autoplay: bool,

    /// Pin a wish before the first frame. Repeatable.
    #[arg(long = "wish")]
    wishes: Vec<String>,

    /// Ask the greeting service for a fresh line at startup.
    #[arg(long)]
    refresh: bool,

    /// Stop after this many frames instead of waiting for Ctrl-C.
    #[arg(long)]
    ticks: Option<u64>,

    /// Write rotating log files here instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
}

impl Cli {
    /// Environment settings first, then flags on top.
    fn session_config(&self) -> Result<SessionConfig, Box<dyn Error>> {
        let mut config = SessionConfig::from_env()?;
        if let Some(target) = &self.target {
            config.target_epoch_ms = parse_local_datetime(target)?;
        }
        if let Some(interval_ms) = self.greeting_interval_ms {
            config.greeting_interval_ms = interval_ms;
        }
        if self.no_autoplay {
            config.autoplay_photos = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logging = match &cli.log_dir {
        Some(dir) => init_logging(&cli.log_level, &dir.to_string_lossy()),
        None => init_stderr_logging(&cli.log_level),
    };
    if let Err(err) = logging {
        eprintln!("wata: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_failed module=cli error={err}");
            eprintln!("wata: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.session_config()?;
    let deps = SessionDeps {
        clock: Arc::new(SystemClock),
        generator: generator_from_config(GeminiConfig::from_env()),
        celebration: Arc::new(print_banner),
    };
    let session = TavernSession::start(config, deps).await?;

    if let Some(dir) = &cli.photos {
        let files = list_image_files(dir).await?;
        let added = session.import_photos(files).await;
        println!("Loaded {added} photo(s) from {}", dir.display());
    }
    for wish in &cli.wishes {
        session.add_wish(wish.as_str()).await?;
    }
    if cli.refresh {
        if let Some(text) = session.refresh_greeting().await {
            println!("Fresh from the keeper: {text}");
        }
    }

    let mut frames = tokio::time::interval(Duration::from_secs(1));
    let mut printed = 0u64;
    loop {
        tokio::select! {
            _ = frames.tick() => {
                print_frame(&session.snapshot().await);
                printed += 1;
                if cli.ticks.is_some_and(|limit| printed >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("event=cli_interrupted module=cli");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

fn print_frame(snapshot: &SessionSnapshot) {
    let photo = match &snapshot.current_photo {
        Some(photo) => format!(
            "photo {}/{} {}",
            snapshot.photo_index.unwrap_or(0) + 1,
            snapshot.photo_count,
            photo.caption()
        ),
        None => "no photos".to_string(),
    };
    println!(
        "[{}] {} | {} | wishes {}",
        snapshot.countdown, snapshot.greeting, photo, snapshot.wishes.len()
    );
}

fn print_banner(params: &ConfettiParams) {
    println!();
    println!("  *** {CELEBRATION_HEADLINE} ***");
    println!("  {CELEBRATION_TAGLINE}");
    println!("  {}", CELEBRATION_MOTTOS.join(" / "));
    println!("  ({} sparks in {})", params.particle_count, params.colors.join(" "));
    println!();
}

//! Chatlate - Live Chat Translation
//!
//! Polls the chat feed of a channel's live stream, translates each
//! message into the configured target languages, and records results
//! to the console and a per-session CSV log.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use chatlate::cli::{Args, Commands};
use chatlate::config::{Config, TranslationBackend};
use chatlate::error::ChatlateError;
use chatlate::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Init { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        Commands::Languages => {
            println!("\nConfigured languages:");
            println!("{:<15} {:<6} {:<8} {:<6}", "Name", "Code", "Default", "Skip");
            println!("{}", "-".repeat(40));
            for (name, code) in &config.languages.lang_options {
                let is_default = config.languages.default_target_languages.contains(code);
                let is_skip = config.languages.skip_languages.contains(code);
                println!(
                    "{:<15} {:<6} {:<8} {:<6}",
                    name,
                    code,
                    if is_default { "yes" } else { "" },
                    if is_skip { "yes" } else { "" },
                );
            }
        }
        Commands::Locate { channel } => {
            if let Some(channel) = channel {
                config.source.channel_id = channel;
            }
            let workflow = Workflow::new(config)?;
            let active = workflow.locate().await?;
            println!("videoId: {}", active.video_id);
            println!("chatId:  {}", active.chat_id);
        }
        Commands::Run { channel, target_langs, backend } => {
            if let Some(channel) = channel {
                config.source.channel_id = channel;
            }
            if let Some(langs) = target_langs {
                config.languages.default_target_languages = langs
                    .split(',')
                    .map(|lang| lang.trim().to_lowercase())
                    .filter(|lang| !lang.is_empty())
                    .collect();
            }
            if let Some(backend) = backend {
                config.translate.backend = parse_backend(&backend)?;
            }

            let workflow = Workflow::new(config)?;

            let cancel = CancellationToken::new();
            let stop = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Stop requested, finishing in-flight translations");
                    stop.cancel();
                }
            });

            workflow.run_session(cancel).await?;
            info!("Session finished");
        }
    }

    Ok(())
}

fn parse_backend(value: &str) -> Result<TranslationBackend, ChatlateError> {
    match value.to_lowercase().as_str() {
        "google" => Ok(TranslationBackend::Google),
        "libre" => Ok(TranslationBackend::Libre),
        other => Err(ChatlateError::Config(format!(
            "Unknown translation backend '{}', expected google or libre", other
        ))),
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let app_dir = std::env::current_dir()?.join(".chatlate");
    let log_dir = app_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "chatlate.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber.try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

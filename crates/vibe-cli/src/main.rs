//! vibe: street ethnography scanner.
//!
//! Usage:
//!   vibe analyze street.jpg --language ja
//!   vibe demo
//!   vibe history
//!   vibe show 1718000000000
//!   vibe export latest --out dossiers/
//!   vibe logo "Analog Listening Bar"
//!   vibe languages fr

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vibe_core::{defaults, languages, Report};
use vibe_inference::{AnalysisClient, InferenceConfig, LogoGenerator};
use vibe_session::{
    HistoryStore, SessionConfig, SessionController, SessionState, TarDossierBuilder,
};

/// Exit code for media the user can fix by choosing another file.
const EXIT_REJECTED_MEDIA: u8 = 2;

#[derive(Parser)]
#[command(name = "vibe")]
#[command(author, version, about = "Street ethnography scanner")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Report language, code or name (default: English)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// History location (default: platform data dir)
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,

    /// Print full reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a street photo or video
    Analyze {
        /// Media file to analyze
        file: PathBuf,
    },

    /// Show the canned demo report
    Demo,

    /// List the five most recent analyses
    History,

    /// Print a stored report
    Show {
        /// History id, or "latest"
        id: String,
    },

    /// Write a dossier for a stored report
    Export {
        /// History id, or "latest"
        #[arg(default_value = "latest")]
        id: String,

        /// Export directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Generate a brand logo (prints a data URL)
    Logo {
        /// Business concept to draw
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// List or search target languages
    Languages {
        /// Substring of a code or name
        query: Option<String>,
    },
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = env::var("LOG_FILE").ok();
    let log_ansi = env::var("LOG_ANSI").ok().map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vibe=info,vibe_session=info,vibe_inference=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdout stays clean for reports.
    match log_file {
        Some(path) => {
            let path = std::path::Path::new(&path);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("vibe.log");
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            if log_format == "json" {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(log_ansi.unwrap_or(false)),
                    )
                    .init();
            }
            Some(guard)
        }
        None => {
            if log_format == "json" {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            } else {
                let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
                if let Some(ansi) = log_ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
            None
        }
    }
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let b = &report.business_recommendation;
    println!("{}", report.location_vibe);
    println!("  location:      {}", report.coordinates.location_name);
    println!("  viability:     {}/100", report.viability_score);
    println!("  gentrification {}/100", report.gentrification_index);
    println!("  concept:       {}", b.title);
    println!("  slogan:        {}", b.marketing_copy.slogan);
    println!("  persona:       {}", report.target_persona.archetype);
    println!("  tarot:         {}", report.vibe_tarot.card_name);
    println!("  objects:       {}", report.detected_objects.len());
    Ok(())
}

fn session(cli: &Cli, client: Option<Arc<AnalysisClient>>) -> SessionController {
    let mut config = SessionConfig::default();
    if let Some(dir) = &cli.history_dir {
        config = config.with_history_dir(dir.clone());
    }
    if let Some(language) = &cli.language {
        config = config.with_language(languages::display_name(language));
    }
    let history = HistoryStore::load(config.history_storage());
    SessionController::new(config, history, client)
}

fn resolve_id(session: &SessionController, id: &str) -> anyhow::Result<String> {
    if id == "latest" {
        return session
            .history()
            .latest()
            .map(|e| e.id.clone())
            .context("History is empty");
    }
    Ok(id.to_string())
}

/// Exit code for a selection error the user can fix, `None` for real failures.
fn rejection_exit_code(err: &vibe_core::Error) -> Option<u8> {
    err.is_user_recoverable().then_some(EXIT_REJECTED_MEDIA)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _guard = init_tracing();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Languages { query } => {
            let list = match query {
                Some(q) => languages::search(q),
                None => languages::sorted(),
            };
            for lang in list {
                println!("{:<6} {}", lang.code, lang.name);
            }
        }

        Commands::Analyze { file } => {
            let config = InferenceConfig::load()?;
            let client = AnalysisClient::from_config(&config)?;
            info!(
                primary = %client.primary_model(),
                secondary = client.secondary_model().unwrap_or("(disabled)"),
                "Analysis client ready"
            );

            let mut session = session(cli, Some(Arc::new(client)));
            if let Err(e) = session.select_path(file).await {
                if let Some(code) = rejection_exit_code(&e) {
                    eprintln!("{}", session.error().unwrap_or("Unsupported media."));
                    return Ok(ExitCode::from(code));
                }
                return Err(e).with_context(|| format!("Failed to read {}", file.display()));
            }

            match session.analyze().await {
                SessionState::Complete => {
                    if let Some(report) = session.report() {
                        print_report(report, cli.json)?;
                    }
                }
                _ => {
                    eprintln!(
                        "{}",
                        session.error().unwrap_or(defaults::ANALYSIS_FAILED_MESSAGE)
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Demo => {
            let mut session = session(cli, None);
            session.load_demo().await;
            if let Some(report) = session.report() {
                print_report(report, cli.json)?;
            }
        }

        Commands::History => {
            let session = session(cli, None);
            if session.history().is_empty() {
                println!("No history yet.");
            }
            for entry in session.history().entries() {
                let when = entry
                    .created_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {}  {} ({})",
                    entry.id,
                    when,
                    entry.report.location_vibe,
                    entry.report.coordinates.location_name
                );
            }
        }

        Commands::Show { id } => {
            let mut session = session(cli, None);
            let id = resolve_id(&session, id)?;
            session.load_from_history(&id)?;
            if let Some(report) = session.report() {
                print_report(report, cli.json)?;
            }
        }

        Commands::Export { id, out } => {
            let mut session = session(cli, None);
            let id = resolve_id(&session, id)?;
            session.load_from_history(&id)?;
            match session
                .export(Box::new(TarDossierBuilder::new()), out)
                .await
            {
                Ok(artifact) => println!("{}", artifact.path.display()),
                Err(e) => {
                    warn!(error = %e, "Export failed");
                    eprintln!(
                        "{}",
                        session.error().unwrap_or(defaults::EXPORT_FAILED_MESSAGE)
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Logo { prompt } => {
            let config = InferenceConfig::load()?;
            let logo = LogoGenerator::from_config(&config)?
                .generate(&prompt.join(" "))
                .await;
            if logo.is_empty() {
                eprintln!("Logo generation failed.");
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", logo);
        }
    }

    Ok(ExitCode::SUCCESS)
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use explorer_core::{GeminiClient, GenerativeClient, MissingGenerativeClient, ScriptedClient, Session};
use map_integration::RecordingMap;
use shared::domain::AppMode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Explore places on a map from natural-language questions")]
struct Cli {
    /// Settings file; `explorer.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(long)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default).
    Repl {
        #[arg(long)]
        planner: bool,
    },
    /// Runs one query and prints the results.
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
        #[arg(long)]
        planner: bool,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Replays function calls from a JSON-lines file instead of calling the model.
    Replay {
        script: PathBuf,
        #[arg(long)]
        planner: bool,
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = apply_overrides(load_settings(cli.config.as_deref())?, &cli);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => run_repl(&settings, false).await,
        Some(Command::Repl { planner }) => run_repl(&settings, planner).await,
        Some(Command::Ask {
            prompt,
            planner,
            export,
        }) => {
            let client = gemini_client(&settings)?;
            let mut session = new_session(&settings, planner);
            repl::ask(&mut session, &client, &prompt.join(" ")).await;
            if let Some(dir) = export {
                repl::export(&session, &dir).await?;
            }
            Ok(())
        }
        Some(Command::Replay {
            script,
            planner,
            export,
        }) => {
            let client = ScriptedClient::from_file(&script)
                .await
                .with_context(|| format!("failed to load replay script '{}'", script.display()))?;
            info!(events = client.events().len(), script = %script.display(), "replaying");
            let mut session = new_session(&settings, planner);
            let prompt = format!("replay of {}", script.display());
            repl::ask(&mut session, &client, &prompt).await;
            if let Some(dir) = export {
                repl::export(&session, &dir).await?;
            }
            Ok(())
        }
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(key) = &cli.api_key {
        settings.api_key = Some(key.clone());
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        settings.temperature = temperature;
    }
    if let Some(filter) = &cli.log_filter {
        settings.log_filter = filter.clone();
    }
    settings
}

fn new_session(settings: &Settings, planner: bool) -> Session<RecordingMap> {
    let mode = if planner || settings.planner_by_default {
        AppMode::Planner
    } else {
        AppMode::Explorer
    };
    Session::new(RecordingMap::new())
        .with_mode(mode)
        .with_temperature(settings.temperature)
}

fn gemini_client(settings: &Settings) -> Result<GeminiClient> {
    let api_key = settings
        .api_key
        .as_deref()
        .context("no API key configured; set GEMINI_API_KEY or APP__API_KEY, or pass --api-key")?;
    GeminiClient::new(&settings.api_base_url, api_key, &settings.model)
        .context("failed to create Gemini client")
}

async fn run_repl(settings: &Settings, planner: bool) -> Result<()> {
    let client: Box<dyn GenerativeClient> = match gemini_client(settings) {
        Ok(client) => Box::new(client),
        Err(err) => {
            warn!(error = %err, "queries will fail until an API key is configured");
            Box::new(MissingGenerativeClient::new(format!("{err:#}")))
        }
    };
    let mut session = new_session(settings, planner);
    repl::run(&mut session, &client, &settings.export_dir).await
}

use caster_cli::commands;
use caster_cli::logging;
use caster_cli::readline;
use caster_core::context::AppConfig;
use caster_core::{CameraAutomator, RiotClient, Spectator, SystemProcessHost};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init_logging();

    let config = AppConfig::load();
    let spectator = build_spectator(&config)?;
    let printer = commands::spawn_event_printer(&spectator);

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &spectator, &config).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    printer.abort();
    Ok(())
}

fn build_spectator(config: &AppConfig) -> Result<Spectator, String> {
    let api_key = config
        .resolved_api_key()
        .ok_or("error: no API key configured (set api_key or RIOT_API_KEY)")?;
    let client = RiotClient::new(api_key)
        .map_err(|e| e.to_string())?
        .with_observer(config.observer_host.clone(), config.observer_port);
    let camera = CameraAutomator::platform_default(config.timings.input_delay());

    Spectator::from_config(config, Arc::new(client), Arc::new(SystemProcessHost), camera)
        .map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a player by name and start spectating their games
    Watch {
        #[arg(short, long)]
        player: String,
    },
    /// Track an already resolved player id
    Track {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        name: String,
    },
    Stop,
    Status,
    Config,
    Exit,
}

async fn respond(line: &str, spectator: &Spectator, config: &AppConfig) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "caster".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Watch { player }) => commands::watch(spectator, player).await,
        Some(Commands::Track { id, name }) => commands::track(spectator, id, name).await,
        Some(Commands::Stop) => commands::stop(spectator).await,
        Some(Commands::Status) => commands::show_status(spectator).await,
        Some(Commands::Config) => commands::show_settings(config),
        Some(Commands::Exit) => {
            commands::exit(spectator).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

mod cli;
mod config;
mod destination;
mod launcher;
mod logging;
mod probe;
mod theme;
mod tui;
mod viewer;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::{Cli, Command, ConfigCommand, OpenArgs, ProbeArgs, TuiArgs};
use config::{ConfigStore, ServerConfig};
use launcher::Launcher;
use probe::ProbeOutcome;
use std::time::Duration;
use viewer::SystemViewer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = ConfigStore::default_location()?;

    match cli.command {
        None => tui::run_tui(store, &TuiArgs::default()).await?,
        Some(Command::Tui(args)) => tui::run_tui(store, &args).await?,
        Some(Command::Open(args)) => {
            logging::init_cli();
            run_open(&store, &args)?;
        }
        Some(Command::Probe(args)) => {
            logging::init_cli();
            run_probe(&store, &args).await?;
        }
        Some(Command::Config(args)) => {
            logging::init_cli();
            run_config(&store, args.command)?;
        }
    }

    Ok(())
}

fn run_open(store: &ConfigStore, args: &OpenArgs) -> Result<()> {
    let config = store.load()?;
    let launcher = Launcher::new(
        config.server_url,
        SystemViewer::new(config.viewer_command),
    );

    if args.print {
        let request = launcher.request_for(args.destination);
        match request.title {
            Some(title) => println!("{}\t{title}", request.address),
            None => println!("{}", request.address),
        }
        return Ok(());
    }

    launcher
        .open(args.destination)
        .with_context(|| format!("failed opening {}", args.destination))?;
    Ok(())
}

async fn run_probe(store: &ConfigStore, args: &ProbeArgs) -> Result<()> {
    let config = store.load()?;
    let address = args.url.clone().unwrap_or(config.server_url);
    let timeout = Duration::from_millis(args.timeout_ms.unwrap_or(config.probe_timeout_ms).max(1));

    let report = probe::probe(&address, timeout).await;
    println!(
        "{address}: {} ({}, {} ms)",
        report.outcome,
        report.detail,
        report.elapsed.as_millis()
    );

    if report.outcome == ProbeOutcome::Unreachable {
        return Err(anyhow!("media server at {address} is unreachable"));
    }
    Ok(())
}

fn run_config(store: &ConfigStore, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show(args) => {
            let config = store.load()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }

            println!("{:<16}  {}", "server_url", config.server_url);
            for destination in destination::Destination::ALL {
                println!(
                    "{:<16}  {}",
                    destination.label(),
                    destination::resolve_address(&config.server_url, destination)
                );
            }
            println!("{:<16}  {}", "probe_timeout_ms", config.probe_timeout_ms);
            println!(
                "{:<16}  {}",
                "viewer_command",
                config
                    .viewer_command
                    .as_ref()
                    .map_or_else(|| "(system default)".to_owned(), |argv| argv.join(" "))
            );
        }
        ConfigCommand::SetUrl(args) => {
            let server_url = config::validate_server_url(&args.url)?;
            let config = ServerConfig {
                server_url,
                ..store.load()?
            };
            store.save(&config)?;
            println!("Saved server URL: {}", config.server_url);
        }
        ConfigCommand::Reset => {
            store.reset()?;
            println!("Settings reset; using {}", config::DEFAULT_SERVER_URL);
        }
        ConfigCommand::Path => {
            println!("{}", store.path().display());
        }
    }

    Ok(())
}

use crate::destination::Destination;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mediacenter-tui",
    version,
    about = "Remote-friendly terminal home screen for a home media server"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive home screen.
    Tui(TuiArgs),
    /// Open one destination in the external viewer.
    Open(OpenArgs),
    /// Check once whether the media server answers.
    Probe(ProbeArgs),
    /// Inspect or change the saved server settings.
    Config(ConfigArgs),
}

#[derive(Debug, Args, Default)]
pub struct TuiArgs {
    /// Replace the network check with a fixed delay that always succeeds.
    #[arg(long, default_value_t = false)]
    pub simulate_probe: bool,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Destination to open.
    #[arg(value_enum)]
    pub destination: Destination,

    /// Print the resolved address instead of launching the viewer.
    #[arg(long, default_value_t = false)]
    pub print: bool,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Address to probe instead of the configured server URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Probe deadline in milliseconds (defaults to the configured value).
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show(ShowArgs),
    /// Save a new server base URL.
    SetUrl(SetUrlArgs),
    /// Forget saved settings and fall back to defaults.
    Reset,
    /// Print where settings are stored.
    Path,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print machine-readable JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SetUrlArgs {
    /// Base URL of the media server dashboard, e.g. http://192.168.1.100:8600
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ConfigCommand};
    use crate::destination::Destination;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn open_accepts_destination_names() {
        let cli = Cli::try_parse_from(["mediacenter-tui", "open", "livetv", "--print"])
            .expect("parse");
        let Some(Command::Open(args)) = cli.command else {
            panic!("expected open command");
        };
        assert_eq!(args.destination, Destination::LiveTv);
        assert!(args.print);

        let cli = Cli::try_parse_from(["mediacenter-tui", "open", "media"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Command::Open(ref args)) if args.destination == Destination::MediaLibrary
        ));
        assert!(Cli::try_parse_from(["mediacenter-tui", "open", "settings"]).is_err());
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["mediacenter-tui", "config", "set-url", "http://h:8600"])
            .expect("parse");
        let Some(Command::Config(args)) = cli.command else {
            panic!("expected config command");
        };
        assert!(matches!(args.command, ConfigCommand::SetUrl(ref set) if set.url == "http://h:8600"));
    }
}

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};

use crate::xbar::DisplayMode;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Tribes 2 server scoreboard
///
/// Serves a live scoreboard image of a Tribes 2 game server over HTTP, and
/// prints the same information as an xbar status-bar menu.
///
/// Endpoints when serving:
/// - GET /?serverName=RE&padding=T,R,B,L&t=TOKEN
/// - GET /TOKEN/image.png
/// - GET /font-test
#[derive(Parser, Debug)]
#[command(about, long_about, version)]
#[command(styles = get_styles())]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Read configuration from this file instead of the default location.
    #[arg(long = "config", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", global = true, help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP image server (the default).
    Serve {
        /// Listen on this port instead of the configured one.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print one xbar menu refresh to stdout.
    ///
    /// Unset options fall back to the variables xbar passes to plugins:
    /// XBARDarkMode, VAR_SERVER_NAME and VAR_DISPLAY_MODE.
    Xbar {
        /// How to display the teams.
        #[arg(short, long, value_enum)]
        mode: Option<DisplayMode>,

        /// Use colors for a dark menu bar.
        #[arg(long)]
        dark_mode: bool,

        /// Server name to match (regular expression).
        #[arg(short, long)]
        server_name: Option<String>,
    },

    /// Install the xbar plugin script.
    InstallXbar {
        /// Plugin directory. Defaults to xbar's plugin folder in the home directory.
        #[arg(long)]
        dir: Option<String>,

        /// Shell text inserted before the command, e.g. exports.
        #[arg(long, default_value = "")]
        prologue: String,

        /// Run the currently executing binary instead of the one on PATH.
        #[arg(long)]
        dev: bool,
    },
}

impl Args {
    /// The requested command, serving when none is given.
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_serve() {
        let args = Args::parse_from(["t2_scoreboard"]);
        assert_eq!(args.resolved_command(), Command::Serve { port: None });
    }

    #[test]
    fn test_xbar_options() {
        let args = Args::parse_from([
            "t2_scoreboard",
            "xbar",
            "--mode",
            "table",
            "--dark-mode",
            "-s",
            "^Discord",
            "--log-file",
            "/tmp/t2.log",
        ]);
        assert_eq!(args.log_file.as_deref(), Some("/tmp/t2.log"));
        assert_eq!(
            args.resolved_command(),
            Command::Xbar {
                mode: Some(DisplayMode::Table),
                dark_mode: true,
                server_name: Some("^Discord".to_string()),
            }
        );
    }

    #[test]
    fn test_install_xbar_options() {
        let args = Args::parse_from(["t2_scoreboard", "install-xbar", "--dir", "/tmp/plugins", "--dev"]);
        assert_eq!(
            args.resolved_command(),
            Command::InstallXbar {
                dir: Some("/tmp/plugins".to_string()),
                prologue: String::new(),
                dev: true,
            }
        );
    }
}

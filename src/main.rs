// src/main.rs
use clap::Parser;
use t2_scoreboard::cli::{Args, Command};
use t2_scoreboard::commands::{
    handle_install_xbar_command, handle_serve_command, handle_xbar_command,
};
use t2_scoreboard::config::Config;
use t2_scoreboard::error::AppError;
use t2_scoreboard::logging::{LogTarget, setup_logging};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let command = args.resolved_command();

    // Installing the plugin needs neither config nor a log file.
    if let Command::InstallXbar {
        dir,
        prologue,
        dev,
    } = &command
    {
        return handle_install_xbar_command(dir.clone(), prologue, *dev).await;
    }

    let config = Config::load(args.config.as_deref()).await?;

    let target = match command {
        Command::Xbar { .. } => LogTarget::FileOnly,
        _ => LogTarget::StdoutAndFile,
    };
    let log_file = args.log_file.as_deref().or(config.log_file_path.as_deref());
    // The guard must be kept alive for the duration of the program
    // to ensure logs are flushed properly
    let (log_file_path, _guard) = setup_logging(log_file, target).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    match command {
        Command::Serve { port } => handle_serve_command(config, port).await,
        Command::Xbar {
            mode,
            dark_mode,
            server_name,
        } => handle_xbar_command(&config, mode, dark_mode, server_name).await,
        Command::InstallXbar { .. } => Ok(()),
    }
}

use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::data_fetcher::api::create_http_client;
use crate::error::AppError;
use crate::server;
use crate::xbar::plugin::{default_plugin_dir, install_plugin};
use crate::xbar::{DisplayMode, XbarOptions, build_menu};

/// Handles the `serve` command.
pub async fn handle_serve_command(mut config: Config, port: Option<u16>) -> Result<(), AppError> {
    if let Some(port) = port {
        config.port = port;
    }
    server::serve(&config).await
}

/// Handles the `xbar` command: prints one menu refresh to stdout.
///
/// Command line options win over the variables xbar sets for the plugin.
pub async fn handle_xbar_command(
    config: &Config,
    mode: Option<DisplayMode>,
    dark_mode: bool,
    server_name: Option<String>,
) -> Result<(), AppError> {
    let env_options = XbarOptions::from_env();
    let options = XbarOptions {
        dark_mode: dark_mode || env_options.dark_mode,
        server_name: server_name.or(env_options.server_name),
        display_mode: mode.unwrap_or(env_options.display_mode),
    };

    let client = create_http_client(config.http_timeout_seconds)
        .map_err(|e| AppError::config_error(format!("Failed to build HTTP client: {e}")))?;
    let menu = build_menu(&client, config, &options).await;
    print!("{menu}");
    Ok(())
}

/// Handles the `install-xbar` command.
pub async fn handle_install_xbar_command(
    dir: Option<String>,
    prologue: &str,
    dev: bool,
) -> Result<(), AppError> {
    let dir = dir.map(PathBuf::from).unwrap_or_else(default_plugin_dir);
    println!("Installing to: {}", dir.display());
    let plugin_file = install_plugin(&dir, prologue, dev).await?;
    info!("Installed xbar plugin at {}", plugin_file.display());
    println!("✔ Success!");
    Ok(())
}

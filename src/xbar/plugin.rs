//! Installs the xbar plugin script that runs `t2_scoreboard xbar` every
//! five minutes.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AppError;

/// xbar reads the refresh interval from the `.5m.` part of the name.
pub const PLUGIN_FILE_NAME: &str = "t2-server.5m.sh";

/// Default xbar plugin directory, under the user's home.
pub fn default_plugin_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join("Library/Application Support/xbar/plugins")
}

/// Plugin script text. `command` is the line that prints the menu and
/// `prologue` is inserted verbatim before it, e.g. to export variables.
pub fn plugin_script(command: &str, prologue: &str) -> String {
    format!(
        r#"#!/bin/bash

#  <xbar.title>Tribes 2 Server Status</xbar.title>
#  <xbar.version>v{version}</xbar.version>
#  <xbar.desc>Show the status of a Tribes 2 server.</xbar.desc>
#  <xbar.dependencies>t2_scoreboard</xbar.dependencies>

#  <xbar.var>string(VAR_SERVER_NAME="Discord PUB"): Server name to match (regular expression).</xbar.var>
#  <xbar.var>select(VAR_DISPLAY_MODE="image"): How to display the teams. [image, table, submenu]</xbar.var>

export PATH='/usr/local/bin:/usr/bin:/bin:$PATH'

{prologue}

{command}
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Command the installed plugin runs. A dev install points at the binary
/// currently running instead of the one on `PATH`.
pub fn plugin_command(dev: bool) -> String {
    let binary = if dev {
        std::env::current_exe()
            .ok()
            .map(|path| format!("\"{}\"", path.display()))
    } else {
        None
    };
    match binary {
        Some(binary) => format!("{binary} xbar"),
        None => "t2_scoreboard xbar".to_string(),
    }
}

/// Writes the plugin script into `dir`, replacing any previous install,
/// and marks it executable. Returns the path written.
pub async fn install_plugin(dir: &Path, prologue: &str, dev: bool) -> Result<PathBuf, AppError> {
    let plugin_file = dir.join(PLUGIN_FILE_NAME);
    info!("Installing xbar plugin to {}", plugin_file.display());

    if !dir.exists() {
        tokio::fs::create_dir_all(dir).await?;
    }
    match tokio::fs::remove_file(&plugin_file).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let script = plugin_script(&plugin_command(dev), prologue);
    tokio::fs::write(&plugin_file, script).await?;
    set_executable(&plugin_file).await?;

    Ok(plugin_file)
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

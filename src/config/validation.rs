use crate::config::Config;
use crate::error::AppError;
use regex::Regex;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - Status URL must be an http(s) URL
/// - Default server name, if set, must compile as a regex
/// - Cache capacities must be non-zero
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_url("Status URL", &config.status_url)?;
    validate_url("Image service URL", &config.image_service_url)?;

    if let Some(filter) = &config.default_server_name {
        Regex::new(filter).map_err(|e| {
            AppError::config_error(format!("Default server name '{filter}' is not a valid regex: {e}"))
        })?;
    }

    if config.cache.status_capacity == 0 || config.cache.snapshot_capacity == 0 {
        return Err(AppError::config_error("Cache capacities must be greater than zero"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        // Check if parent directory exists or can be created
        if let Some(parent) = Path::new(log_path).parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

fn validate_url(label: &str, url: &str) -> Result<(), AppError> {
    if url.is_empty() {
        return Err(AppError::config_error(format!("{label} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "{label} must start with http:// or https://"
        )));
    }
    Ok(())
}

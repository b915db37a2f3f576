mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::grading::{FrameworkId, Level};

/// Get the config directory path (~/.config/cgpa-features/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("cgpa-features"))
}

/// Get the default config file path (~/.config/cgpa-features/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path and
///   falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let defaults = [
        ("olevel_framework", &config.olevel_framework, Level::OLevel),
        ("alevel_framework", &config.alevel_framework, Level::ALevel),
    ];
    for (key, value, level) in defaults {
        if let Some(id) = value {
            match FrameworkId::parse(id) {
                Ok(fid) => {
                    let actual = crate::grading::get_framework(fid).level;
                    if actual != level {
                        errors.push(format!("{}: '{}' is an {} framework", key, id, actual));
                    }
                }
                Err(e) => errors.push(format!("{}: {}", key, e)),
            }
        }
    }

    if let Some(ref years) = config.years {
        if years.first > years.last {
            errors.push(format!(
                "years: first ({}) must not be after last ({})",
                years.first, years.last
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

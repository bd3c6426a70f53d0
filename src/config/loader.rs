use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::Collection;

/// Default config filenames checked when no path is provided.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["wavebench.toml", "wavebench.json"];

/// Loads a collection from the provided path or the default locations.
///
/// # Errors
///
/// Returns an error when no config file exists, or when it cannot be read
/// or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Collection> {
    if let Some(path) = path {
        return load_config_file(Path::new(path));
    }

    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .map_or_else(
            || Err(AppError::config(ConfigError::NotFound)),
            |candidate| load_config_file(&candidate),
        )
}

/// Loads a collection from a `.toml` or `.json` file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or does not match the collection schema.
pub fn load_config_file(path: &Path) -> AppResult<Collection> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}

//! Configuration types and file loading.
mod loader;
mod parse;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file};
pub(crate) use parse::parse_duration_value;
pub use types::{
    Collection, Cookie, DurationValue, Global, GlobalSettings, Header, HttpMethod, Phase,
    RequestTemplate, Test, UserAgent,
};

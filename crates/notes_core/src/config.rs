//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_ID_LEASE_SIZE, DEFAULT_MAX_TAG_LOOKUPS, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SEARCH_LIMIT, DEFAULT_STATIC_DIR,
};
use crate::db::DatabaseOptions;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the notes backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub search_path: String,
    pub port: u16,
    pub static_dir: String,
    pub signing_secret: String,
    pub id_lease_size: u64,
    pub max_tag_lookups: usize,
    pub search_limit: usize,
    pub request_timeout_secs: u64,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String, home: Option<PathBuf>) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(home) = non_empty("HOME") {
        return Some(PathBuf::from(home));
    }

    // Windows USERPROFILE (standard)
    if let Some(profile) = non_empty("USERPROFILE") {
        return Some(PathBuf::from(profile));
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for a variable name, if set.
    ///
    /// # Returns
    /// A populated [`Config`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let home = resolve_home_dir(&lookup);
        let cache_dir = home
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cache")
            .join("notes");

        Self {
            db_path: lookup("DB_PATH")
                .map(|path| expand_tilde(path, home.clone()))
                .unwrap_or_else(|| cache_dir.join("kv").to_string_lossy().to_string()),
            search_path: lookup("SEARCH_PATH")
                .map(|path| expand_tilde(path, home.clone()))
                .unwrap_or_else(|| cache_dir.join("search").to_string_lossy().to_string()),
            port: parsed_or(&lookup, "PORT", DEFAULT_PORT),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            signing_secret: lookup("SIGNING_SECRET").unwrap_or_default(),
            id_lease_size: parsed_or(&lookup, "ID_LEASE_SIZE", DEFAULT_ID_LEASE_SIZE).max(1),
            max_tag_lookups: parsed_or(&lookup, "MAX_TAG_LOOKUPS", DEFAULT_MAX_TAG_LOOKUPS).max(1),
            search_limit: parsed_or(&lookup, "SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT).max(1),
            request_timeout_secs: parsed_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )
            .max(1),
        }
    }

    /// Storage tuning derived from this configuration.
    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            id_lease_size: self.id_lease_size,
            max_tag_lookups: self.max_tag_lookups,
        }
    }
}

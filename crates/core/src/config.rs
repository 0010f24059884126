//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the core. Binaries
//! read the environment; nothing in this crate does so while handling a request.

use crate::constants::DEFAULT_NOTIFICATION_TTL_MS;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Longest notification lifetime accepted from configuration (10 minutes).
const MAX_NOTIFICATION_TTL_MS: u64 = 10 * 60 * 1000;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    fixture_path: Option<PathBuf>,
    notification_ttl_ms: u64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `fixture_path` of `None` selects the embedded demonstration dataset.
    pub fn new(fixture_path: Option<PathBuf>, notification_ttl_ms: u64) -> CoreResult<Self> {
        if notification_ttl_ms == 0 || notification_ttl_ms > MAX_NOTIFICATION_TTL_MS {
            return Err(CoreError::InvalidInput(format!(
                "notification TTL must be between 1 and {MAX_NOTIFICATION_TTL_MS} ms"
            )));
        }

        Ok(Self {
            fixture_path,
            notification_ttl_ms,
        })
    }

    /// Build a config from raw environment values, as read by the binaries.
    pub fn from_env_values(
        fixtures: Option<String>,
        notification_ttl_ms: Option<String>,
    ) -> CoreResult<Self> {
        Self::new(
            fixture_path_from_env_value(fixtures)?,
            notification_ttl_from_env_value(notification_ttl_ms)?,
        )
    }

    pub fn fixture_path(&self) -> Option<&Path> {
        self.fixture_path.as_deref()
    }

    pub fn notification_ttl_ms(&self) -> u64 {
        self.notification_ttl_ms
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            fixture_path: None,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
        }
    }
}

/// Parse the notification TTL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 3000 ms.
pub fn notification_ttl_from_env_value(value: Option<String>) -> CoreResult<u64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                CoreError::InvalidInput(format!("invalid notification TTL '{v}': {e}"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_NOTIFICATION_TTL_MS))
}

/// Resolve the fixture path from an optional string value.
///
/// Empty values select the embedded dataset. A non-empty value must name an existing file.
pub fn fixture_path_from_env_value(value: Option<String>) -> CoreResult<Option<PathBuf>> {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let path = PathBuf::from(raw);
    if !path.is_file() {
        return Err(CoreError::InvalidInput(format!(
            "fixture file does not exist: {}",
            path.display()
        )));
    }
    Ok(Some(path))
}

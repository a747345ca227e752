//! Router settings loaded from TOML with environment overrides.
//!
//! ```toml
//! base_path = "/app"
//! debug = false
//! guard_timeout_ms = 1000
//! ```
//!
//! Every key is optional. Environment variables prefixed with `SWITCHYARD_`
//! override file values when [`RouterSettings::with_env_overrides`] is applied.

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

const DEFAULT_GUARD_TIMEOUT_MS: u64 = 1000;

/// Deployment settings for a [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterSettings {
	/// Path prefix the application is mounted under, for example `/app`.
	/// Stripped from request paths and prepended to redirect targets.
	pub base_path: String,
	/// Adds the full error chain to 500 responses.
	pub debug: bool,
	/// Budget for one authenticator lookup, in milliseconds.
	pub guard_timeout_ms: u64,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			base_path: String::new(),
			debug: false,
			guard_timeout_ms: DEFAULT_GUARD_TIMEOUT_MS,
		}
	}
}

impl RouterSettings {
	/// Parses settings from TOML text.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::RouterSettings;
	///
	/// let settings = RouterSettings::from_toml_str("base_path = \"/app/\"").unwrap();
	/// assert_eq!(settings.base_path(), "/app");
	/// assert!(!settings.debug);
	/// ```
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let settings: Self = toml::from_str(content)?;
		Ok(settings)
	}

	/// Reads and parses a TOML settings file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			RouterError::Settings(format!("Failed to read {}: {}", path.display(), e))
		})?;
		let settings = Self::from_toml_str(&content)?;
		tracing::debug!(path = %path.display(), "Loaded router settings");
		Ok(settings)
	}

	/// Applies `SWITCHYARD_BASE_PATH`, `SWITCHYARD_DEBUG` and
	/// `SWITCHYARD_GUARD_TIMEOUT_MS` from the process environment.
	pub fn with_env_overrides(self) -> Result<Self> {
		self.with_overrides_from(|key| env::var(key).ok())
	}

	/// Applies overrides read through `lookup`, which receives full
	/// variable names.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Settings`] if a present value cannot be parsed.
	pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let key = |name: &str| format!("{ENV_PREFIX}{name}");

		if let Some(base_path) = lookup(&key("BASE_PATH")) {
			self.base_path = base_path;
		}
		if let Some(raw) = lookup(&key("DEBUG")) {
			self.debug = parse_bool(&raw)
				.ok_or_else(|| RouterError::Settings(format!("{}: not a boolean: {raw}", key("DEBUG"))))?;
		}
		if let Some(raw) = lookup(&key("GUARD_TIMEOUT_MS")) {
			self.guard_timeout_ms = raw.trim().parse().map_err(|e| {
				RouterError::Settings(format!("{}: {e}", key("GUARD_TIMEOUT_MS")))
			})?;
		}
		Ok(self)
	}

	/// Base path with a leading slash and no trailing slash. Empty when the
	/// application is mounted at the root.
	pub fn base_path(&self) -> String {
		let trimmed = self.base_path.trim().trim_end_matches('/');
		if trimmed.is_empty() {
			String::new()
		} else if trimmed.starts_with('/') {
			trimmed.to_string()
		} else {
			format!("/{trimmed}")
		}
	}

	pub fn guard_timeout(&self) -> Duration {
		Duration::from_millis(self.guard_timeout_ms)
	}
}

fn parse_bool(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" | "" => Some(false),
		_ => None,
	}
}

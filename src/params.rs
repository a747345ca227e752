//! Path parameters extracted from a matched request path.
//!
//! Values are kept as text exactly as captured. Coercion to numbers or other
//! types is left to handlers, which can use [`PathParams::parse`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a handler reads a parameter that is absent or cannot be
/// converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
	/// No parameter with this name was captured.
	#[error("Missing path parameter: {0}")]
	Missing(String),

	/// The captured text could not be parsed.
	#[error("Failed to parse path parameter '{name}' ('{raw_value}') as {param_type}: {reason}")]
	Parse {
		/// Parameter name.
		name: String,
		/// Expected type name.
		param_type: &'static str,
		/// Raw captured value.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},
}

/// Ordered mapping from declared parameter name to the captured substring.
///
/// Order follows the order of captures in the route template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
	entries: Vec<(String, String)>,
}

impl PathParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), value.into()));
	}

	/// Returns the captured text for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Parses the captured text for `name` into `T`.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::CompiledPattern;
	///
	/// let pattern = CompiledPattern::compile("/posts/view/int:id", "").unwrap();
	/// let params = pattern.matches("/posts/view/42").unwrap();
	/// let id: u64 = params.parse("id").unwrap();
	/// assert_eq!(id, 42);
	/// ```
	pub fn parse<T>(&self, name: &str) -> Result<T, ParamError>
	where
		T: FromStr,
		T::Err: fmt::Display,
	{
		let raw = self
			.get(name)
			.ok_or_else(|| ParamError::Missing(name.to_string()))?;

		raw.parse::<T>().map_err(|e| ParamError::Parse {
			name: name.to_string(),
			param_type: std::any::type_name::<T>(),
			raw_value: raw.to_string(),
			reason: e.to_string(),
		})
	}

	/// Returns true if a parameter named `name` was captured.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Iterates `(name, value)` pairs in capture order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Converts into an unordered map.
	pub fn into_map(self) -> HashMap<String, String> {
		self.entries.into_iter().collect()
	}
}

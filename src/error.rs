//! Error types for route registration and dispatch.

use thiserror::Error;

/// Errors raised while declaring routes, loading settings or resolving a request.
///
/// Declaration errors (`MalformedTemplate`, `UnknownController`, `UnknownAction`,
/// `InvalidAction`, `InvalidRedirect`) are start-up fatal: [`Routes::build`](crate::Routes::build)
/// returns the first one recorded. `GuardTimeout` is the only variant produced
/// while serving a request.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RouterError {
	/// A route template could not be compiled into a matcher.
	#[error("Malformed route template '{template}': {reason}")]
	MalformedTemplate {
		/// The full template, including any group prefix.
		template: String,
		/// Why compilation failed.
		reason: String,
	},

	/// A "Controller@Action" reference names a controller that was never registered.
	#[error("Unknown controller: {0}")]
	UnknownController(String),

	/// A "Controller@Action" reference names an action the controller does not provide.
	#[error("Unknown action '{action}' on controller '{controller}'")]
	UnknownAction {
		/// Controller name as written in the reference.
		controller: String,
		/// Action name after defaulting (empty becomes `Index`).
		action: String,
	},

	/// A string action reference is not of the form "Controller@Action".
	#[error("Invalid action reference: {0}")]
	InvalidAction(String),

	/// A guard fallback target cannot be sent as a `Location` header.
	#[error("Invalid redirect target: {0:?}")]
	InvalidRedirect(String),

	/// The authentication lookup for a guard exceeded its budget.
	#[error("Guard evaluation timed out after {0} ms")]
	GuardTimeout(u64),

	/// Settings could not be loaded or parsed.
	#[error("Settings error: {0}")]
	Settings(String),
}

impl From<toml::de::Error> for RouterError {
	fn from(err: toml::de::Error) -> Self {
		Self::Settings(err.to_string())
	}
}

impl From<std::io::Error> for RouterError {
	fn from(err: std::io::Error) -> Self {
		Self::Settings(err.to_string())
	}
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RouterError>;

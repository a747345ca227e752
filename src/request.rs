//! Inbound request seen by the dispatcher.
//!
//! The hosting server converts its own request type into [`Request`];
//! serving HTTP is not this crate's job.

use http::Method;
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Inbound request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct Request {
	/// HTTP verb.
	pub method: Method,
	/// Request target: path plus optional query string.
	pub uri: String,
	/// Request headers, available to authenticators.
	pub headers: HeaderMap,
}

impl Request {
	/// Creates a request with no headers.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::Request;
	/// use http::Method;
	///
	/// let request = Request::new(Method::GET, "/users/42?tab=posts");
	/// assert_eq!(request.path(), "/users/42");
	/// assert_eq!(request.query(), Some("tab=posts"));
	/// ```
	pub fn new(method: Method, uri: impl Into<String>) -> Self {
		Self {
			method,
			uri: uri.into(),
			headers: HeaderMap::new(),
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(uri: impl Into<String>) -> Self {
		Self::new(Method::GET, uri)
	}

	/// Shorthand for a `POST` request.
	pub fn post(uri: impl Into<String>) -> Self {
		Self::new(Method::POST, uri)
	}

	/// Adds a header. Invalid names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Returns the request path without the query string.
	pub fn path(&self) -> &str {
		match self.uri.split_once('?') {
			Some((path, _)) => path,
			None => &self.uri,
		}
	}

	/// Returns the query string, if any.
	pub fn query(&self) -> Option<&str> {
		self.uri.split_once('?').map(|(_, query)| query)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/users", "/users", None)]
	#[case("/users?page=2", "/users", Some("page=2"))]
	#[case("?only=query", "", Some("only=query"))]
	#[case("", "", None)]
	fn test_request_path_and_query(
		#[case] uri: &str,
		#[case] path: &str,
		#[case] query: Option<&str>,
	) {
		let request = Request::get(uri);

		assert_eq!(request.path(), path);
		assert_eq!(request.query(), query);
	}

	#[rstest]
	fn test_request_with_header() {
		let request = Request::get("/").with_header("Authorization", "Bearer token");

		assert_eq!(
			request.headers.get("authorization").unwrap(),
			"Bearer token"
		);
	}
}

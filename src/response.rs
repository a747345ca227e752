//! Outbound response and the fixed error payloads.

use bytes::Bytes;
use http::StatusCode;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// JSON body used for 404 and 500 responses.
///
/// Serializes as `{"code":"404","title":"Not Found","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: String,
	pub title: String,
	pub message: String,
}

impl ErrorPayload {
	/// Creates a payload from its three parts.
	pub fn new(
		code: impl Into<String>,
		title: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self {
			code: code.into(),
			title: title.into(),
			message: message.into(),
		}
	}

	/// The fixed payload returned when no route matches.
	pub fn not_found() -> Self {
		Self::new("404", "Not Found", "The specified page does not exist")
	}

	/// Payload for a failed handler or guard, carrying the failure detail.
	pub fn internal(detail: impl Into<String>) -> Self {
		Self::new("500", "Internal Server Error", detail)
	}
}

/// Outbound response.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Creates an empty response with the given status.
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Creates an empty `200 OK` response.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Creates a `404 Not Found` response with the fixed JSON payload.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::not_found();
	/// assert_eq!(response.status, StatusCode::NOT_FOUND);
	/// assert_eq!(
	///     response.text(),
	///     r#"{"code":"404","title":"Not Found","message":"The specified page does not exist"}"#
	/// );
	/// ```
	pub fn not_found() -> Self {
		Self::error(StatusCode::NOT_FOUND, &ErrorPayload::not_found())
	}

	/// Creates a `500 Internal Server Error` response carrying `detail`.
	pub fn internal_server_error(detail: impl Into<String>) -> Self {
		Self::error(
			StatusCode::INTERNAL_SERVER_ERROR,
			&ErrorPayload::internal(detail),
		)
	}

	/// Creates a `302 Found` response pointing at `location`.
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	pub(crate) fn error(status: StatusCode, payload: &ErrorPayload) -> Self {
		match Self::new(status).with_json(payload) {
			Ok(response) => response,
			Err(e) => {
				tracing::error!(error = %e, "Failed to serialize error payload");
				Self::new(status).with_body(payload.message.clone())
			}
		}
	}

	/// Sets the response body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
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

	/// Sets the `Location` header. A target that is not a valid header value
	/// is logged and left unset.
	pub fn with_location(mut self, location: &str) -> Self {
		match HeaderValue::from_str(location) {
			Ok(value) => {
				self.headers.insert(header::LOCATION, value);
			}
			Err(e) => {
				tracing::warn!(location = ?location, error = %e, "Dropped invalid redirect target");
			}
		}
		self
	}

	/// Serializes `data` as the JSON body and sets `Content-Type`.
	///
	/// # Errors
	///
	/// Returns the serializer error if `data` cannot be represented as JSON.
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self, serde_json::Error> {
		let json = serde_json::to_vec(data)?;
		self.body = Bytes::from(json);
		self.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// Returns the `Location` header, if set.
	pub fn location(&self) -> Option<&str> {
		self.headers
			.get(header::LOCATION)
			.and_then(|value| value.to_str().ok())
	}

	/// Returns the body as text, replacing invalid UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

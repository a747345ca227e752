//! Current-user lookup consulted by authentication guards.
//!
//! The dispatcher never inspects sessions or credentials itself. It asks an
//! [`Authenticator`] at most once per request, and only when a candidate
//! route carries an authentication guard.

use crate::request::Request;
use async_trait::async_trait;

/// The user an [`Authenticator`] found for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
	/// Stable identifier, such as a username or account id.
	pub id: String,
}

impl AuthUser {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into() }
	}
}

/// Answers "is there a current user?" for a request.
#[async_trait]
pub trait Authenticator: Send + Sync {
	/// Returns the current user, or `None` for an anonymous request.
	async fn current_user(&self, request: &Request) -> Option<AuthUser>;
}

/// Treats every request as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
	async fn current_user(&self, _request: &Request) -> Option<AuthUser> {
		None
	}
}

/// Trusts a header set by an upstream authentication layer.
///
/// Only use this behind a proxy that strips the header from client requests.
///
/// # Examples
///
/// ```
/// use switchyard::{Authenticator, HeaderAuthenticator, Request};
///
/// # #[tokio::main]
/// # async fn main() {
/// let auth = HeaderAuthenticator::new("X-Remote-User");
/// let request = Request::get("/account").with_header("X-Remote-User", "alice");
///
/// let user = auth.current_user(&request).await.unwrap();
/// assert_eq!(user.id, "alice");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HeaderAuthenticator {
	header_name: String,
}

impl HeaderAuthenticator {
	pub fn new(header_name: impl Into<String>) -> Self {
		Self {
			header_name: header_name.into(),
		}
	}
}

impl Default for HeaderAuthenticator {
	fn default() -> Self {
		Self::new("REMOTE_USER")
	}
}

#[async_trait]
impl Authenticator for HeaderAuthenticator {
	async fn current_user(&self, request: &Request) -> Option<AuthUser> {
		request
			.headers
			.get(self.header_name.as_str())
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(AuthUser::new)
	}
}

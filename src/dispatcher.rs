//! First-match dispatch over a sealed route table.
//!
//! Routes are tried in registration order. The first route whose verb filter
//! accepts the request method, whose pattern matches the normalized path and
//! whose guard passes handles the request. A refused guard with a fallback
//! target ends the scan with a redirect; a refused guard without one lets the
//! scan continue. When nothing matches, the default handler runs.
//!
//! Every failure past this point is answered with a 500 response, including
//! panics and guard lookups that exceed their time budget.

use crate::auth::Authenticator;
use crate::error::{Result, RouterError};
use crate::handler::{Handler, Reply, RouteContext};
use crate::options::GuardOutcome;
use crate::params::PathParams;
use crate::registry::RouteEntry;
use crate::request::Request;
use crate::response::Response;
use crate::settings::RouterSettings;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// A route selected for a request.
#[derive(Debug)]
pub struct RouteMatch<'r> {
	/// Position of the entry in registration order.
	pub index: usize,
	/// The matched entry.
	pub entry: &'r RouteEntry,
	/// Parameters captured from the path.
	pub params: PathParams,
}

/// How a request was settled by the route scan.
#[derive(Debug)]
pub enum Resolution<'r> {
	/// A route accepted the request.
	Matched(RouteMatch<'r>),
	/// A guard refused the request and named a fallback. The location already
	/// includes the base path.
	Redirect(String),
	/// No route accepted the request; the default handler applies.
	Default,
}

/// A sealed, immutable route table ready to serve requests.
///
/// Obtained from [`RouteRegistry::seal`](crate::RouteRegistry::seal) or
/// [`Routes::build`](crate::Routes::build). Settings and the authenticator
/// can be swapped, routes cannot.
pub struct Router {
	entries: Vec<RouteEntry>,
	default: Arc<dyn Handler>,
	settings: RouterSettings,
	base_path: String,
	authenticator: Arc<dyn Authenticator>,
}

impl Router {
	pub(crate) fn new(
		entries: Vec<RouteEntry>,
		default: Arc<dyn Handler>,
		settings: RouterSettings,
		authenticator: Arc<dyn Authenticator>,
	) -> Self {
		let base_path = settings.base_path();
		Self {
			entries,
			default,
			settings,
			base_path,
			authenticator,
		}
	}

	/// Replaces the settings.
	pub fn with_settings(mut self, settings: RouterSettings) -> Self {
		self.base_path = settings.base_path();
		self.settings = settings;
		self
	}

	/// Replaces the authenticator consulted by authentication guards.
	pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
		self.authenticator = Arc::new(authenticator);
		self
	}

	pub fn settings(&self) -> &RouterSettings {
		&self.settings
	}

	/// Routes in registration order.
	pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
		self.entries.iter()
	}

	pub fn route_count(&self) -> usize {
		self.entries.len()
	}

	/// Reduces a request target to the path matched against routes.
	///
	/// Drops the query string and fragment, strips the base path when the
	/// target lies under it, and guarantees a leading `/`.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::{RouteRegistry, RouterSettings};
	///
	/// let router = RouteRegistry::new().seal().with_settings(RouterSettings {
	///     base_path: "/app".to_string(),
	///     ..RouterSettings::default()
	/// });
	///
	/// assert_eq!(router.normalize_path("/app/users/7?tab=1"), "/users/7");
	/// assert_eq!(router.normalize_path("/app"), "/");
	/// assert_eq!(router.normalize_path("/apple"), "/apple");
	/// assert_eq!(router.normalize_path(""), "/");
	/// ```
	pub fn normalize_path(&self, uri: &str) -> String {
		let path = uri.split(['?', '#']).next().unwrap_or_default();

		let path = if self.base_path.is_empty() {
			path
		} else {
			match path.strip_prefix(self.base_path.as_str()) {
				Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
				_ => path,
			}
		};

		if path.is_empty() {
			"/".to_string()
		} else if path.starts_with('/') {
			path.to_string()
		} else {
			format!("/{path}")
		}
	}

	/// Finds the route for `request` without invoking any handler.
	///
	/// The authenticator is consulted at most once, and only if a candidate
	/// route carries an authentication guard.
	///
	/// # Errors
	///
	/// Returns [`RouterError::GuardTimeout`] if the authenticator does not
	/// answer within the configured budget.
	pub async fn resolve(&self, request: &Request) -> Result<Resolution<'_>> {
		let path = self.normalize_path(&request.uri);
		let mut user_present: Option<bool> = None;

		for (index, entry) in self.entries.iter().enumerate() {
			let options = entry.options();

			let Some(params) = entry.pattern().matches(&path) else {
				continue;
			};
			if !options.accepts(&request.method) {
				tracing::trace!(
					template = %entry.pattern().template(),
					method = %request.method,
					"Verb filter rejected route"
				);
				continue;
			}

			if let Some(guard) = options.guard_ref()
				&& guard.needs_user()
				&& user_present.is_none()
			{
				user_present = Some(self.lookup_user(request).await?);
			}

			match options.evaluate(|| user_present.unwrap_or(false)) {
				GuardOutcome::Accepted => {
					tracing::debug!(
						index,
						template = %entry.pattern().template(),
						path = %path,
						"Route matched"
					);
					return Ok(Resolution::Matched(RouteMatch {
						index,
						entry,
						params,
					}));
				}
				GuardOutcome::Rejected(Some(target)) => {
					let location = self.redirect_location(&target);
					tracing::info!(
						template = %entry.pattern().template(),
						location = %location,
						"Guard refused route, redirecting"
					);
					return Ok(Resolution::Redirect(location));
				}
				GuardOutcome::Rejected(None) => {
					tracing::trace!(
						template = %entry.pattern().template(),
						"Guard refused route, continuing scan"
					);
				}
			}
		}

		tracing::debug!(path = %path, "No route matched, using default handler");
		Ok(Resolution::Default)
	}

	/// Serves `request`, always producing a response.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::{HandlerResult, Reply, Request, RouteContext, Routes, handler_fn};
	/// use http::StatusCode;
	///
	/// async fn home(_ctx: RouteContext) -> HandlerResult {
	///     Ok(Reply::text("welcome"))
	/// }
	///
	/// # #[tokio::main]
	/// # async fn main() {
	/// let mut routes = Routes::new();
	/// routes.home(handler_fn(home));
	/// let router = routes.build().unwrap();
	///
	/// let response = router.dispatch(Request::get("/")).await;
	/// assert_eq!(response.text(), "welcome");
	///
	/// let response = router.dispatch(Request::get("/missing")).await;
	/// assert_eq!(response.status, StatusCode::NOT_FOUND);
	/// # }
	/// ```
	pub async fn dispatch(&self, request: Request) -> Response {
		let span = tracing::info_span!(
			"dispatch",
			method = %request.method,
			path = %request.path()
		);

		async move {
			match AssertUnwindSafe(self.serve(request)).catch_unwind().await {
				Ok(response) => response,
				Err(panic) => {
					let message = panic_message(panic.as_ref());
					tracing::error!(panic = %message, "Request handling panicked");
					Response::internal_server_error(format!("Handler panicked: {message}"))
				}
			}
		}
		.instrument(span)
		.await
	}

	async fn serve(&self, request: Request) -> Response {
		let (handler, params) = match self.resolve(&request).await {
			Ok(Resolution::Matched(matched)) => (Arc::clone(matched.entry.handler()), matched.params),
			Ok(Resolution::Redirect(location)) => return Response::temporary_redirect(location),
			Ok(Resolution::Default) => (Arc::clone(&self.default), PathParams::new()),
			Err(e) => return self.failure(&anyhow::Error::from(e)),
		};

		match handler.handle(RouteContext::new(request, params)).await {
			Ok(Reply::Redirect(target)) => Response::temporary_redirect(self.redirect_location(&target)),
			Ok(reply) => reply.into_response(),
			Err(e) => {
				tracing::warn!(error = %e, "Handler returned an error");
				self.failure(&e)
			}
		}
	}

	async fn lookup_user(&self, request: &Request) -> Result<bool> {
		let budget = self.settings.guard_timeout();
		match tokio::time::timeout(budget, self.authenticator.current_user(request)).await {
			Ok(user) => Ok(user.is_some()),
			Err(_) => {
				tracing::error!(
					timeout_ms = self.settings.guard_timeout_ms,
					"Authenticator lookup timed out"
				);
				Err(RouterError::GuardTimeout(self.settings.guard_timeout_ms))
			}
		}
	}

	/// Places an application-relative target under the base path. Absolute
	/// URLs and protocol-relative targets are returned untouched.
	fn redirect_location(&self, target: &str) -> String {
		if target.starts_with('/') && !target.starts_with("//") {
			format!("{}{}", self.base_path, target)
		} else {
			target.to_string()
		}
	}

	fn failure(&self, err: &anyhow::Error) -> Response {
		let detail = if self.settings.debug {
			format!("{err:?}")
		} else {
			err.to_string()
		};
		Response::internal_server_error(detail)
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("entries", &self.entries)
			.field("settings", &self.settings)
			.finish()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}

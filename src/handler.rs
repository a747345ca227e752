//! Handler abstractions and the values they produce.
//!
//! A handler receives a [`RouteContext`] holding the request and the path
//! parameters captured by the matched route, and returns a [`Reply`]. Any
//! error it returns, and any panic it raises, is converted to a 500 response
//! by the dispatcher.

use crate::params::PathParams;
use crate::request::Request;
use crate::response::{ErrorPayload, Response};
use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Result type returned by handlers.
pub type HandlerResult = anyhow::Result<Reply>;

/// A renderable page element, sent as HTML.
pub trait Render: Send + Sync {
	/// Produces the markup for this element.
	fn render(&self) -> String;
}

/// What a handler produced.
pub enum Reply {
	/// An element rendered to HTML.
	Element(Box<dyn Render>),
	/// A JSON document.
	Json(serde_json::Value),
	/// Plain text.
	Text(String),
	/// Nothing to send.
	Empty,
	/// A redirect to another path of this application.
	Redirect(String),
	/// An error status with the standard JSON payload.
	Error(StatusCode, ErrorPayload),
}

impl Reply {
	/// Wraps an element.
	pub fn element(element: impl Render + 'static) -> Self {
		Self::Element(Box::new(element))
	}

	/// Serializes `value` as a JSON reply.
	///
	/// # Errors
	///
	/// Returns the serializer error if `value` cannot be represented as JSON.
	pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
		Ok(Self::Json(serde_json::to_value(value)?))
	}

	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn redirect(target: impl Into<String>) -> Self {
		Self::Redirect(target.into())
	}

	/// The fixed 404 reply.
	pub fn not_found() -> Self {
		Self::Error(StatusCode::NOT_FOUND, ErrorPayload::not_found())
	}

	/// Converts the reply into a response.
	///
	/// Redirect targets are used as given. The dispatcher rewrites them under
	/// the configured base path before calling this.
	pub fn into_response(self) -> Response {
		match self {
			Self::Element(element) => Response::ok()
				.with_header("content-type", "text/html; charset=utf-8")
				.with_body(element.render()),
			Self::Json(value) => match Response::ok().with_json(&value) {
				Ok(response) => response,
				Err(e) => Response::internal_server_error(e.to_string()),
			},
			Self::Text(text) => Response::ok()
				.with_header("content-type", "text/plain; charset=utf-8")
				.with_body(text),
			Self::Empty => Response::ok(),
			Self::Redirect(target) => Response::temporary_redirect(target),
			Self::Error(status, payload) => Response::error(status, &payload),
		}
	}
}

impl fmt::Debug for Reply {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Element(_) => f.write_str("Element(..)"),
			Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
			Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Self::Empty => f.write_str("Empty"),
			Self::Redirect(target) => f.debug_tuple("Redirect").field(target).finish(),
			Self::Error(status, payload) => f
				.debug_tuple("Error")
				.field(status)
				.field(payload)
				.finish(),
		}
	}
}

impl From<String> for Reply {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&str> for Reply {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<serde_json::Value> for Reply {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}

impl From<()> for Reply {
	fn from(_: ()) -> Self {
		Self::Empty
	}
}

/// Everything a handler gets to see.
#[derive(Debug, Clone)]
pub struct RouteContext {
	/// The request being served.
	pub request: Request,
	/// Parameters captured by the matched route. Empty for the default handler.
	pub params: PathParams,
}

impl RouteContext {
	pub fn new(request: Request, params: PathParams) -> Self {
		Self { request, params }
	}

	/// Shorthand for `self.params.get(name)`.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name)
	}
}

/// An async request handler.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles a matched request.
	///
	/// # Errors
	///
	/// Any error is reported to the client as a 500 response.
	async fn handle(&self, ctx: RouteContext) -> HandlerResult;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, ctx: RouteContext) -> HandlerResult {
		(**self).handle(ctx).await
	}
}

/// Adapts an async closure or `async fn` into a [`Handler`].
pub struct FnHandler<F> {
	handler: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
	F: Fn(RouteContext) -> Fut + Send + Sync,
	Fut: Future<Output = HandlerResult> + Send + 'static,
{
	async fn handle(&self, ctx: RouteContext) -> HandlerResult {
		(self.handler)(ctx).await
	}
}

/// Wraps `handler` so it can be registered as a route handler.
///
/// # Examples
///
/// ```
/// use switchyard::{HandlerResult, Reply, RouteContext, handler_fn};
///
/// async fn show_user(ctx: RouteContext) -> HandlerResult {
///     let id: u64 = ctx.params.parse("id")?;
///     Ok(Reply::text(format!("user {id}")))
/// }
///
/// let handler = handler_fn(show_user);
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(handler: F) -> Arc<dyn Handler>
where
	F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = HandlerResult> + Send + 'static,
{
	Arc::new(FnHandler { handler })
}

/// Default handler used when no route matches and none was configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
	async fn handle(&self, _ctx: RouteContext) -> HandlerResult {
		Ok(Reply::not_found())
	}
}

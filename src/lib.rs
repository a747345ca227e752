//! # Switchyard
//!
//! Route-pattern compiler and first-match dispatcher.
//!
//! Route templates such as `/users/int:id` are compiled into anchored
//! matchers with typed capture groups and kept in registration order. Each
//! request is checked against them in that order and the first acceptable
//! route wins. When none accepts, a default handler answers (a JSON 404
//! unless the application declares its own).
//!
//! ## Architecture
//!
//! ```text
//! Routes (builder) ──▶ RouteRegistry ──seal──▶ Router
//!                           │                    │
//!                    CompiledPattern     resolve ─▶ Handler ─▶ Reply ─▶ Response
//!                                           │
//!                                     Authenticator (guards)
//! ```
//!
//! ## Template syntax
//!
//! Templates are split on `/`. Each segment is one of:
//!
//! - a literal, matched exactly: `users`
//! - a typed capture `type:name`, where type is `int`/`integer`,
//!   `alpha`, `alnum`/`alphanum`/`alphanumeric`, or anything else for
//!   "any non-slash text": `int:id`
//! - a bare capture `:name`, equivalent to the "any" type
//! - a raw fragment `regex:<expr>`, inserted unescaped
//!
//! ## Example
//!
//! ```rust
//! use switchyard::{
//!     AuthUser, Authenticator, HandlerResult, Reply, Request, RouteContext, RouteOptions,
//!     Routes, handler_fn,
//! };
//! use async_trait::async_trait;
//! use http::StatusCode;
//!
//! struct NobodyHome;
//!
//! #[async_trait]
//! impl Authenticator for NobodyHome {
//!     async fn current_user(&self, _request: &Request) -> Option<AuthUser> {
//!         None
//!     }
//! }
//!
//! async fn show_post(ctx: RouteContext) -> HandlerResult {
//!     let id: u64 = ctx.params.parse("id")?;
//!     Ok(Reply::text(format!("post #{id}")))
//! }
//!
//! async fn settings(_ctx: RouteContext) -> HandlerResult {
//!     Ok(Reply::text("settings"))
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut routes = Routes::new();
//! routes.get("/posts/int:id", handler_fn(show_post));
//! routes.get_with(
//!     "/settings",
//!     handler_fn(settings),
//!     RouteOptions::new().requires_authenticated().redirect_to("/login"),
//! );
//! let router = routes.build().unwrap().with_authenticator(NobodyHome);
//!
//! let response = router.dispatch(Request::get("/posts/7")).await;
//! assert_eq!(response.text(), "post #7");
//!
//! let response = router.dispatch(Request::get("/settings")).await;
//! assert_eq!(response.status, StatusCode::FOUND);
//! assert_eq!(response.location(), Some("/login"));
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and a `dispatch` span per request. It
//! never installs a subscriber.

pub mod auth;
pub mod builder;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod options;
pub mod params;
pub mod pattern;
pub mod registry;
pub mod request;
pub mod response;
pub mod settings;

pub use auth::{AnonymousAuthenticator, AuthUser, Authenticator, HeaderAuthenticator};
pub use builder::{Action, Routes};
pub use controller::{ActionRef, ControllerTable, CrudAction, CrudController};
pub use dispatcher::{Resolution, RouteMatch, Router};
pub use error::{Result, RouterError};
pub use handler::{
	FnHandler, Handler, HandlerResult, NotFoundHandler, Render, Reply, RouteContext, handler_fn,
};
pub use options::{Guard, GuardOutcome, RouteOptions};
pub use params::{ParamError, PathParams};
pub use pattern::{CompiledPattern, ParameterType};
pub use registry::{RouteEntry, RouteRegistry};
pub use request::Request;
pub use response::{ErrorPayload, Response};
pub use settings::RouterSettings;

//! Declarative route builder.
//!
//! [`Routes`] is the surface application start-up uses to declare its routes,
//! with verb shorthands and nested prefix groups plus the CRUD convention.
//! Errors are collected while declaring and reported once by
//! [`Routes::build`], so a block of declarations needs no `?` on every line.

use crate::controller::{ActionRef, ControllerTable, CrudAction};
use crate::dispatcher::Router;
use crate::error::{Result, RouterError};
use crate::handler::Handler;
use crate::options::RouteOptions;
use crate::pattern::CompiledPattern;
use crate::registry::{RouteEntry, RouteRegistry};
use http::{HeaderValue, Method};
use std::fmt;
use std::sync::Arc;

/// What a route invokes: a handler, or a "Controller@Action" reference.
#[derive(Clone)]
pub enum Action {
	Handler(Arc<dyn Handler>),
	Named(String),
}

impl From<Arc<dyn Handler>> for Action {
	fn from(handler: Arc<dyn Handler>) -> Self {
		Self::Handler(handler)
	}
}

impl From<&str> for Action {
	fn from(reference: &str) -> Self {
		Self::Named(reference.to_string())
	}
}

impl From<String> for Action {
	fn from(reference: String) -> Self {
		Self::Named(reference)
	}
}

impl From<ActionRef> for Action {
	fn from(reference: ActionRef) -> Self {
		Self::Named(reference.to_string())
	}
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Handler(_) => f.write_str("Handler(..)"),
			Self::Named(reference) => f.debug_tuple("Named").field(reference).finish(),
		}
	}
}

struct Scope {
	prefix: String,
	options: RouteOptions,
}

/// Route declarations collected at start-up.
///
/// # Examples
///
/// ```
/// use switchyard::{HandlerResult, Reply, Request, RouteContext, RouteOptions, Routes, handler_fn};
/// use http::StatusCode;
///
/// async fn profile(ctx: RouteContext) -> HandlerResult {
///     Ok(Reply::text(format!("profile {}", ctx.param("name").unwrap_or_default())))
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut routes = Routes::new();
/// routes.group("/members", RouteOptions::new(), |r| {
///     r.get("/alpha:name", handler_fn(profile));
/// });
/// let router = routes.build().unwrap();
///
/// let response = router.dispatch(Request::get("/members/alice")).await;
/// assert_eq!(response.text(), "profile alice");
///
/// let response = router.dispatch(Request::post("/members/alice")).await;
/// assert_eq!(response.status, StatusCode::NOT_FOUND);
/// # }
/// ```
pub struct Routes {
	registry: RouteRegistry,
	controllers: ControllerTable,
	scopes: Vec<Scope>,
	errors: Vec<RouterError>,
}

impl Default for Routes {
	fn default() -> Self {
		Self::new()
	}
}

impl Routes {
	/// Starts an empty declaration with no controllers.
	pub fn new() -> Self {
		Self::with_controllers(ControllerTable::new())
	}

	/// Starts an empty declaration resolving action references against
	/// `controllers`.
	pub fn with_controllers(controllers: ControllerTable) -> Self {
		Self {
			registry: RouteRegistry::new(),
			controllers,
			scopes: Vec::new(),
			errors: Vec::new(),
		}
	}

	/// Gives access to the controller table for late registrations. Only
	/// routes declared afterwards see the additions.
	pub fn controllers_mut(&mut self) -> &mut ControllerTable {
		&mut self.controllers
	}

	/// Declares the routes in `body` under `prefix` with `options` as their
	/// defaults.
	///
	/// Groups nest: prefixes concatenate from the outermost group inwards and
	/// options set by an inner group or route override the outer ones.
	pub fn group<F>(&mut self, prefix: &str, options: RouteOptions, body: F) -> &mut Self
	where
		F: FnOnce(&mut Self),
	{
		self.scopes.push(Scope {
			prefix: prefix.to_string(),
			options,
		});
		body(self);
		self.scopes.pop();
		self
	}

	/// Declares a route with explicit options.
	pub fn add(
		&mut self,
		template: &str,
		action: impl Into<Action>,
		options: RouteOptions,
	) -> &mut Self {
		self.register(template, action.into(), options);
		self
	}

	/// Declares a route matching any verb.
	pub fn any(&mut self, template: &str, action: impl Into<Action>) -> &mut Self {
		self.add(template, action, RouteOptions::new())
	}

	pub fn any_with(
		&mut self,
		template: &str,
		action: impl Into<Action>,
		options: RouteOptions,
	) -> &mut Self {
		self.add(template, action, options)
	}

	/// Declares a `GET` route.
	pub fn get(&mut self, template: &str, action: impl Into<Action>) -> &mut Self {
		self.get_with(template, action, RouteOptions::new())
	}

	pub fn get_with(
		&mut self,
		template: &str,
		action: impl Into<Action>,
		options: RouteOptions,
	) -> &mut Self {
		self.add(template, action, options.method(Method::GET))
	}

	/// Declares a `POST` route.
	pub fn post(&mut self, template: &str, action: impl Into<Action>) -> &mut Self {
		self.post_with(template, action, RouteOptions::new())
	}

	pub fn post_with(
		&mut self,
		template: &str,
		action: impl Into<Action>,
		options: RouteOptions,
	) -> &mut Self {
		self.add(template, action, options.method(Method::POST))
	}

	/// Declares the five CRUD routes under `base`, delegating to
	/// `{name}Controller`:
	///
	/// | route | action |
	/// |---|---|
	/// | `GET base` | `Index` |
	/// | `GET base/add` | `Create` |
	/// | `GET base/view/int:id` | `Read` |
	/// | `GET base/edit/int:id` | `Update` |
	/// | `GET base/delete/int:id` | `Destroy` |
	pub fn crud(&mut self, base: &str, name: &str) -> &mut Self {
		self.crud_with(base, name, RouteOptions::new())
	}

	pub fn crud_with(&mut self, base: &str, name: &str, options: RouteOptions) -> &mut Self {
		let controller = format!("{name}Controller");
		let routes = [
			(String::new(), CrudAction::Index),
			("/add".to_string(), CrudAction::Create),
			("/view/int:id".to_string(), CrudAction::Read),
			("/edit/int:id".to_string(), CrudAction::Update),
			("/delete/int:id".to_string(), CrudAction::Destroy),
		];

		for (suffix, action) in routes {
			let template = format!("{base}{suffix}");
			self.get_with(
				&template,
				ActionRef::new(controller.as_str(), action.name()),
				options.clone(),
			);
		}
		self
	}

	/// Declares the root route `/`, relative to the current group.
	pub fn home(&mut self, action: impl Into<Action>) -> &mut Self {
		self.any("/", action)
	}

	/// Sets the handler used when no route matches. The last call wins.
	pub fn fallback(&mut self, action: impl Into<Action>) -> &mut Self {
		match self.resolve_action(action.into()) {
			Ok((handler, _)) => self.registry.set_default(handler),
			Err(e) => self.record(e),
		}
		self
	}

	/// Returns the number of routes declared so far.
	pub fn len(&self) -> usize {
		self.registry.len()
	}

	pub fn is_empty(&self) -> bool {
		self.registry.is_empty()
	}

	/// Returns every error recorded so far, in declaration order.
	pub fn errors(&self) -> &[RouterError] {
		&self.errors
	}

	/// Seals the declarations into a [`Router`].
	///
	/// # Errors
	///
	/// Returns the first error recorded while declaring routes.
	pub fn build(self) -> Result<Router> {
		Ok(self.into_registry()?.seal())
	}

	/// Returns the open registry, for callers that add routes by hand.
	///
	/// # Errors
	///
	/// Returns the first error recorded while declaring routes.
	pub fn into_registry(self) -> Result<RouteRegistry> {
		match self.errors.into_iter().next() {
			Some(err) => Err(err),
			None => Ok(self.registry),
		}
	}

	fn register(&mut self, template: &str, action: Action, options: RouteOptions) {
		let prefix = self.current_prefix();
		let options = self.current_options().merge(&options);

		if let Some(target) = options.fallback()
			&& HeaderValue::from_str(target).is_err()
		{
			return self.record(RouterError::InvalidRedirect(target.to_string()));
		}

		let (handler, action_name) = match self.resolve_action(action) {
			Ok(resolved) => resolved,
			Err(e) => return self.record(e),
		};

		match CompiledPattern::compile(template, &prefix) {
			Ok(pattern) => {
				let mut entry = RouteEntry::new(pattern, handler, options);
				if let Some(name) = action_name {
					entry = entry.with_action(name);
				}
				self.registry.push(entry);
			}
			Err(e) => self.record(e),
		}
	}

	fn resolve_action(&self, action: Action) -> Result<(Arc<dyn Handler>, Option<String>)> {
		match action {
			Action::Handler(handler) => Ok((handler, None)),
			Action::Named(reference) => {
				let parsed = ActionRef::parse(&reference)?;
				let handler = self.controllers.resolve(&parsed)?;
				Ok((handler, Some(parsed.to_string())))
			}
		}
	}

	fn current_prefix(&self) -> String {
		self.scopes.iter().map(|scope| scope.prefix.as_str()).collect()
	}

	fn current_options(&self) -> RouteOptions {
		self.scopes
			.iter()
			.fold(RouteOptions::new(), |acc, scope| acc.merge(&scope.options))
	}

	fn record(&mut self, err: RouterError) {
		tracing::warn!(error = %err, "Rejected route declaration");
		self.errors.push(err);
	}
}

impl fmt::Debug for Routes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Routes")
			.field("registry", &self.registry)
			.field("controllers", &self.controllers)
			.field("depth", &self.scopes.len())
			.field("errors", &self.errors)
			.finish()
	}
}

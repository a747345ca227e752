//! Ordered route table, open for registration until sealed.

use crate::auth::AnonymousAuthenticator;
use crate::dispatcher::Router;
use crate::error::Result;
use crate::handler::{Handler, NotFoundHandler};
use crate::options::RouteOptions;
use crate::pattern::CompiledPattern;
use crate::settings::RouterSettings;
use std::fmt;
use std::sync::Arc;

/// A registered route: matcher, handler and options.
#[derive(Clone)]
pub struct RouteEntry {
	pattern: CompiledPattern,
	handler: Arc<dyn Handler>,
	options: RouteOptions,
	action: Option<String>,
}

impl RouteEntry {
	pub fn new(pattern: CompiledPattern, handler: Arc<dyn Handler>, options: RouteOptions) -> Self {
		Self {
			pattern,
			handler,
			options,
			action: None,
		}
	}

	/// Records the "Controller@Action" reference this entry was built from.
	pub fn with_action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn pattern(&self) -> &CompiledPattern {
		&self.pattern
	}

	pub fn handler(&self) -> &Arc<dyn Handler> {
		&self.handler
	}

	pub fn options(&self) -> &RouteOptions {
		&self.options
	}

	/// The action reference, if the handler came from a controller.
	pub fn action(&self) -> Option<&str> {
		self.action.as_deref()
	}
}

impl fmt::Debug for RouteEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteEntry")
			.field("template", &self.pattern.template())
			.field("options", &self.options)
			.field("action", &self.action)
			.finish()
	}
}

/// Routes in registration order plus the default handler.
///
/// Registration is only possible before [`seal`](Self::seal); the resulting
/// [`Router`] has no way to add routes.
///
/// # Examples
///
/// ```
/// use switchyard::{HandlerResult, Reply, RouteContext, RouteOptions, RouteRegistry, handler_fn};
///
/// async fn about(_ctx: RouteContext) -> HandlerResult {
///     Ok(Reply::text("about"))
/// }
///
/// let mut registry = RouteRegistry::new();
/// registry.add("/about", handler_fn(about), RouteOptions::new()).unwrap();
/// let router = registry.seal();
/// assert_eq!(router.routes().count(), 1);
/// ```
#[derive(Default)]
pub struct RouteRegistry {
	entries: Vec<RouteEntry>,
	default: Option<Arc<dyn Handler>>,
}

impl RouteRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Compiles `template` and appends a route.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MalformedTemplate`](crate::RouterError::MalformedTemplate)
	/// if the template does not compile.
	pub fn add(
		&mut self,
		template: &str,
		handler: Arc<dyn Handler>,
		options: RouteOptions,
	) -> Result<()> {
		let pattern = CompiledPattern::compile(template, "")?;
		self.push(RouteEntry::new(pattern, handler, options));
		Ok(())
	}

	/// Appends an already built entry.
	pub fn push(&mut self, entry: RouteEntry) {
		tracing::debug!(
			template = %entry.pattern.template(),
			regex = %entry.pattern.as_regex(),
			method = ?entry.options.verb(),
			guard = ?entry.options.guard_ref(),
			"Registered route"
		);
		self.entries.push(entry);
	}

	/// Sets the handler used when no route matches. The last call wins.
	pub fn set_default(&mut self, handler: Arc<dyn Handler>) {
		if self.default.is_some() {
			tracing::debug!("Replacing default handler");
		}
		self.default = Some(handler);
	}

	pub fn entries(&self) -> &[RouteEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn has_default(&self) -> bool {
		self.default.is_some()
	}

	/// Freezes the table into a [`Router`] with default settings and an
	/// anonymous authenticator.
	pub fn seal(self) -> Router {
		let default = self
			.default
			.unwrap_or_else(|| Arc::new(NotFoundHandler) as Arc<dyn Handler>);
		tracing::debug!(routes = self.entries.len(), "Sealed route registry");
		Router::new(
			self.entries,
			default,
			RouterSettings::default(),
			Arc::new(AnonymousAuthenticator),
		)
	}
}

impl fmt::Debug for RouteRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteRegistry")
			.field("entries", &self.entries)
			.field("has_default", &self.default.is_some())
			.finish()
	}
}

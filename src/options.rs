//! Per-route options: verb filter and pre-dispatch guard.

use http::Method;
use std::fmt;
use std::sync::Arc;

/// Zero-argument predicate used by [`Guard::Custom`].
pub type GuardPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// A pre-dispatch check gating whether a matched route may be used.
#[derive(Clone)]
pub enum Guard {
	/// Passes iff the authenticator reports a current user.
	RequiresAuthenticated,
	/// Passes iff the authenticator reports no current user.
	RequiresAnonymous,
	/// Passes iff the predicate returns true.
	Custom(GuardPredicate),
}

impl Guard {
	/// Wraps a closure as a custom guard.
	pub fn custom<F>(predicate: F) -> Self
	where
		F: Fn() -> bool + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(predicate))
	}

	/// Returns true if evaluating this guard needs the authenticator.
	pub fn needs_user(&self) -> bool {
		matches!(self, Self::RequiresAuthenticated | Self::RequiresAnonymous)
	}

	/// Evaluates the guard given whether a user is present.
	///
	/// `user_present` is only called for the authentication kinds.
	pub fn check(&self, user_present: impl FnOnce() -> bool) -> bool {
		match self {
			Self::RequiresAuthenticated => user_present(),
			Self::RequiresAnonymous => !user_present(),
			Self::Custom(predicate) => predicate(),
		}
	}

	/// Short name used in logs and route listings.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::RequiresAuthenticated => "requires-authenticated",
			Self::RequiresAnonymous => "requires-anonymous",
			Self::Custom(_) => "custom-predicate",
		}
	}
}

impl fmt::Debug for Guard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.kind())
	}
}

/// Result of evaluating a route's guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// The route may be used.
	Accepted,
	/// The route was refused. With a fallback target the refusal settles the
	/// request as a redirect; without one the route is skipped.
	Rejected(Option<String>),
}

/// Options attached to a route registration.
///
/// # Examples
///
/// ```
/// use switchyard::RouteOptions;
/// use http::Method;
///
/// let options = RouteOptions::new()
///     .method(Method::POST)
///     .requires_authenticated()
///     .redirect_to("/login");
///
/// assert_eq!(options.verb(), Some(&Method::POST));
/// assert_eq!(options.fallback(), Some("/login"));
/// ```
#[derive(Clone, Default)]
pub struct RouteOptions {
	method: Option<Method>,
	guard: Option<Guard>,
	fallback: Option<String>,
}

impl RouteOptions {
	/// Options that match any verb with no guard.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts the route to one verb. Comparison is exact.
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Sets an arbitrary guard.
	pub fn guard(mut self, guard: Guard) -> Self {
		self.guard = Some(guard);
		self
	}

	/// Requires a current user.
	pub fn requires_authenticated(self) -> Self {
		self.guard(Guard::RequiresAuthenticated)
	}

	/// Requires that there is no current user.
	pub fn requires_anonymous(self) -> Self {
		self.guard(Guard::RequiresAnonymous)
	}

	/// Requires `predicate` to return true.
	pub fn when<F>(self, predicate: F) -> Self
	where
		F: Fn() -> bool + Send + Sync + 'static,
	{
		self.guard(Guard::custom(predicate))
	}

	/// Sets the path to redirect to when the guard refuses the route.
	pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
		self.fallback = Some(target.into());
		self
	}

	/// Returns the verb filter, if any.
	pub fn verb(&self) -> Option<&Method> {
		self.method.as_ref()
	}

	/// Returns the guard, if any.
	pub fn guard_ref(&self) -> Option<&Guard> {
		self.guard.as_ref()
	}

	/// Returns the redirect target used on guard failure.
	pub fn fallback(&self) -> Option<&str> {
		self.fallback.as_deref()
	}

	/// Returns true if this route accepts `method`.
	pub fn accepts(&self, method: &Method) -> bool {
		self.method.as_ref().is_none_or(|expected| expected == method)
	}

	/// Layers `inner` over `self`: every field `inner` sets wins.
	pub fn merge(&self, inner: &RouteOptions) -> RouteOptions {
		RouteOptions {
			method: inner.method.clone().or_else(|| self.method.clone()),
			guard: inner.guard.clone().or_else(|| self.guard.clone()),
			fallback: inner.fallback.clone().or_else(|| self.fallback.clone()),
		}
	}

	/// Evaluates the guard, mapping refusal to the configured fallback.
	pub fn evaluate(&self, user_present: impl FnOnce() -> bool) -> GuardOutcome {
		match &self.guard {
			None => GuardOutcome::Accepted,
			Some(guard) if guard.check(user_present) => GuardOutcome::Accepted,
			Some(_) => GuardOutcome::Rejected(self.fallback.clone()),
		}
	}
}

impl fmt::Debug for RouteOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteOptions")
			.field("method", &self.method)
			.field("guard", &self.guard)
			.field("fallback", &self.fallback)
			.finish()
	}
}

//! Controllers addressed by "Controller@Action" strings.
//!
//! Action references are resolved against a [`ControllerTable`] when a route is
//! registered, so a misspelt controller or action fails start-up instead of a
//! request.

use crate::error::{Result, RouterError};
use crate::handler::{Handler, HandlerResult, RouteContext};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Action used when a reference omits one (`"PostController@"`).
pub const DEFAULT_ACTION: &str = "Index";

const ACTION_SEPARATOR: char = '@';

/// A parsed "Controller@Action" reference.
///
/// # Examples
///
/// ```
/// use switchyard::ActionRef;
///
/// let action = ActionRef::parse("PostController@Read").unwrap();
/// assert_eq!(action.controller(), "PostController");
/// assert_eq!(action.action(), "Read");
///
/// let index = ActionRef::parse("PostController@").unwrap();
/// assert_eq!(index.action(), "Index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
	controller: String,
	action: String,
}

impl ActionRef {
	/// Parses `reference`. A missing or empty action defaults to `Index`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidAction`] if the controller part is empty
	/// or the action part contains a further separator.
	pub fn parse(reference: &str) -> Result<Self> {
		let (controller, action) = match reference.split_once(ACTION_SEPARATOR) {
			Some((controller, action)) => (controller.trim(), action.trim()),
			None => (reference.trim(), ""),
		};

		if controller.is_empty() || action.contains(ACTION_SEPARATOR) {
			return Err(RouterError::InvalidAction(reference.to_string()));
		}

		let action = if action.is_empty() {
			DEFAULT_ACTION
		} else {
			action
		};

		Ok(Self {
			controller: controller.to_string(),
			action: action.to_string(),
		})
	}

	pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
		Self {
			controller: controller.into(),
			action: action.into(),
		}
	}

	pub fn controller(&self) -> &str {
		&self.controller
	}

	pub fn action(&self) -> &str {
		&self.action
	}
}

impl fmt::Display for ActionRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.controller, self.action)
	}
}

/// The five actions every CRUD controller provides.
#[async_trait]
pub trait CrudController: Send + Sync + 'static {
	/// Lists records.
	async fn index(&self, ctx: RouteContext) -> HandlerResult;
	/// Shows the creation form or creates a record.
	async fn create(&self, ctx: RouteContext) -> HandlerResult;
	/// Shows one record, identified by the `id` parameter.
	async fn read(&self, ctx: RouteContext) -> HandlerResult;
	/// Edits one record, identified by the `id` parameter.
	async fn update(&self, ctx: RouteContext) -> HandlerResult;
	/// Deletes one record, identified by the `id` parameter.
	async fn destroy(&self, ctx: RouteContext) -> HandlerResult;
}

/// One of the five CRUD actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudAction {
	Index,
	Create,
	Read,
	Update,
	Destroy,
}

impl CrudAction {
	pub const ALL: [CrudAction; 5] = [
		Self::Index,
		Self::Create,
		Self::Read,
		Self::Update,
		Self::Destroy,
	];

	/// Action name as used in "Controller@Action" references.
	pub fn name(self) -> &'static str {
		match self {
			Self::Index => "Index",
			Self::Create => "Create",
			Self::Read => "Read",
			Self::Update => "Update",
			Self::Destroy => "Destroy",
		}
	}
}

struct CrudHandler<C> {
	controller: Arc<C>,
	action: CrudAction,
}

#[async_trait]
impl<C: CrudController> Handler for CrudHandler<C> {
	async fn handle(&self, ctx: RouteContext) -> HandlerResult {
		match self.action {
			CrudAction::Index => self.controller.index(ctx).await,
			CrudAction::Create => self.controller.create(ctx).await,
			CrudAction::Read => self.controller.read(ctx).await,
			CrudAction::Update => self.controller.update(ctx).await,
			CrudAction::Destroy => self.controller.destroy(ctx).await,
		}
	}
}

/// Maps controller and action names to handlers.
///
/// Names are matched case-insensitively.
///
/// # Examples
///
/// ```
/// use switchyard::{ActionRef, ControllerTable, HandlerResult, Reply, RouteContext, handler_fn};
///
/// async fn publish(_ctx: RouteContext) -> HandlerResult {
///     Ok(Reply::text("published"))
/// }
///
/// let mut table = ControllerTable::new();
/// table.action("PostController", "Publish", handler_fn(publish));
///
/// assert!(table.resolve(&ActionRef::parse("PostController@Publish").unwrap()).is_ok());
/// assert!(table.resolve(&ActionRef::parse("PostController@Archive").unwrap()).is_err());
/// ```
#[derive(Default, Clone)]
pub struct ControllerTable {
	controllers: HashMap<String, HashMap<String, Arc<dyn Handler>>>,
}

impl ControllerTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a single action. A later registration replaces an earlier one.
	pub fn action(
		&mut self,
		controller: &str,
		action: &str,
		handler: Arc<dyn Handler>,
	) -> &mut Self {
		self.controllers
			.entry(controller.to_ascii_lowercase())
			.or_default()
			.insert(action.to_ascii_lowercase(), handler);
		self
	}

	/// Registers all five CRUD actions of `controller` under `name`.
	pub fn crud<C: CrudController>(&mut self, name: &str, controller: C) -> &mut Self {
		let controller = Arc::new(controller);
		for action in CrudAction::ALL {
			let handler: Arc<dyn Handler> = Arc::new(CrudHandler {
				controller: Arc::clone(&controller),
				action,
			});
			self.action(name, action.name(), handler);
		}
		self
	}

	/// Returns true if any action is registered for `controller`.
	pub fn contains_controller(&self, controller: &str) -> bool {
		self.controllers
			.contains_key(&controller.to_ascii_lowercase())
	}

	/// Looks up the handler for `reference`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::UnknownController`] or
	/// [`RouterError::UnknownAction`] if nothing is registered under the names.
	pub fn resolve(&self, reference: &ActionRef) -> Result<Arc<dyn Handler>> {
		let actions = self
			.controllers
			.get(&reference.controller().to_ascii_lowercase())
			.ok_or_else(|| RouterError::UnknownController(reference.controller().to_string()))?;

		actions
			.get(&reference.action().to_ascii_lowercase())
			.cloned()
			.ok_or_else(|| RouterError::UnknownAction {
				controller: reference.controller().to_string(),
				action: reference.action().to_string(),
			})
	}
}

impl fmt::Debug for ControllerTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<_> = self.controllers.keys().collect();
		names.sort();
		f.debug_struct("ControllerTable")
			.field("controllers", &names)
			.finish()
	}
}

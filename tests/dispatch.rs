//! End-to-end dispatch behavior through the public API.

use async_trait::async_trait;
use http::{Method, StatusCode};
use rstest::{fixture, rstest};
use switchyard::{
	AuthUser, Authenticator, ErrorPayload, HandlerResult, HeaderAuthenticator, Reply, Request,
	RouteContext, RouteOptions, Router, RouterSettings, Routes, handler_fn,
};

async fn new_user_form(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("new-user-form"))
}

async fn user_by_name(ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text(format!(
		"user:{}",
		ctx.param("name").unwrap_or_default()
	)))
}

async fn user_by_id(ctx: RouteContext) -> HandlerResult {
	let id: u64 = ctx.params.parse("id")?;
	Ok(Reply::text(format!("id:{id}")))
}

async fn contact_form(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("contact-form"))
}

async fn dashboard(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("dashboard"))
}

async fn public_dashboard(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("public-dashboard"))
}

async fn failing(_ctx: RouteContext) -> HandlerResult {
	Err(anyhow::anyhow!("database unavailable").context("loading report"))
}

async fn panicking(_ctx: RouteContext) -> HandlerResult {
	panic!("report template missing")
}

async fn go_home(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::redirect("/"))
}

async fn custom_not_found(ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text(format!("nothing at {}", ctx.request.path())))
}

struct SignedIn;

#[async_trait]
impl Authenticator for SignedIn {
	async fn current_user(&self, _request: &Request) -> Option<AuthUser> {
		Some(AuthUser::new("alice"))
	}
}

#[fixture]
fn router() -> Router {
	let mut routes = Routes::new();
	routes
		.get("/users/new", handler_fn(new_user_form))
		.get("/users/alpha:name", handler_fn(user_by_name))
		.get("/users/int:id", handler_fn(user_by_id))
		.get("/contact", handler_fn(contact_form))
		.get_with(
			"/dashboard",
			handler_fn(dashboard),
			RouteOptions::new().requires_authenticated().redirect_to("/login"),
		)
		.get("/dashboard", handler_fn(public_dashboard))
		.get("/report", handler_fn(failing))
		.get("/broken", handler_fn(panicking))
		.get("/leave", handler_fn(go_home));
	routes.build().unwrap()
}

#[rstest]
#[case("/users/new", "new-user-form")]
#[case("/users/bob", "user:bob")]
#[case("/users/42", "id:42")]
#[tokio::test]
async fn test_registration_order_decides_overlaps(
	router: Router,
	#[case] path: &str,
	#[case] expected: &str,
) {
	// Act
	let response = router.dispatch(Request::get(path)).await;

	// Assert
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), expected);
}

#[rstest]
#[tokio::test]
async fn test_verb_mismatch_falls_through_to_not_found(router: Router) {
	// Act
	let response = router.dispatch(Request::post("/contact")).await;

	// Assert
	assert_eq!(response.status, StatusCode::NOT_FOUND);
	let payload: ErrorPayload = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(payload.code, "404");
}

#[rstest]
#[tokio::test]
async fn test_unregistered_path_returns_not_found_payload(router: Router) {
	// Act
	let response = router.dispatch(Request::get("/nowhere")).await;

	// Assert
	let payload: ErrorPayload = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(response.status, StatusCode::NOT_FOUND);
	assert_eq!(
		payload,
		ErrorPayload::new("404", "Not Found", "The specified page does not exist")
	);
}

#[rstest]
#[tokio::test]
async fn test_guard_redirect_is_terminal(router: Router) {
	// Act
	let response = router.dispatch(Request::get("/dashboard")).await;

	// Assert
	assert_eq!(response.status, StatusCode::FOUND);
	assert_eq!(response.location(), Some("/login"));
}

#[rstest]
#[tokio::test]
async fn test_guard_passes_for_signed_in_user(router: Router) {
	// Arrange
	let router = router.with_authenticator(SignedIn);

	// Act
	let response = router.dispatch(Request::get("/dashboard")).await;

	// Assert
	assert_eq!(response.text(), "dashboard");
}

#[rstest]
#[tokio::test]
async fn test_header_authenticator_unlocks_guarded_route(router: Router) {
	// Arrange
	let router = router.with_authenticator(HeaderAuthenticator::new("X-Remote-User"));
	let request = Request::get("/dashboard").with_header("X-Remote-User", "carol");

	// Act
	let response = router.dispatch(request).await;

	// Assert
	assert_eq!(response.text(), "dashboard");
}

#[rstest]
#[tokio::test]
async fn test_typed_capture_rejects_wrong_kind(router: Router) {
	// Act
	let response = router.dispatch(Request::get("/users/4a")).await;

	// Assert
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_handler_error_becomes_internal_error(router: Router) {
	// Act
	let response = router.dispatch(Request::get("/report")).await;

	// Assert
	let payload: ErrorPayload = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(payload.code, "500");
	assert_eq!(payload.message, "loading report");
}

#[rstest]
#[tokio::test]
async fn test_debug_mode_exposes_error_chain(router: Router) {
	// Arrange
	let router = router.with_settings(RouterSettings {
		debug: true,
		..RouterSettings::default()
	});

	// Act
	let response = router.dispatch(Request::get("/report")).await;

	// Assert
	let payload: ErrorPayload = serde_json::from_slice(&response.body).unwrap();
	assert!(payload.message.contains("loading report"));
	assert!(payload.message.contains("database unavailable"));
}

#[rstest]
#[tokio::test]
async fn test_handler_panic_becomes_internal_error(router: Router) {
	// Act
	let response = router.dispatch(Request::get("/broken")).await;

	// Assert
	let payload: ErrorPayload = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(payload.message.contains("report template missing"));
}

#[rstest]
#[tokio::test]
async fn test_router_survives_panicking_request(router: Router) {
	// Act
	let _ = router.dispatch(Request::get("/broken")).await;
	let response = router.dispatch(Request::get("/contact")).await;

	// Assert
	assert_eq!(response.text(), "contact-form");
}

#[rstest]
#[tokio::test]
async fn test_base_path_is_stripped_and_applied_to_redirects(router: Router) {
	// Arrange
	let router = router.with_settings(RouterSettings {
		base_path: "/portal".to_string(),
		..RouterSettings::default()
	});

	// Act
	let matched = router.dispatch(Request::get("/portal/users/7?tab=posts")).await;
	let guarded = router.dispatch(Request::get("/portal/dashboard")).await;
	let handler_redirect = router.dispatch(Request::get("/portal/leave")).await;

	// Assert
	assert_eq!(matched.text(), "id:7");
	assert_eq!(guarded.location(), Some("/portal/login"));
	assert_eq!(handler_redirect.location(), Some("/portal/"));
}

#[rstest]
#[tokio::test]
async fn test_custom_fallback_replaces_not_found() {
	// Arrange
	let mut routes = Routes::new();
	routes
		.fallback(handler_fn(custom_not_found))
		.get("/contact", handler_fn(contact_form));
	let router = routes.build().unwrap();

	// Act
	let response = router.dispatch(Request::get("/missing?x=1")).await;

	// Assert
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), "nothing at /missing");
}

#[rstest]
#[tokio::test]
async fn test_root_matches_empty_and_slash() {
	// Arrange
	let mut routes = Routes::new();
	routes.home(handler_fn(contact_form));
	let router = routes.build().unwrap();

	// Act
	let empty = router.dispatch(Request::new(Method::GET, "")).await;
	let slash = router.dispatch(Request::new(Method::DELETE, "/")).await;

	// Assert
	assert_eq!(empty.text(), "contact-form");
	assert_eq!(slash.text(), "contact-form");
}

#[rstest]
fn test_routes_are_listed_in_registration_order(router: Router) {
	// Act
	let listed: Vec<_> = router
		.routes()
		.map(|entry| entry.pattern().template().to_string())
		.collect();

	// Assert
	assert_eq!(router.route_count(), 9);
	assert_eq!(listed[0], "/users/new");
	assert_eq!(listed[8], "/leave");
}

async fn add_user_form(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("add-form"))
}

async fn user_by_raw_id(ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text(format!(
		"id={}",
		ctx.param("id").unwrap_or_default()
	)))
}

async fn archive(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("archive"))
}

async fn reports(_ctx: RouteContext) -> HandlerResult {
	Ok(Reply::text("reports"))
}

#[rstest]
#[case(true, "add-form")]
#[case(false, "id=add")]
#[tokio::test]
async fn test_literal_and_capture_order(#[case] literal_first: bool, #[case] expected: &str) {
	// Arrange
	let mut routes = Routes::new();
	if literal_first {
		routes
			.get("/users/add", handler_fn(add_user_form))
			.get("/users/:id", handler_fn(user_by_raw_id));
	} else {
		routes
			.get("/users/:id", handler_fn(user_by_raw_id))
			.get("/users/add", handler_fn(add_user_form));
	}
	let router = routes.build().unwrap();

	// Act
	let response = router.dispatch(Request::get("/users/add")).await;

	// Assert
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), expected);
}

#[rstest]
#[case("/archive/2024", StatusCode::OK, "archive")]
#[case("/reports/2024", StatusCode::OK, "reports")]
#[case("/archive/2023-junk", StatusCode::NOT_FOUND, "")]
#[tokio::test]
async fn test_fragment_route_does_not_shadow_later_routes(
	#[case] path: &str,
	#[case] status: StatusCode,
	#[case] expected: &str,
) {
	// Arrange
	let mut routes = Routes::new();
	routes
		.get("/archive/regex:2023|2024", handler_fn(archive))
		.get("/reports/2024", handler_fn(reports));
	let router = routes.build().unwrap();

	// Act
	let response = router.dispatch(Request::get(path)).await;

	// Assert
	assert_eq!(response.status, status);
	if status == StatusCode::OK {
		assert_eq!(response.text(), expected);
	}
}

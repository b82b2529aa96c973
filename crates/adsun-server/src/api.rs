// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use adsun_server_auth::{
	JwtTokenService, MenuStore, PermissionService, RoleDefaults, RoleDefaultsError, RoleResolver,
	RoleStore, RoleTemplates, TokenService, UserStore,
};
use adsun_server_config::ServerConfig;
use adsun_server_db::{CategoryRepository, RoleRepository, UserRepository};
use axum::{
	middleware::from_fn_with_state,
	routing::{delete, get, patch, post, put},
	Router,
};
use sqlx::sqlite::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::{
	api_docs, auth_middleware::auth_layer, permission_middleware::RequirePermission, routes,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub permissions: PermissionService,
	pub users: Arc<dyn UserStore>,
	pub menu: Arc<dyn MenuStore>,
	pub tokens: Arc<dyn TokenService>,
	/// Recompute the effective tree per request instead of trusting the token.
	pub resolve_per_request: bool,
}

impl AppState {
	/// Wire the SQLite repositories into the permission service.
	pub fn new(
		pool: SqlitePool,
		templates: Arc<dyn RoleTemplates>,
		tokens: Arc<dyn TokenService>,
		resolve_per_request: bool,
	) -> Self {
		let roles: Arc<dyn RoleStore> = Arc::new(RoleRepository::new(pool.clone()));
		let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
		let menu: Arc<dyn MenuStore> = Arc::new(CategoryRepository::new(pool.clone()));
		let resolver = RoleResolver::new(Arc::clone(&roles), templates);

		Self {
			pool,
			permissions: PermissionService::new(roles, Arc::clone(&users), resolver),
			users,
			menu,
			tokens,
			resolve_per_request,
		}
	}
}

/// Role defaults from the configured file, or the built-in table.
pub fn load_role_defaults(config: &ServerConfig) -> Result<RoleDefaults, RoleDefaultsError> {
	match &config.roles.defaults_path {
		Some(path) => RoleDefaults::load(path),
		None => {
			tracing::info!(version = RoleDefaults::BUILTIN_VERSION, "using built-in role defaults");
			Ok(RoleDefaults::builtin())
		}
	}
}

/// Token service keyed by the configured secret, or an ephemeral key.
pub fn create_token_service(config: &ServerConfig) -> JwtTokenService {
	match &config.auth.token_secret {
		Some(secret) => JwtTokenService::new(secret.clone(), config.auth.token_ttl_secs),
		None => JwtTokenService::ephemeral(config.auth.token_ttl_secs),
	}
}

pub fn create_app_state(
	pool: SqlitePool,
	config: &ServerConfig,
) -> Result<AppState, RoleDefaultsError> {
	let templates = load_role_defaults(config)?;
	let tokens = create_token_service(config);
	Ok(AppState::new(
		pool,
		Arc::new(templates),
		Arc::new(tokens),
		config.auth.resolve_per_request,
	))
}

fn admin_routes() -> Router<AppState> {
	let roles_read = Router::new()
		.route("/roles", get(routes::roles::list_roles))
		.route("/roles/{id}", get(routes::roles::get_role))
		.route("/permissions", get(routes::permissions::list_permissions))
		.route(
			"/permission-templates",
			get(routes::permissions::list_permission_templates),
		)
		.route_layer(RequirePermission::token("admin_roles_read"));

	let roles_write = Router::new()
		.route("/roles", post(routes::roles::create_role))
		.route(
			"/roles/{id}",
			put(routes::roles::update_role).delete(routes::roles::delete_role),
		)
		.route(
			"/roles/{id}/permissions",
			patch(routes::roles::update_role_permissions),
		)
		.route_layer(RequirePermission::token("admin_roles_write"));

	let users_read = Router::new()
		.route("/users", get(routes::users::list_users))
		.route("/users/{id}", get(routes::users::get_user))
		.route(
			"/users/{id}/permissions",
			get(routes::users::get_user_permissions),
		)
		.route_layer(RequirePermission::token("admin_users_read"));

	let users_write = Router::new()
		.route("/users", post(routes::users::create_user))
		.route("/users/{id}", put(routes::users::update_user))
		.route("/users/{id}/status", patch(routes::users::update_user_status))
		.route(
			"/users/{id}/permissions",
			patch(routes::users::update_user_permissions),
		)
		.route_layer(RequirePermission::token("admin_users_write"));

	let users_delete = Router::new()
		.route("/users/{id}", delete(routes::users::delete_user))
		.route_layer(RequirePermission::token("admin_users_delete"));

	Router::new()
		.merge(roles_read)
		.merge(roles_write)
		.merge(users_read)
		.merge(users_write)
		.merge(users_delete)
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	let public = Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/version", get(routes::health::version))
		.route("/api/openapi.json", get(api_docs::openapi_json))
		.route("/api/auth/login", post(routes::auth::login));

	let authed = Router::new()
		.route("/api/auth/me", get(routes::auth::get_current_user))
		.route(
			"/api/menu/authorized-menu",
			get(routes::menu::get_authorized_menu),
		)
		.nest("/api/admin", admin_routes());

	Router::new()
		.merge(public)
		.merge(authed)
		.layer(from_fn_with_state(state.clone(), auth_layer))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

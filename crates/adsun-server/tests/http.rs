// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end HTTP tests against a seeded SQLite file.

use std::sync::Arc;

use adsun_common_config::SecretString;
use adsun_server::{api::AppState, create_router, seed};
use adsun_server_auth::{
	hash_password, JwtTokenService, PermissionTree, RoleDefaults, TokenService, User, UserStore,
};
use adsun_server_db::{create_pool, run_migrations, RoleRepository, UserRepository};
use axum::{
	body::Body,
	http::{header::AUTHORIZATION, Method, Request, StatusCode},
	Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

const SECRET: &str = "adsun-http-test-secret";

struct TestApp {
	router: Router,
	tokens: JwtTokenService,
	pool: SqlitePool,
	users: UserRepository,
	roles: RoleRepository,
	_dir: tempfile::TempDir,
}

impl TestApp {
	async fn new(resolve_per_request: bool) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("http.db").display());
		let pool = create_pool(&url).await.unwrap();
		run_migrations(&pool).await.unwrap();
		seed::seed(&pool, "admin", None).await.unwrap();

		let state = AppState::new(
			pool.clone(),
			Arc::new(RoleDefaults::builtin()),
			Arc::new(JwtTokenService::new(SecretString::new(SECRET.to_string()), 900)),
			resolve_per_request,
		);

		Self {
			router: create_router(state),
			tokens: JwtTokenService::new(SecretString::new(SECRET.to_string()), 900),
			users: UserRepository::new(pool.clone()),
			roles: RoleRepository::new(pool.clone()),
			pool,
			_dir: dir,
		}
	}

	async fn add_user(&self, username: &str, role: &str) -> User {
		let mut user = User::new(username, role);
		if let Some(found) = self.roles.get_role_by_name(role).await.unwrap() {
			user = user.with_role_id(found.id);
		}
		self.users.create_user(&user).await.unwrap();
		user
	}

	async fn add_user_with_password(&self, username: &str, role: &str, password: &str) -> User {
		let mut user = User::new(username, role)
			.with_email(format!("{username}@adsun.sk"))
			.with_password_hash(hash_password(password).unwrap());
		if let Some(found) = self.roles.get_role_by_name(role).await.unwrap() {
			user = user.with_role_id(found.id);
		}
		self.users.create_user(&user).await.unwrap();
		user
	}

	async fn login(&self, body: Value) -> (StatusCode, Value) {
		self.call(Method::POST, "/api/auth/login", None, Some(body)).await
	}

	fn token_for(&self, user: &User, snapshot: &PermissionTree) -> String {
		self.tokens.issue(&self.tokens.claims_for(user, snapshot)).unwrap()
	}

	async fn admin_token(&self) -> String {
		let admin = self.users.find_user_by_username("admin").await.unwrap().unwrap();
		self.token_for(&admin, &PermissionTree::new())
	}

	async fn call(
		&self,
		method: Method,
		uri: &str,
		token: Option<&str>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
		}
		let request = match body {
			Some(body) => builder
				.header("content-type", "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		};

		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, body)
	}
}

fn menu_codes(body: &Value) -> Vec<String> {
	body["menu"]
		.as_array()
		.unwrap()
		.iter()
		.map(|node| node["code"].as_str().unwrap().to_string())
		.collect()
}

#[tokio::test]
async fn health_is_public() {
	let app = TestApp::new(true).await;
	let (status, body) = app.call(Method::GET, "/health", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);
	assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
	let app = TestApp::new(true).await;

	let (status, body) = app.call(Method::GET, "/api/auth/me", None, None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["success"], false);

	let (status, _) = app
		.call(Method::GET, "/api/admin/roles", Some("not.a.token"), None)
		.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_another_key_is_rejected() {
	let app = TestApp::new(true).await;
	let admin = app.users.find_user_by_username("admin").await.unwrap().unwrap();
	let foreign = JwtTokenService::new(SecretString::new("other-key".to_string()), 900);
	let token = foreign
		.issue(&foreign.claims_for(&admin, &PermissionTree::new()))
		.unwrap();

	let (status, _) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_reports_resolved_permissions() {
	let app = TestApp::new(true).await;
	let user = app.add_user("jana", "employee").await;
	let token = app.token_for(&user, &PermissionTree::new());

	let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"]["username"], "jana");
	assert_eq!(body["user"]["isAdmin"], false);
	assert_eq!(body["user"]["permissionSource"], "resolved");
	assert_eq!(body["permissions"]["zakazky"], json!({ "read": true }));
	let tokens = body["tokens"].as_array().unwrap();
	assert!(tokens.contains(&json!("vyroba_sklad_read")));
}

#[tokio::test]
async fn snapshot_mode_trusts_token_claims() {
	let app = TestApp::new(false).await;
	let user = User::new("ghost", "employee");
	let snapshot = PermissionTree::new().with("financie", PermissionTree::with_actions(&["read"]));
	let token = app.token_for(&user, &snapshot);

	let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"]["permissionSource"], "token_snapshot");
	assert_eq!(body["tokens"], json!(["financie_read"]));
}

#[tokio::test]
async fn deleted_user_token_is_unauthenticated() {
	let app = TestApp::new(true).await;
	let ghost = User::new("ghost", "employee");
	let token = app.token_for(&ghost, &PermissionTree::new());

	let (status, _) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn employee_is_forbidden_from_admin_routes() {
	let app = TestApp::new(true).await;
	let user = app.add_user("jana", "employee").await;
	let token = app.token_for(&user, &PermissionTree::new());

	let (status, body) = app
		.call(Method::GET, "/api/admin/roles", Some(&token), None)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["success"], false);
	assert_eq!(body["message"], "Permission denied");
}

#[tokio::test]
async fn admin_lists_roles_with_initialized_trees() {
	let app = TestApp::new(true).await;
	let token = app.admin_token().await;

	let (status, body) = app
		.call(Method::GET, "/api/admin/roles", Some(&token), None)
		.await;
	assert_eq!(status, StatusCode::OK);

	let roles = body["roles"].as_array().unwrap();
	let names: Vec<&str> = roles.iter().map(|r| r["name"].as_str().unwrap()).collect();
	assert_eq!(names, ["accountant", "admin", "employee", "manager"]);

	let accountant = &roles[0];
	assert_eq!(accountant["isSystem"], true);
	assert_eq!(accountant["permissions"]["financie"]["faktury"]["approve"], true);
}

#[tokio::test]
async fn menu_is_filtered_by_effective_tree() {
	let app = TestApp::new(true).await;
	let user = app.add_user("jana", "employee").await;
	let token = app.token_for(&user, &PermissionTree::new());

	let (status, body) = app
		.call(Method::GET, "/api/menu/authorized-menu", Some(&token), None)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(menu_codes(&body), ["dashboard", "zakazky", "vyroba"]);

	let admin = app.admin_token().await;
	let (_, body) = app
		.call(Method::GET, "/api/menu/authorized-menu", Some(&admin), None)
		.await;
	assert_eq!(
		menu_codes(&body),
		["dashboard", "zakazky", "vyroba", "financie", "admin"]
	);
}

#[tokio::test]
async fn user_overrides_take_effect_on_next_request() {
	let app = TestApp::new(true).await;
	let user = app.add_user("jana", "employee").await;
	let user_token = app.token_for(&user, &PermissionTree::new());
	let admin = app.admin_token().await;

	let uri = format!("/api/admin/users/{}/permissions", user.id);
	let (status, body) = app
		.call(
			Method::PATCH,
			&uri,
			Some(&admin),
			Some(json!({ "permissions": { "financie": { "read": true }, "vyroba": { "read": false } } })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["roleName"], "employee");
	let tokens = body["tokens"].as_array().unwrap();
	assert!(tokens.contains(&json!("financie_read")));
	assert!(!tokens.contains(&json!("vyroba_read")));

	let (_, body) = app
		.call(Method::GET, "/api/menu/authorized-menu", Some(&user_token), None)
		.await;
	assert_eq!(menu_codes(&body), ["dashboard", "zakazky", "financie"]);
}

#[tokio::test]
async fn user_permissions_for_unknown_user_is_not_found() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;
	let uri = format!("/api/admin/users/{}/permissions", uuid::Uuid::new_v4());

	let (status, _) = app.call(Method::GET, &uri, Some(&admin), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_lifecycle() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(
			Method::POST,
			"/api/admin/roles",
			Some(&admin),
			Some(json!({ "name": "Účtovník", "description": "Mzdy a faktúry" })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["role"]["isSystem"], false);
	assert_eq!(body["role"]["permissions"]["financie"]["write"], true);
	let id = body["role"]["id"].as_str().unwrap().to_string();

	let (status, _) = app
		.call(
			Method::POST,
			"/api/admin/roles",
			Some(&admin),
			Some(json!({ "name": "Účtovník" })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, body) = app
		.call(
			Method::PATCH,
			&format!("/api/admin/roles/{id}/permissions"),
			Some(&admin),
			Some(json!({ "permissions": ["zakazky"] })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		body["role"]["permissions"],
		json!({ "zakazky": { "read": true, "write": false } })
	);

	let clerk = app.add_user("clerk", "Účtovník").await;
	let (status, _) = app
		.call(Method::DELETE, &format!("/api/admin/roles/{id}"), Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	sqlx::query("DELETE FROM users WHERE id = ?")
		.bind(clerk.id.to_string())
		.execute(&app.pool)
		.await
		.unwrap();

	let (status, body) = app
		.call(Method::DELETE, &format!("/api/admin/roles/{id}"), Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);

	let (status, _) = app
		.call(Method::GET, &format!("/api/admin/roles/{id}"), Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn system_roles_are_protected() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;
	let admin_role = app.roles.get_role_by_name("admin").await.unwrap().unwrap();
	let employee_role = app.roles.get_role_by_name("employee").await.unwrap().unwrap();

	let (status, _) = app
		.call(
			Method::PATCH,
			&format!("/api/admin/roles/{}/permissions", admin_role.id),
			Some(&admin),
			Some(json!({ "permissions": { "dashboard": { "read": true } } })),
		)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = app
		.call(
			Method::DELETE,
			&format!("/api/admin/roles/{}", employee_role.id),
			Some(&admin),
			None,
		)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	// Tree replacement is allowed on every system role except admin.
	let (status, _) = app
		.call(
			Method::PATCH,
			&format!("/api/admin/roles/{}/permissions", employee_role.id),
			Some(&admin),
			Some(json!({ "permissions": { "dashboard": { "read": true } } })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(Method::GET, "/api/admin/roles/not-a-uuid", Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "bad_request");

	let employee_role = app.roles.get_role_by_name("employee").await.unwrap().unwrap();
	let (status, _) = app
		.call(
			Method::PATCH,
			&format!("/api/admin/roles/{}/permissions", employee_role.id),
			Some(&admin),
			Some(json!({ "permissions": "everything" })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permission_catalogue_is_served_to_role_readers() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(Method::GET, "/api/admin/permissions", Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::OK);
	let ids: Vec<&str> = body["permissions"]
		.as_array()
		.unwrap()
		.iter()
		.map(|p| p["id"].as_str().unwrap())
		.collect();
	assert!(ids.contains(&"financie_read"));
}

#[tokio::test]
async fn login_returns_a_token_with_effective_permissions() {
	let app = TestApp::new(false).await;
	let user = app.add_user_with_password("jana", "accountant", "tlaciaren").await;

	let (status, body) = app
		.login(json!({ "username": "jana", "password": "tlaciaren" }))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);
	assert_eq!(body["tokenType"], "Bearer");
	assert_eq!(body["expiresIn"], 900);
	assert_eq!(body["user"]["id"], user.id.to_string());
	assert_eq!(body["user"]["roleName"], "accountant");
	assert_eq!(body["user"]["permissions"]["financie"]["faktury"]["approve"], true);
	assert!(body["user"].get("passwordHash").is_none());

	// Snapshot mode: the claims alone carry the tree.
	let token = body["accessToken"].as_str().unwrap().to_string();
	let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(me["user"]["permissionSource"], "token_snapshot");
	assert!(me["tokens"].as_array().unwrap().contains(&json!("financie_faktury_approve")));

	let (status, body) = app
		.login(json!({ "email": "jana@adsun.sk", "password": "tlaciaren" }))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"]["username"], "jana");
}

#[tokio::test]
async fn login_failures_map_to_status_codes() {
	let app = TestApp::new(true).await;
	app.add_user_with_password("jana", "employee", "tlaciaren").await;
	let disabled = app.add_user_with_password("eva", "employee", "tlaciaren").await;
	app.users.set_user_active(&disabled.id, false).await.unwrap();

	for body in [json!({ "username": "jana" }), json!({ "password": "tlaciaren" }), json!({})] {
		let (status, _) = app.login(body.clone()).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
	}

	for body in [
		json!({ "username": "jana", "password": "wrong" }),
		json!({ "username": "nikto", "password": "tlaciaren" }),
	] {
		let (status, resp) = app.login(body.clone()).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
		assert_eq!(resp["message"], "Invalid credentials");
	}

	let (status, body) = app
		.login(json!({ "username": "eva", "password": "tlaciaren" }))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"], "account_disabled");

	// Seeded admin has no password and cannot log in with one.
	let (status, _) = app.login(json!({ "username": "admin", "password": "" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let (status, _) = app
		.login(json!({ "username": "admin", "password": "admin" }))
		.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_templates_are_served_to_role_readers() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(Method::GET, "/api/admin/permission-templates", Some(&admin), None)
		.await;
	assert_eq!(status, StatusCode::OK);
	let templates = body["templates"].as_array().unwrap();
	let ids: Vec<&str> = templates.iter().map(|t| t["id"].as_str().unwrap()).collect();
	assert_eq!(ids, ["dashboard", "admin", "zakazky", "vyroba", "financie"]);
	assert_eq!(templates[1]["children"][4]["permissions"], json!(["read", "write", "execute"]));
	assert_eq!(templates[4]["children"][3]["name"], "Mzdy");

	let user = app.add_user("jana", "employee").await;
	let token = app.token_for(&user, &PermissionTree::new());
	let (status, _) = app
		.call(Method::GET, "/api/admin/permission-templates", Some(&token), None)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_administration_lifecycle() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(
			Method::POST,
			"/api/admin/users",
			Some(&admin),
			Some(json!({
				"username": "eva",
				"email": "eva@adsun.sk",
				"password": "tlaciaren",
				"roleName": "employee"
			})),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["user"]["roleName"], "employee");
	assert!(body["user"]["roleId"].is_string());
	assert_eq!(body["user"]["permissions"], json!({}));
	assert_eq!(body["user"]["active"], true);
	let id = body["user"]["id"].as_str().unwrap().to_string();

	for duplicate in [
		json!({ "username": "eva", "password": "x" }),
		json!({ "username": "eva2", "email": "eva@adsun.sk", "password": "x" }),
	] {
		let (status, _) = app
			.call(Method::POST, "/api/admin/users", Some(&admin), Some(duplicate))
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	let (status, body) = app.call(Method::GET, "/api/admin/users", Some(&admin), None).await;
	assert_eq!(status, StatusCode::OK);
	let eva = body["users"]
		.as_array()
		.unwrap()
		.iter()
		.find(|u| u["username"] == "eva")
		.unwrap();
	assert_eq!(eva["role"], "employee");
	assert!(!body.to_string().contains("argon2"));

	let uri = format!("/api/admin/users/{id}");
	let (status, body) = app
		.call(
			Method::PUT,
			&uri,
			Some(&admin),
			Some(json!({
				"roleName": "accountant",
				"permissions": { "sklad": { "read": false } }
			})),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"]["roleName"], "accountant");
	assert_eq!(body["user"]["permissions"], json!({ "sklad": { "read": false } }));
	assert_eq!(body["user"]["effectivePermissions"]["financie"]["read"], true);

	let (status, body) = app.call(Method::GET, &uri, Some(&admin), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"]["roleName"], "accountant");

	let (status, body) = app
		.login(json!({ "username": "eva", "password": "tlaciaren" }))
		.await;
	assert_eq!(status, StatusCode::OK);
	let eva_token = body["accessToken"].as_str().unwrap().to_string();

	let status_uri = format!("/api/admin/users/{id}/status");
	let (status, _) = app
		.call(Method::PATCH, &status_uri, Some(&admin), Some(json!({})))
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, body) = app
		.call(Method::PATCH, &status_uri, Some(&admin), Some(json!({ "active": false })))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user"], json!({ "id": id, "active": false }));

	// Resolve mode re-reads the account, so the old token stops working.
	let (status, _) = app
		.call(Method::GET, "/api/auth/me", Some(&eva_token), None)
		.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	let (status, _) = app
		.login(json!({ "username": "eva", "password": "tlaciaren" }))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, body) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);

	let (status, _) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = app.call(Method::GET, &uri, Some(&admin), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = app
		.call(Method::PUT, &uri, Some(&admin), Some(json!({ "username": "x" })))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = app
		.call(Method::PATCH, &status_uri, Some(&admin), Some(json!({ "active": true })))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_user_with_unknown_role_gets_the_minimal_tree() {
	let app = TestApp::new(true).await;
	let admin = app.admin_token().await;

	let (status, body) = app
		.call(
			Method::POST,
			"/api/admin/users",
			Some(&admin),
			Some(json!({ "username": "novy", "password": "tlaciaren", "roleName": "ghost" })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["user"]["roleName"], "user");
	assert!(body["user"]["roleId"].is_null());
	assert_eq!(
		body["user"]["effectivePermissions"],
		json!({ "dashboard": { "read": true } })
	);
}

#[tokio::test]
async fn employee_cannot_administer_users() {
	let app = TestApp::new(true).await;
	let user = app.add_user("jana", "employee").await;
	let token = app.token_for(&user, &PermissionTree::new());

	let (status, _) = app.call(Method::GET, "/api/admin/users", Some(&token), None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, _) = app
		.call(
			Method::DELETE,
			&format!("/api/admin/users/{}", user.id),
			Some(&token),
			None,
		)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

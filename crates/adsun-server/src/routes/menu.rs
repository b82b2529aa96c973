// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorized navigation menu.

use adsun_server_api::{AuthorizedMenuResponse, ErrorResponse, MenuNodeResponse};
use adsun_server_auth::{build_menu, filter_menu};
use axum::{extract::State, Json};

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

#[utoipa::path(
    get,
    path = "/api/menu/authorized-menu",
    responses(
        (status = 200, description = "Menu entries the caller may see", body = AuthorizedMenuResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "menu"
)]
/// GET /api/menu/authorized-menu - Active menu filtered by the caller's tree.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_authorized_menu(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<Json<AuthorizedMenuResponse>, ServerError> {
	let categories = state.menu.list_active_categories().await?;
	let menu = build_menu(&categories);
	let visible = filter_menu(&menu, &current_user.permissions, &current_user.role_name);

	tracing::debug!(
		role = %current_user.role_name,
		total = menu.len(),
		visible = visible.len(),
		"filtered menu"
	);

	Ok(Json(AuthorizedMenuResponse {
		success: true,
		menu: visible.into_iter().map(MenuNodeResponse::from).collect(),
	}))
}

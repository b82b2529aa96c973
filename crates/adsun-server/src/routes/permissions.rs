// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_api::{
	ErrorResponse, PermissionCatalogueEntry, PermissionCatalogueResponse, PermissionTemplateEntry,
	PermissionTemplatesResponse,
};
use adsun_server_auth::{PERMISSION_TEMPLATES, SYSTEM_PERMISSIONS};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/admin/permissions",
    responses(
        (status = 200, description = "Catalogue of system permissions", body = PermissionCatalogueResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing admin_roles_read", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/permissions - Named permissions shown in the role editor.
pub async fn list_permissions() -> Json<PermissionCatalogueResponse> {
	Json(PermissionCatalogueResponse {
		success: true,
		permissions: SYSTEM_PERMISSIONS
			.iter()
			.map(PermissionCatalogueEntry::from)
			.collect(),
	})
}

#[utoipa::path(
    get,
    path = "/api/admin/permission-templates",
    responses(
        (status = 200, description = "Categories, subcategories and their actions", body = PermissionTemplatesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing admin_roles_read", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/permission-templates
pub async fn list_permission_templates() -> Json<PermissionTemplatesResponse> {
	Json(PermissionTemplatesResponse {
		success: true,
		templates: PERMISSION_TEMPLATES
			.iter()
			.map(PermissionTemplateEntry::from)
			.collect(),
	})
}

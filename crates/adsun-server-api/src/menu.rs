// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_auth::{MenuNode, MenuNodeKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A category (with `children`) or a module entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MenuNodeResponse {
	pub id: Uuid,
	pub code: String,
	pub name: String,
	pub icon: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// `category` or `module`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Underscore-joined token, e.g. `zakazky_prehlad_read`.
	pub required_permission: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[cfg_attr(feature = "openapi", schema(no_recursion))]
	pub children: Option<Vec<MenuNodeResponse>>,
}

impl From<MenuNode> for MenuNodeResponse {
	fn from(node: MenuNode) -> Self {
		Self {
			id: node.id,
			code: node.code,
			name: node.name,
			icon: node.icon,
			path: node.path,
			kind: match node.kind {
				MenuNodeKind::Category => "category".to_string(),
				MenuNodeKind::Module => "module".to_string(),
			},
			required_permission: node.required_permission.to_token(),
			children: node
				.children
				.map(|children| children.into_iter().map(Self::from).collect()),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuthorizedMenuResponse {
	pub success: bool,
	pub menu: Vec<MenuNodeResponse>,
}

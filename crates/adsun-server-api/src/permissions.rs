// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_auth::{PermissionDescriptor, PermissionTemplate, TemplateChild};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionCatalogueEntry {
	/// Grant token, e.g. `financie_read`.
	pub id: String,
	pub name: String,
	pub category: String,
	pub description: String,
}

impl From<&PermissionDescriptor> for PermissionCatalogueEntry {
	fn from(descriptor: &PermissionDescriptor) -> Self {
		Self {
			id: descriptor.token.to_string(),
			name: descriptor.name.to_string(),
			category: descriptor.category.to_string(),
			description: descriptor.description.to_string(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionCatalogueResponse {
	pub success: bool,
	pub permissions: Vec<PermissionCatalogueEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionTemplateChild {
	pub id: String,
	pub name: String,
	/// Actions offered for the subcategory, e.g. `["read", "approve"]`.
	pub permissions: Vec<String>,
}

impl From<&TemplateChild> for PermissionTemplateChild {
	fn from(child: &TemplateChild) -> Self {
		Self {
			id: child.id.to_string(),
			name: child.name.to_string(),
			permissions: child.permissions.iter().map(|a| a.to_string()).collect(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionTemplateEntry {
	pub id: String,
	pub name: String,
	pub permissions: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<PermissionTemplateChild>,
}

impl From<&PermissionTemplate> for PermissionTemplateEntry {
	fn from(template: &PermissionTemplate) -> Self {
		Self {
			id: template.id.to_string(),
			name: template.name.to_string(),
			permissions: template.permissions.iter().map(|a| a.to_string()).collect(),
			children: template.children.iter().map(Into::into).collect(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionTemplatesResponse {
	pub success: bool,
	pub templates: Vec<PermissionTemplateEntry>,
}

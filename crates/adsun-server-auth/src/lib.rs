// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchical permissions for the Adsun back office.
//!
//! A [`PermissionTree`] is a nested map of categories, subcategories and
//! boolean action grants:
//!
//! ```text
//! { "financie": { "read": true, "faktury": { "approve": true } } }
//! ```
//!
//! The pipeline that turns stored data into a decision:
//!
//! ```text
//! principal ──► RoleResolver ──► role tree ─┐
//!     │                                     ├─► merge (user wins) ─► effective tree
//!     └──────────────► user override tree ──┘            │
//!                                                        ├─► evaluate(token)  → API gating
//!                                                        └─► filter_menu(...)  → UI gating
//! ```
//!
//! Storage, token signing and HTTP are reached through the traits in
//! [`role`], [`user`], [`menu`] and [`token`].

pub mod catalogue;
pub mod decision;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod password;
pub mod permission;
pub mod resolver;
pub mod role;
pub mod role_defaults;
pub mod service;
pub mod token;
pub mod types;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use catalogue::{
	PermissionDescriptor, PermissionTemplate, TemplateChild, PERMISSION_TEMPLATES, SYSTEM_PERMISSIONS,
};
pub use decision::{authorize, evaluate, is_admin, is_authorized, Decision, ADMIN_ROLE};
pub use error::{PermissionError, Result};
pub use menu::{
	build_menu, category_code, filter_menu, normalize_name_to_code, required_permission,
	subcategory_code, Category, MenuNode, MenuNodeKind, MenuStore, Subcategory,
};
pub use middleware::{
	extract_bearer_token, AuthContext, AuthRequired, CurrentUser, PermissionSource,
};
pub use permission::{
	flatten, flatten_tokens, merge, unflatten, unflatten_tokens, GrantNode, PermissionPath,
	PermissionTree,
};
pub use resolver::RoleResolver;
pub use role::{Role, RoleStore};
pub use role_defaults::{RoleDefaults, RoleDefaultsError, RoleTemplates, RoleTier};
pub use password::{hash_password, verify_password};
pub use service::{
	EffectivePermissions, NewRole, NewUser, PermissionService, RoleUpdate, UserUpdate, FALLBACK_ROLE,
};
pub use token::{JwtTokenService, TokenClaims, TokenError, TokenService};
pub use types::{CategoryId, RoleId, SubcategoryId, UserId};
pub use user::{User, UserStore};

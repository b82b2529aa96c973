// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! First-run data: system roles, the admin account and the default menu.
//!
//! Every step is idempotent. System roles are stored with empty trees so that
//! the role defaults table fills them on first read.

use adsun_server_auth::{hash_password, Category, PermissionTree, Role, Subcategory, User};
use adsun_server_db::{CategoryRepository, DbError, RoleRepository, UserRepository};
use sqlx::sqlite::SqlitePool;

/// Roles created on first run.
pub const SYSTEM_ROLES: &[(&str, &str)] = &[
	("admin", "Full access to every module"),
	("manager", "Orders, production and read access to finance"),
	("accountant", "Finance and invoicing"),
	("employee", "Day-to-day order and production work"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
	pub roles_created: usize,
	pub admin_created: bool,
	pub menu_seeded: bool,
}

/// Seed the database, skipping anything already present.
///
/// `admin_password` is only applied when the admin account is created; without
/// one the account can only be reached through `issue-token`.
#[tracing::instrument(skip(pool, admin_password))]
pub async fn seed(
	pool: &SqlitePool,
	admin_username: &str,
	admin_password: Option<&str>,
) -> Result<SeedReport, DbError> {
	let roles = RoleRepository::new(pool.clone());
	let users = UserRepository::new(pool.clone());
	let categories = CategoryRepository::new(pool.clone());
	let mut report = SeedReport::default();

	for (name, description) in SYSTEM_ROLES {
		if roles.get_role_by_name(name).await?.is_none() {
			let role = Role::new(*name, PermissionTree::new())
				.with_description(*description)
				.system();
			roles.create_role(&role).await?;
			report.roles_created += 1;
		}
	}

	if users.get_user_by_username(admin_username).await?.is_none() {
		let admin_role = roles
			.get_role_by_name("admin")
			.await?
			.ok_or_else(|| DbError::Internal("admin role missing after seeding".to_string()))?;
		let mut user = User::new(admin_username, admin_role.name.as_str()).with_role_id(admin_role.id);
		if let Some(password) = admin_password {
			let hash = hash_password(password).map_err(|e| DbError::Internal(e.to_string()))?;
			user = user.with_password_hash(hash);
		}
		users.create_user(&user).await?;
		report.admin_created = true;
	}

	if categories.count_categories().await? == 0 {
		for category in default_menu() {
			categories.create_category(&category).await?;
		}
		report.menu_seeded = true;
	}

	tracing::info!(
		roles_created = report.roles_created,
		admin_created = report.admin_created,
		menu_seeded = report.menu_seeded,
		"seed complete"
	);
	Ok(report)
}

/// The print-shop navigation shipped with a fresh install.
pub fn default_menu() -> Vec<Category> {
	vec![
		Category::new("Dashboard", 0).with_icon("dashboard"),
		Category::new("Zákazky", 1)
			.with_icon("assignment")
			.with_subcategory(Subcategory::new("Cenové ponuky", "/workflow/quotes", 0))
			.with_subcategory(Subcategory::new("Objednávky", "/zakazky/objednavka", 1))
			.with_subcategory(Subcategory::new("Zákazky", "/zakazky/zakazka", 2)),
		Category::new("Výroba", 2)
			.with_icon("precision_manufacturing")
			.with_subcategory(Subcategory::new("Plánovanie", "/vyroba/planovanie", 0))
			.with_subcategory(Subcategory::new("Sklad", "/vyroba/sklad", 1))
			.with_subcategory(Subcategory::new("Expedícia", "/zakazky/expediacia", 2)),
		Category::new("Financie", 3)
			.with_icon("account_balance")
			.with_subcategory(Subcategory::new("Faktúry", "/financie/faktury", 0))
			.with_subcategory(Subcategory::new("Príjmy", "/financie/prijmy", 1))
			.with_subcategory(Subcategory::new("Výdavky", "/financie/vydavky", 2)),
		Category::new("Administrácia", 4)
			.with_icon("admin_panel_settings")
			.with_subcategory(Subcategory::new("Používatelia", "/admin/users", 0))
			.with_subcategory(Subcategory::new("Roly", "/admin/roles", 1))
			.with_subcategory(Subcategory::new("Nastavenia", "/admin/settings", 2))
			.with_subcategory(Subcategory::new("Zálohy", "/admin/backups", 3)),
	]
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixed catalogues offered by the role editor: the top-level grants and the
//! category/subcategory templates with the actions each one supports.

use serde::Serialize;

use crate::permission::PermissionPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionDescriptor {
	pub token: &'static str,
	pub name: &'static str,
	pub category: &'static str,
	pub description: &'static str,
}

impl PermissionDescriptor {
	pub fn path(&self) -> PermissionPath {
		PermissionPath::from_segments(self.token.split(PermissionPath::SEPARATOR))
	}
}

pub const SYSTEM_PERMISSIONS: &[PermissionDescriptor] = &[
	PermissionDescriptor {
		token: "admin_read",
		name: "Čítanie administrácie",
		category: "Admin",
		description: "Umožňuje prezerať administračné nastavenia",
	},
	PermissionDescriptor {
		token: "admin_write",
		name: "Zápis administrácie",
		category: "Admin",
		description: "Umožňuje upravovať administračné nastavenia",
	},
	PermissionDescriptor {
		token: "vyroba_read",
		name: "Čítanie výroby",
		category: "Výroba",
		description: "Umožňuje prezerať výrobné dáta",
	},
	PermissionDescriptor {
		token: "vyroba_write",
		name: "Zápis výroby",
		category: "Výroba",
		description: "Umožňuje upravovať výrobné dáta",
	},
	PermissionDescriptor {
		token: "financie_read",
		name: "Čítanie financií",
		category: "Financie",
		description: "Umožňuje prezerať finančné dáta",
	},
	PermissionDescriptor {
		token: "financie_write",
		name: "Zápis financií",
		category: "Financie",
		description: "Umožňuje upravovať finančné dáta",
	},
	PermissionDescriptor {
		token: "zakazky_read",
		name: "Čítanie zákaziek",
		category: "Zákazky",
		description: "Umožňuje prezerať zákazky",
	},
	PermissionDescriptor {
		token: "zakazky_write",
		name: "Zápis zákaziek",
		category: "Zákazky",
		description: "Umožňuje vytvárať a upravovať zákazky",
	},
];

/// A subcategory of a [`PermissionTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateChild {
	pub id: &'static str,
	pub name: &'static str,
	pub permissions: &'static [&'static str],
}

/// A category as the role editor draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionTemplate {
	pub id: &'static str,
	pub name: &'static str,
	pub permissions: &'static [&'static str],
	pub children: &'static [TemplateChild],
}

impl PermissionTemplate {
	/// Every `{category}[_{child}]_{action}` path the template offers.
	pub fn paths(&self) -> Vec<PermissionPath> {
		let own = self
			.permissions
			.iter()
			.map(|action| PermissionPath::from_segments([self.id, *action]));
		let nested = self.children.iter().flat_map(|child| {
			child
				.permissions
				.iter()
				.map(|action| PermissionPath::from_segments([self.id, child.id, *action]))
		});
		own.chain(nested).collect()
	}
}

const CRUD: &[&str] = &["read", "write", "delete"];

pub const PERMISSION_TEMPLATES: &[PermissionTemplate] = &[
	PermissionTemplate {
		id: "dashboard",
		name: "Dashboard",
		permissions: &["read"],
		children: &[],
	},
	PermissionTemplate {
		id: "admin",
		name: "Administrácia",
		permissions: &["read", "write"],
		children: &[
			TemplateChild {
				id: "users",
				name: "Používatelia",
				permissions: CRUD,
			},
			TemplateChild {
				id: "roles",
				name: "Role a oprávnenia",
				permissions: CRUD,
			},
			TemplateChild {
				id: "settings",
				name: "Nastavenia systému",
				permissions: &["read", "write"],
			},
			TemplateChild {
				id: "logs",
				name: "Systémové logy",
				permissions: &["read"],
			},
			TemplateChild {
				id: "backups",
				name: "Zálohovanie",
				permissions: &["read", "write", "execute"],
			},
		],
	},
	PermissionTemplate {
		id: "zakazky",
		name: "Zákazky",
		permissions: CRUD,
		children: &[
			TemplateChild {
				id: "create",
				name: "Vytváranie zákaziek",
				permissions: &["read", "write"],
			},
			TemplateChild {
				id: "edit",
				name: "Úprava zákaziek",
				permissions: CRUD,
			},
			TemplateChild {
				id: "management",
				name: "Správa zákaziek",
				permissions: &["read", "write", "delete", "approve"],
			},
		],
	},
	PermissionTemplate {
		id: "vyroba",
		name: "Výroba",
		permissions: CRUD,
		children: &[
			TemplateChild {
				id: "sklad",
				name: "Sklad",
				permissions: CRUD,
			},
			TemplateChild {
				id: "planovanie",
				name: "Plánovanie výroby",
				permissions: &["read", "write"],
			},
			TemplateChild {
				id: "vyrobky",
				name: "Správa výrobkov",
				permissions: CRUD,
			},
		],
	},
	PermissionTemplate {
		id: "financie",
		name: "Financie",
		permissions: CRUD,
		children: &[
			TemplateChild {
				id: "faktury",
				name: "Faktúry",
				permissions: &["read", "write", "delete", "approve"],
			},
			TemplateChild {
				id: "prijmy",
				name: "Príjmy",
				permissions: CRUD,
			},
			TemplateChild {
				id: "vydavky",
				name: "Výdavky",
				permissions: CRUD,
			},
			TemplateChild {
				id: "mzdy",
				name: "Mzdy",
				permissions: &["read", "write", "approve"],
			},
		],
	},
];

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Display name → permission key mapping for menu entries.
//!
//! Menu names are free text maintained by administrators, while permission
//! trees use fixed keys. A name maps to the code of the first table row with a
//! keyword contained in the lowercased name; unmatched names fall back to
//! [`normalize_name_to_code`].

use unicode_normalization::UnicodeNormalization;

use crate::permission::PermissionPath;

type CodeTable = &'static [(&'static [&'static str], &'static str)];

const CATEGORY_CODES: CodeTable = &[
	(&["dashboard"], "dashboard"),
	(
		&["zákazky", "zakazky", "správa zákaziek", "workflow"],
		"zakazky",
	),
	(&["výroba", "vyroba", "sklad"], "vyroba"),
	(&["financie", "finančný"], "financie"),
	(&["admin", "administrácia"], "admin"),
];

// Row order matters: "faktúra" must be tried before "faktúry".
const SUBCATEGORY_CODES: CodeTable = &[
	(
		&["cenová ponuka", "cenova ponuka", "cenové ponuky", "cenove ponuky"],
		"quotes",
	),
	(&["objednávka", "objednavka"], "objednavka"),
	(
		&["faktúra", "faktura", "fakturácia", "fakturacia"],
		"fakturacia",
	),
	(&["expedícia", "expedicia"], "expediacia"),
	(&["zákazka", "zakazka"], "zakazka"),
	(&["sklad"], "sklad"),
	(&["plánovanie", "planovanie"], "planovanie"),
	(&["faktúry", "faktury"], "faktury"),
	(&["príjmy", "prijmy"], "prijmy"),
	(&["výdavky", "vydavky"], "vydavky"),
	(
		&["užívatelia", "uzivatelia", "používatelia", "pouzivatelia"],
		"users",
	),
	(&["roly", "role"], "roles"),
	(&["nastavenia", "settings"], "settings"),
];

fn lookup(table: CodeTable, name: &str) -> Option<&'static str> {
	let lowered = name.to_lowercase();
	table
		.iter()
		.find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
		.map(|(_, code)| *code)
}

/// Permission key for a top-level menu category.
pub fn category_code(name: &str) -> String {
	lookup(CATEGORY_CODES, name)
		.map(str::to_string)
		.unwrap_or_else(|| normalize_name_to_code(name))
}

/// Permission key for a module under a category.
pub fn subcategory_code(name: &str) -> String {
	lookup(SUBCATEGORY_CODES, name)
		.map(str::to_string)
		.unwrap_or_else(|| normalize_name_to_code(name))
}

/// Lowercase, strip diacritics, keep only `[a-z0-9]`.
pub fn normalize_name_to_code(name: &str) -> String {
	name
		.to_lowercase()
		.nfd()
		.filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
		.filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
		.collect()
}

/// Names with no ASCII letters or digits (for example `日本`) normalize to an
/// empty code; such entries are keyed by their id instead.
pub(crate) fn code_or_id(code: String, id: &uuid::Uuid) -> String {
	if code.is_empty() {
		id.simple().to_string()
	} else {
		code
	}
}

/// `{category}_read`, or `{category}_{child}_read` for a module.
///
/// Used both when building menu nodes and when guarding the routes behind
/// them, so the two can never disagree.
pub fn required_permission(category: &str, child: Option<&str>) -> PermissionPath {
	let mut segments = vec![category.to_string()];
	if let Some(child) = child {
		segments.push(child.to_string());
	}
	segments.push("read".to_string());
	PermissionPath::from_segments(segments)
}

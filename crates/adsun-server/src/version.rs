// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for adsun-server.

use std::time::Duration;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"{NAME} version: {VERSION}\n\
         Platform:             {}-{}",
		std::env::consts::ARCH,
		std::env::consts::OS,
	)
}

/// Human-readable token lifetime, e.g. `15m`.
pub fn format_ttl(ttl_secs: u64) -> String {
	humantime::format_duration(Duration::from_secs(ttl_secs)).to_string()
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in providers, discoverable as `providers::<name>`.
//!
//! Each module exports `create` as its constructor symbol. Adding a module
//! here makes it discoverable by name without registration.

pub mod dotenv;
pub mod env;
pub mod keepassxc;

use credfetch_core::ModuleTable;

/// Namespace the built-in modules live under.
pub const NAMESPACE: &str = "providers";

/// The built-in discovery namespace.
pub fn builtin_modules() -> ModuleTable {
	ModuleTable::new(NAMESPACE)
		.with_module(dotenv::NAME, |m| m.with_constructor(dotenv::create))
		.with_module(env::NAME, |m| m.with_constructor(env::create))
		.with_module(keepassxc::NAME, |m| m.with_constructor(keepassxc::create))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_namespace_lists_every_module() {
		assert_eq!(
			builtin_modules().module_names(),
			["dotenv", "env", "keepassxc"]
		);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retrieve credentials by provider name.
//!
//! [`create_provider`] resolves a name against the process-wide registry
//! ([`creators`]) first and the built-in `providers` namespace second. With
//! the `dylib` feature, shared libraries in the directories listed in
//! `CREDFETCH_PROVIDER_PATH` are searched after the built-ins.
//!
//! # Example
//!
//! ```rust,no_run
//! use credfetch::{create_provider, ProviderArgs};
//!
//! let provider = create_provider("dotenv", &ProviderArgs::new().arg("creds.env")).unwrap();
//! let creds = provider.get_id_pw(&ProviderArgs::new()).unwrap();
//! let token = provider.get("API_TOKEN").unwrap();
//! # let _ = (creds, token);
//! ```

pub mod providers;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use credfetch_core::{
	creator, ContractViolation, Creator, CreatorRegistry, CredentialProvider, Credentials,
	DiscoveryError, FactoryError, ModuleTable, Operation, ProviderArgs, ProviderError,
	ProviderFactory, ProviderName, ProviderResolver, RegistryError, ResolverChain,
	CONSTRUCTOR_SYMBOL,
};
pub use credfetch_secret::SecretString;

/// Search path for provider libraries (`dylib` feature).
pub const PROVIDER_PATH_ENV: &str = "CREDFETCH_PROVIDER_PATH";

/// The process-wide creator registry.
pub fn creators() -> &'static CreatorRegistry {
	CreatorRegistry::global()
}

/// Built-in namespace, then provider libraries in `library_dirs`.
pub fn resolver_with_paths(library_dirs: &[PathBuf]) -> Arc<dyn ProviderResolver> {
	let chain = ResolverChain::new().with(Arc::new(providers::builtin_modules()));

	#[cfg(feature = "dylib")]
	let chain = if library_dirs.is_empty() {
		chain
	} else {
		chain.with(Arc::new(credfetch_core::DylibResolver::new(library_dirs.iter().cloned())))
	};

	if cfg!(not(feature = "dylib")) && !library_dirs.is_empty() {
		tracing::warn!(
			dirs = library_dirs.len(),
			"provider library directories configured but dylib support is not compiled in"
		);
	}

	Arc::new(chain)
}

/// Resolver used by [`create_provider`], built once per process.
pub fn default_resolver() -> Arc<dyn ProviderResolver> {
	static DEFAULT: OnceLock<Arc<dyn ProviderResolver>> = OnceLock::new();
	DEFAULT
		.get_or_init(|| {
			let dirs: Vec<PathBuf> = std::env::var_os(PROVIDER_PATH_ENV)
				.map(|paths| std::env::split_paths(&paths).collect())
				.unwrap_or_default();
			resolver_with_paths(&dirs)
		})
		.clone()
}

/// Factory over the global registry and the default resolver.
pub fn factory() -> ProviderFactory<'static> {
	ProviderFactory::new(creators(), default_resolver())
}

/// Construct provider `name` with `args`.
pub fn create_provider(
	name: &str,
	args: &ProviderArgs,
) -> Result<Box<dyn CredentialProvider>, FactoryError> {
	factory().create_provider(name, args)
}

/// Registered names plus built-in module names, sorted and deduplicated.
pub fn known_providers(registry: &CreatorRegistry) -> Vec<String> {
	let mut names = registry.list_names();
	names.extend(providers::builtin_modules().module_names());
	names.sort();
	names.dedup();
	names
}

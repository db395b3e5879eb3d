// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Convention-based discovery of provider units.
//!
//! A resolver maps a provider name to one or more *locators* (module paths,
//! library files) and loads the unit found there. Every unit must export a
//! constructor under [`CONSTRUCTOR_SYMBOL`]; that name is the stable contract
//! with out-of-tree providers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::args::ProviderArgs;
use crate::contract::CredentialProvider;
use crate::error::{DiscoveryError, ProviderError};
use crate::name::ProviderName;
use crate::registry::{creator, Creator};

/// Symbol every provider unit exports its constructor under.
pub const CONSTRUCTOR_SYMBOL: &str = "credfetch_create_provider";

/// A loaded unit: something that exports named constructors.
pub trait ProviderUnit: Send + Sync {
	fn locator(&self) -> &str;

	fn symbol(&self, name: &str) -> Option<Creator>;
}

/// Maps provider names to units.
pub trait ProviderResolver: Send + Sync + fmt::Debug {
	/// Locators the naming convention derives for `name`, in lookup order.
	fn locators_for(&self, name: &ProviderName) -> Vec<String>;

	/// Load the unit at `locator`, or `Ok(None)` if nothing lives there.
	fn load_unit(&self, locator: &str) -> Result<Option<Box<dyn ProviderUnit>>, DiscoveryError>;

	/// First unit found among [`locators_for`](Self::locators_for).
	fn resolve(&self, name: &ProviderName) -> Result<Box<dyn ProviderUnit>, DiscoveryError> {
		let locators = self.locators_for(name);
		for locator in &locators {
			trace!(provider = %name, locator = %locator, "probing locator");
			if let Some(unit) = self.load_unit(locator)? {
				return Ok(unit);
			}
		}
		Err(DiscoveryError::UnitNotFound { locators })
	}
}

/// An in-process unit with a symbol table.
#[derive(Clone)]
pub struct ProviderModule {
	locator: String,
	symbols: HashMap<String, Creator>,
}

impl ProviderModule {
	pub fn new(locator: impl Into<String>) -> Self {
		Self {
			locator: locator.into(),
			symbols: HashMap::new(),
		}
	}

	pub fn export(mut self, symbol: impl Into<String>, creator: Creator) -> Self {
		self.symbols.insert(symbol.into(), creator);
		self
	}

	/// Export `f` under [`CONSTRUCTOR_SYMBOL`].
	pub fn with_constructor<F>(self, f: F) -> Self
	where
		F: Fn(&ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.export(CONSTRUCTOR_SYMBOL, creator(f))
	}
}

impl ProviderUnit for ProviderModule {
	fn locator(&self) -> &str {
		&self.locator
	}

	fn symbol(&self, name: &str) -> Option<Creator> {
		self.symbols.get(name).cloned()
	}
}

impl fmt::Debug for ProviderModule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderModule")
			.field("locator", &self.locator)
			.field("symbols", &self.symbols.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// A namespace of in-process modules, located as `<namespace>::<name>`.
pub struct ModuleTable {
	namespace: String,
	modules: HashMap<String, ProviderModule>,
}

impl ModuleTable {
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			modules: HashMap::new(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn locator(&self, name: &str) -> String {
		format!("{}::{}", self.namespace, name)
	}

	/// Add module `name`, letting `build` fill in its exports.
	pub fn with_module(
		mut self,
		name: &str,
		build: impl FnOnce(ProviderModule) -> ProviderModule,
	) -> Self {
		let locator = self.locator(name);
		let module = build(ProviderModule::new(locator.clone()));
		self.modules.insert(locator, module);
		self
	}

	/// Names of the modules in this namespace.
	pub fn module_names(&self) -> Vec<String> {
		let prefix = format!("{}::", self.namespace);
		let mut names: Vec<String> = self
			.modules
			.keys()
			.filter_map(|locator| locator.strip_prefix(&prefix))
			.map(str::to_owned)
			.collect();
		names.sort();
		names
	}
}

impl ProviderResolver for ModuleTable {
	fn locators_for(&self, name: &ProviderName) -> Vec<String> {
		vec![self.locator(name.as_str())]
	}

	fn load_unit(&self, locator: &str) -> Result<Option<Box<dyn ProviderUnit>>, DiscoveryError> {
		Ok(self
			.modules
			.get(locator)
			.cloned()
			.map(|module| Box::new(module) as Box<dyn ProviderUnit>))
	}
}

impl fmt::Debug for ModuleTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModuleTable")
			.field("namespace", &self.namespace)
			.field("modules", &self.module_names())
			.finish()
	}
}

/// Several resolvers consulted in order; the first unit found wins.
#[derive(Debug, Default)]
pub struct ResolverChain {
	resolvers: Vec<Arc<dyn ProviderResolver>>,
}

impl ResolverChain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, resolver: Arc<dyn ProviderResolver>) -> Self {
		self.resolvers.push(resolver);
		self
	}

	pub fn len(&self) -> usize {
		self.resolvers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resolvers.is_empty()
	}
}

impl ProviderResolver for ResolverChain {
	fn locators_for(&self, name: &ProviderName) -> Vec<String> {
		self.resolvers
			.iter()
			.flat_map(|r| r.locators_for(name))
			.collect()
	}

	fn load_unit(&self, locator: &str) -> Result<Option<Box<dyn ProviderUnit>>, DiscoveryError> {
		for resolver in &self.resolvers {
			if let Some(unit) = resolver.load_unit(locator)? {
				return Ok(Some(unit));
			}
		}
		Ok(None)
	}

	// Each resolver only searches its own locators; a load failure stops the chain.
	fn resolve(&self, name: &ProviderName) -> Result<Box<dyn ProviderUnit>, DiscoveryError> {
		let mut tried = Vec::new();
		for resolver in &self.resolvers {
			match resolver.resolve(name) {
				Ok(unit) => return Ok(unit),
				Err(DiscoveryError::UnitNotFound { locators }) => tried.extend(locators),
				Err(e) => return Err(e),
			}
		}
		Err(DiscoveryError::UnitNotFound { locators: tried })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::contract::Operation;

	#[derive(Debug)]
	struct Nothing;

	impl CredentialProvider for Nothing {
		fn operations(&self) -> &'static [Operation] {
			&[]
		}
	}

	fn name(s: &str) -> ProviderName {
		ProviderName::parse(s).unwrap()
	}

	#[test]
	fn module_table_follows_namespace_convention() {
		let table = ModuleTable::new("providers")
			.with_module("dotenv", |m| m.with_constructor(|_| Ok(Box::new(Nothing))));

		assert_eq!(table.locators_for(&name("dotenv")), ["providers::dotenv"]);

		let unit = table.resolve(&name("dotenv")).unwrap();
		assert_eq!(unit.locator(), "providers::dotenv");
		assert!(unit.symbol(CONSTRUCTOR_SYMBOL).is_some());
		assert!(unit.symbol("Provider").is_none());
	}

	#[test]
	fn module_table_reports_tried_locator() {
		let table = ModuleTable::new("providers");
		let err = table.resolve(&name("ghost")).err().unwrap();
		assert_eq!(
			err,
			DiscoveryError::UnitNotFound {
				locators: vec!["providers::ghost".to_string()]
			}
		);
	}

	#[test]
	fn chain_falls_through_to_later_resolvers() {
		let first = ModuleTable::new("builtin");
		let second = ModuleTable::new("extra")
			.with_module("vault", |m| m.with_constructor(|_| Ok(Box::new(Nothing))));
		let chain = ResolverChain::new()
			.with(Arc::new(first))
			.with(Arc::new(second));

		let unit = chain.resolve(&name("vault")).unwrap();
		assert_eq!(unit.locator(), "extra::vault");
	}

	#[test]
	fn chain_lists_every_locator_when_nothing_matches() {
		let chain = ResolverChain::new()
			.with(Arc::new(ModuleTable::new("builtin")))
			.with(Arc::new(ModuleTable::new("extra")));

		let err = chain.resolve(&name("ghost")).err().unwrap();
		assert_eq!(
			err.to_string(),
			"no provider unit found (tried builtin::ghost, extra::ghost)"
		);
	}

	#[test]
	fn module_names_are_sorted() {
		let table = ModuleTable::new("providers")
			.with_module("keepassxc", |m| m)
			.with_module("dotenv", |m| m);
		assert_eq!(table.module_names(), ["dotenv", "keepassxc"]);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Explicitly registered provider creators.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::args::ProviderArgs;
use crate::contract::CredentialProvider;
use crate::error::{ProviderError, RegistryError};
use crate::name::ProviderName;

/// A function that constructs a provider from construction arguments.
pub type Creator = Arc<
	dyn Fn(&ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError> + Send + Sync,
>;

/// Wrap a closure or fn item as a [`Creator`].
pub fn creator<F>(f: F) -> Creator
where
	F: Fn(&ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError>
		+ Send
		+ Sync
		+ 'static,
{
	Arc::new(f)
}

/// Name → creator map.
///
/// A name is bound at most once for the registry's lifetime; registering it
/// again fails and leaves the first creator in place. The map sits behind an
/// `RwLock`, so the duplicate check and the insert happen atomically.
pub struct CreatorRegistry {
	creators: RwLock<HashMap<ProviderName, Creator>>,
}

impl CreatorRegistry {
	pub fn new() -> Self {
		Self {
			creators: RwLock::new(HashMap::new()),
		}
	}

	/// The process-wide registry, created on first use and never torn down.
	///
	/// Tests that need isolation should build their own with [`CreatorRegistry::new`].
	pub fn global() -> &'static CreatorRegistry {
		static GLOBAL: OnceLock<CreatorRegistry> = OnceLock::new();
		GLOBAL.get_or_init(CreatorRegistry::new)
	}

	pub fn register<F>(&self, name: &str, creator: F) -> Result<(), RegistryError>
	where
		F: Fn(&ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.register_creator(name, Arc::new(creator))
	}

	pub fn register_creator(&self, name: &str, creator: Creator) -> Result<(), RegistryError> {
		let name = ProviderName::parse(name)?;
		let mut creators = self.write();
		if creators.contains_key(&name) {
			return Err(RegistryError::AlreadyRegistered(name.to_string()));
		}
		debug!(provider = %name, "registering provider creator");
		creators.insert(name, creator);
		Ok(())
	}

	pub fn get_creator(&self, name: &str) -> Result<Creator, RegistryError> {
		self.read()
			.get(name)
			.cloned()
			.ok_or_else(|| RegistryError::NotFound(name.to_owned()))
	}

	/// Snapshot of registered names, in no particular order.
	pub fn list_names(&self) -> Vec<String> {
		self.read().keys().map(ProviderName::to_string).collect()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.read().contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().is_empty()
	}

	// The map only holds function handles, so a panic while it was locked
	// cannot leave it half-updated.
	fn read(&self) -> RwLockReadGuard<'_, HashMap<ProviderName, Creator>> {
		self.creators.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, HashMap<ProviderName, Creator>> {
		self.creators.write().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Default for CreatorRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for CreatorRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CreatorRegistry")
			.field("names", &self.list_names())
			.finish()
	}
}

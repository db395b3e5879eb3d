// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Discovery of providers shipped as shared libraries.
//!
//! Only available with the `dylib` feature. For provider `name`, each search
//! directory is searched for `{DLL_PREFIX}credfetch_{name}{DLL_SUFFIX}`
//! (`libcredfetch_vault.so`, `credfetch_vault.dll`, ...). The library must
//! export [`CONSTRUCTOR_SYMBOL`] as a [`CreateProviderFn`], built with the
//! same compiler and `credfetch-core` version as the host.

use std::collections::HashMap;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use libloading::Library;
use tracing::debug;

use crate::args::ProviderArgs;
use crate::contract::CredentialProvider;
use crate::error::{DiscoveryError, ProviderError};
use crate::name::ProviderName;
use crate::registry::Creator;
use crate::resolver::{ProviderResolver, ProviderUnit, CONSTRUCTOR_SYMBOL};

/// Signature of the exported constructor.
pub type CreateProviderFn =
	fn(&ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError>;

/// Resolves providers from shared libraries in a list of directories.
///
/// A loaded library is never unloaded: the providers it constructs run code
/// and vtables from inside it and may outlive this resolver. Each path is
/// opened at most once per resolver.
pub struct DylibResolver {
	dirs: Vec<PathBuf>,
	loaded: Mutex<HashMap<PathBuf, Option<CreateProviderFn>>>,
}

impl DylibResolver {
	pub fn new<I, P>(dirs: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		Self {
			dirs: dirs.into_iter().map(Into::into).collect(),
			loaded: Mutex::new(HashMap::new()),
		}
	}

	pub fn dirs(&self) -> &[PathBuf] {
		&self.dirs
	}

	pub fn library_file_name(name: &str) -> String {
		format!("{DLL_PREFIX}credfetch_{name}{DLL_SUFFIX}")
	}

	fn open(path: &Path) -> Result<Option<CreateProviderFn>, DiscoveryError> {
		// SAFETY: loading runs the library's initializers. Provider libraries
		// are trusted code placed in the configured directories.
		let library = unsafe { Library::new(path) }.map_err(|e| DiscoveryError::LoadFailed {
			locator: path.display().to_string(),
			reason: e.to_string(),
		})?;
		let library: &'static Library = Box::leak(Box::new(library));

		// SAFETY: the exported symbol is declared with `CreateProviderFn`'s
		// signature, and the library is mapped for the rest of the process.
		let constructor = unsafe { library.get::<CreateProviderFn>(CONSTRUCTOR_SYMBOL.as_bytes()) }
			.ok()
			.map(|symbol| *symbol);

		debug!(path = %path.display(), has_constructor = constructor.is_some(), "loaded provider library");
		Ok(constructor)
	}
}

impl fmt::Debug for DylibResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
		f.debug_struct("DylibResolver")
			.field("dirs", &self.dirs)
			.field("loaded", &loaded.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl ProviderResolver for DylibResolver {
	fn locators_for(&self, name: &ProviderName) -> Vec<String> {
		let file = Self::library_file_name(name.as_str());
		self.dirs
			.iter()
			.map(|dir| dir.join(&file).display().to_string())
			.collect()
	}

	fn load_unit(&self, locator: &str) -> Result<Option<Box<dyn ProviderUnit>>, DiscoveryError> {
		let path = Path::new(locator);
		if !path.is_file() {
			return Ok(None);
		}

		let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
		let constructor = match loaded.get(path) {
			Some(constructor) => *constructor,
			None => {
				let constructor = Self::open(path)?;
				loaded.insert(path.to_path_buf(), constructor);
				constructor
			}
		};

		Ok(Some(Box::new(DylibUnit {
			locator: locator.to_string(),
			constructor,
		})))
	}
}

struct DylibUnit {
	locator: String,
	constructor: Option<CreateProviderFn>,
}

impl ProviderUnit for DylibUnit {
	fn locator(&self) -> &str {
		&self.locator
	}

	fn symbol(&self, name: &str) -> Option<Creator> {
		if name != CONSTRUCTOR_SYMBOL {
			return None;
		}
		let constructor = self.constructor?;
		Some(Arc::new(move |args: &ProviderArgs| constructor(args)))
	}
}

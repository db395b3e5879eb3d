// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider registry and factory for credfetch.
//!
//! Callers ask a [`ProviderFactory`] for a credential source by name and get
//! back a `Box<dyn CredentialProvider>` without knowing which store sits
//! behind it.
//!
//! - [`CredentialProvider`]: the contract every source satisfies (`get_id_pw`, `get`)
//! - [`CreatorRegistry`]: explicitly registered creators, one per name
//! - [`ProviderResolver`]: convention-based discovery of provider units
//! - [`ProviderFactory`]: registry first, discovery second
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use credfetch_core::{
//!     CreatorRegistry, CredentialProvider, Credentials, ModuleTable, Operation,
//!     ProviderArgs, ProviderError, ProviderFactory,
//! };
//!
//! #[derive(Debug)]
//! struct Static;
//!
//! impl CredentialProvider for Static {
//!     fn operations(&self) -> &'static [Operation] {
//!         &[Operation::GetIdPw]
//!     }
//!
//!     fn get_id_pw(&self, _args: &ProviderArgs) -> Result<Credentials, ProviderError> {
//!         Ok(Credentials::new("alice", "secret1"))
//!     }
//! }
//!
//! let registry = CreatorRegistry::new();
//! registry
//!     .register("static", |_: &ProviderArgs| {
//!         Ok(Box::new(Static) as Box<dyn CredentialProvider>)
//!     })
//!     .unwrap();
//!
//! let factory = ProviderFactory::new(&registry, Arc::new(ModuleTable::new("providers")));
//! let provider = factory.create_provider("static", &ProviderArgs::new()).unwrap();
//! let (id, secret) = provider.get_id_pw(&ProviderArgs::new()).unwrap().into_pair();
//! assert_eq!((id.as_str(), secret.expose().as_str()), ("alice", "secret1"));
//! ```

mod args;
mod contract;
#[cfg(feature = "dylib")]
mod dylib;
mod error;
mod factory;
mod name;
mod registry;
mod resolver;

pub use args::ProviderArgs;
pub use contract::{CredentialProvider, Credentials, Operation};
#[cfg(feature = "dylib")]
pub use dylib::{CreateProviderFn, DylibResolver};
pub use error::{
	ContractViolation, DiscoveryError, FactoryError, NameError, ProviderError, RegistryError,
};
pub use factory::ProviderFactory;
pub use name::ProviderName;
pub use registry::{creator, Creator, CreatorRegistry};
pub use resolver::{
	ModuleTable, ProviderModule, ProviderResolver, ProviderUnit, ResolverChain, CONSTRUCTOR_SYMBOL,
};

pub use credfetch_secret::{Secret, SecretString};

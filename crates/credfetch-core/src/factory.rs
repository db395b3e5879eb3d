// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolve a provider name to a live provider instance.

use std::sync::Arc;

use tracing::debug;

use crate::args::ProviderArgs;
use crate::contract::{CredentialProvider, Operation};
use crate::error::{ContractViolation, FactoryError};
use crate::name::ProviderName;
use crate::registry::{Creator, CreatorRegistry};
use crate::resolver::{ProviderResolver, CONSTRUCTOR_SYMBOL};

/// Origin reported for providers built from a registered creator.
const REGISTRY_ORIGIN: &str = "registry";

/// Builds providers from registered creators, falling back to discovery.
///
/// Registered creators always take precedence, so an application can shadow a
/// discoverable provider by registering the same name. Nothing is cached:
/// every call resolves and constructs from scratch.
#[derive(Debug, Clone)]
pub struct ProviderFactory<'r> {
	registry: &'r CreatorRegistry,
	resolver: Arc<dyn ProviderResolver>,
}

impl<'r> ProviderFactory<'r> {
	pub fn new(registry: &'r CreatorRegistry, resolver: Arc<dyn ProviderResolver>) -> Self {
		Self { registry, resolver }
	}

	pub fn registry(&self) -> &'r CreatorRegistry {
		self.registry
	}

	pub fn resolver(&self) -> &Arc<dyn ProviderResolver> {
		&self.resolver
	}

	/// Construct provider `name` with `args`.
	pub fn create_provider(
		&self,
		name: &str,
		args: &ProviderArgs,
	) -> Result<Box<dyn CredentialProvider>, FactoryError> {
		let name = ProviderName::parse(name)?;
		let (creator, origin) = self.resolve(&name)?;
		let provider = creator(args)?;
		debug!(provider = %name, origin = %origin, "constructed credential provider");
		Ok(provider)
	}

	/// Like [`create_provider`](Self::create_provider), then check the instance
	/// implements every operation in `required`.
	pub fn create_provider_requiring(
		&self,
		name: &str,
		args: &ProviderArgs,
		required: &[Operation],
	) -> Result<Box<dyn CredentialProvider>, FactoryError> {
		let name = ProviderName::parse(name)?;
		let (creator, origin) = self.resolve(&name)?;
		let provider = creator(args)?;

		if let Some(&operation) = required.iter().find(|op| !provider.supports(**op)) {
			return Err(FactoryError::Contract {
				provider: name.to_string(),
				locator: origin,
				violation: ContractViolation::MissingOperation { operation },
			});
		}
		Ok(provider)
	}

	fn resolve(&self, name: &ProviderName) -> Result<(Creator, String), FactoryError> {
		if self.registry.contains(name.as_str()) {
			let creator = self.registry.get_creator(name.as_str())?;
			debug!(provider = %name, source = "registry", "resolved provider");
			return Ok((creator, REGISTRY_ORIGIN.to_string()));
		}

		name.check_locator_safe()?;
		let unit = self
			.resolver
			.resolve(name)
			.map_err(|source| FactoryError::Discovery {
				provider: name.to_string(),
				source,
			})?;

		let locator = unit.locator().to_string();
		let creator = unit
			.symbol(CONSTRUCTOR_SYMBOL)
			.ok_or_else(|| FactoryError::Contract {
				provider: name.to_string(),
				locator: locator.clone(),
				violation: ContractViolation::MissingSymbol {
					symbol: CONSTRUCTOR_SYMBOL,
				},
			})?;

		debug!(provider = %name, source = "discovery", locator = %locator, "resolved provider");
		Ok((creator, locator))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::contract::Credentials;
	use crate::error::{DiscoveryError, ProviderError};
	use crate::registry::creator;
	use crate::resolver::ModuleTable;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[derive(Debug)]
	struct Fixed {
		id: String,
	}

	impl CredentialProvider for Fixed {
		fn operations(&self) -> &'static [Operation] {
			&[Operation::GetIdPw]
		}

		fn get_id_pw(&self, _args: &ProviderArgs) -> Result<Credentials, ProviderError> {
			Ok(Credentials::new(self.id.clone(), "pw"))
		}
	}

	fn fixed(id: &'static str) -> Creator {
		creator(move |_| Ok(Box::new(Fixed { id: id.to_string() })))
	}

	fn discoverable() -> Arc<dyn ProviderResolver> {
		Arc::new(
			ModuleTable::new("providers")
				.with_module("shared", |m| {
					m.export(CONSTRUCTOR_SYMBOL, fixed("discovered"))
				})
				.with_module("malformed", |m| m.export("Provider", fixed("never"))),
		)
	}

	fn id(provider: &dyn CredentialProvider) -> String {
		provider.get_id_pw(&ProviderArgs::new()).unwrap().id
	}

	#[test]
	fn registered_creator_receives_construction_args() {
		let registry = CreatorRegistry::new();
		registry
			.register("echo", |args: &ProviderArgs| {
				let id = args.require(0, "id")?.to_string();
				Ok(Box::new(Fixed { id }) as Box<dyn CredentialProvider>)
			})
			.unwrap();
		let factory = ProviderFactory::new(&registry, discoverable());

		let provider = factory
			.create_provider("echo", &ProviderArgs::new().arg("alice"))
			.unwrap();
		assert_eq!(id(provider.as_ref()), "alice");
	}

	#[test]
	fn registration_shadows_discovery() {
		let registry = CreatorRegistry::new();
		let factory = ProviderFactory::new(&registry, discoverable());

		let provider = factory.create_provider("shared", &ProviderArgs::new()).unwrap();
		assert_eq!(id(provider.as_ref()), "discovered");

		registry.register_creator("shared", fixed("registered")).unwrap();
		let provider = factory.create_provider("shared", &ProviderArgs::new()).unwrap();
		assert_eq!(id(provider.as_ref()), "registered");
	}

	#[test]
	fn unknown_name_is_a_discovery_error() {
		let registry = CreatorRegistry::new();
		let factory = ProviderFactory::new(&registry, discoverable());

		let err = factory.create_provider("ghost", &ProviderArgs::new()).unwrap_err();
		match err {
			FactoryError::Discovery { provider, source } => {
				assert_eq!(provider, "ghost");
				assert!(matches!(source, DiscoveryError::UnitNotFound { .. }));
			}
			other => panic!("expected discovery error, got {other:?}"),
		}
	}

	#[test]
	fn unit_without_constructor_is_a_contract_error() {
		let registry = CreatorRegistry::new();
		let factory = ProviderFactory::new(&registry, discoverable());

		let err = factory.create_provider("malformed", &ProviderArgs::new()).unwrap_err();
		match err {
			FactoryError::Contract {
				locator, violation, ..
			} => {
				assert_eq!(locator, "providers::malformed");
				assert_eq!(
					violation,
					ContractViolation::MissingSymbol {
						symbol: CONSTRUCTOR_SYMBOL
					}
				);
			}
			other => panic!("expected contract error, got {other:?}"),
		}
	}

	#[test]
	fn constructor_failure_passes_through_unchanged() {
		let registry = CreatorRegistry::new();
		registry
			.register("broken", |_: &ProviderArgs| {
				Err(ProviderError::backend("vault sealed"))
			})
			.unwrap();
		let factory = ProviderFactory::new(&registry, discoverable());

		let err = factory.create_provider("broken", &ProviderArgs::new()).unwrap_err();
		assert!(err.is_construction());
		assert_eq!(err.to_string(), "backend error: vault sealed");
	}

	#[test]
	fn path_like_name_never_reaches_discovery() {
		let registry = CreatorRegistry::new();
		let factory = ProviderFactory::new(&registry, discoverable());

		let err = factory.create_provider("../shared", &ProviderArgs::new()).unwrap_err();
		assert!(matches!(err, FactoryError::InvalidName(_)));
		let err = factory.create_provider("", &ProviderArgs::new()).unwrap_err();
		assert!(matches!(err, FactoryError::InvalidName(_)));
	}

	#[test]
	fn registered_names_need_not_be_locator_safe() {
		let registry = CreatorRegistry::new();
		registry.register_creator("team vault", fixed("team")).unwrap();
		let factory = ProviderFactory::new(&registry, discoverable());

		let provider = factory.create_provider("team vault", &ProviderArgs::new()).unwrap();
		assert_eq!(id(provider.as_ref()), "team");

		let err = factory.create_provider("other vault", &ProviderArgs::new()).unwrap_err();
		assert!(matches!(err, FactoryError::InvalidName(_)));
	}

	#[test]
	fn required_operations_are_checked() {
		let registry = CreatorRegistry::new();
		let factory = ProviderFactory::new(&registry, discoverable());

		let err = factory
			.create_provider_requiring("shared", &ProviderArgs::new(), Operation::ALL)
			.unwrap_err();
		match err {
			FactoryError::Contract { violation, .. } => assert_eq!(
				violation,
				ContractViolation::MissingOperation {
					operation: Operation::Get
				}
			),
			other => panic!("expected contract error, got {other:?}"),
		}

		assert!(factory
			.create_provider_requiring("shared", &ProviderArgs::new(), &[Operation::GetIdPw])
			.is_ok());
	}

	#[test]
	fn every_call_constructs_afresh() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let registry = CreatorRegistry::new();
		registry
			.register("counted", move |_: &ProviderArgs| {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(Box::new(Fixed { id: "n".into() }) as Box<dyn CredentialProvider>)
			})
			.unwrap();
		let factory = ProviderFactory::new(&registry, discoverable());

		for _ in 0..3 {
			factory.create_provider("counted", &ProviderArgs::new()).unwrap();
		}
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}
}

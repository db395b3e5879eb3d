// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end lookups through the public API.

use std::io::Write;
use std::sync::Arc;

use credfetch::providers::builtin_modules;
use credfetch::{
	create_provider, creators, CreatorRegistry, CredentialProvider, Credentials, FactoryError,
	Operation, ProviderArgs, ProviderError, ProviderFactory, RegistryError,
};

#[derive(Debug)]
struct Static {
	id: &'static str,
	secret: &'static str,
}

impl CredentialProvider for Static {
	fn operations(&self) -> &'static [Operation] {
		&[Operation::GetIdPw]
	}

	fn get_id_pw(&self, _args: &ProviderArgs) -> Result<Credentials, ProviderError> {
		Ok(Credentials::new(self.id, self.secret))
	}
}

#[test]
fn registered_static_provider_returns_its_pair() {
	creators()
		.register("static", |_: &ProviderArgs| {
			Ok(Box::new(Static {
				id: "alice",
				secret: "secret1",
			}) as Box<dyn CredentialProvider>)
		})
		.unwrap();

	let provider = create_provider("static", &ProviderArgs::new()).unwrap();
	let (id, secret) = provider.get_id_pw(&ProviderArgs::new()).unwrap().into_pair();
	assert_eq!(id, "alice");
	assert_eq!(secret.expose(), "secret1");

	let again = creators().register("static", |_: &ProviderArgs| {
		Ok(Box::new(Static {
			id: "mallory",
			secret: "x",
		}) as Box<dyn CredentialProvider>)
	});
	assert_eq!(
		again.unwrap_err(),
		RegistryError::AlreadyRegistered("static".to_string())
	);
	assert!(creators().list_names().contains(&"static".to_string()));
}

#[test]
fn unknown_provider_is_a_discovery_error() {
	let err = create_provider("ghost", &ProviderArgs::new()).unwrap_err();
	assert!(err.is_discovery(), "got {err:?}");
	assert!(err.to_string().contains("providers::ghost"));
}

#[test]
fn dotenv_provider_reads_pair_and_keys() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "ID=bob").unwrap();
	writeln!(file, "PW=hunter2").unwrap();

	let args = ProviderArgs::new().arg(file.path().display().to_string());
	let provider = create_provider("dotenv", &args).unwrap();

	let (id, pw) = provider.get_id_pw(&ProviderArgs::new()).unwrap().into_pair();
	assert_eq!((id.as_str(), pw.expose().as_str()), ("bob", "hunter2"));

	let err = provider.get("MISSING").unwrap_err();
	assert!(err.is_not_found());
}

#[test]
fn dotenv_construction_failure_is_passed_through() {
	let dir = tempfile::tempdir().unwrap();
	let args = ProviderArgs::new().named("env_file", dir.path().join("nope.env").display().to_string());

	match create_provider("dotenv", &args).unwrap_err() {
		FactoryError::Construction(ProviderError::StoreMissing(path)) => {
			assert!(path.ends_with("nope.env"))
		}
		other => panic!("expected construction failure, got {other:?}"),
	}
}

#[test]
fn registration_overrides_builtin_module() {
	let registry = CreatorRegistry::new();
	let factory = ProviderFactory::new(&registry, Arc::new(builtin_modules()));

	registry
		.register("keepassxc", |_: &ProviderArgs| {
			Ok(Box::new(Static {
				id: "stub",
				secret: "stub-pw",
			}) as Box<dyn CredentialProvider>)
		})
		.unwrap();

	// The real keepassxc provider would demand a db_path here.
	let provider = factory.create_provider("keepassxc", &ProviderArgs::new()).unwrap();
	assert_eq!(provider.get_id_pw(&ProviderArgs::new()).unwrap().id, "stub");
}

#[test]
fn keepassxc_lacks_keyed_lookup() {
	let registry = CreatorRegistry::new();
	let factory = ProviderFactory::new(&registry, Arc::new(builtin_modules()));
	let args = ProviderArgs::new().arg("vault.kdbx").named("cli", "keepassxc-cli");

	let err = factory
		.create_provider_requiring("keepassxc", &args, &[Operation::Get])
		.unwrap_err();
	assert!(err.is_contract(), "got {err:?}");
	assert!(err.to_string().contains("providers::keepassxc"));
}

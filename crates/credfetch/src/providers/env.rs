// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process environment variables, optionally under a common prefix.

use std::env::VarError;

use credfetch_core::{CredentialProvider, Credentials, Operation, ProviderArgs, ProviderError};
use credfetch_secret::SecretString;

use super::dotenv::{DEFAULT_ID_KEY, DEFAULT_PW_KEY};

pub const NAME: &str = "env";

#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
	prefix: String,
}

impl EnvProvider {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	pub fn from_args(args: &ProviderArgs) -> Result<Self, ProviderError> {
		Ok(Self::new(args.bind_or(0, "prefix", "")?))
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	fn var(&self, key: &str) -> Result<SecretString, ProviderError> {
		let name = format!("{}{}", self.prefix, key);
		match std::env::var(&name) {
			Ok(value) => Ok(SecretString::new(value)),
			Err(VarError::NotPresent) => Err(ProviderError::not_found(name, "the process environment")),
			Err(VarError::NotUnicode(_)) => Err(ProviderError::invalid_argument(name, "value is not valid unicode")),
		}
	}
}

impl CredentialProvider for EnvProvider {
	fn operations(&self) -> &'static [Operation] {
		Operation::ALL
	}

	fn get_id_pw(&self, args: &ProviderArgs) -> Result<Credentials, ProviderError> {
		let id = self.var(args.bind_or(0, "id", DEFAULT_ID_KEY)?)?;
		let secret = self.var(args.bind_or(1, "pw", DEFAULT_PW_KEY)?)?;
		Ok(Credentials {
			id: id.expose().clone(),
			secret,
		})
	}

	fn get(&self, key: &str) -> Result<SecretString, ProviderError> {
		self.var(key)
	}
}

/// Constructor exported into the built-in namespace.
pub fn create(args: &ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError> {
	Ok(Box::new(EnvProvider::from_args(args)?))
}

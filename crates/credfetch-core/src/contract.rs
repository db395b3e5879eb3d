// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The capability contract every credential source satisfies.

use std::fmt;

use credfetch_secret::SecretString;

use crate::args::ProviderArgs;
use crate::error::ProviderError;

/// Operations a provider can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	GetIdPw,
	Get,
}

impl Operation {
	pub const ALL: &'static [Operation] = &[Operation::GetIdPw, Operation::Get];

	pub fn as_str(self) -> &'static str {
		match self {
			Operation::GetIdPw => "get_id_pw",
			Operation::Get => "get",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An identifier/secret pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
	pub id: String,
	pub secret: SecretString,
}

impl Credentials {
	pub fn new(id: impl Into<String>, secret: impl Into<SecretString>) -> Self {
		Self {
			id: id.into(),
			secret: secret.into(),
		}
	}

	pub fn into_pair(self) -> (String, SecretString) {
		(self.id, self.secret)
	}
}

/// A credential source.
///
/// Providers declare what they implement through [`operations`](Self::operations);
/// the lookup methods default to [`ProviderError::NotImplemented`]. Lookup
/// arguments are provider-defined and passed through untouched.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
	/// Operations this provider actually implements.
	fn operations(&self) -> &'static [Operation];

	fn supports(&self, operation: Operation) -> bool {
		self.operations().contains(&operation)
	}

	/// Retrieve the primary identifier/secret pair.
	fn get_id_pw(&self, args: &ProviderArgs) -> Result<Credentials, ProviderError> {
		let _ = args;
		Err(ProviderError::NotImplemented {
			operation: Operation::GetIdPw,
		})
	}

	/// Retrieve an arbitrary secret by key.
	fn get(&self, key: &str) -> Result<SecretString, ProviderError> {
		let _ = key;
		Err(ProviderError::NotImplemented {
			operation: Operation::Get,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug)]
	struct Bare;

	impl CredentialProvider for Bare {
		fn operations(&self) -> &'static [Operation] {
			&[]
		}
	}

	#[test]
	fn omitted_operations_are_not_implemented() {
		let provider = Bare;

		let err = provider.get_id_pw(&ProviderArgs::new()).unwrap_err();
		assert!(matches!(
			err,
			ProviderError::NotImplemented {
				operation: Operation::GetIdPw
			}
		));

		let err = provider.get("KEY").unwrap_err();
		assert_eq!(err.to_string(), "get is not implemented by this provider");
		assert!(!provider.supports(Operation::Get));
	}

	#[test]
	fn credentials_debug_redacts_secret() {
		let creds = Credentials::new("alice", "secret1");
		let debug = format!("{creds:?}");
		assert!(debug.contains("alice"));
		assert!(!debug.contains("secret1"));

		let (id, secret) = creds.into_pair();
		assert_eq!(id, "alice");
		assert_eq!(secret.expose(), "secret1");
	}
}

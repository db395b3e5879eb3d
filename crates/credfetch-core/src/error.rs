// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for registration, discovery, construction and lookup.

use std::path::PathBuf;

use crate::contract::Operation;

/// Errors raised by concrete providers, during construction or lookup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("{operation} is not implemented by this provider")]
	NotImplemented { operation: Operation },

	#[error("'{key}' not found in {store}")]
	NotFound { key: String, store: String },

	#[error("missing required argument '{name}'")]
	MissingArgument { name: &'static str },

	#[error("invalid argument '{name}': {reason}")]
	InvalidArgument { name: String, reason: String },

	#[error("backing store {} was not found", .0.display())]
	StoreMissing(PathBuf),

	#[error("I/O error on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("parse error at {location}: {message}")]
	Parse { location: String, message: String },

	#[error("`{program}` failed ({status}): {stderr}")]
	Command {
		program: String,
		status: String,
		stderr: String,
	},

	#[error("backend error: {0}")]
	Backend(String),
}

impl ProviderError {
	pub fn not_found(key: impl Into<String>, store: impl Into<String>) -> Self {
		Self::NotFound {
			key: key.into(),
			store: store.into(),
		}
	}

	pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidArgument {
			name: name.into(),
			reason: reason.into(),
		}
	}

	pub fn parse(location: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Parse {
			location: location.into(),
			message: message.into(),
		}
	}

	pub fn backend(msg: impl Into<String>) -> Self {
		Self::Backend(msg.into())
	}

	/// Whether this is a lookup miss rather than a broken store.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

/// A provider name that cannot be used as a registry key or locator part.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid provider name '{name}': {reason}")]
pub struct NameError {
	pub name: String,
	pub reason: &'static str,
}

/// Errors from the creator registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("provider '{0}' is already registered")]
	AlreadyRegistered(String),

	#[error("provider '{0}' is not registered")]
	NotFound(String),

	#[error(transparent)]
	InvalidName(#[from] NameError),
}

/// Discovery could not produce a unit for a provider name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
	#[error("no provider unit found (tried {})", .locators.join(", "))]
	UnitNotFound { locators: Vec<String> },

	#[error("failed to load provider unit {locator}: {reason}")]
	LoadFailed { locator: String, reason: String },
}

/// How a unit or an instance falls short of the provider contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
	#[error("unit does not export `{symbol}`")]
	MissingSymbol { symbol: &'static str },

	#[error("provider does not implement {operation}")]
	MissingOperation { operation: Operation },
}

/// Errors from [`ProviderFactory`](crate::ProviderFactory).
///
/// Callers branch on the variant: `Discovery` means no such provider exists,
/// `Contract` means it exists but is malformed, `Construction` carries the
/// provider's own failure unchanged.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
	#[error(transparent)]
	InvalidName(#[from] NameError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error("provider '{provider}' could not be discovered: {source}")]
	Discovery {
		provider: String,
		#[source]
		source: DiscoveryError,
	},

	#[error("provider '{provider}' from {locator} breaks the provider contract: {violation}")]
	Contract {
		provider: String,
		locator: String,
		violation: ContractViolation,
	},

	#[error(transparent)]
	Construction(#[from] ProviderError),
}

impl FactoryError {
	pub fn is_discovery(&self) -> bool {
		matches!(self, Self::Discovery { .. })
	}

	pub fn is_contract(&self) -> bool {
		matches!(self, Self::Contract { .. })
	}

	pub fn is_construction(&self) -> bool {
		matches!(self, Self::Construction(_))
	}
}

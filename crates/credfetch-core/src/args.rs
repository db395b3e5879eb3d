// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opaque construction and lookup arguments.
//!
//! The core passes these through without looking at them. Providers bind
//! their parameters by position or by name, mirroring how a call site would
//! pass them either way.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProviderError;

/// Positional and named string arguments for a creator or a lookup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderArgs {
	positional: Vec<String>,
	named: BTreeMap<String, String>,
}

impl ProviderArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from positional values only.
	pub fn from_positional<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			positional: values.into_iter().map(Into::into).collect(),
			named: BTreeMap::new(),
		}
	}

	pub fn arg(mut self, value: impl Into<String>) -> Self {
		self.positional.push(value.into());
		self
	}

	pub fn named(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.named.insert(name.into(), value.into());
		self
	}

	pub fn push(&mut self, value: impl Into<String>) {
		self.positional.push(value.into());
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.named.insert(name.into(), value.into());
	}

	pub fn positional(&self) -> &[String] {
		&self.positional
	}

	pub fn named_values(&self) -> &BTreeMap<String, String> {
		&self.named
	}

	pub fn is_empty(&self) -> bool {
		self.positional.is_empty() && self.named.is_empty()
	}

	/// Bind parameter `name` at position `index`.
	///
	/// Supplying the same parameter both ways is rejected.
	pub fn bind(&self, index: usize, name: &str) -> Result<Option<&str>, ProviderError> {
		match (self.positional.get(index), self.named.get(name)) {
			(Some(_), Some(_)) => Err(ProviderError::invalid_argument(
				name,
				"given both positionally and by name",
			)),
			(Some(value), None) | (None, Some(value)) => Ok(Some(value.as_str())),
			(None, None) => Ok(None),
		}
	}

	pub fn bind_or<'a>(
		&'a self,
		index: usize,
		name: &str,
		default: &'a str,
	) -> Result<&'a str, ProviderError> {
		Ok(self.bind(index, name)?.unwrap_or(default))
	}

	pub fn require(&self, index: usize, name: &'static str) -> Result<&str, ProviderError> {
		self.bind(index, name)?
			.ok_or(ProviderError::MissingArgument { name })
	}

	/// `other` when it carries any value, otherwise `self`.
	///
	/// Replacement is all-or-nothing: keeping part of `self` could bind one
	/// parameter both positionally and by name.
	pub fn or_override(self, other: ProviderArgs) -> Self {
		if other.is_empty() {
			self
		} else {
			other
		}
	}
}

// Values may be passphrases; only the shape is printed.
impl fmt::Debug for ProviderArgs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderArgs")
			.field("positional", &self.positional.len())
			.field("named", &self.named.keys().collect::<Vec<_>>())
			.finish()
	}
}

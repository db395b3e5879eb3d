// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// A non-empty provider name.
///
/// Any non-empty string may be registered. Names that reach discovery are
/// substituted into locators (module paths, library file names) and must
/// also pass [`ProviderName::check_locator_safe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderName(String);

impl ProviderName {
	pub fn parse(name: &str) -> Result<Self, NameError> {
		if name.is_empty() {
			return Err(NameError {
				name: String::new(),
				reason: "must not be empty",
			});
		}
		Ok(Self(name.to_owned()))
	}

	/// Reject names that cannot be embedded in a locator.
	pub fn check_locator_safe(&self) -> Result<(), NameError> {
		let reason = if self.0 == "." || self.0 == ".." {
			"must not be a relative path component"
		} else if self.0.chars().any(char::is_whitespace) {
			"must not contain whitespace"
		} else if self.0.contains(['/', '\\']) {
			"must not contain path separators"
		} else {
			return Ok(());
		};
		Err(NameError {
			name: self.0.clone(),
			reason,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl FromStr for ProviderName {
	type Err = NameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Borrow<str> for ProviderName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for ProviderName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ProviderName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

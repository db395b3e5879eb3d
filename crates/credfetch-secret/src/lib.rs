// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper for credential values handed out by providers.
//!
//! Every secret a provider returns travels inside a [`Secret<T>`]. The wrapper
//! keeps the value out of `Debug`, `Display` and (with the `serde`
//! feature) serialized output, and wipes
//! the memory when dropped. Reading the value requires an explicit
//! [`Secret::expose`] call.
//!
//! ```
//! use credfetch_secret::SecretString;
//!
//! let pw = SecretString::from("hunter2");
//!
//! assert_eq!(format!("{pw}"), "[REDACTED]");
//! assert_eq!(format!("{pw:?}"), "Secret(\"[REDACTED]\")");
//! assert_eq!(pw.expose(), "hunter2");
//! ```
//!
//! Structured logging goes through the same redacting `Display`/`Debug`
//! impls, so `tracing::debug!(secret = %pw)` logs `[REDACTED]`.

use std::fmt;

use zeroize::Zeroize;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value that never prints itself.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string such as a password or API token.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Call sites that read secrets stay greppable.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_owned())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	use super::{Secret, REDACTED};

	// Serializing never writes the value; config dumps show the placeholder.
	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

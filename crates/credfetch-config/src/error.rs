// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// I/O error without a file attached (current directory lookups)
	#[error("I/O error: {0}")]
	CurrentDir(#[from] std::io::Error),

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Invalid value
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	/// Home directory not found
	#[error("Could not determine home directory")]
	HomeDirNotFound,
}

impl ConfigError {
	/// Create an invalid value error
	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `KEY=value` files.
//!
//! Construction: `env_file` (position 0 or named), default `.env`. The file
//! is read once, when the provider is built.
//!
//! `get_id_pw` arguments: `id` (position 0, default `ID`) and `pw`
//! (position 1, default `PW`) name the two keys to return.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use credfetch_core::{CredentialProvider, Credentials, Operation, ProviderArgs, ProviderError};
use credfetch_secret::SecretString;
use tracing::debug;

pub const NAME: &str = "dotenv";
pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_ID_KEY: &str = "ID";
pub const DEFAULT_PW_KEY: &str = "PW";

#[derive(Debug)]
pub struct DotenvProvider {
	env_file: PathBuf,
	variables: HashMap<String, SecretString>,
}

impl DotenvProvider {
	pub fn open(env_file: impl Into<PathBuf>) -> Result<Self, ProviderError> {
		let env_file = env_file.into();
		let contents = std::fs::read_to_string(&env_file).map_err(|e| match e.kind() {
			io::ErrorKind::NotFound => ProviderError::StoreMissing(env_file.clone()),
			_ => ProviderError::Io {
				path: env_file.clone(),
				source: e,
			},
		})?;

		let variables = parse(&contents, &env_file)?;
		debug!(path = %env_file.display(), count = variables.len(), "loaded env file");
		Ok(Self {
			env_file,
			variables,
		})
	}

	pub fn from_args(args: &ProviderArgs) -> Result<Self, ProviderError> {
		Self::open(args.bind_or(0, "env_file", DEFAULT_ENV_FILE)?)
	}

	pub fn env_file(&self) -> &Path {
		&self.env_file
	}

	pub fn contains(&self, key: &str) -> bool {
		self.variables.contains_key(key)
	}

	fn store(&self) -> String {
		format!("env file {}", self.env_file.display())
	}
}

impl CredentialProvider for DotenvProvider {
	fn operations(&self) -> &'static [Operation] {
		Operation::ALL
	}

	fn get_id_pw(&self, args: &ProviderArgs) -> Result<Credentials, ProviderError> {
		let id_key = args.bind_or(0, "id", DEFAULT_ID_KEY)?;
		let pw_key = args.bind_or(1, "pw", DEFAULT_PW_KEY)?;

		match (self.variables.get(id_key), self.variables.get(pw_key)) {
			(Some(id), Some(pw)) => Ok(Credentials {
				id: id.expose().clone(),
				secret: pw.clone(),
			}),
			_ => Err(ProviderError::not_found(
				format!("{id_key} and {pw_key}"),
				self.store(),
			)),
		}
	}

	fn get(&self, key: &str) -> Result<SecretString, ProviderError> {
		self.variables
			.get(key)
			.cloned()
			.ok_or_else(|| ProviderError::not_found(key, self.store()))
	}
}

/// Constructor exported into the built-in namespace.
pub fn create(args: &ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError> {
	Ok(Box::new(DotenvProvider::from_args(args)?))
}

/// Parse env file contents.
///
/// Blank lines and `#` comments are skipped; each other line splits at its
/// first `=`. Keys and values are trimmed, then surrounding `"` and `'`
/// characters are removed from the value. Later keys override earlier ones.
pub fn parse(contents: &str, origin: &Path) -> Result<HashMap<String, SecretString>, ProviderError> {
	let mut variables = HashMap::new();
	for (index, raw) in contents.lines().enumerate() {
		let line = raw.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		let Some((key, value)) = line.split_once('=') else {
			return Err(ProviderError::parse(
				format!("{}:{}", origin.display(), index + 1),
				"expected KEY=VALUE",
			));
		};

		let value = value.trim().trim_matches('"').trim_matches('\'');
		variables.insert(key.trim().to_string(), SecretString::from(value));
	}
	Ok(variables)
}

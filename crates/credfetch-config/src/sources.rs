// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::*;
use crate::paths::{PathsConfig, SYSTEM_CONFIG_FILE};
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	WorkspaceFile = 40,
	ExplicitFile = 45,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied when the runtime config is built.
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
	required: bool,
}

impl FileSource {
	/// System config: /etc/credfetch/config.toml
	pub fn system() -> Self {
		Self::custom(
			PathBuf::from(SYSTEM_CONFIG_FILE),
			Precedence::SystemFile,
			"system-config",
		)
	}

	/// User config: ~/.config/credfetch/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self::custom(
			paths.user_config_file.clone(),
			Precedence::UserFile,
			"user-config",
		)
	}

	/// Workspace config: .credfetch/config.toml
	pub fn workspace() -> Result<Self, ConfigError> {
		Ok(Self::custom(
			crate::paths::workspace_config_path()?,
			Precedence::WorkspaceFile,
			"workspace-config",
		))
	}

	/// File named with `--config`; it must exist.
	pub fn explicit(path: PathBuf) -> Self {
		Self {
			required: true,
			..Self::custom(path, Precedence::ExplicitFile, "explicit-config")
		}
	}

	/// Custom file path with specified precedence
	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
			required: false,
		}
	}

	pub fn is_required(&self) -> bool {
		self.required
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
			path: self.path.clone(),
			source,
		})?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Recognised: `CREDFETCH_DEFAULT_PROVIDER`, `CREDFETCH_PROVIDER_PATH`
/// (platform path list), `CREDFETCH_LOG_LEVEL`, `CREDFETCH_LOG_FORMAT`.
pub struct EnvSource;

impl EnvSource {
	/// Build a layer from `(key, value)` pairs.
	pub fn layer_from<I>(vars: I) -> ConfigLayer
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut layer = ConfigLayer::default();

		for (key, value) in vars {
			if !key.starts_with("CREDFETCH_") {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key.as_str() {
				"CREDFETCH_DEFAULT_PROVIDER" => {
					layer
						.global
						.get_or_insert_with(GlobalLayer::default)
						.default_provider = Some(value);
				}
				"CREDFETCH_PROVIDER_PATH" => {
					layer
						.global
						.get_or_insert_with(GlobalLayer::default)
						.provider_paths = Some(std::env::split_paths(&value).collect());
				}
				"CREDFETCH_LOG_LEVEL" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.level = Some(value);
				}
				"CREDFETCH_LOG_FORMAT" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.format = Some(value);
				}
				_ => {
					// Unknown CREDFETCH_ variable, ignore
				}
			}
		}

		layer
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(Self::layer_from(std::env::vars()))
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub provider: Option<String>,
	pub provider_paths: Vec<PathBuf>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let mut layer = ConfigLayer::default();

		if let Some(ref provider) = self.overrides.provider {
			layer
				.global
				.get_or_insert_with(GlobalLayer::default)
				.default_provider = Some(provider.clone());
		}

		if !self.overrides.provider_paths.is_empty() {
			layer
				.global
				.get_or_insert_with(GlobalLayer::default)
				.provider_paths = Some(self.overrides.provider_paths.clone());
		}

		if let Some(ref level) = self.overrides.log_level {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.level = Some(level.clone());
		}

		if let Some(ref format) = self.overrides.log_format {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.format = Some(format.clone());
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::ExplicitFile);
		assert!(Precedence::ExplicitFile > Precedence::WorkspaceFile);
		assert!(Precedence::WorkspaceFile > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::SystemFile);
		assert!(Precedence::SystemFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.global.is_none());
		assert!(layer.providers.is_none());
	}

	#[test]
	fn test_file_source_missing_file_returns_empty() {
		let source = FileSource::custom(
			PathBuf::from("/nonexistent/config.toml"),
			Precedence::UserFile,
			"test",
		);
		let layer = source.load().unwrap();
		assert!(layer.global.is_none());
	}

	#[test]
	fn test_explicit_file_must_exist() {
		let source = FileSource::explicit(PathBuf::from("/nonexistent/credfetch.toml"));
		assert!(source.is_required());
		assert!(matches!(source.load(), Err(ConfigError::Io { .. })));
	}

	#[test]
	fn test_file_source_reads_provider_profiles() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[global]
default_provider = "keepassxc"

[providers.keepassxc]
args = ["/vaults/main.kdbx"]
lookup_options = {{ entry = "mail" }}
"#
		)
		.unwrap();

		let source = FileSource::custom(file.path().to_path_buf(), Precedence::UserFile, "test");
		let layer = source.load().unwrap();

		assert_eq!(
			layer.global.unwrap().default_provider.as_deref(),
			Some("keepassxc")
		);
		let keepassxc = &layer.providers.unwrap().entries["keepassxc"];
		assert_eq!(keepassxc.args.as_ref().unwrap()[0], "/vaults/main.kdbx");
		assert_eq!(keepassxc.lookup_options.as_ref().unwrap()["entry"], "mail");
	}

	#[test]
	fn test_file_source_reports_parse_errors_with_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[global\ndefault_provider = 1").unwrap();

		let source = FileSource::custom(file.path().to_path_buf(), Precedence::UserFile, "test");
		match source.load() {
			Err(ConfigError::TomlParse { path, .. }) => assert_eq!(path, file.path()),
			other => panic!("expected parse error, got {other:?}"),
		}
	}

	#[test]
	fn test_env_layer_reads_known_variables() {
		let layer = EnvSource::layer_from([
			("CREDFETCH_DEFAULT_PROVIDER".to_string(), "dotenv".to_string()),
			("CREDFETCH_LOG_LEVEL".to_string(), " debug ".to_string()),
			("CREDFETCH_LOG_FORMAT".to_string(), String::new()),
			("CREDFETCH_UNKNOWN".to_string(), "x".to_string()),
			("HOME".to_string(), "/home/u".to_string()),
		]);

		let global = layer.global.unwrap();
		assert_eq!(global.default_provider.as_deref(), Some("dotenv"));
		assert!(global.provider_paths.is_none());
		let logging = layer.logging.unwrap();
		assert_eq!(logging.level.as_deref(), Some("debug"));
		assert!(logging.format.is_none());
	}

	#[test]
	fn test_env_provider_path_is_split() {
		let joined = std::env::join_paths(["/opt/a", "/opt/b"]).unwrap();
		let layer = EnvSource::layer_from([(
			"CREDFETCH_PROVIDER_PATH".to_string(),
			joined.to_string_lossy().into_owned(),
		)]);
		assert_eq!(
			layer.global.unwrap().provider_paths.unwrap(),
			[PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
		);
	}

	#[test]
	fn test_cli_source_sets_only_given_fields() {
		let source = CliSource::new(CliOverrides {
			log_level: Some("trace".to_string()),
			..Default::default()
		});
		let layer = source.load().unwrap();
		assert!(layer.global.is_none());
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("trace"));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolved runtime configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use credfetch_core::ProviderArgs;

use crate::layer::{ConfigLayer, GlobalLayer, LoggingLayer, ProviderLayer};
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Fully merged configuration with defaults applied.
#[derive(Debug, Clone, Default)]
pub struct CredfetchConfig {
	pub global: GlobalConfig,
	pub providers: BTreeMap<String, ProviderProfile>,
	pub logging: LoggingConfig,
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
	/// Provider used when none is named on the command line.
	pub default_provider: Option<String>,
	/// Directories searched for provider libraries.
	pub provider_paths: Vec<PathBuf>,
}

/// Stored arguments for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
	pub args: Vec<String>,
	pub options: BTreeMap<String, String>,
	pub lookup_args: Vec<String>,
	pub lookup_options: BTreeMap<String, String>,
}

impl ProviderProfile {
	/// Arguments handed to the provider's constructor.
	pub fn construction(&self) -> ProviderArgs {
		to_args(&self.args, &self.options)
	}

	/// Arguments handed to `get_id_pw`.
	pub fn lookup(&self) -> ProviderArgs {
		to_args(&self.lookup_args, &self.lookup_options)
	}
}

fn to_args(positional: &[String], named: &BTreeMap<String, String>) -> ProviderArgs {
	let mut args = ProviderArgs::from_positional(positional.iter().cloned());
	for (key, value) in named {
		args.insert(key.clone(), value.clone());
	}
	args
}

impl fmt::Debug for ProviderProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderProfile")
			.field("args", &self.args.len())
			.field("options", &self.options.keys().collect::<Vec<_>>())
			.field("lookup_args", &self.lookup_args.len())
			.field("lookup_options", &self.lookup_options.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

impl FromStr for LogLevel {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"error" => Ok(LogLevel::Error),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"info" => Ok(LogLevel::Info),
			"debug" => Ok(LogLevel::Debug),
			"trace" => Ok(LogLevel::Trace),
			_ => Err(ConfigError::invalid_value(
				"logging.level",
				format!("unknown log level '{s}' (expected error, warn, info, debug or trace)"),
			)),
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl FromStr for LogFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"pretty" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			"compact" => Ok(LogFormat::Compact),
			_ => Err(ConfigError::invalid_value(
				"logging.format",
				format!("unknown log format '{s}' (expected pretty, json or compact)"),
			)),
		}
	}
}

impl CredfetchConfig {
	/// Build runtime config from a merged layer.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			global: build_global_config(layer.global),
			providers: layer
				.providers
				.map(|p| {
					p.entries
						.into_iter()
						.map(|(name, provider)| (name, build_provider_profile(provider)))
						.collect()
				})
				.unwrap_or_default(),
			logging: build_logging_config(layer.logging)?,
			paths,
		})
	}

	/// Stored profile for `name`, or an empty one.
	pub fn profile(&self, name: &str) -> ProviderProfile {
		self.providers.get(name).cloned().unwrap_or_default()
	}
}

fn build_global_config(layer: Option<GlobalLayer>) -> GlobalConfig {
	let layer = layer.unwrap_or_default();
	GlobalConfig {
		default_provider: layer.default_provider,
		provider_paths: layer.provider_paths.unwrap_or_default(),
	}
}

fn build_provider_profile(layer: ProviderLayer) -> ProviderProfile {
	ProviderProfile {
		args: layer.args.unwrap_or_default(),
		options: layer.options.unwrap_or_default(),
		lookup_args: layer.lookup_args.unwrap_or_default(),
		lookup_options: layer.lookup_options.unwrap_or_default(),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	Ok(LoggingConfig {
		level: layer
			.level
			.as_deref()
			.map(str::parse::<LogLevel>)
			.transpose()?
			.unwrap_or_default(),
		format: layer
			.format
			.as_deref()
			.map(str::parse::<LogFormat>)
			.transpose()?
			.unwrap_or_default(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_from_empty_layer() {
		let config = CredfetchConfig::from_layer(ConfigLayer::default(), PathsConfig::default())
			.unwrap();
		assert_eq!(config.global, GlobalConfig::default());
		assert!(config.providers.is_empty());
		assert_eq!(config.logging.level, LogLevel::Warn);
		assert_eq!(config.logging.format, LogFormat::Pretty);
	}

	#[test]
	fn test_profile_produces_provider_args() {
		let layer: ConfigLayer = toml::from_str(
			r#"
			[providers.keepassxc]
			args = ["/vaults/main.kdbx"]
			options = { cli = "/usr/bin/keepassxc-cli" }
			lookup_args = ["db-pass"]
			lookup_options = { entry = "mail" }
			"#,
		)
		.unwrap();
		let config = CredfetchConfig::from_layer(layer, PathsConfig::default()).unwrap();

		let profile = config.profile("keepassxc");
		let construction = profile.construction();
		assert_eq!(construction.positional(), ["/vaults/main.kdbx"]);
		assert_eq!(construction.named_values()["cli"], "/usr/bin/keepassxc-cli");

		let lookup = profile.lookup();
		assert_eq!(lookup.require(0, "db_pw").unwrap(), "db-pass");
		assert_eq!(lookup.require(1, "entry").unwrap(), "mail");

		assert!(config.profile("dotenv").construction().is_empty());
	}

	#[test]
	fn test_unknown_log_format_is_rejected() {
		let layer = ConfigLayer {
			logging: Some(LoggingLayer {
				level: None,
				format: Some("xml".to_string()),
			}),
			..Default::default()
		};
		let err = CredfetchConfig::from_layer(layer, PathsConfig::default()).unwrap_err();
		assert!(err.to_string().contains("logging.format"));
	}

	#[test]
	fn test_log_level_parsing_is_case_insensitive() {
		assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
		assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
		assert!("loud".parse::<LogLevel>().is_err());
		assert_eq!(LogLevel::Trace.to_string(), "trace");
	}

	#[test]
	fn test_profile_debug_hides_values() {
		let profile = build_provider_profile(ProviderLayer {
			lookup_args: Some(vec!["hunter2".to_string()]),
			..Default::default()
		});
		let config = CredfetchConfig {
			providers: BTreeMap::from([("keepassxc".to_string(), profile)]),
			..Default::default()
		};
		assert!(!format!("{config:?}").contains("hunter2"));
	}
}

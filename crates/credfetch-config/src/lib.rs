// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for credfetch.
//!
//! Layers, lowest to highest precedence: built-in defaults,
//! `/etc/credfetch/config.toml`, `$XDG_CONFIG_HOME/credfetch/config.toml`,
//! `.credfetch/config.toml` in the working directory, a file passed with
//! `--config`, `CREDFETCH_*` environment variables, command-line flags.
//!
//! ```toml
//! [global]
//! default_provider = "keepassxc"
//! provider_paths = ["/usr/lib/credfetch"]
//!
//! [providers.keepassxc]
//! args = ["/home/me/vault.kdbx"]
//! lookup_options = { entry = "mail" }
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{CredfetchConfig, GlobalConfig, LogFormat, LogLevel, LoggingConfig, ProviderProfile};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with default precedence.
pub fn load_config() -> Result<CredfetchConfig, ConfigError> {
	load_config_with_cli(CliOverrides::default())
}

/// Load configuration with CLI overrides.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<CredfetchConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system()));
	registry.register(Box::new(sources::FileSource::user(&paths)));
	if let Ok(ws) = sources::FileSource::workspace() {
		registry.register(Box::new(ws));
	}
	if let Some(ref file) = cli.config_file {
		registry.register(Box::new(sources::FileSource::explicit(file.clone())));
	}
	registry.register(Box::new(sources::EnvSource));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use credfetch_core::ProviderName;
use tracing::warn;

use crate::runtime::CredfetchConfig;
use crate::ConfigError;

/// Validate the configuration.
///
/// Returns Ok(()) if valid, or ConfigError::InvalidValue with details.
pub fn validate_config(config: &CredfetchConfig) -> Result<(), ConfigError> {
	validate_global(config)?;
	validate_providers(config)?;

	Ok(())
}

fn validate_global(config: &CredfetchConfig) -> Result<(), ConfigError> {
	if let Some(ref name) = config.global.default_provider {
		ProviderName::parse(name).map_err(|e| {
			ConfigError::invalid_value("global.default_provider", e.to_string())
		})?;
	}

	for dir in &config.global.provider_paths {
		if !dir.is_dir() {
			warn!(path = %dir.display(), "provider path is not a directory");
		}
	}

	Ok(())
}

fn validate_providers(config: &CredfetchConfig) -> Result<(), ConfigError> {
	for name in config.providers.keys() {
		ProviderName::parse(name)
			.map_err(|e| ConfigError::invalid_value(format!("providers.{name}"), e.to_string()))?;
	}

	Ok(())
}

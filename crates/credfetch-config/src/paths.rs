// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/credfetch/config.toml";
pub const WORKSPACE_CONFIG_FILE: &str = ".credfetch/config.toml";

/// Resolved config file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/credfetch/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/credfetch/config.toml
	pub system_config_file: PathBuf,
}

impl PathsConfig {
	/// Get the config directory (parent of user_config_file)
	pub fn config_dir(&self) -> PathBuf {
		self
			.user_config_file
			.parent()
			.map(|p| p.to_path_buf())
			.unwrap_or_else(|| self.user_config_file.clone())
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/credfetch/config.toml"),
			system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
		}
	}
}

/// Resolve config paths, honouring `XDG_CONFIG_HOME` and falling back to
/// `~/.config`.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
		Some(dir) => PathBuf::from(dir),
		None => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	tracing::debug!(config_home = %config_home.display(), "resolved XDG paths");

	Ok(PathsConfig {
		user_config_file: config_home.join("credfetch/config.toml"),
		system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
	})
}

/// Get the workspace config file path from current directory.
pub fn workspace_config_path() -> Result<PathBuf, ConfigError> {
	let cwd = std::env::current_dir()?;
	Ok(cwd.join(WORKSPACE_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_xdg_paths_names_credfetch() {
		let paths = resolve_xdg_paths().unwrap();
		assert!(paths.user_config_file.ends_with("credfetch/config.toml"));
		assert_eq!(paths.system_config_file, PathBuf::from(SYSTEM_CONFIG_FILE));
	}

	#[test]
	fn test_config_dir_returns_parent() {
		let paths = PathsConfig {
			user_config_file: PathBuf::from("/home/u/.config/credfetch/config.toml"),
			..Default::default()
		};
		assert_eq!(paths.config_dir(), PathBuf::from("/home/u/.config/credfetch"));
	}

	#[test]
	fn test_workspace_config_path() {
		let path = workspace_config_path().unwrap();
		assert!(path.ends_with(".credfetch/config.toml"));
	}
}

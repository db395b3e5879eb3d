// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! KeePassXC databases, read through `keepassxc-cli`.
//!
//! Construction: `db_path` (position 0 or named, required) and an optional
//! named `cli` pointing at the `keepassxc-cli` executable.
//!
//! `get_id_pw` arguments: `db_pw` (position 0) and `entry` (position 1). The
//! database passphrase is written to the CLI's stdin, never to its argv.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use credfetch_core::{CredentialProvider, Credentials, Operation, ProviderArgs, ProviderError};
use tracing::{debug, instrument};

pub const NAME: &str = "keepassxc";

/// Environment variable that overrides CLI discovery.
pub const CLI_ENV: &str = "KEEPASSXC_CLI";

const INSTALL_DIRS: &[&str] = &[
	r"C:\Program Files\KeePassXC",
	r"C:\Program Files (x86)\KeePassXC",
	"/Applications/KeePassXC.app/Contents/MacOS",
];

#[derive(Debug, Clone)]
pub struct KeepassxcProvider {
	db_path: PathBuf,
	cli: PathBuf,
}

impl KeepassxcProvider {
	pub fn new(db_path: impl Into<PathBuf>, cli: impl Into<PathBuf>) -> Self {
		Self {
			db_path: db_path.into(),
			cli: cli.into(),
		}
	}

	pub fn from_args(args: &ProviderArgs) -> Result<Self, ProviderError> {
		let db_path = args.require(0, "db_path")?;
		let cli = match args.named_values().get("cli") {
			Some(cli) => PathBuf::from(cli),
			None => locate_cli()?,
		};
		Ok(Self::new(db_path, cli))
	}

	pub fn db_path(&self) -> &Path {
		&self.db_path
	}

	pub fn cli(&self) -> &Path {
		&self.cli
	}

	/// Arguments for reading username and password of `entry`.
	pub fn show_args(&self, entry: &str) -> Vec<OsString> {
		vec![
			"show".into(),
			"-qsa".into(),
			"username".into(),
			"-sa".into(),
			"password".into(),
			self.db_path.clone().into_os_string(),
			entry.into(),
		]
	}

	fn run_show(&self, db_pw: &str, entry: &str) -> Result<String, ProviderError> {
		let mut child = Command::new(&self.cli)
			.args(self.show_args(entry))
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|source| ProviderError::Io {
				path: self.cli.clone(),
				source,
			})?;

		// The CLI may exit without reading the passphrase; its status and
		// stderr say why.
		if let Some(mut stdin) = child.stdin.take() {
			match stdin.write_all(db_pw.as_bytes()) {
				Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
					debug!("keepassxc-cli closed stdin before reading the passphrase");
				}
				Err(source) => {
					return Err(ProviderError::Io {
						path: self.cli.clone(),
						source,
					});
				}
				Ok(()) => {}
			}
		}

		let output = child.wait_with_output().map_err(|source| ProviderError::Io {
			path: self.cli.clone(),
			source,
		})?;

		if !output.status.success() {
			return Err(ProviderError::Command {
				program: self.cli.display().to_string(),
				status: output.status.to_string(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}

impl CredentialProvider for KeepassxcProvider {
	fn operations(&self) -> &'static [Operation] {
		&[Operation::GetIdPw]
	}

	#[instrument(skip_all, fields(db = %self.db_path.display()))]
	fn get_id_pw(&self, args: &ProviderArgs) -> Result<Credentials, ProviderError> {
		let db_pw = args.require(0, "db_pw")?;
		let entry = args.require(1, "entry")?;

		let stdout = self.run_show(db_pw, entry)?;
		debug!(entry = %entry, "read entry from keepassxc database");
		parse_show_output(&stdout, entry)
	}
}

/// Constructor exported into the built-in namespace.
pub fn create(args: &ProviderArgs) -> Result<Box<dyn CredentialProvider>, ProviderError> {
	Ok(Box::new(KeepassxcProvider::from_args(args)?))
}

/// First line is the username, second the password.
pub fn parse_show_output(stdout: &str, entry: &str) -> Result<Credentials, ProviderError> {
	let mut lines = stdout.lines();
	match (lines.next(), lines.next()) {
		(Some(id), Some(pw)) => Ok(Credentials::new(id, pw)),
		_ => Err(ProviderError::parse(
			format!("keepassxc-cli output for '{entry}'"),
			"expected username and password lines",
		)),
	}
}

/// Find `keepassxc-cli`: `KEEPASSXC_CLI`, then `PATH`, then standard install locations.
pub fn locate_cli() -> Result<PathBuf, ProviderError> {
	if let Some(cli) = std::env::var_os(CLI_ENV).filter(|v| !v.is_empty()) {
		return Ok(PathBuf::from(cli));
	}

	let file = cli_file_name();
	let on_path = std::env::var_os("PATH")
		.map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
		.unwrap_or_default();

	on_path
		.into_iter()
		.chain(INSTALL_DIRS.iter().map(PathBuf::from))
		.map(|dir| dir.join(file))
		.find(|candidate| candidate.is_file())
		.ok_or_else(|| {
			ProviderError::backend(format!(
				"{file} not found; install KeePassXC or set {CLI_ENV}"
			))
		})
}

fn cli_file_name() -> &'static str {
	if cfg!(windows) {
		"keepassxc-cli.exe"
	} else {
		"keepassxc-cli"
	}
}

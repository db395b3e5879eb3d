// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! credfetch - look up a credential through a named provider
//!
//! Stored per-provider arguments come from configuration. Construction or
//! lookup flags given here replace the stored set for that stage.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use credfetch::{
	creators, known_providers, resolver_with_paths, Credentials, Operation, ProviderArgs,
	ProviderFactory,
};
use credfetch_config::{
	load_config_with_cli, CliOverrides, CredfetchConfig, LogFormat, LogLevel, LoggingConfig,
};

/// Fetch credentials from dotenv files, KeePassXC and other providers
#[derive(Parser, Debug)]
#[command(name = "credfetch", version, about, long_about = None)]
struct Args {
	/// Path to an additional configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	/// Provider to use (defaults to global.default_provider)
	#[arg(short, long)]
	provider: Option<String>,

	/// Positional construction argument (repeatable, replaces configured arguments)
	#[arg(long = "arg", value_name = "VALUE")]
	args: Vec<String>,

	/// Named construction argument (repeatable: --opt KEY=VALUE, replaces configured arguments)
	#[arg(long = "opt", value_name = "KEY=VALUE", value_parser = parse_key_value)]
	opts: Vec<(String, String)>,

	/// Directory searched for provider libraries (repeatable)
	#[arg(long = "provider-path", value_name = "DIR")]
	provider_paths: Vec<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the identity and secret pair
	#[command(name = "id-pw")]
	IdPw {
		/// Positional lookup argument (repeatable, replaces configured lookup arguments)
		#[arg(long = "lookup-arg", value_name = "VALUE")]
		lookup_args: Vec<String>,

		/// Named lookup argument (repeatable: --lookup-opt KEY=VALUE, replaces configured lookup arguments)
		#[arg(long = "lookup-opt", value_name = "KEY=VALUE", value_parser = parse_key_value)]
		lookup_opts: Vec<(String, String)>,
	},
	/// Print the secret stored under KEY
	Get {
		key: String,
	},
	/// List registered and built-in providers
	List,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			provider: args.provider.clone(),
			provider_paths: args.provider_paths.clone(),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			config_file: args.config.clone(),
		}
	}
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
	match s.split_once('=') {
		Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
		_ => Err(format!("expected KEY=VALUE, got '{s}'")),
	}
}

fn to_provider_args(positional: &[String], named: &[(String, String)]) -> ProviderArgs {
	let mut args = ProviderArgs::from_positional(positional.iter().cloned());
	for (key, value) in named {
		args.insert(key.clone(), value.clone());
	}
	args
}

/// Configured arguments unless the command line gives any for this stage.
fn layered_args(
	configured: ProviderArgs,
	positional: &[String],
	named: &[(String, String)],
) -> ProviderArgs {
	configured.or_override(to_provider_args(positional, named))
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

// Logs go to stderr; stdout carries the credential.
fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!("credfetch={}", log_level_to_tracing(logging.level)))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(io::stderr))
				.init();
		}
	}
}

fn provider_name<'a>(args: &'a Args, config: &'a CredfetchConfig) -> Result<&'a str> {
	args.provider
		.as_deref()
		.or(config.global.default_provider.as_deref())
		.context("no provider given; pass --provider or set global.default_provider")
}

fn write_credentials(out: &mut impl Write, creds: &Credentials) -> io::Result<()> {
	writeln!(out, "id={}", creds.id)?;
	writeln!(out, "secret={}", creds.secret.expose())
}

fn run(args: &Args, config: &CredfetchConfig) -> Result<()> {
	let stdout = io::stdout();
	let mut out = stdout.lock();

	if let Command::List = args.command {
		for name in known_providers(creators()) {
			writeln!(out, "{name}")?;
		}
		return Ok(());
	}

	let name = provider_name(args, config)?;
	let profile = config.profile(name);
	let construction = layered_args(profile.construction(), &args.args, &args.opts);
	debug!(provider = %name, args = ?construction, "resolved construction arguments");

	let resolver = resolver_with_paths(&config.global.provider_paths);
	let factory = ProviderFactory::new(creators(), resolver);

	match &args.command {
		Command::IdPw {
			lookup_args,
			lookup_opts,
		} => {
			let provider = factory
				.create_provider_requiring(name, &construction, &[Operation::GetIdPw])
				.with_context(|| format!("failed to create provider '{name}'"))?;
			let lookup = layered_args(profile.lookup(), lookup_args, lookup_opts);
			let creds = provider
				.get_id_pw(&lookup)
				.with_context(|| format!("provider '{name}' could not produce an id/secret pair"))?;
			info!(provider = %name, id = %creds.id, "retrieved credentials");
			write_credentials(&mut out, &creds)?;
		}
		Command::Get { key } => {
			let provider = factory
				.create_provider_requiring(name, &construction, &[Operation::Get])
				.with_context(|| format!("failed to create provider '{name}'"))?;
			let value = provider
				.get(key)
				.with_context(|| format!("provider '{name}' could not read '{key}'"))?;
			info!(provider = %name, key = %key, "retrieved secret");
			writeln!(out, "{}", value.expose())?;
		}
		Command::List => {}
	}

	out.flush()?;
	Ok(())
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config = load_config_with_cli(CliOverrides::from(&args))
		.context("failed to load configuration")?;

	init_tracing(&config.logging);

	run(&args, &config)
}

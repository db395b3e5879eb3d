// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub global: Option<GlobalLayer>,
	#[serde(default)]
	pub providers: Option<ProvidersLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalLayer {
	#[serde(default)]
	pub default_provider: Option<String>,
	#[serde(default)]
	pub provider_paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersLayer {
	#[serde(flatten)]
	pub entries: HashMap<String, ProviderLayer>,
}

/// Per-provider defaults: `args`/`options` feed construction, the `lookup_*`
/// pair feeds `get_id_pw`.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderLayer {
	#[serde(default)]
	pub args: Option<Vec<String>>,
	#[serde(default)]
	pub options: Option<BTreeMap<String, String>>,
	#[serde(default)]
	pub lookup_args: Option<Vec<String>>,
	#[serde(default)]
	pub lookup_options: Option<BTreeMap<String, String>>,
}

// Lookup values are frequently passphrases.
impl fmt::Debug for ProviderLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderLayer")
			.field("args", &self.args.as_ref().map(Vec::len))
			.field("options", &self.options.as_ref().map(|o| o.keys().collect::<Vec<_>>()))
			.field("lookup_args", &self.lookup_args.as_ref().map(Vec::len))
			.field(
				"lookup_options",
				&self.lookup_options.as_ref().map(|o| o.keys().collect::<Vec<_>>()),
			)
			.finish()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.global, other.global, GlobalLayer::merge);
		merge_option(&mut self.providers, other.providers, ProvidersLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

impl GlobalLayer {
	fn merge(&mut self, other: GlobalLayer) {
		if other.default_provider.is_some() {
			self.default_provider = other.default_provider;
		}
		if other.provider_paths.is_some() {
			self.provider_paths = other.provider_paths;
		}
	}
}

impl ProvidersLayer {
	fn merge(&mut self, other: ProvidersLayer) {
		for (name, provider) in other.entries {
			match self.entries.get_mut(&name) {
				Some(existing) => existing.merge(provider),
				None => {
					self.entries.insert(name, provider);
				}
			}
		}
	}
}

impl ProviderLayer {
	fn merge(&mut self, other: ProviderLayer) {
		if other.args.is_some() {
			self.args = other.args;
		}
		if other.lookup_args.is_some() {
			self.lookup_args = other.lookup_args;
		}
		merge_option(&mut self.options, other.options, |t, s| t.extend(s));
		merge_option(&mut self.lookup_options, other.lookup_options, |t, s| {
			t.extend(s)
		});
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

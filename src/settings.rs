use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use config::{Config, ConfigError, File};
use serde::Deserialize;

use perch::app_dirs;
use perch::{Capacity, ColorScheme, Theme};

use crate::cli::{CliArgs, CommandArgs};

const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "perch";
const DEFAULT_MAX_ITEMS: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
	max_items: Option<i64>,
	default_max_items: Option<usize>,
	log_level: Option<String>,
	colors: ColorScheme,
}

/// Settings after merging files, environment and command-line flags.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
	pub(crate) capacity: Capacity,
	pub(crate) log_level: Option<String>,
	pub(crate) theme: Theme,
}

pub(crate) fn load(cli: &CliArgs, command: &CommandArgs) -> Result<ResolvedConfig> {
	let defaults = if cli.no_config {
		Vec::new()
	} else {
		default_config_files()
	};
	let raw = read_sources(&defaults, &cli.config)?;

	let cli_level = command.session().log_level.map(|level| level.as_str());
	Ok(raw.resolve(command.max_items(), cli_level))
}

/// Merge optional default files, required extra files, then `PERCH__*` variables.
fn read_sources(defaults: &[PathBuf], extra: &[PathBuf]) -> Result<RawConfig> {
	let mut builder = Config::builder();
	for path in defaults {
		builder = builder.add_source(File::from(path.clone()).required(false));
	}
	for path in extra {
		builder = builder.add_source(File::from(path.clone()).required(true));
	}
	builder = builder.add_source(
		config::Environment::with_prefix(ENV_PREFIX)
			.separator("__")
			.try_parsing(true),
	);

	let config = builder.build().map_err(|err| match err {
		ConfigError::Frozen => anyhow!("configuration builder is frozen"),
		other => other.into(),
	})?;
	config
		.try_deserialize()
		.context("failed to deserialize configuration")
}

fn default_config_files() -> Vec<PathBuf> {
	app_dirs::get_config_dir()
		.map(|dir| vec![dir.join(CONFIG_FILE)])
		.unwrap_or_default()
}

impl RawConfig {
	fn resolve(self, cli_max_items: Option<i64>, cli_log_level: Option<&str>) -> ResolvedConfig {
		let fallback = self.default_max_items.unwrap_or(DEFAULT_MAX_ITEMS).max(1);
		// `-n 0` is the flag's unset value; `-1` forces auto sizing.
		let cli_max_items = cli_max_items.filter(|count| *count != 0);
		let capacity = match cli_max_items.or(self.max_items) {
			Some(count) if count > 0 => usize::try_from(count)
				.map(Capacity::Fixed)
				.unwrap_or(Capacity::Auto { fallback }),
			_ => Capacity::Auto { fallback },
		};

		let log_level = cli_log_level
			.map(str::to_string)
			.or(self.log_level)
			.filter(|level| !level.trim().is_empty());

		ResolvedConfig {
			capacity,
			log_level,
			theme: Theme::from_colors(&self.colors),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use ratatui::style::Color;

	use super::*;

	fn write(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
		let path = dir.join(name);
		fs::write(&path, body).expect("write config");
		path
	}

	#[test]
	fn missing_default_file_is_fine() {
		let dir = tempfile::tempdir().expect("tempdir");
		let raw = read_sources(&[dir.path().join(CONFIG_FILE)], &[]).expect("config");
		let resolved = raw.resolve(None, None);
		assert_eq!(resolved.capacity, Capacity::Auto { fallback: 10 });
		assert_eq!(resolved.log_level, None);
		assert_eq!(resolved.theme, Theme::default());
	}

	#[test]
	fn missing_extra_file_is_an_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		assert!(read_sources(&[], &[dir.path().join("absent.toml")]).is_err());
	}

	#[test]
	fn later_files_override_earlier_ones() {
		let dir = tempfile::tempdir().expect("tempdir");
		let base = write(
			dir.path(),
			"config.toml",
			"max_items = 4\nlog_level = \"info\"\n[colors]\ntitle = \"33\"\n",
		);
		let extra = write(dir.path(), "extra.toml", "max_items = 12\n");

		let resolved = read_sources(&[base], &[extra])
			.expect("config")
			.resolve(None, None);
		assert_eq!(resolved.capacity, Capacity::Fixed(12));
		assert_eq!(resolved.log_level.as_deref(), Some("info"));
		assert_eq!(resolved.theme.title.fg, Some(Color::Indexed(33)));
	}

	#[test]
	fn flags_override_file_values() {
		let raw = RawConfig {
			max_items: Some(4),
			log_level: Some("info".into()),
			..RawConfig::default()
		};
		let resolved = raw.resolve(Some(7), Some("trace"));
		assert_eq!(resolved.capacity, Capacity::Fixed(7));
		assert_eq!(resolved.log_level.as_deref(), Some("trace"));
	}

	#[test]
	fn non_positive_max_items_follow_terminal() {
		let raw = RawConfig {
			max_items: Some(8),
			default_max_items: Some(15),
			..RawConfig::default()
		};
		assert_eq!(
			raw.clone().resolve(Some(-1), None).capacity,
			Capacity::Auto { fallback: 15 }
		);
		assert_eq!(
			RawConfig {
				max_items: Some(0),
				..raw
			}
			.resolve(None, None)
			.capacity,
			Capacity::Auto { fallback: 15 }
		);
	}

	#[test]
	fn zero_max_items_flag_defers_to_config() {
		let raw = RawConfig {
			max_items: Some(8),
			..RawConfig::default()
		};
		assert_eq!(raw.clone().resolve(Some(0), None).capacity, Capacity::Fixed(8));
		assert_eq!(
			RawConfig::default().resolve(Some(0), None).capacity,
			Capacity::Auto {
				fallback: DEFAULT_MAX_ITEMS
			}
		);
		assert_eq!(raw.resolve(Some(3), None).capacity, Capacity::Fixed(3));
	}

	#[test]
	fn bad_value_type_is_reported() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write(dir.path(), "config.toml", "max_items = \"many\"\n");
		let err = read_sources(&[path], &[]).expect_err("invalid max_items");
		assert!(format!("{err:#}").contains("failed to deserialize configuration"));
	}
}

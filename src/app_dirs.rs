//! Configuration, data and cache directories for `perch`.
//!
//! Environment overrides win; otherwise the platform locations from the
//! `directories` crate are used.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::{BaseDirs, ProjectDirs};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "perch";
const APPLICATION: &str = "perch";

pub const CONFIG_DIR_ENV: &str = "PERCH_CONFIG_DIR";
pub const DATA_DIR_ENV: &str = "PERCH_DATA_DIR";
pub const CACHE_DIR_ENV: &str = "PERCH_CACHE_DIR";

fn project_dirs() -> Result<ProjectDirs> {
	ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
		.ok_or_else(|| anyhow!("unable to determine project directories for perch"))
}

/// Read a directory override. Empty values count as unset.
fn dir_from_env(name: &str) -> Option<PathBuf> {
	env::var_os(name)
		.filter(|value| !value.is_empty())
		.map(PathBuf::from)
}

/// Directory holding `config.toml` and `menu.toml`.
pub fn get_config_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(CONFIG_DIR_ENV) {
		return Ok(dir);
	}
	Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn get_data_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(DATA_DIR_ENV) {
		return Ok(dir);
	}
	Ok(project_dirs()?.data_local_dir().to_path_buf())
}

/// Directory holding the log file.
pub fn get_cache_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(CACHE_DIR_ENV) {
		return Ok(dir);
	}
	Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Default menu file location.
pub fn menu_file() -> Result<PathBuf> {
	Ok(get_config_dir()?.join("menu.toml"))
}

/// The user's `applications` directory, e.g. `~/.local/share/applications`.
pub fn applications_dir() -> Result<PathBuf> {
	let base = BaseDirs::new().ok_or_else(|| anyhow!("unable to determine the home directory"))?;
	Ok(base.data_dir().join("applications"))
}

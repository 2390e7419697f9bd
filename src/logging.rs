//! File-backed tracing setup.
//!
//! The picker owns the terminal while it runs, so events go to
//! `<cache_dir>/perch.log` instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::app_dirs;

/// Environment variable consulted when no level is configured.
pub const LOG_ENV: &str = "PERCH_LOG";
const LOG_FILE: &str = "perch.log";
const DEFAULT_FILTER: &str = "warn";

/// Path of the log file inside the cache directory.
pub fn log_path() -> Option<PathBuf> {
	app_dirs::get_cache_dir().ok().map(|dir| dir.join(LOG_FILE))
}

/// Choose the filter directive: explicit level, then [`LOG_ENV`], then `warn`.
pub fn filter_directive(level: Option<&str>) -> String {
	level
		.map(str::to_string)
		.or_else(|| std::env::var(LOG_ENV).ok().filter(|value| !value.trim().is_empty()))
		.unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber writing to the default log file.
///
/// Returns the file in use, or `None` when logging stays disabled because
/// the file could not be opened or a subscriber was already installed.
pub fn initialize(level: Option<&str>) -> Option<PathBuf> {
	let path = log_path()?;
	initialize_at(&path, level).then_some(path)
}

/// Install the global subscriber writing to `path`.
pub fn initialize_at(path: &Path, level: Option<&str>) -> bool {
	if let Some(parent) = path.parent()
		&& fs::create_dir_all(parent).is_err()
	{
		return false;
	}
	let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
		return false;
	};

	let directive = filter_directive(level);
	let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
	let file_layer = tracing_subscriber::fmt::layer()
		.with_writer(Mutex::new(file))
		.with_ansi(false)
		.with_target(true);

	let installed = tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.try_init()
		.is_ok();
	if installed {
		tracing::debug!(path = %path.display(), %directive, "logging initialized");
	}
	installed
}

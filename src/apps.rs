//! Installed applications read from `.desktop` files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::DispatchError;

/// Field codes removed from `Exec=` lines before launching.
const FIELD_CODES: [&str; 7] = ["%f", "%F", "%u", "%U", "%i", "%c", "%k"];

/// One launchable application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
	/// Value of the first `Name=` line.
	pub name: String,
	/// Desktop file the entry was read from.
	pub path: PathBuf,
}

/// Read every `*.desktop` file directly inside `dir`, ordered by file name.
///
/// Files that cannot be read or carry no `Name=` are skipped.
pub fn scan(dir: &Path) -> io::Result<Vec<AppEntry>> {
	let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_ok_and(|kind| !kind.is_dir()))
		.map(|entry| entry.path())
		.filter(|path| path.extension().is_some_and(|ext| ext == "desktop"))
		.collect();
	paths.sort();

	let mut apps = Vec::with_capacity(paths.len());
	for path in paths {
		let Ok(text) = fs::read_to_string(&path) else {
			trace!(path = %path.display(), "skipping unreadable desktop file");
			continue;
		};
		match first_value(&text, "Name") {
			Some(name) => {
				debug!(%name, path = %path.display(), "loaded application");
				apps.push(AppEntry {
					name: name.to_string(),
					path,
				});
			}
			None => trace!(path = %path.display(), "skipping desktop file without Name"),
		}
	}
	Ok(apps)
}

/// Find the application whose display name is `name`.
pub fn find<'a>(apps: &'a [AppEntry], name: &str) -> Option<&'a AppEntry> {
	apps.iter().find(|app| app.name == name)
}

/// Read the command line to run for a desktop file.
pub fn launch_command(path: &Path) -> Result<String, DispatchError> {
	let text = fs::read_to_string(path).map_err(|source| DispatchError::ReadDesktopEntry {
		path: path.to_path_buf(),
		source,
	})?;
	first_value(&text, "Exec")
		.map(strip_field_codes)
		.filter(|command| !command.is_empty())
		.ok_or_else(|| DispatchError::MissingExec {
			path: path.to_path_buf(),
		})
}

fn first_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
	text.lines()
		.find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
		.map(str::trim)
		.filter(|value| !value.is_empty())
}

fn strip_field_codes(exec: &str) -> String {
	let mut command = exec.to_string();
	for code in FIELD_CODES {
		command = command.replace(code, "");
	}
	command.trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
		let path = dir.join(name);
		fs::write(&path, body).expect("write desktop file");
		path
	}

	#[test]
	fn scans_names_in_file_order() {
		let dir = tempfile::tempdir().expect("tempdir");
		write(
			dir.path(),
			"b.desktop",
			"[Desktop Entry]\nName=Browser\nName[de]=Netz\nExec=firefox %u\n",
		);
		write(dir.path(), "a.desktop", "[Desktop Entry]\nName= Alacritty \n");
		write(dir.path(), "c.desktop", "[Desktop Entry]\nExec=nameless\n");
		write(dir.path(), "notes.txt", "Name=Not an app\n");
		fs::create_dir(dir.path().join("sub.desktop")).expect("mkdir");

		let apps = scan(dir.path()).expect("scan");
		let names: Vec<_> = apps.iter().map(|app| app.name.as_str()).collect();
		assert_eq!(names, ["Alacritty", "Browser"]);
		assert_eq!(find(&apps, "Browser").map(|app| &app.path), Some(&dir.path().join("b.desktop")));
		assert!(find(&apps, "Netz").is_none());
	}

	#[test]
	fn missing_directory_is_an_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		assert!(scan(&dir.path().join("absent")).is_err());
	}

	#[test]
	fn launch_command_strips_field_codes() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write(
			dir.path(),
			"x.desktop",
			"[Desktop Entry]\nName=X\nExec=env FOO=1 viewer %F --flag %u\nExec=ignored\n",
		);
		assert_eq!(
			launch_command(&path).expect("exec line"),
			"env FOO=1 viewer  --flag"
		);
	}

	#[test]
	fn launch_command_requires_exec() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write(dir.path(), "y.desktop", "[Desktop Entry]\nName=Y\nExec=%U\n");
		assert!(matches!(
			launch_command(&path),
			Err(DispatchError::MissingExec { .. })
		));
		assert!(matches!(
			launch_command(&dir.path().join("gone.desktop")),
			Err(DispatchError::ReadDesktopEntry { .. })
		));
	}
}

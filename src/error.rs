//! Error types shared by the menu loader, the process capability and dispatch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a menu file or expanding a generator entry.
#[derive(Debug, Error)]
pub enum MenuError {
	/// The menu file does not exist.
	#[error("menu file not found: {}", path.display())]
	NotFound { path: PathBuf },

	/// The menu file exists but could not be read.
	#[error("failed to read menu file {}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The menu document is not valid TOML for the menu schema.
	#[error("failed to parse menu: {0}")]
	Parse(#[from] toml::de::Error),

	/// An entry was declared without a label.
	#[error("menu entry without a label (under '{parent}')")]
	MissingLabel { parent: String },

	/// An entry declared more than one of `items`, `generator` and `exec`.
	#[error("menu entry '{label}' declares more than one of items, generator and exec")]
	ConflictingActions { label: String },

	/// The generator command could not be run or exited unsuccessfully.
	#[error("generator '{command}' failed")]
	Generator {
		command: String,
		#[source]
		source: ProcessError,
	},

	/// The generator ran but printed something that is not a menu.
	#[error("generator '{command}' produced invalid output: {reason}")]
	GeneratorOutput { command: String, reason: String },
}

/// Failures reported by a [`ProcessRunner`](crate::process::ProcessRunner).
#[derive(Debug, Error)]
pub enum ProcessError {
	/// The shell could not be started.
	#[error("failed to start '{command}'")]
	Spawn {
		command: String,
		#[source]
		source: io::Error,
	},

	/// The command ran and exited unsuccessfully.
	#[error("'{command}' exited with {}{}", describe_code(*code), describe_output(output))]
	Exit {
		command: String,
		code: Option<i32>,
		output: String,
	},
}

fn describe_code(code: Option<i32>) -> String {
	match code {
		Some(code) => format!("status {code}"),
		None => "a signal".to_string(),
	}
}

fn describe_output(output: &str) -> String {
	let trimmed = output.trim();
	if trimmed.is_empty() {
		String::new()
	} else {
		format!(": {trimmed}")
	}
}

/// Failures while acting on a committed selection.
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The selection file or its parent directory could not be written.
	#[error("failed to write selection to {}", path.display())]
	WriteSelection {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// Printing the selection to the output stream failed.
	#[error("failed to print selection")]
	Print(#[source] io::Error),

	/// The desktop entry backing an application could not be read.
	#[error("failed to read desktop entry {}", path.display())]
	ReadDesktopEntry {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The desktop entry has no usable `Exec=` line.
	#[error("no Exec line found in {}", path.display())]
	MissingExec { path: PathBuf },

	/// The selected application or command could not be run.
	#[error(transparent)]
	Process(#[from] ProcessError),
}

//! Acting on the outcome of a picker session.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::apps::{self, AppEntry};
use crate::error::{DispatchError, ProcessError};
use crate::picker::Outcome;
use crate::process::ProcessRunner;

/// Where a selection goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	/// Print the selected line.
	Stdout,
	/// Write the selected line to a file.
	File(PathBuf),
	/// Launch the selected application.
	Apps(Vec<AppEntry>),
	/// Run the selected menu command.
	Menu,
}

/// What dispatch ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
	/// Cancelled or timed out.
	NoSelection,
	/// Something was printed instead of performed, or the selection itself was printed.
	Printed,
	Written(PathBuf),
	Launched,
	/// A visible command ran to completion.
	Ran,
}

/// Performs the action for an outcome.
pub struct Dispatcher<'a, W: Write> {
	target: Target,
	dry_run: bool,
	runner: &'a dyn ProcessRunner,
	out: W,
}

impl<'a, W: Write> Dispatcher<'a, W> {
	pub fn new(target: Target, dry_run: bool, runner: &'a dyn ProcessRunner, out: W) -> Self {
		Self {
			target,
			dry_run,
			runner,
			out,
		}
	}

	pub fn dispatch(&mut self, outcome: Outcome) -> Result<Dispatched, DispatchError> {
		match outcome {
			Outcome::Cancelled | Outcome::TimedOut => {
				debug!(?outcome, "no selection");
				Ok(Dispatched::NoSelection)
			}
			Outcome::Selected(value) => self.selection(value),
			Outcome::SelectedCommand {
				label,
				command,
				visible,
			} => {
				debug!(%label, "dispatching menu command");
				self.command(&command, visible)
			}
		}
	}

	fn selection(&mut self, value: String) -> Result<Dispatched, DispatchError> {
		match &self.target {
			Target::Stdout | Target::Menu => self.print(&value),
			Target::File(path) => {
				let path = path.clone();
				write_selection(&path, &value)?;
				Ok(Dispatched::Written(path))
			}
			Target::Apps(registry) => {
				let Some(app) = apps::find(registry, &value) else {
					warn!(%value, "selected application is not in the registry");
					return Ok(Dispatched::NoSelection);
				};
				if self.dry_run {
					return self.print(&value);
				}
				let command = apps::launch_command(&app.path)?;
				info!(name = %app.name, %command, "launching application");
				self.runner.run_detached(&command)?;
				Ok(Dispatched::Launched)
			}
		}
	}

	fn command(&mut self, command: &str, visible: bool) -> Result<Dispatched, DispatchError> {
		if self.dry_run {
			writeln!(self.out, "DRY-RUN: {command}").map_err(DispatchError::Print)?;
			return Ok(Dispatched::Printed);
		}

		if !visible {
			self.runner.run_detached(command)?;
			return Ok(Dispatched::Launched);
		}

		match self.runner.run_foreground(command)? {
			Some(0) => Ok(Dispatched::Ran),
			code => Err(ProcessError::Exit {
				command: command.to_string(),
				code,
				output: String::new(),
			}
			.into()),
		}
	}

	fn print(&mut self, value: &str) -> Result<Dispatched, DispatchError> {
		writeln!(self.out, "{value}").map_err(DispatchError::Print)?;
		Ok(Dispatched::Printed)
	}
}

/// Write `value` and a newline to `path`, creating parent directories.
pub fn write_selection(path: &Path, value: &str) -> Result<(), DispatchError> {
	let wrap = |source| DispatchError::WriteSelection {
		path: path.to_path_buf(),
		source,
	};
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent).map_err(wrap)?;
	}
	fs::write(path, format!("{value}\n")).map_err(wrap)
}

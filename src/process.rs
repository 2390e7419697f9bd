//! Process capability used by generator expansion and dispatch.
//!
//! Everything goes through [`ProcessRunner`] so the selector engine and the
//! dispatcher can be exercised without touching the operating system.

use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::ProcessError;

const SHELL: &str = "/bin/sh";

/// Runs shell command lines on behalf of the picker.
pub trait ProcessRunner {
	/// Run attached to the current stdio and wait. Returns the exit code,
	/// `None` when the child was terminated by a signal.
	fn run_foreground(&self, command: &str) -> Result<Option<i32>, ProcessError>;

	/// Start in a new session with null stdio and do not wait.
	fn run_detached(&self, command: &str) -> Result<(), ProcessError>;

	/// Run to completion and return captured standard output. A non-zero
	/// exit is an error carrying the captured standard error.
	fn run_captured(&self, command: &str) -> Result<Vec<u8>, ProcessError>;
}

/// [`ProcessRunner`] that hands command lines to `/bin/sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
	fn command(line: &str) -> Command {
		let mut cmd = Command::new(SHELL);
		cmd.arg("-c").arg(line);
		cmd
	}
}

fn spawn_error(command: &str) -> impl FnOnce(std::io::Error) -> ProcessError + '_ {
	move |source| ProcessError::Spawn {
		command: command.to_string(),
		source,
	}
}

impl ProcessRunner for ShellRunner {
	fn run_foreground(&self, command: &str) -> Result<Option<i32>, ProcessError> {
		info!(command, "running attached command");
		let status = Self::command(command)
			.stdin(Stdio::inherit())
			.stdout(Stdio::inherit())
			.stderr(Stdio::inherit())
			.status()
			.map_err(spawn_error(command))?;
		debug!(command, ?status, "attached command finished");
		Ok(status.code())
	}

	fn run_detached(&self, command: &str) -> Result<(), ProcessError> {
		info!(command, "starting detached command");
		let mut cmd = Self::command(command);
		cmd.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null());

		#[cfg(unix)]
		{
			use std::os::unix::process::CommandExt;
			// SAFETY: setsid is a single async-signal-safe syscall.
			unsafe {
				cmd.pre_exec(|| {
					rustix::process::setsid()
						.map(drop)
						.map_err(std::io::Error::from)
				});
			}
		}

		// Not waited on.
		let child = cmd.spawn().map_err(spawn_error(command))?;
		debug!(command, pid = child.id(), "detached command started");
		Ok(())
	}

	fn run_captured(&self, command: &str) -> Result<Vec<u8>, ProcessError> {
		debug!(command, "capturing command output");
		let output = Self::command(command)
			.stdin(Stdio::null())
			.output()
			.map_err(spawn_error(command))?;

		if !output.status.success() {
			let mut combined = String::from_utf8_lossy(&output.stderr).into_owned();
			if combined.trim().is_empty() {
				combined = String::from_utf8_lossy(&output.stdout).into_owned();
			}
			return Err(ProcessError::Exit {
				command: command.to_string(),
				code: output.status.code(),
				output: combined,
			});
		}

		Ok(output.stdout)
	}
}

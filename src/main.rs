mod cli;
mod settings;
mod workflow;

use std::process::ExitCode;

use anyhow::Result;
use cli::parse_cli;
use perch::{Dispatched, ShellRunner, logging};
use tracing::{debug, error};
use workflow::PickerWorkflow;

const EXIT_NO_SELECTION: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(err) => {
			error!("{err:#}");
			eprintln!("perch: {err:#}");
			ExitCode::from(EXIT_FAILURE)
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = parse_cli();
	let command = cli.subcommand();
	let resolved = settings::load(&cli, &command)?;

	if let Some(path) = logging::initialize(resolved.log_level.as_deref()) {
		debug!(path = %path.display(), ?command, "perch starting");
	}

	let workflow = PickerWorkflow::from_command(&command, &resolved)?;
	let dispatched = workflow.run(&ShellRunner, &resolved.theme)?;
	debug!(?dispatched, "session finished");

	Ok(match dispatched {
		Dispatched::NoSelection => ExitCode::from(EXIT_NO_SELECTION),
		_ => ExitCode::SUCCESS,
	})
}

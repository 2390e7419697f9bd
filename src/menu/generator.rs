use serde::Deserialize;
use tracing::debug;

use super::{Entry, RawEntry, convert_entries};
use crate::error::MenuError;
use crate::process::ProcessRunner;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedMenu {
	items: Vec<RawEntry>,
}

/// Run a generator command and parse its standard output into entries.
pub fn expand(command: &str, runner: &dyn ProcessRunner) -> Result<Vec<Entry>, MenuError> {
	let stdout = runner
		.run_captured(command)
		.map_err(|source| MenuError::Generator {
			command: command.to_string(),
			source,
		})?;
	let text = String::from_utf8(stdout).map_err(|_| MenuError::GeneratorOutput {
		command: command.to_string(),
		reason: "output is not valid UTF-8".into(),
	})?;
	let entries = parse_generated(command, &text)?;
	debug!(command, count = entries.len(), "generator expanded");
	Ok(entries)
}

/// Parse generator output of the form `[[items]] label = ... exec = ...`.
pub fn parse_generated(command: &str, text: &str) -> Result<Vec<Entry>, MenuError> {
	let invalid = |reason: String| MenuError::GeneratorOutput {
		command: command.to_string(),
		reason,
	};
	let generated: GeneratedMenu =
		toml::from_str(text).map_err(|err| invalid(err.message().to_string()))?;
	convert_entries(generated.items, command).map_err(|err| invalid(err.to_string()))
}

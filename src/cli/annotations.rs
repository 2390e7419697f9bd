use std::fmt::Write;

use clap::Arg;
use clap::builder::StyledStr;
use clap::builder::styling::{AnsiColor, Color, Style};

fn muted() -> Style {
	Style::new()
		.fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)))
		.dimmed()
}

/// Fold clap's possible-values, default and env notes into the help line,
/// rendered in a muted style.
pub(crate) fn dim_annotations(mut arg: Arg) -> Arg {
	let mut notes = Vec::new();
	if let Some(note) = possible_values_note(&arg) {
		arg = arg.hide_possible_values(true);
		notes.push(note);
	}
	if let Some(note) = default_note(&arg) {
		arg = arg.hide_default_value(true);
		notes.push(note);
	}
	if let Some(note) = env_note(&arg) {
		arg = arg.hide_env(true);
		notes.push(note);
	}
	if notes.is_empty() {
		return arg;
	}

	let base = arg.get_help().map(ToString::to_string).unwrap_or_default();
	let mut help = StyledStr::new();
	help.push_str(&base);
	let style = muted();
	for (index, note) in notes.iter().enumerate() {
		if index > 0 || !base.is_empty() {
			help.push_str(" ");
		}
		let _ = write!(help, "{style}{note}{style:#}");
	}
	arg.help(help)
}

fn quote_spaced(value: &str) -> String {
	if value.chars().any(char::is_whitespace) {
		format!("{value:?}")
	} else {
		value.to_string()
	}
}

pub(crate) fn possible_values_note(arg: &Arg) -> Option<String> {
	if !arg.get_action().takes_values() {
		return None;
	}
	let values: Vec<String> = arg
		.get_possible_values()
		.iter()
		.filter(|value| !value.is_hide_set())
		.map(|value| quote_spaced(value.get_name()))
		.collect();
	(!values.is_empty()).then(|| format!("[possible values: {}]", values.join(", ")))
}

pub(crate) fn default_note(arg: &Arg) -> Option<String> {
	let values: Vec<String> = arg
		.get_default_values()
		.iter()
		.map(|value| value.to_string_lossy())
		.filter(|value| !value.trim().is_empty())
		.map(|value| quote_spaced(&value))
		.collect();
	(!values.is_empty()).then(|| format!("(default: {})", values.join(", ")))
}

pub(crate) fn env_note(arg: &Arg) -> Option<String> {
	let name = arg.get_env()?.to_string_lossy();
	(!name.trim().is_empty()).then(|| format!("[env: {name}=]"))
}

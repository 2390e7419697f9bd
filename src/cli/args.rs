use std::fmt::Write;
use std::path::PathBuf;

use clap::{
	ArgAction, Args, ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
	ValueEnum,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use perch::app_dirs;

use super::annotations::dim_annotations;

const DRY_RUN_ENV: &str = "PERCH_DRY_RUN";

/// Read a boolean flag from the environment the way clap reads flag envs.
fn env_flag(name: &str) -> bool {
	std::env::var(name).is_ok_and(|value| {
		let value = value.trim().to_ascii_lowercase();
		!matches!(value.as_str(), "" | "0" | "false" | "no" | "off" | "n")
	})
}

/// Version banner listing the directories in use.
fn long_version() -> &'static str {
	let describe = |dir: anyhow::Result<PathBuf>| match dir {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("perch {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {}", describe(app_dirs::get_config_dir()));
	let _ = writeln!(details, "data directory: {}", describe(app_dirs::get_data_dir()));
	let _ = writeln!(details, "cache directory: {}", describe(app_dirs::get_cache_dir()));

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Magenta.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Magenta.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse the process arguments, exiting with clap's message on error.
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = tinted_cli_command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

/// The clap command with dimmed annotations on every subcommand.
pub(crate) fn tinted_cli_command() -> Command {
	let command = CliArgs::command().mut_args(dim_annotations);
	let names: Vec<String> = command
		.get_subcommands()
		.map(|sub| sub.get_name().to_string())
		.collect();
	names.iter().fold(command, |command, name| {
		command.mut_subcommand(name, |sub| sub.mut_args(dim_annotations))
	})
}

#[derive(Parser, Debug)]
#[command(
	name = "perch",
	version,
	long_version = long_version(),
	about = "Keyboard-driven picker for piped lines, applications and command menus",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "PERCH_CONFIG",
		action = ArgAction::Append,
		global = true,
		help = "Additional configuration file to merge"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		long = "no-config",
		global = true,
		help = "Skip the configuration file in the config directory"
	)]
	pub(crate) no_config: bool,
	#[command(subcommand)]
	pub(crate) command: Option<CommandArgs>,
}

impl CliArgs {
	/// The requested subcommand; `apps` when none was given.
	pub(crate) fn subcommand(&self) -> CommandArgs {
		self.command.clone().unwrap_or_else(|| {
			let mut apps = AppsArgs::default();
			apps.session.dry_run = env_flag(DRY_RUN_ENV);
			CommandArgs::Apps(apps)
		})
	}
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandArgs {
	/// Navigate the command menu.
	Menu(MenuArgs),
	/// Pick one line from standard input.
	Dmenu(DmenuArgs),
	/// Launch an installed application.
	Apps(AppsArgs),
}

impl CommandArgs {
	pub(crate) fn session(&self) -> &SessionArgs {
		match self {
			CommandArgs::Menu(args) => &args.session,
			CommandArgs::Dmenu(args) => &args.session,
			CommandArgs::Apps(args) => &args.session,
		}
	}

	pub(crate) fn max_items(&self) -> Option<i64> {
		match self {
			CommandArgs::Menu(args) => args.max_items,
			CommandArgs::Dmenu(args) => args.max_items,
			CommandArgs::Apps(_) => None,
		}
	}
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionArgs {
	#[arg(long = "log-level", value_enum, value_name = "LEVEL", help = "Log verbosity")]
	pub(crate) log_level: Option<LogLevel>,
	#[arg(
		long = "dry-run",
		env = DRY_RUN_ENV,
		help = "Print what would run instead of running it"
	)]
	pub(crate) dry_run: bool,
	#[arg(
		long,
		value_name = "SECS",
		default_value_t = 0,
		help = "Cancel after this many idle seconds, 0 waits forever"
	)]
	pub(crate) timeout: u64,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MenuArgs {
	#[arg(short, long, value_name = "ID", help = "Start inside the entry with this id")]
	pub(crate) start: Option<String>,
	#[arg(short, long, value_name = "TEXT", help = "Prompt shown before the query")]
	pub(crate) prompt: Option<String>,
	#[arg(long, value_name = "TEXT", help = "Header title")]
	pub(crate) header: Option<String>,
	#[arg(
		long,
		value_name = "FILE",
		help = "Menu file to load instead of menu.toml in the config directory"
	)]
	pub(crate) menu: Option<PathBuf>,
	#[arg(
		short = 'n',
		long = "max-items",
		value_name = "N",
		allow_negative_numbers = true,
		help = "Visible rows, -1 to follow the terminal height, 0 for the configured value"
	)]
	pub(crate) max_items: Option<i64>,
	#[command(flatten)]
	pub(crate) session: SessionArgs,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DmenuArgs {
	#[arg(short, long, value_name = "TEXT", help = "Prompt shown before the query")]
	pub(crate) prompt: Option<String>,
	#[arg(long, value_name = "TEXT", help = "Header title")]
	pub(crate) header: Option<String>,
	#[arg(
		short,
		long = "out",
		value_name = "FILE",
		help = "Write the selection to this file instead of standard output"
	)]
	pub(crate) out: Option<PathBuf>,
	#[arg(
		short = 'n',
		long = "max-items",
		value_name = "N",
		allow_negative_numbers = true,
		help = "Visible rows, -1 to follow the terminal height, 0 for the configured value"
	)]
	pub(crate) max_items: Option<i64>,
	#[command(flatten)]
	pub(crate) session: SessionArgs,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AppsArgs {
	#[arg(
		long = "desktop-dir",
		value_name = "DIR",
		help = "Directory of .desktop files to list"
	)]
	pub(crate) desktop_dir: Option<PathBuf>,
	#[command(flatten)]
	pub(crate) session: SessionArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

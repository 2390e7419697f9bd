use std::io::{self, BufRead, IsTerminal};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use perch::menu::{Entry, EntryAction, MenuFile};
use perch::{
	Dispatched, Dispatcher, Picker, PickerOptions, ProcessRunner, Target, Theme, app_dirs, apps,
	picker,
};

use crate::cli::{AppsArgs, CommandArgs, DmenuArgs, MenuArgs, SessionArgs};
use crate::settings::ResolvedConfig;

/// One picker session and the place its selection goes.
pub(crate) struct PickerWorkflow {
	picker: Picker,
	target: Target,
}

impl PickerWorkflow {
	pub(crate) fn from_command(command: &CommandArgs, config: &ResolvedConfig) -> Result<Self> {
		match command {
			CommandArgs::Menu(args) => Self::menu(args, config),
			CommandArgs::Dmenu(args) => Self::dmenu(args, config),
			CommandArgs::Apps(args) => Self::apps(args, config),
		}
	}

	fn menu(args: &MenuArgs, config: &ResolvedConfig) -> Result<Self> {
		let path = match &args.menu {
			Some(path) => path.clone(),
			None => app_dirs::menu_file()?,
		};
		let file = MenuFile::load(&path)?;
		let prompt = args.prompt.clone().or_else(|| file.prompt.clone());
		let header = args.header.clone().or_else(|| file.title.clone());
		let entries = start_level(file, args.start.as_deref());

		let options = picker_options(config, &args.session, prompt, header);
		info!(menu = %path.display(), entries = entries.len(), "starting menu");
		Ok(Self {
			picker: Picker::menu(entries, options),
			target: Target::Menu,
		})
	}

	fn dmenu(args: &DmenuArgs, config: &ResolvedConfig) -> Result<Self> {
		let stdin = io::stdin();
		if stdin.is_terminal() {
			bail!("expected piped input, e.g. `ls | perch dmenu`");
		}
		let items = read_lines(stdin.lock())?;

		let options = picker_options(
			config,
			&args.session,
			args.prompt.clone(),
			args.header.clone(),
		);
		info!(items = items.len(), out = ?args.out, "starting dmenu");
		Ok(match &args.out {
			Some(path) => Self {
				picker: Picker::flat_to_file(items, options),
				target: Target::File(path.clone()),
			},
			None => Self {
				picker: Picker::flat(items, options),
				target: Target::Stdout,
			},
		})
	}

	fn apps(args: &AppsArgs, config: &ResolvedConfig) -> Result<Self> {
		let dir = match &args.desktop_dir {
			Some(dir) => dir.clone(),
			None => app_dirs::applications_dir()?,
		};
		let registry = scan_apps(&dir)?;
		let names = registry.iter().map(|app| app.name.clone()).collect();

		let options = picker_options(config, &args.session, None, None);
		info!(dir = %dir.display(), apps = registry.len(), "starting application launcher");
		Ok(Self {
			picker: Picker::flat(names, options),
			target: Target::Apps(registry),
		})
	}

	/// Run the picker on the terminal, then act on the outcome.
	pub(crate) fn run(self, runner: &dyn ProcessRunner, theme: &Theme) -> Result<Dispatched> {
		let dry_run = self.picker.dry_run();
		let outcome = picker::run(self.picker, runner, theme)?;

		let stdout = io::stdout();
		let mut dispatcher = Dispatcher::new(self.target, dry_run, runner, stdout.lock());
		Ok(dispatcher.dispatch(outcome)?)
	}
}

fn picker_options(
	config: &ResolvedConfig,
	session: &SessionArgs,
	prompt: Option<String>,
	header: Option<String>,
) -> PickerOptions {
	let defaults = PickerOptions::default();
	PickerOptions {
		prompt: prompt.unwrap_or(defaults.prompt),
		header: header.unwrap_or(defaults.header),
		capacity: config.capacity,
		idle_timeout: Duration::from_secs(session.timeout),
		dry_run: session.dry_run,
	}
}

/// The level the menu opens on: the children of the entry tagged `start`,
/// or the root when there is no such submenu.
fn start_level(file: MenuFile, start: Option<&str>) -> Vec<Entry> {
	let Some(id) = start else {
		return file.entries;
	};
	let Some(path) = file.find_path(id) else {
		warn!(id, "no menu entry with this id, starting from the root menu");
		return file.entries;
	};
	if let Some(Entry {
		action: EntryAction::Submenu(children),
		..
	}) = file.entry_at(&path)
	{
		return children.clone();
	}
	warn!(id, "menu entry has no submenu, starting from the root menu");
	file.entries
}

fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
	reader
		.lines()
		.collect::<io::Result<Vec<_>>>()
		.context("failed to read items from standard input")
}

fn scan_apps(dir: &Path) -> Result<Vec<perch::AppEntry>> {
	apps::scan(dir).with_context(|| format!("failed to read desktop files from {}", dir.display()))
}

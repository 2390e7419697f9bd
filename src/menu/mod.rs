//! Hierarchical menu tree loaded from TOML.
//!
//! A menu file looks like:
//!
//! ```toml
//! title = "session"
//! prompt = "run>"
//!
//! [[menu]]
//! label = "Power"
//! id = "power"
//!
//!   [[menu.items]]
//!   label = "Suspend"
//!   exec = "systemctl suspend"
//!
//! [[menu]]
//! label = "Windows"
//! generator = "list-windows --toml"
//!
//! [[menu]]
//! label = "Top"
//! exec = "htop"
//! visible = true
//! ```
//!
//! Each entry carries at most one of `items`, `generator` and `exec`.

mod generator;

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::MenuError;

pub use generator::{expand, parse_generated};

/// One node of the menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	/// Display text, also the key matched by the filter.
	pub label: String,
	pub action: EntryAction,
	/// Optional identifier used to start inside a submenu.
	pub id: Option<String>,
}

/// What committing an [`Entry`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
	None,
	Submenu(Vec<Entry>),
	/// Shell command whose output becomes the submenu.
	Generator(String),
	/// Shell command to run; `visible` commands run attached to the terminal.
	Command { command: String, visible: bool },
}

impl Entry {
	pub fn new(label: impl Into<String>, action: EntryAction) -> Self {
		Self {
			label: label.into(),
			action,
			id: None,
		}
	}

	pub fn submenu(label: impl Into<String>, children: Vec<Entry>) -> Self {
		Self::new(label, EntryAction::Submenu(children))
	}

	pub fn command(label: impl Into<String>, command: impl Into<String>, visible: bool) -> Self {
		Self::new(
			label,
			EntryAction::Command {
				command: command.into(),
				visible,
			},
		)
	}

	pub fn generator(label: impl Into<String>, command: impl Into<String>) -> Self {
		Self::new(label, EntryAction::Generator(command.into()))
	}
}

/// A parsed menu file: the root entries plus optional display overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFile {
	pub prompt: Option<String>,
	pub title: Option<String>,
	pub entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMenuFile {
	prompt: Option<String>,
	title: Option<String>,
	menu: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawEntry {
	label: String,
	exec: Option<String>,
	generator: Option<String>,
	visible: bool,
	items: Vec<RawEntry>,
	id: Option<String>,
}

impl MenuFile {
	/// Read and validate a menu file.
	pub fn load(path: &Path) -> Result<Self, MenuError> {
		let text = fs::read_to_string(path).map_err(|source| match source.kind() {
			io::ErrorKind::NotFound => MenuError::NotFound {
				path: path.to_path_buf(),
			},
			_ => MenuError::Read {
				path: path.to_path_buf(),
				source,
			},
		})?;
		Self::parse(&text)
	}

	/// Parse and validate a menu document.
	pub fn parse(text: &str) -> Result<Self, MenuError> {
		let raw: RawMenuFile = toml::from_str(text)?;
		Ok(Self {
			prompt: raw.prompt.filter(|p| !p.is_empty()),
			title: raw.title.filter(|t| !t.is_empty()),
			entries: convert_entries(raw.menu, "<root>")?,
		})
	}

	/// Depth-first search for the first entry with `id`, returned as the list
	/// of child indices leading to it from the root.
	pub fn find_path(&self, id: &str) -> Option<Vec<usize>> {
		find_path_in(&self.entries, id)
	}

	/// Resolve an index path produced by [`MenuFile::find_path`].
	pub fn entry_at(&self, path: &[usize]) -> Option<&Entry> {
		let (first, rest) = path.split_first()?;
		let mut entry = self.entries.get(*first)?;
		for &index in rest {
			match &entry.action {
				EntryAction::Submenu(children) => entry = children.get(index)?,
				_ => return None,
			}
		}
		Some(entry)
	}
}

fn find_path_in(entries: &[Entry], id: &str) -> Option<Vec<usize>> {
	for (index, entry) in entries.iter().enumerate() {
		if entry.id.as_deref() == Some(id) {
			return Some(vec![index]);
		}
		if let EntryAction::Submenu(children) = &entry.action
			&& let Some(mut path) = find_path_in(children, id)
		{
			path.insert(0, index);
			return Some(path);
		}
	}
	None
}

pub(crate) fn convert_entries(raw: Vec<RawEntry>, parent: &str) -> Result<Vec<Entry>, MenuError> {
	raw.into_iter()
		.map(|entry| convert_entry(entry, parent))
		.collect()
}

fn convert_entry(raw: RawEntry, parent: &str) -> Result<Entry, MenuError> {
	let label = raw.label.trim().to_string();
	if label.is_empty() {
		return Err(MenuError::MissingLabel {
			parent: parent.to_string(),
		});
	}

	let exec = raw.exec.filter(|c| !c.trim().is_empty());
	let generator = raw.generator.filter(|c| !c.trim().is_empty());
	let declared = usize::from(!raw.items.is_empty())
		+ usize::from(exec.is_some())
		+ usize::from(generator.is_some());
	if declared > 1 {
		return Err(MenuError::ConflictingActions { label });
	}

	let action = if !raw.items.is_empty() {
		EntryAction::Submenu(convert_entries(raw.items, &label)?)
	} else if let Some(command) = generator {
		EntryAction::Generator(command)
	} else if let Some(command) = exec {
		EntryAction::Command {
			command,
			visible: raw.visible,
		}
	} else {
		EntryAction::None
	};

	Ok(Entry {
		label,
		action,
		id: raw.id.filter(|id| !id.is_empty()),
	})
}

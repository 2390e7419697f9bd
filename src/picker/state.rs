//! Selector state: current level, query, filtered view, cursor and viewport.
//!
//! Every mutation goes through a method that re-establishes the viewport
//! invariants:
//!
//! * `cursor` is `None` exactly when `filtered` is empty, otherwise it indexes
//!   into `filtered`;
//! * `window_start <= cursor < window_start + capacity`.

use std::time::Duration;

use ratatui::crossterm::event::KeyEvent;

use super::filter::matching_indices;
use super::navigation::NavStack;
use crate::menu::Entry;

/// Rows around the item window: two margins, header, prompt, spacer, and the
/// blank line plus status line below the list.
pub const RESERVED_ROWS: u16 = 7;

const DEFAULT_PROMPT: &str = "search>";
const DEFAULT_HEADER: &str = "perch";
const FLAT_HELP: &str = " - type to filter, ↑↓ to move, enter to select";
const MENU_HELP: &str = " - type to filter, ↑↓ to move, enter to select, esc to go back";

/// Which flavour of picker is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Pick one line and hand it to the caller.
	FlatPick,
	/// Pick one line destined for a file.
	FlatPickToFile,
	/// Navigate a menu tree and run the chosen command.
	HierarchicalMenu,
}

/// How many items the viewport shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
	Fixed(usize),
	/// Follow the terminal height, using `fallback` when it is unknown or tiny.
	Auto { fallback: usize },
}

impl Capacity {
	/// Resolve against the terminal height in rows.
	pub fn resolve(self, rows: Option<u16>) -> usize {
		match self {
			Capacity::Fixed(count) => count.max(1),
			Capacity::Auto { fallback } => match rows {
				Some(rows) if rows >= 5 => usize::from(rows.saturating_sub(RESERVED_ROWS).max(1)),
				_ => fallback.max(1),
			},
		}
	}
}

/// Construction options shared by every mode.
#[derive(Debug, Clone)]
pub struct PickerOptions {
	pub prompt: String,
	pub header: String,
	pub capacity: Capacity,
	/// Zero disables the inactivity timer.
	pub idle_timeout: Duration,
	pub dry_run: bool,
}

impl Default for PickerOptions {
	fn default() -> Self {
		Self {
			prompt: DEFAULT_PROMPT.to_string(),
			header: DEFAULT_HEADER.to_string(),
			capacity: Capacity::Fixed(10),
			idle_timeout: Duration::ZERO,
			dry_run: false,
		}
	}
}

/// Input delivered to the engine, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
	Key(KeyEvent),
	Resize(u16, u16),
	TimedOut,
}

/// How a picker session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Cancelled,
	TimedOut,
	Selected(String),
	/// A menu command was committed; it has not been run yet.
	SelectedCommand {
		label: String,
		command: String,
		visible: bool,
	},
}

/// The selector engine's state.
#[derive(Debug, Clone)]
pub struct Picker {
	mode: Mode,
	/// Items of the current level (menu labels in hierarchical mode).
	pub(crate) source: Vec<String>,
	/// Entries of the current level; empty in flat modes.
	pub(crate) entries: Vec<Entry>,
	pub(crate) query: String,
	pub(crate) filtered: Vec<String>,
	/// Position in `source` of each `filtered` item.
	pub(crate) matches: Vec<usize>,
	pub(crate) cursor: Option<usize>,
	pub(crate) window_start: usize,
	capacity: usize,
	capacity_mode: Capacity,
	pub(crate) nav: NavStack,
	prompt: String,
	header: String,
	idle_timeout: Duration,
	dry_run: bool,
	pub(crate) status: Option<String>,
	size: Option<(u16, u16)>,
}

impl Picker {
	/// Pick one of `items`.
	pub fn flat(items: Vec<String>, options: PickerOptions) -> Self {
		Self::build(Mode::FlatPick, items, Vec::new(), options)
	}

	/// Pick one of `items` for writing to a file.
	pub fn flat_to_file(items: Vec<String>, options: PickerOptions) -> Self {
		Self::build(Mode::FlatPickToFile, items, Vec::new(), options)
	}

	/// Navigate the menu rooted at `entries`.
	pub fn menu(entries: Vec<Entry>, options: PickerOptions) -> Self {
		let labels = entries.iter().map(|entry| entry.label.clone()).collect();
		Self::build(Mode::HierarchicalMenu, labels, entries, options)
	}

	fn build(mode: Mode, source: Vec<String>, entries: Vec<Entry>, options: PickerOptions) -> Self {
		let filtered = source.clone();
		let matches = (0..source.len()).collect();
		let cursor = (!filtered.is_empty()).then_some(0);
		Self {
			mode,
			source,
			entries,
			query: String::new(),
			filtered,
			matches,
			cursor,
			window_start: 0,
			capacity: options.capacity.resolve(None),
			capacity_mode: options.capacity,
			nav: NavStack::default(),
			prompt: options.prompt,
			header: options.header,
			idle_timeout: options.idle_timeout,
			dry_run: options.dry_run,
			status: None,
			size: None,
		}
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn filtered(&self) -> &[String] {
		&self.filtered
	}

	pub fn cursor(&self) -> Option<usize> {
		self.cursor
	}

	pub fn window_start(&self) -> usize {
		self.window_start
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Number of levels below the root.
	pub fn depth(&self) -> usize {
		self.nav.depth()
	}

	pub fn idle_timeout(&self) -> Duration {
		self.idle_timeout
	}

	pub fn dry_run(&self) -> bool {
		self.dry_run
	}

	pub fn prompt(&self) -> &str {
		&self.prompt
	}

	pub fn header(&self) -> &str {
		&self.header
	}

	pub fn help(&self) -> &'static str {
		match self.mode {
			Mode::HierarchicalMenu => MENU_HELP,
			Mode::FlatPick | Mode::FlatPickToFile => FLAT_HELP,
		}
	}

	/// Message from the last failed action, cleared by the next key.
	pub fn status(&self) -> Option<&str> {
		self.status.as_deref()
	}

	/// Last size reported by the terminal, as `(columns, rows)`.
	pub fn size(&self) -> Option<(u16, u16)> {
		self.size
	}

	/// The highlighted item, if any.
	pub fn selected(&self) -> Option<&str> {
		self.cursor
			.and_then(|index| self.filtered.get(index))
			.map(String::as_str)
	}

	/// Position of the highlighted item in the current level's source.
	pub(crate) fn selected_index(&self) -> Option<usize> {
		self.cursor.and_then(|index| self.matches.get(index)).copied()
	}

	/// Items inside the viewport with their index into `filtered`.
	pub fn visible(&self) -> impl Iterator<Item = (usize, &str)> {
		self.filtered
			.iter()
			.enumerate()
			.skip(self.window_start)
			.take(self.capacity)
			.map(|(index, item)| (index, item.as_str()))
	}

	pub(crate) fn push_char(&mut self, ch: char) {
		self.query.push(ch);
		self.refilter();
	}

	/// Drop the last query character. No-op on an empty query.
	pub(crate) fn pop_char(&mut self) {
		if self.query.pop().is_some() {
			self.refilter();
		}
	}

	pub(crate) fn move_up(&mut self) {
		if let Some(cursor) = self.cursor
			&& cursor > 0
		{
			let cursor = cursor - 1;
			self.cursor = Some(cursor);
			if cursor < self.window_start {
				self.window_start = cursor;
			}
		}
	}

	pub(crate) fn move_down(&mut self) {
		if let Some(cursor) = self.cursor
			&& cursor + 1 < self.filtered.len()
		{
			let cursor = cursor + 1;
			self.cursor = Some(cursor);
			if cursor >= self.window_start + self.capacity {
				self.window_start = cursor + 1 - self.capacity;
			}
		}
	}

	/// Record a terminal resize; auto capacity follows the new height.
	pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
		self.size = Some((cols, rows));
		if matches!(self.capacity_mode, Capacity::Auto { .. }) {
			self.set_capacity(self.capacity_mode.resolve(Some(rows)));
		}
	}

	pub fn set_capacity(&mut self, capacity: usize) {
		self.capacity = capacity.max(1);
		self.clamp_window();
	}

	/// Recompute `filtered` from the current source and query.
	fn refilter(&mut self) {
		self.matches = matching_indices(&self.source, &self.query);
		self.filtered = self
			.matches
			.iter()
			.map(|&index| self.source[index].clone())
			.collect();
		self.cursor = match self.cursor {
			_ if self.filtered.is_empty() => None,
			Some(cursor) if !self.query.is_empty() && cursor < self.filtered.len() => Some(cursor),
			_ => Some(0),
		};
		self.window_start = 0;
		self.clamp_window();
	}

	/// Re-establish the cursor and viewport invariants.
	pub(crate) fn clamp_window(&mut self) {
		let len = self.filtered.len();
		let Some(last) = len.checked_sub(1) else {
			self.cursor = None;
			self.window_start = 0;
			return;
		};

		let cursor = self.cursor.map_or(0, |cursor| cursor.min(last));
		self.cursor = Some(cursor);
		self.window_start = self.window_start.min(last);
		if cursor < self.window_start {
			self.window_start = cursor;
		} else if cursor >= self.window_start + self.capacity {
			self.window_start = cursor + 1 - self.capacity;
		}
	}
}

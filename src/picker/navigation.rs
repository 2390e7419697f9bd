//! Breadcrumb stack for hierarchical menus.

use tracing::debug;

use super::Picker;
use crate::menu::Entry;

/// Saved position of a parent level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub cursor: Option<usize>,
	pub window_start: usize,
	pub parent: Vec<Entry>,
}

/// Frames for every level above the current one, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavStack {
	frames: Vec<Frame>,
}

impl NavStack {
	pub fn push(&mut self, frame: Frame) {
		self.frames.push(frame);
	}

	pub fn pop(&mut self) -> Option<Frame> {
		self.frames.pop()
	}

	pub fn depth(&self) -> usize {
		self.frames.len()
	}
}

impl Picker {
	/// Enter `children`, remembering where we were.
	pub fn descend(&mut self, children: Vec<Entry>) {
		let parent = std::mem::replace(&mut self.entries, children);
		self.nav.push(Frame {
			cursor: self.cursor,
			window_start: self.window_start,
			parent,
		});
		debug!(depth = self.nav.depth(), "descended into submenu");

		self.reset_level();
		self.window_start = 0;
		self.cursor = (!self.filtered.is_empty()).then_some(0);
	}

	/// Return to the parent level. Returns `false` when already at the root,
	/// which callers treat as a request to exit.
	pub fn ascend(&mut self) -> bool {
		let Some(frame) = self.nav.pop() else {
			return false;
		};
		debug!(depth = self.nav.depth(), "ascended to parent menu");

		self.entries = frame.parent;
		self.reset_level();

		let len = self.filtered.len();
		self.cursor = match frame.cursor {
			_ if len == 0 => None,
			Some(cursor) if cursor < len => Some(cursor),
			Some(_) => Some(len - 1),
			None => Some(0),
		};
		self.window_start = if frame.window_start >= len {
			0
		} else {
			frame.window_start
		};
		self.clamp_window();
		true
	}

	/// Rebuild labels for the current level with an empty query.
	fn reset_level(&mut self) {
		self.query.clear();
		self.source = self
			.entries
			.iter()
			.map(|entry| entry.label.clone())
			.collect();
		self.filtered = self.source.clone();
		self.matches = (0..self.source.len()).collect();
	}
}

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use super::{Mode, Outcome, Picker, PickerEvent};
use crate::menu::{self, EntryAction};
use crate::process::ProcessRunner;

impl Picker {
	/// Apply one event. Returns the outcome once the session is over.
	///
	/// `runner` is only used to expand generator entries.
	pub fn handle_event(
		&mut self,
		event: PickerEvent,
		runner: &dyn ProcessRunner,
	) -> Option<Outcome> {
		match event {
			PickerEvent::Key(key) => self.handle_key(key, runner),
			PickerEvent::Resize(cols, rows) => {
				self.resize(cols, rows);
				None
			}
			PickerEvent::TimedOut => Some(Outcome::TimedOut),
		}
	}

	pub(crate) fn handle_key(&mut self, key: KeyEvent, runner: &dyn ProcessRunner) -> Option<Outcome> {
		self.status = None;
		let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
		let alt = key.modifiers.contains(KeyModifiers::ALT);

		match key.code {
			KeyCode::Char('c') if ctrl => return Some(Outcome::Cancelled),
			KeyCode::Esc => {
				if self.ascend() {
					return None;
				}
				return Some(Outcome::Cancelled);
			}
			KeyCode::Enter => return self.commit(runner),
			KeyCode::Up => self.move_up(),
			KeyCode::Down => self.move_down(),
			KeyCode::Char('k' | 'p') if ctrl => self.move_up(),
			KeyCode::Char('j' | 'n') if ctrl => self.move_down(),
			KeyCode::Char('k') if !alt => self.move_up(),
			KeyCode::Char('j') if !alt => self.move_down(),
			KeyCode::Backspace => self.pop_char(),
			KeyCode::Char(ch) if !ctrl && !alt => self.push_char(ch),
			_ => {}
		}
		None
	}

	/// Act on the highlighted item.
	fn commit(&mut self, runner: &dyn ProcessRunner) -> Option<Outcome> {
		let label = self.selected()?.to_string();
		if self.mode() != Mode::HierarchicalMenu {
			return Some(Outcome::Selected(label));
		}

		let index = self.selected_index()?;
		match self.entries.get(index)?.action.clone() {
			EntryAction::Submenu(children) => {
				self.descend(children);
				None
			}
			EntryAction::Generator(command) => {
				match menu::expand(&command, runner) {
					Ok(children) => self.descend(children),
					Err(err) => {
						let err = anyhow::Error::new(err);
						warn!(%label, "{err:#}");
						self.status = Some(format!("{err:#}"));
					}
				}
				None
			}
			EntryAction::Command { command, visible } => {
				debug!(%label, %command, visible, "menu command selected");
				Some(Outcome::SelectedCommand {
					label,
					command,
					visible,
				})
			}
			EntryAction::None => {
				self.status = Some(format!("'{label}' has no action"));
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::menu::Entry;
	use crate::picker::{Capacity, PickerOptions};
	use crate::process::fake::{Call, RecordingRunner};

	fn key(code: KeyCode) -> PickerEvent {
		PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
	}

	fn ctrl(ch: char) -> PickerEvent {
		PickerEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
	}

	fn type_text(picker: &mut Picker, runner: &RecordingRunner, text: &str) {
		for ch in text.chars() {
			assert_eq!(picker.handle_event(key(KeyCode::Char(ch)), runner), None);
		}
	}

	fn options() -> PickerOptions {
		PickerOptions {
			capacity: Capacity::Fixed(5),
			..PickerOptions::default()
		}
	}

	fn flat(values: &[&str]) -> Picker {
		Picker::flat(values.iter().map(|v| v.to_string()).collect(), options())
	}

	#[test]
	fn flat_filter_move_select() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["alpha", "berry", "gamma"]);

		type_text(&mut picker, &runner, "a");
		insta::assert_snapshot!(picker.filtered().join(","), @"alpha,gamma");

		assert_eq!(picker.handle_event(key(KeyCode::Down), &runner), None);
		assert_eq!(picker.cursor(), Some(1));
		assert_eq!(
			picker.handle_event(key(KeyCode::Enter), &runner),
			Some(Outcome::Selected("gamma".into()))
		);
		assert!(runner.calls().is_empty());
	}

	#[test]
	fn enter_on_empty_filter_is_a_noop() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["alpha"]);
		type_text(&mut picker, &runner, "x");
		assert_eq!(picker.handle_event(key(KeyCode::Enter), &runner), None);
		assert_eq!(picker.cursor(), None);

		let mut empty = Picker::menu(Vec::new(), options());
		assert_eq!(empty.handle_event(key(KeyCode::Enter), &runner), None);
	}

	#[test]
	fn escape_and_interrupt_cancel_flat_pick() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["a"]);
		assert_eq!(
			picker.handle_event(key(KeyCode::Esc), &runner),
			Some(Outcome::Cancelled)
		);
		assert_eq!(
			flat(&["a"]).handle_event(ctrl('c'), &runner),
			Some(Outcome::Cancelled)
		);
	}

	#[test]
	fn movement_key_bindings() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["one", "two", "three"]);

		picker.handle_event(key(KeyCode::Char('j')), &runner);
		picker.handle_event(ctrl('n'), &runner);
		assert_eq!(picker.cursor(), Some(2));
		picker.handle_event(ctrl('j'), &runner);
		assert_eq!(picker.cursor(), Some(2));

		picker.handle_event(key(KeyCode::Char('k')), &runner);
		picker.handle_event(ctrl('p'), &runner);
		picker.handle_event(ctrl('k'), &runner);
		assert_eq!(picker.cursor(), Some(0));
		assert_eq!(picker.query(), "");
	}

	#[test]
	fn control_and_alt_chords_do_not_type() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["one"]);
		picker.handle_event(ctrl('x'), &runner);
		picker.handle_event(
			PickerEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)),
			&runner,
		);
		picker.handle_event(
			PickerEvent::Key(KeyEvent::new(KeyCode::Char('O'), KeyModifiers::SHIFT)),
			&runner,
		);
		assert_eq!(picker.query(), "O");
	}

	#[test]
	fn backspace_refilters() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["alpha", "beta"]);
		type_text(&mut picker, &runner, "al");
		assert_eq!(picker.filtered(), ["alpha"]);
		picker.handle_event(key(KeyCode::Backspace), &runner);
		picker.handle_event(key(KeyCode::Backspace), &runner);
		assert_eq!(picker.filtered().len(), 2);
		picker.handle_event(key(KeyCode::Backspace), &runner);
		assert_eq!(picker.query(), "");
	}

	#[test]
	fn timeout_and_resize_events() {
		let runner = RecordingRunner::default();
		let mut picker = flat(&["a", "b"]);
		assert_eq!(picker.handle_event(PickerEvent::Resize(90, 40), &runner), None);
		assert_eq!(picker.size(), Some((90, 40)));
		assert_eq!(picker.capacity(), 5);
		assert_eq!(
			picker.handle_event(PickerEvent::TimedOut, &runner),
			Some(Outcome::TimedOut)
		);
	}

	fn sample_menu() -> Vec<Entry> {
		vec![
			Entry::command("first", "true", false),
			Entry::submenu("A", vec![Entry::command("B", "echo hi", true)]),
			Entry::generator("Generated", "gen"),
			Entry::generator("Broken", "broken"),
			Entry::new("Inert", EntryAction::None),
		]
	}

	fn select(picker: &mut Picker, runner: &RecordingRunner, label: &str) -> Option<Outcome> {
		for ch in label.chars() {
			picker.handle_event(key(KeyCode::Char(ch)), runner);
		}
		picker.handle_event(key(KeyCode::Enter), runner)
	}

	#[test]
	fn submenu_descent_and_escape_restore_root() {
		let runner = RecordingRunner::default();
		let mut picker = Picker::menu(sample_menu(), options());
		picker.handle_event(key(KeyCode::Down), &runner);
		let root_labels = picker.filtered().to_vec();

		assert_eq!(picker.handle_event(key(KeyCode::Enter), &runner), None);
		assert_eq!(picker.depth(), 1);
		assert_eq!(picker.filtered(), ["B"]);

		assert_eq!(picker.handle_event(key(KeyCode::Esc), &runner), None);
		assert_eq!(picker.depth(), 0);
		assert_eq!(picker.cursor(), Some(1));
		assert_eq!(picker.window_start(), 0);
		assert_eq!(picker.filtered(), root_labels.as_slice());

		assert_eq!(
			picker.handle_event(key(KeyCode::Esc), &runner),
			Some(Outcome::Cancelled)
		);
	}

	#[test]
	fn interrupt_cancels_at_any_depth() {
		let runner = RecordingRunner::default();
		let mut picker = Picker::menu(sample_menu(), options());
		picker.handle_event(key(KeyCode::Down), &runner);
		picker.handle_event(key(KeyCode::Enter), &runner);
		assert_eq!(picker.depth(), 1);
		assert_eq!(picker.handle_event(ctrl('c'), &runner), Some(Outcome::Cancelled));
	}

	#[test]
	fn command_entry_produces_selected_command() {
		let runner = RecordingRunner::default();
		let mut picker = Picker::menu(sample_menu(), options());
		picker.handle_event(key(KeyCode::Down), &runner);
		picker.handle_event(key(KeyCode::Enter), &runner);

		assert_eq!(
			picker.handle_event(key(KeyCode::Enter), &runner),
			Some(Outcome::SelectedCommand {
				label: "B".into(),
				command: "echo hi".into(),
				visible: true,
			})
		);
		assert!(runner.calls().is_empty());
	}

	#[test]
	fn generator_success_descends() {
		let runner = RecordingRunner::default()
			.with_output("gen", "[[items]]\nlabel = \"made\"\nexec = \"run-made\"\n");
		let mut picker = Picker::menu(sample_menu(), options());

		assert_eq!(select(&mut picker, &runner, "gene"), None);
		assert_eq!(runner.calls(), vec![Call::Captured("gen".into())]);
		assert_eq!(picker.depth(), 1);
		assert_eq!(picker.filtered(), ["made"]);
		assert_eq!(picker.query(), "");

		assert_eq!(
			picker.handle_event(key(KeyCode::Enter), &runner),
			Some(Outcome::SelectedCommand {
				label: "made".into(),
				command: "run-made".into(),
				visible: false,
			})
		);
	}

	#[test]
	fn generator_failure_stays_put_with_status() {
		let runner = RecordingRunner::default().with_failure("broken", 1);
		let mut picker = Picker::menu(sample_menu(), options());

		assert_eq!(select(&mut picker, &runner, "bro"), None);
		assert_eq!(picker.depth(), 0);
		assert_eq!(picker.query(), "bro");
		assert_eq!(picker.filtered(), ["Broken"]);
		let status = picker.status().expect("status message");
		assert!(status.starts_with("generator 'broken' failed"), "{status}");

		picker.handle_event(key(KeyCode::Backspace), &runner);
		assert_eq!(picker.status(), None);
	}

	#[test]
	fn entry_without_action_reports_status() {
		let runner = RecordingRunner::default();
		let mut picker = Picker::menu(sample_menu(), options());
		assert_eq!(select(&mut picker, &runner, "inert"), None);
		assert_eq!(picker.status(), Some("'Inert' has no action"));
	}

	#[test]
	fn generator_expansion_leaves_source_tree_untouched() {
		let runner = RecordingRunner::default().with_output("gen", "[[items]]\nlabel = \"x\"\n");
		let mut picker = Picker::menu(sample_menu(), options());
		select(&mut picker, &runner, "gene");
		picker.handle_event(key(KeyCode::Esc), &runner);

		assert_eq!(picker.entries, sample_menu());
	}

	#[test]
	fn duplicate_labels_run_the_highlighted_entry() {
		let runner = RecordingRunner::default();
		let mut picker = Picker::menu(
			vec![
				Entry::command("Open", "xdg-open ~", false),
				Entry::command("Files", "thunar", false),
				Entry::command("Open", "xdg-open /tmp", false),
			],
			options(),
		);

		type_text(&mut picker, &runner, "open");
		assert_eq!(picker.filtered(), ["Open", "Open"]);
		picker.handle_event(key(KeyCode::Down), &runner);
		assert_eq!(
			picker.handle_event(key(KeyCode::Enter), &runner),
			Some(Outcome::SelectedCommand {
				label: "Open".into(),
				command: "xdg-open /tmp".into(),
				visible: false,
			})
		);
	}
}

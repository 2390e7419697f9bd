use std::io::{self, Stderr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::crossterm::terminal::{
	EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::crossterm::{cursor, execute};
use tracing::{debug, info};

use super::timer::InactivityTimer;
use super::{Outcome, Picker, PickerEvent};
use crate::process::ProcessRunner;
use crate::theme::Theme;

const INPUT_POLL: Duration = Duration::from_millis(50);

type StderrBackend = CrosstermBackend<Stderr>;

/// Run `picker` on the controlling terminal until it produces an outcome.
pub fn run(mut picker: Picker, runner: &dyn ProcessRunner, theme: &Theme) -> Result<Outcome> {
	picker.run(runner, theme)
}

/// Raw-mode alternate screen on stderr, so stdout stays free for the result.
struct TerminalSession {
	terminal: Terminal<StderrBackend>,
}

impl TerminalSession {
	fn enter() -> Result<Self> {
		enable_raw_mode().context("failed to enable raw mode")?;
		let mut stderr = io::stderr();
		execute!(stderr, EnterAlternateScreen).context("failed to enter alternate screen")?;
		let terminal = Terminal::new(CrosstermBackend::new(stderr))?;
		Ok(Self { terminal })
	}
}

impl Drop for TerminalSession {
	fn drop(&mut self) {
		let _ = disable_raw_mode();
		let _ = execute!(
			self.terminal.backend_mut(),
			LeaveAlternateScreen,
			cursor::Show
		);
	}
}

impl Picker {
	/// Pump terminal, resize and timer events until the session ends.
	pub fn run(&mut self, runner: &dyn ProcessRunner, theme: &Theme) -> Result<Outcome> {
		let mut session = TerminalSession::enter()?;
		session.terminal.clear()?;
		let size = session.terminal.size()?;
		self.resize(size.width, size.height);

		let (event_tx, event_rx) = mpsc::channel();
		let event_loop_running = Arc::new(AtomicBool::new(true));
		let event_loop_flag = Arc::clone(&event_loop_running);

		let input_tx = event_tx.clone();
		let event_thread = thread::spawn(move || -> Result<()> {
			while event_loop_flag.load(Ordering::Relaxed) {
				if event::poll(INPUT_POLL)? {
					let event = match event::read()? {
						Event::Key(key) if key.kind == KeyEventKind::Press => PickerEvent::Key(key),
						Event::Resize(cols, rows) => PickerEvent::Resize(cols, rows),
						_ => continue,
					};
					if input_tx.send(event).is_err() {
						break;
					}
				}
			}
			Ok(())
		});

		let mut timer = (!self.idle_timeout().is_zero()).then(|| {
			info!(timeout = ?self.idle_timeout(), "inactivity timer armed");
			InactivityTimer::start(self.idle_timeout(), event_tx)
		});

		let result = self.pump(&mut session.terminal, &event_rx, timer.as_ref(), runner, theme);

		if let Some(timer) = timer.as_mut() {
			timer.stop();
		}
		drop(session);

		event_loop_running.store(false, Ordering::Relaxed);
		match event_thread.join() {
			Ok(join_result) => join_result?,
			Err(err) => std::panic::resume_unwind(err),
		}

		if let Ok(outcome) = &result {
			debug!(?outcome, "picker finished");
		}
		result
	}

	/// Draw, then apply queued events until one ends the session. Keys that
	/// leave the session running restart the inactivity countdown.
	fn pump<B: Backend>(
		&mut self,
		terminal: &mut Terminal<B>,
		events: &Receiver<PickerEvent>,
		timer: Option<&InactivityTimer>,
		runner: &dyn ProcessRunner,
		theme: &Theme,
	) -> Result<Outcome> {
		loop {
			terminal.draw(|frame| self.draw(frame, theme))?;

			let event = events
				.recv()
				.map_err(|_| anyhow!("input event channel disconnected"))?;
			let is_key = matches!(event, PickerEvent::Key(_));

			if let Some(outcome) = self.handle_event(event, runner) {
				return Ok(outcome);
			}
			if is_key && let Some(timer) = timer {
				timer.reset();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc::Sender;
	use std::time::Instant;

	use ratatui::backend::TestBackend;
	use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

	use super::*;
	use crate::picker::{Capacity, PickerOptions};
	use crate::process::fake::RecordingRunner;

	fn flat(items: &[&str]) -> Picker {
		Picker::flat(
			items.iter().map(|item| item.to_string()).collect(),
			PickerOptions {
				capacity: Capacity::Fixed(5),
				..PickerOptions::default()
			},
		)
	}

	fn pump(picker: &mut Picker, events: &Receiver<PickerEvent>, timer: &InactivityTimer) -> Outcome {
		let mut terminal = Terminal::new(TestBackend::new(40, 12)).expect("terminal");
		picker
			.pump(
				&mut terminal,
				events,
				Some(timer),
				&RecordingRunner::default(),
				&Theme::default(),
			)
			.expect("pump")
	}

	fn send_later(tx: &Sender<PickerEvent>, delays_and_keys: Vec<(u64, KeyCode)>) -> thread::JoinHandle<()> {
		let tx = tx.clone();
		thread::spawn(move || {
			for (delay, code) in delays_and_keys {
				thread::sleep(Duration::from_millis(delay));
				let _ = tx.send(PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
			}
		})
	}

	#[test]
	fn idle_session_times_out() {
		let (tx, rx) = mpsc::channel();
		let timer = InactivityTimer::start(Duration::from_millis(50), tx.clone());
		let mut picker = flat(&["alpha", "beta"]);

		assert_eq!(pump(&mut picker, &rx, &timer), Outcome::TimedOut);
		drop(tx);
	}

	#[test]
	fn typing_postpones_the_timeout() {
		let (tx, rx) = mpsc::channel();
		let timer = InactivityTimer::start(Duration::from_millis(300), tx.clone());
		let mut picker = flat(&["abcd", "other"]);
		let typist = send_later(
			&tx,
			"abcd".chars().map(|ch| (150, KeyCode::Char(ch))).collect(),
		);

		let started = Instant::now();
		let outcome = pump(&mut picker, &rx, &timer);
		typist.join().expect("typist thread");

		assert_eq!(outcome, Outcome::TimedOut);
		assert_eq!(picker.query(), "abcd");
		assert!(started.elapsed() >= Duration::from_millis(800));
	}

	#[test]
	fn committing_key_leaves_the_countdown_alone() {
		let (tx, rx) = mpsc::channel();
		let started = Instant::now();
		let timer = InactivityTimer::start(Duration::from_millis(600), tx.clone());
		let mut picker = flat(&["alpha", "beta"]);
		let typist = send_later(&tx, vec![(300, KeyCode::Enter)]);

		assert_eq!(
			pump(&mut picker, &rx, &timer),
			Outcome::Selected("alpha".into())
		);
		typist.join().expect("typist thread");

		assert_eq!(
			rx.recv_timeout(Duration::from_secs(2)),
			Ok(PickerEvent::TimedOut)
		);
		assert!(started.elapsed() < Duration::from_millis(800));
	}
}

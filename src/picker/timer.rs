//! Inactivity timer posting [`PickerEvent::TimedOut`] into the event queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::PickerEvent;

/// Single-shot countdown running on its own thread.
///
/// Resets travel through a one-slot channel; a reset attempted while another
/// is still pending is dropped. Once [`InactivityTimer::stop`] returns (or the
/// timer is dropped) no event is posted.
pub struct InactivityTimer {
	reset_tx: Option<SyncSender<()>>,
	stopped: Arc<AtomicBool>,
	handle: Option<JoinHandle<()>>,
}

impl InactivityTimer {
	/// Start counting down `duration`; on expiry exactly one
	/// [`PickerEvent::TimedOut`] is sent on `events`.
	pub fn start(duration: Duration, events: Sender<PickerEvent>) -> Self {
		let (reset_tx, reset_rx) = mpsc::sync_channel::<()>(1);
		let stopped = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&stopped);

		let handle = thread::spawn(move || {
			let mut deadline = Instant::now() + duration;
			loop {
				let remaining = deadline.saturating_duration_since(Instant::now());
				match reset_rx.recv_timeout(remaining) {
					Ok(()) => {
						trace!("inactivity timer reset");
						deadline = Instant::now() + duration;
					}
					Err(RecvTimeoutError::Timeout) => {
						if !flag.load(Ordering::SeqCst) {
							debug!(?duration, "inactivity timeout elapsed");
							let _ = events.send(PickerEvent::TimedOut);
						}
						return;
					}
					Err(RecvTimeoutError::Disconnected) => return,
				}
			}
		});

		Self {
			reset_tx: Some(reset_tx),
			stopped,
			handle: Some(handle),
		}
	}

	/// Restart the countdown from its full duration.
	pub fn reset(&self) {
		let Some(tx) = &self.reset_tx else {
			return;
		};
		// Full means a reset is already pending; disconnected means the timer
		// has fired or stopped.
		let _ = tx.try_send(());
	}

	/// Halt the timer thread and wait for it to exit.
	pub fn stop(&mut self) {
		self.stopped.store(true, Ordering::SeqCst);
		self.reset_tx.take();
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

impl Drop for InactivityTimer {
	fn drop(&mut self) {
		self.stop();
	}
}

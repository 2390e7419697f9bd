//! The selector engine.
//!
//! [`Picker`] holds the state for all three modes. Key handling lives in
//! `actions`, submenu descent in `navigation`, drawing in `render` and the
//! terminal event loop in `runtime`; each adds an `impl Picker` block.

mod actions;
mod filter;
mod navigation;
mod render;
mod runtime;
mod state;
mod timer;

pub use filter::{filter, matching_indices};
pub use navigation::{Frame, NavStack};
pub use runtime::run;
pub use state::{Capacity, Mode, Outcome, Picker, PickerEvent, PickerOptions, RESERVED_ROWS};
pub use timer::InactivityTimer;

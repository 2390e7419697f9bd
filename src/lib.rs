//! Keyboard-driven picker for piped lines, desktop applications and
//! hierarchical command menus.
//!
//! The binary wires these pieces together: a [`Picker`] runs until it yields
//! an [`Outcome`], which a [`Dispatcher`] then acts on.

pub mod app_dirs;
pub mod apps;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod menu;
pub mod picker;
pub mod process;
pub mod theme;

pub use apps::AppEntry;
pub use dispatch::{Dispatched, Dispatcher, Target};
pub use error::{DispatchError, MenuError, ProcessError};
pub use menu::{Entry, EntryAction, MenuFile};
pub use picker::{Capacity, Mode, Outcome, Picker, PickerEvent, PickerOptions};
pub use process::{ProcessRunner, ShellRunner};
pub use theme::{ColorScheme, Theme};

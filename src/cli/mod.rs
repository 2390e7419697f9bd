mod annotations;
mod args;

pub(crate) use args::{AppsArgs, CliArgs, CommandArgs, DmenuArgs, MenuArgs, SessionArgs, parse_cli};

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use tracing::warn;

/// Styles used when drawing the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
	/// Header title.
	pub title: Style,
	/// Prompt in front of the query.
	pub prompt: Style,
	/// Unselected rows.
	pub item: Style,
	/// Row under the cursor.
	pub selected: Style,
	/// Help text, "no matches" and status lines.
	pub help: Style,
}

/// Color names as they appear in configuration: an ANSI index (`"205"`),
/// a hex triple (`"#ff87d7"`) or a named color (`"magenta"`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorScheme {
	pub title: Option<String>,
	pub prompt: Option<String>,
	pub item: Option<String>,
	pub selected: Option<String>,
	pub help: Option<String>,
}

const SELECTED_FG: Color = Color::Indexed(230);

impl Default for Theme {
	fn default() -> Self {
		Self {
			title: Style::new()
				.fg(Color::Indexed(205))
				.add_modifier(Modifier::BOLD),
			prompt: Style::new().fg(Color::Indexed(6)),
			item: Style::new().fg(Color::Indexed(252)),
			selected: Style::new()
				.fg(SELECTED_FG)
				.bg(Color::Indexed(57))
				.add_modifier(Modifier::BOLD),
			help: Style::new().fg(Color::Indexed(241)),
		}
	}
}

impl Theme {
	/// Start from the defaults and override every configured color.
	/// Unparseable colors are logged and ignored.
	#[must_use]
	pub fn from_colors(colors: &ColorScheme) -> Self {
		let mut theme = Self::default();
		if let Some(color) = parse_setting("title", colors.title.as_deref()) {
			theme.title = theme.title.fg(color);
		}
		if let Some(color) = parse_setting("prompt", colors.prompt.as_deref()) {
			theme.prompt = theme.prompt.fg(color);
		}
		if let Some(color) = parse_setting("item", colors.item.as_deref()) {
			theme.item = theme.item.fg(color);
		}
		if let Some(color) = parse_setting("selected", colors.selected.as_deref()) {
			theme.selected = theme.selected.bg(color);
		}
		if let Some(color) = parse_setting("help", colors.help.as_deref()) {
			theme.help = theme.help.fg(color);
		}
		theme
	}
}

fn parse_setting(key: &str, value: Option<&str>) -> Option<Color> {
	let value = value?.trim();
	if value.is_empty() {
		return None;
	}
	match parse_color(value) {
		Some(color) => Some(color),
		None => {
			warn!(key, value, "ignoring unrecognised color");
			None
		}
	}
}

/// Parse an ANSI index, `#rrggbb` or color name.
pub fn parse_color(value: &str) -> Option<Color> {
	if let Ok(index) = value.parse::<u8>() {
		return Some(Color::Indexed(index));
	}
	value.parse::<Color>().ok()
}

use std::borrow::Cow;

use ratatui::{
	Frame,
	layout::Margin,
	text::{Line, Span},
	widgets::Paragraph,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::Picker;
use crate::theme::Theme;

const CURSOR_MARKER: &str = " > ";
const ROW_INDENT: &str = "   ";
const NO_MATCHES: &str = "   no matches found";

impl Picker {
	/// Draw header, prompt line, the visible window and any status message.
	pub fn draw(&self, frame: &mut Frame, theme: &Theme) {
		let area = frame.area().inner(Margin {
			vertical: 1,
			horizontal: 2,
		});
		let width = usize::from(area.width);
		let mut lines = Vec::with_capacity(self.capacity() + 4);

		if !self.header().is_empty() {
			lines.push(Line::from(vec![
				Span::styled(self.header(), theme.title),
				Span::styled(self.help(), theme.help),
			]));
		}
		lines.push(Line::from(vec![
			Span::styled(self.prompt(), theme.prompt),
			Span::raw(" "),
			Span::raw(self.query()),
		]));
		lines.push(Line::default());

		let label_width = width.saturating_sub(CURSOR_MARKER.len());
		for (index, item) in self.visible() {
			let label = truncate_to_width(item, label_width);
			let line = if Some(index) == self.cursor() {
				Line::styled(format!("{CURSOR_MARKER}{label}"), theme.selected)
			} else {
				Line::styled(format!("{ROW_INDENT}{label}"), theme.item)
			};
			lines.push(line);
		}

		if self.filtered().is_empty() {
			lines.push(Line::styled(NO_MATCHES, theme.help));
		}

		if let Some(status) = self.status() {
			lines.push(Line::default());
			lines.push(Line::styled(
				truncate_to_width(status, width).into_owned(),
				theme.help,
			));
		}

		frame.render_widget(Paragraph::new(lines), area);
	}
}

/// Cut `text` to `max` display columns, ending with an ellipsis when cut.
fn truncate_to_width(text: &str, max: usize) -> Cow<'_, str> {
	if text.width() <= max {
		return Cow::Borrowed(text);
	}
	if max == 0 {
		return Cow::Borrowed("");
	}

	let mut out = String::new();
	let mut used = 0;
	for ch in text.chars() {
		let ch_width = ch.width().unwrap_or(0);
		if used + ch_width > max - 1 {
			break;
		}
		used += ch_width;
		out.push(ch);
	}
	out.push('…');
	Cow::Owned(out)
}

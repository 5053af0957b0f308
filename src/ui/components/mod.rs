pub mod dialog;
pub mod drill_view;
pub mod menu;
pub mod reading_view;
pub mod vocab_manager;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::line_input::LineInput;
use crate::ui::theme::ThemeColors;

/// Render a line editor with a visible cursor cell. The cursor is drawn by
/// inverting one character; unfocused inputs render flat.
pub fn input_line<'a>(input: &'a LineInput, focused: bool, colors: &ThemeColors) -> Line<'a> {
    let (before, at, after) = input.render_parts();
    let base = Style::default().fg(colors.fg());
    if !focused {
        return Line::from(Span::styled(input.value(), Style::default().fg(colors.muted())));
    }
    let cursor_style = Style::default()
        .fg(colors.bg())
        .bg(colors.fg())
        .add_modifier(Modifier::BOLD);
    match at {
        Some(ch) => Line::from(vec![
            Span::styled(before, base),
            Span::styled(ch.to_string(), cursor_style),
            Span::styled(after, base),
        ]),
        None => Line::from(vec![
            Span::styled(before, base),
            Span::styled(" ", cursor_style),
        ]),
    }
}

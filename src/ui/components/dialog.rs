use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// Centered modal dialog. Confirm dialogs answer with y/n; notices dismiss
/// with Enter or Esc.
pub struct DialogView<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub confirm: bool,
    pub danger: bool,
    pub theme: &'a Theme,
}

impl Widget for DialogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(50, 30, area);

        Clear.render(popup, buf);

        let border = if self.danger {
            colors.error()
        } else {
            colors.accent()
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(border).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(1)])
            .split(inner);

        Paragraph::new(self.body)
            .style(Style::default().fg(colors.fg()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        let hint = if self.confirm {
            " [y] yes   [n] no "
        } else {
            " [Enter] OK "
        };
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.muted()),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);
    }
}

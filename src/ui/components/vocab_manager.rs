use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::store::vocab::VocabRepository;
use crate::ui::Feedback;
use crate::ui::components::input_line;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagerField {
    Term,
    Translation,
}

pub struct VocabManagerView<'a> {
    pub repo: &'a VocabRepository,
    pub selected: Option<usize>,
    pub term: &'a LineInput,
    pub translation: &'a LineInput,
    pub field: ManagerField,
    pub feedback: Option<&'a Feedback>,
    pub theme: &'a Theme,
}

impl Widget for VocabManagerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Manage Vocabulary ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(inner);

        self.render_list(halves[0], buf);
        self.render_editor(halves[1], buf);
    }
}

impl VocabManagerView<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" Words ({}) ", self.repo.len()))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = inner.height as usize;
        let selected = self.selected.unwrap_or(0);
        let first = if selected >= visible {
            selected + 1 - visible
        } else {
            0
        };

        let mut lines: Vec<Line> = Vec::new();
        for (i, item) in self.repo.items().iter().enumerate().skip(first).take(visible) {
            let is_selected = self.selected == Some(i);
            let indicator = if is_selected { ">" } else { " " };
            let style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(" {indicator} {} — {}", item.term, item.translation),
                style,
            )));
        }
        if self.repo.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (no words yet — add one on the right)",
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_editor(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(if self.selected.is_some() {
                " Edit entry "
            } else {
                " New entry "
            })
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let term_block = Block::bordered()
            .title(" English ")
            .border_style(Style::default().fg(if self.field == ManagerField::Term {
                colors.accent()
            } else {
                colors.border()
            }));
        let term_inner = term_block.inner(layout[0]);
        term_block.render(layout[0], buf);
        input_line(self.term, self.field == ManagerField::Term, colors).render(term_inner, buf);

        let translation_block = Block::bordered()
            .title(" Vietnamese ")
            .border_style(
                Style::default().fg(if self.field == ManagerField::Translation {
                    colors.accent()
                } else {
                    colors.border()
                }),
            );
        let translation_inner = translation_block.inner(layout[1]);
        translation_block.render(layout[1], buf);
        input_line(
            self.translation,
            self.field == ManagerField::Translation,
            colors,
        )
        .render(translation_inner, buf);

        if let Some((message, tone)) = self.feedback {
            Paragraph::new(Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(tone.color(colors)),
            )))
            .render(layout[2], buf);
        }

        let hints = vec![
            Line::from(Span::styled(
                " [Enter] save  [Tab] next field",
                Style::default().fg(colors.muted()),
            )),
            Line::from(Span::styled(
                " [Up/Down] pick  [Ctrl+X] new  [Ctrl+D] delete",
                Style::default().fg(colors.muted()),
            )),
            Line::from(Span::styled(
                " Edits save to vocab.json immediately.",
                Style::default().fg(colors.muted()),
            )),
        ];
        Paragraph::new(hints).render(layout[3], buf);
    }
}

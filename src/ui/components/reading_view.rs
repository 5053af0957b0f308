use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::reading::{ComprehensionTest, QuestionSlot};
use crate::reading::grader::GradeSummary;
use crate::ui::Feedback;
use crate::ui::layout::LayoutTier;
use crate::ui::theme::Theme;

pub struct ReadingView<'a> {
    pub test: &'a ComprehensionTest,
    pub slots: &'a [QuestionSlot],
    pub responses: &'a [Option<String>],
    pub selected: usize,
    pub scroll: u16,
    pub last_grade: Option<GradeSummary>,
    pub feedback: Option<&'a Feedback>,
    pub tier: LayoutTier,
    pub theme: &'a Theme,
}

impl Widget for ReadingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Reading: {} ", self.test.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let (passage_area, questions_area) = if self.tier.side_by_side() {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(inner);
            (halves[0], halves[1])
        } else {
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(inner);
            (halves[0], halves[1])
        };

        let passage_block = Block::bordered()
            .title(" Passage ")
            .border_style(Style::default().fg(colors.border()));
        let passage_inner = passage_block.inner(passage_area);
        passage_block.render(passage_area, buf);
        Paragraph::new(self.test.passage.as_str())
            .style(Style::default().fg(colors.fg()))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(passage_inner, buf);

        let questions_block = Block::bordered()
            .title(" Questions ")
            .border_style(Style::default().fg(colors.border()));
        let questions_inner = questions_block.inner(questions_area);
        questions_block.render(questions_area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(2)])
            .split(questions_inner);

        // Keep the selected question in view.
        let visible = layout[0].height as usize;
        let first = if self.selected >= visible {
            self.selected + 1 - visible
        } else {
            0
        };

        let mut lines: Vec<Line> = Vec::new();
        for (i, slot) in self.slots.iter().enumerate().skip(first).take(visible) {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let answer = self.responses.get(i).and_then(|r| r.as_deref()).unwrap_or("—");
            let style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {indicator} [{answer}] "), style),
                Span::styled(slot.label.clone(), style),
            ]));
        }
        Paragraph::new(lines).render(layout[0], buf);

        let summary = match self.last_grade {
            Some(grade) => format!(
                "  Score: {}/{} correct, {} unanswered",
                grade.correct, grade.total, grade.unanswered
            ),
            None => String::from("  Not graded yet"),
        };
        let mut footer_lines = vec![Line::from(Span::styled(
            summary,
            Style::default().fg(colors.muted()),
        ))];
        if let Some((message, tone)) = self.feedback {
            footer_lines.push(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(tone.color(colors)),
            )));
        }
        Paragraph::new(footer_lines).render(layout[1], buf);
    }
}

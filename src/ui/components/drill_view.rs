use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::scheduler::{DrillScheduler, Phase};
use crate::store::vocab::VocabRepository;
use crate::ui::Feedback;
use crate::ui::components::input_line;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct DrillView<'a> {
    pub scheduler: &'a DrillScheduler,
    pub repo: &'a VocabRepository,
    pub answer: &'a LineInput,
    pub sentence: &'a LineInput,
    pub feedback: Option<&'a Feedback>,
    pub judge_feedback: Option<&'a Feedback>,
    pub judging: bool,
    pub theme: &'a Theme,
}

impl Widget for DrillView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Vocabulary Drill ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // progress
                Constraint::Length(5), // prompt
                Constraint::Length(3), // answer input
                Constraint::Length(2), // feedback
                Constraint::Min(0),    // remediation panel
            ])
            .split(inner);

        let round = if self.scheduler.is_review_round() {
            format!("Round {} (review)", self.scheduler.round())
        } else {
            format!("Round {}", self.scheduler.round())
        };
        let progress = format!(
            "  Correct: {} / Target: {}   {}",
            self.scheduler.correct_count(),
            self.scheduler.target_correct(),
            round,
        );
        Paragraph::new(Line::from(Span::styled(
            progress,
            Style::default().fg(colors.muted()),
        )))
        .render(layout[0], buf);

        let prompt_lines = match self.scheduler.current_prompt(self.repo) {
            Some(translation) => vec![
                Line::from(Span::styled(
                    "Which ENGLISH word means:",
                    Style::default().fg(colors.fg()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("\"{translation}\""),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
            ],
            None if self.scheduler.is_complete() => vec![Line::from(Span::styled(
                "Target reached — this module is unlocked.",
                Style::default().fg(colors.success()),
            ))],
            None => vec![Line::from(Span::styled(
                "Drawing a question…",
                Style::default().fg(colors.muted()),
            ))],
        };
        Paragraph::new(prompt_lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);

        let in_remediation = matches!(self.scheduler.phase(), Phase::Remediation { .. });

        let answer_block = Block::bordered()
            .title(" Your answer ")
            .border_style(Style::default().fg(if in_remediation {
                colors.border()
            } else {
                colors.accent()
            }));
        let answer_inner = answer_block.inner(layout[2]);
        answer_block.render(layout[2], buf);
        input_line(self.answer, !in_remediation, colors).render(answer_inner, buf);

        if let Some((message, tone)) = self.feedback {
            Paragraph::new(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(tone.color(colors)),
            )))
            .render(layout[3], buf);
        }

        if in_remediation {
            self.render_remediation(layout[4], buf);
        }
    }
}

impl DrillView<'_> {
    /// The forced sentence-production task shown after a miss.
    fn render_remediation(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let missed_term = self
            .scheduler
            .current_index()
            .and_then(|i| self.repo.get(i))
            .map(|item| item.term.as_str())
            .unwrap_or("");

        let block = Block::bordered()
            .title(" Practice the word you missed ")
            .border_style(Style::default().fg(colors.warning()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::styled("Write a sentence using ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("\"{missed_term}\""),
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " to continue.",
                Style::default().fg(colors.fg()),
            ),
        ]))
        .render(layout[0], buf);

        let sentence_block = Block::bordered()
            .title(" Your sentence ")
            .border_style(Style::default().fg(colors.accent()));
        let sentence_inner = sentence_block.inner(layout[1]);
        sentence_block.render(layout[1], buf);
        input_line(self.sentence, true, colors).render(sentence_inner, buf);

        let status = if self.judging {
            Some(("Checking your sentence…".to_string(), crate::ui::Tone::Info))
        } else {
            None
        };
        let shown = status.as_ref().or(self.judge_feedback);
        if let Some((message, tone)) = shown {
            Paragraph::new(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(tone.color(colors)),
            )))
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);
        }
    }
}

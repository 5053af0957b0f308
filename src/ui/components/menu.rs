use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::coordinator::StudyModule;
use crate::ui::Feedback;
use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub module: Option<StudyModule>,
}

/// The hub: pick a module, watch completion status, and read why the app
/// refuses to close.
pub struct HubMenu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> HubMenu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: "1".to_string(),
                    label: "Vocabulary Drill".to_string(),
                    description: "Answer enough terms correctly to unlock".to_string(),
                    module: Some(StudyModule::Vocabulary),
                },
                MenuItem {
                    key: "2".to_string(),
                    label: "Reading Practice".to_string(),
                    description: "Read the passage and answer every question".to_string(),
                    module: Some(StudyModule::Reading),
                },
                MenuItem {
                    key: "m".to_string(),
                    label: "Manage Vocabulary".to_string(),
                    description: "Add, edit, or remove word pairs".to_string(),
                    module: None,
                },
            ],
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }
}

pub struct HubView<'a> {
    pub menu: &'a HubMenu<'a>,
    pub vocab_done: bool,
    pub reading_done: bool,
    pub feedback: Option<&'a Feedback>,
    pub theme: &'a Theme,
}

impl Widget for HubView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(self.menu.items.len() as u16 * 3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "studyguard",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Finish both modules to unlock this session",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.menu
                    .items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[1]);

        for (i, item) in self.menu.items.iter().enumerate() {
            let is_selected = i == self.menu.selected;
            let indicator = if is_selected { ">" } else { " " };
            let done = item
                .module
                .map(|m| match m {
                    StudyModule::Vocabulary => self.vocab_done,
                    StudyModule::Reading => self.reading_done,
                })
                .unwrap_or(false);
            let status = if item.module.is_none() {
                ""
            } else if done {
                "  [done]"
            } else {
                "  [locked]"
            };

            let label_text = format!(
                " {indicator} [{key}] {label}{status}",
                key = item.key,
                label = item.label
            );
            let desc_text = format!("     {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if done {
                            colors.success()
                        } else if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];
            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }

        let status_line = format!(
            "  Vocabulary: {}   Reading: {}",
            if self.vocab_done { "complete" } else { "not yet" },
            if self.reading_done { "complete" } else { "not yet" },
        );
        Paragraph::new(Line::from(Span::styled(
            status_line,
            Style::default().fg(colors.muted()),
        )))
        .render(layout[2], buf);

        if let Some((message, tone)) = self.feedback {
            Paragraph::new(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(tone.color(colors)),
            )))
            .render(layout[3], buf);
        }
    }
}

pub mod components;
pub mod layout;
pub mod line_input;
pub mod theme;

use ratatui::style::Color;

use crate::ui::theme::ThemeColors;

/// Severity of an inline feedback message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

impl Tone {
    pub fn color(self, colors: &ThemeColors) -> Color {
        match self {
            Tone::Info => colors.fg(),
            Tone::Success => colors.success(),
            Tone::Warning => colors.warning(),
            Tone::Error => colors.error(),
        }
    }
}

/// An inline message plus its severity, as held by the view state.
pub type Feedback = (String, Tone);

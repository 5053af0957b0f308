mod app;
mod config;
mod coordinator;
mod error;
mod event;
mod guard;
mod reading;
mod remote;
mod session;
mod store;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen, Dialog};
use config::Config;
use event::{AppEvent, EventHandler};
use session::scheduler::Phase;
use store::vocab::VocabRepository;
use ui::Tone;
use ui::components::dialog::DialogView;
use ui::components::drill_view::DrillView;
use ui::components::menu::HubView;
use ui::components::reading_view::ReadingView;
use ui::components::vocab_manager::{ManagerField, VocabManagerView};
use ui::layout::AppLayout;
use ui::line_input::InputResult;

#[derive(Parser)]
#[command(
    name = "studyguard",
    version,
    about = "Terminal study trainer that locks the session until drills are done"
)]
struct Cli {
    #[arg(short, long, help = "Vocabulary JSON file")]
    vocab: Option<PathBuf>,

    #[arg(short, long, help = "Reading test descriptor JSON")]
    reading: Option<PathBuf>,

    #[arg(short, long, help = "Correct answers required to unlock the drill")]
    target: Option<u32>,

    #[arg(long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load().unwrap_or_default();
    if let Some(target) = cli.target {
        config.target_correct = target;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    let vocab_path = cli
        .vocab
        .or_else(|| {
            (!config.vocab_file.is_empty()).then(|| PathBuf::from(&config.vocab_file))
        })
        .unwrap_or_else(VocabRepository::default_path);
    let repo = VocabRepository::open(vocab_path)?;

    let reading_path = cli.reading.or_else(|| {
        (!config.reading_file.is_empty()).then(|| PathBuf::from(&config.reading_file))
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, repo, reading_path, events.sender());

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Logs go to a file under the data dir; the alternate screen stays clean.
fn init_tracing() {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyguard");
    if fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = fs::File::create(log_dir.join("studyguard.log")) else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
            AppEvent::FocusGained => app.coordinator.guard.on_focus_gained(),
            AppEvent::FocusLost => app.coordinator.guard.on_focus_lost(),
            AppEvent::SentenceVerdict(result) => app.on_sentence_verdict(result),
            AppEvent::HostCompleted => app.on_all_complete(),
            AppEvent::HostSwitch(module) => app.switch_to(module),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Modal overlays swallow everything else first.
    if app.dialog.is_some() {
        handle_dialog_key(app, key);
        return;
    }

    // Close and escape chords pass through the suppression layer on every
    // screen: quitting is gated, the override is always reachable.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.request_quit();
                return;
            }
            KeyCode::Char('e') => {
                app.request_emergency();
                return;
            }
            _ => {}
        }
    }

    match app.screen {
        AppScreen::Hub => handle_hub_key(app, key),
        AppScreen::Drill => handle_drill_key(app, key),
        AppScreen::Reading => handle_reading_key(app, key),
        AppScreen::VocabManager => handle_manager_key(app, key),
    }
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match app.dialog.clone() {
        Some(Dialog::EmergencyConfirm) => match key.code {
            KeyCode::Char('y') => {
                app.dismiss_dialog();
                app.emergency_confirmed();
            }
            KeyCode::Char('n') | KeyCode::Esc => app.dismiss_dialog(),
            _ => {}
        },
        Some(Dialog::ConfirmDelete { index }) => match key.code {
            KeyCode::Char('y') => {
                app.dismiss_dialog();
                app.manager_delete_confirmed(index);
            }
            KeyCode::Char('n') | KeyCode::Esc => app.dismiss_dialog(),
            _ => {}
        },
        Some(Dialog::Notice { .. }) => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => app.dismiss_dialog(),
            _ => {}
        },
        None => {}
    }
}

fn handle_hub_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Char('1') => app.enter_vocab_module(),
        KeyCode::Char('2') => app.enter_reading_module(),
        KeyCode::Char('m') => app.open_manager(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.enter_vocab_module(),
            1 => app.enter_reading_module(),
            2 => app.open_manager(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => {
                app.request_switch_module();
                return;
            }
            KeyCode::Char('o') => {
                app.open_manager();
                return;
            }
            _ => {}
        }
    }

    let Some(drill) = app.drill.as_mut() else {
        return;
    };
    if drill.scheduler.is_complete() {
        return;
    }
    let in_remediation = matches!(drill.scheduler.phase(), Phase::Remediation { .. });
    let input = if in_remediation {
        &mut drill.sentence
    } else {
        &mut drill.answer
    };
    match input.handle(key) {
        InputResult::Submit => {
            if in_remediation {
                app.submit_sentence();
            } else {
                app.submit_answer();
            }
        }
        InputResult::Cancel => {
            drill.feedback = Some((
                "This drill is locked. [Ctrl+S] switch module, [Ctrl+E] emergency exit."
                    .to_string(),
                Tone::Warning,
            ));
        }
        InputResult::Continue => {}
    }
}

fn handle_reading_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        app.request_switch_module();
        return;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.reading_select(-1),
        KeyCode::Down | KeyCode::Char('j') => app.reading_select(1),
        KeyCode::Left | KeyCode::Char('h') => app.reading_cycle(false),
        KeyCode::Right | KeyCode::Char('l') => app.reading_cycle(true),
        KeyCode::Char(' ') | KeyCode::Backspace | KeyCode::Delete => app.reading_clear_answer(),
        KeyCode::PageUp | KeyCode::Char('u') => app.reading_scroll(-3),
        KeyCode::PageDown | KeyCode::Char('d') => app.reading_scroll(3),
        KeyCode::Enter | KeyCode::Char('g') => app.grade_reading(),
        KeyCode::Esc => {
            if let Some(reading) = app.reading.as_mut() {
                reading.feedback = Some((
                    "This module is locked. [Ctrl+S] switch module, [Ctrl+E] emergency exit."
                        .to_string(),
                    Tone::Warning,
                ));
            }
        }
        _ => {}
    }
}

fn handle_manager_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('d') => {
                app.manager_request_delete();
                return;
            }
            KeyCode::Char('x') => {
                app.manager_new_entry();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => {
            app.close_manager();
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.manager.field = match app.manager.field {
                ManagerField::Term => ManagerField::Translation,
                ManagerField::Translation => ManagerField::Term,
            };
            return;
        }
        KeyCode::Up => {
            app.manager_select(-1);
            return;
        }
        KeyCode::Down => {
            app.manager_select(1);
            return;
        }
        _ => {}
    }

    if app.manager.focused_input().handle(key) == InputResult::Submit {
        app.manager_apply();
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);

    let lock_state = if app.coordinator.is_complete() {
        ("unlocked", colors.success())
    } else {
        ("locked", colors.warning())
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " studyguard ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(ratatui::style::Modifier::BOLD),
        ),
        Span::styled(
            format!(" session {} ", lock_state.0),
            Style::default().fg(lock_state.1).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    match app.screen {
        AppScreen::Hub => {
            frame.render_widget(
                HubView {
                    menu: &app.menu,
                    vocab_done: app
                        .coordinator
                        .is_module_done(coordinator::StudyModule::Vocabulary),
                    reading_done: app
                        .coordinator
                        .is_module_done(coordinator::StudyModule::Reading),
                    feedback: app.hub_feedback.as_ref(),
                    theme: app.theme,
                },
                layout.main,
            );
        }
        AppScreen::Drill => {
            if let Some(ref drill) = app.drill {
                frame.render_widget(
                    DrillView {
                        scheduler: &drill.scheduler,
                        repo: &app.repo,
                        answer: &drill.answer,
                        sentence: &drill.sentence,
                        feedback: drill.feedback.as_ref(),
                        judge_feedback: drill.judge_feedback.as_ref(),
                        judging: drill.judging,
                        theme: app.theme,
                    },
                    layout.main,
                );
            }
        }
        AppScreen::Reading => {
            if let Some(ref reading) = app.reading {
                frame.render_widget(
                    ReadingView {
                        test: &reading.test,
                        slots: &reading.slots,
                        responses: &reading.responses,
                        selected: reading.selected,
                        scroll: reading.scroll,
                        last_grade: reading.last_grade,
                        feedback: reading.feedback.as_ref(),
                        tier: layout.tier,
                        theme: app.theme,
                    },
                    layout.main,
                );
            }
        }
        AppScreen::VocabManager => {
            frame.render_widget(
                VocabManagerView {
                    repo: &app.repo,
                    selected: app.manager.selected,
                    term: &app.manager.term,
                    translation: &app.manager.translation,
                    field: app.manager.field,
                    feedback: app.manager.feedback.as_ref(),
                    theme: app.theme,
                },
                layout.main,
            );
        }
    }

    let hint = match app.screen {
        AppScreen::Hub => " [1/2] Start module  [m] Manage words  [q] Quit  [Ctrl+E] Emergency ",
        AppScreen::Drill => {
            " [Enter] Submit  [Ctrl+O] Manage words  [Ctrl+S] Switch  [Ctrl+E] Emergency "
        }
        AppScreen::Reading => {
            " [j/k] Question  [h/l] Answer  [g] Grade  [Ctrl+S] Switch  [Ctrl+E] Emergency "
        }
        AppScreen::VocabManager => " [Enter] Save  [Ctrl+D] Delete  [Esc] Back ",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout.footer);

    if let Some(ref dialog) = app.dialog {
        let (title, body, confirm, danger) = match dialog {
            Dialog::EmergencyConfirm => (
                "Emergency exit".to_string(),
                "The emergency exit should only be used when something is broken.\nAre you sure you want to leave?"
                    .to_string(),
                true,
                true,
            ),
            Dialog::ConfirmDelete { index } => {
                let entry = app
                    .repo
                    .get(*index)
                    .map(|item| format!("{} — {}", item.term, item.translation))
                    .unwrap_or_default();
                (
                    "Delete word".to_string(),
                    format!("Really delete:\n{entry} ?"),
                    true,
                    true,
                )
            }
            Dialog::Notice { title, body, .. } => (title.clone(), body.clone(), false, false),
        };
        frame.render_widget(
            DialogView {
                title: &title,
                body: &body,
                confirm,
                danger,
                theme: app.theme,
            },
            area,
        );
    }
}

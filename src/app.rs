use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use crate::config::Config;
use crate::coordinator::{SessionCoordinator, StudyModule};
use crate::error::SessionError;
use crate::event::AppEvent;
use crate::guard::{CloseDecision, FocusGuard, TermControl};
use crate::reading::grader::{self, GradeSummary};
use crate::reading::{self, ComprehensionTest, QuestionSlot};
use crate::remote::{self, SentenceReview};
use crate::session::scheduler::{DrillScheduler, Phase, Submission};
use crate::store::vocab::VocabRepository;
use crate::ui::components::menu::HubMenu;
use crate::ui::components::vocab_manager::ManagerField;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;
use crate::ui::{Feedback, Tone};

/// The single active view. Switched atomically; there is never more than one
/// screen's worth of interactive state on display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Hub,
    Drill,
    Reading,
    VocabManager,
}

/// Modal overlay riding on top of whatever screen is active.
#[derive(Clone, Debug)]
pub enum Dialog {
    EmergencyConfirm,
    ConfirmDelete { index: usize },
    Notice {
        title: String,
        body: String,
        then: AfterNotice,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterNotice {
    Stay,
    GoHub,
    Quit,
}

/// Vocabulary-drill view state around the scheduler.
pub struct DrillUi {
    pub scheduler: DrillScheduler,
    pub answer: LineInput,
    pub sentence: LineInput,
    pub feedback: Option<Feedback>,
    pub judge_feedback: Option<Feedback>,
    pub judging: bool,
    advance_at: Option<Instant>,
}

/// Reading-module view state around the loaded test.
pub struct ReadingUi {
    pub test: ComprehensionTest,
    pub slots: Vec<QuestionSlot>,
    pub responses: Vec<Option<String>>,
    pub selected: usize,
    pub scroll: u16,
    pub last_grade: Option<GradeSummary>,
    pub feedback: Option<Feedback>,
}

/// Vocabulary-manager view state.
pub struct ManagerUi {
    pub selected: Option<usize>,
    pub term: LineInput,
    pub translation: LineInput,
    pub field: ManagerField,
    pub feedback: Option<Feedback>,
}

impl ManagerUi {
    fn new() -> Self {
        Self {
            selected: None,
            term: LineInput::new(""),
            translation: LineInput::new(""),
            field: ManagerField::Term,
            feedback: None,
        }
    }

    pub fn focused_input(&mut self) -> &mut LineInput {
        match self.field {
            ManagerField::Term => &mut self.term,
            ManagerField::Translation => &mut self.translation,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub dialog: Option<Dialog>,
    pub menu: HubMenu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub repo: VocabRepository,
    pub coordinator: SessionCoordinator,
    pub drill: Option<DrillUi>,
    pub reading: Option<ReadingUi>,
    pub manager: ManagerUi,
    pub hub_feedback: Option<Feedback>,
    pub should_quit: bool,
    reading_path: Option<PathBuf>,
    manager_return: AppScreen,
    events_tx: Sender<AppEvent>,
    rng: SmallRng,
}

impl App {
    pub fn new(
        config: Config,
        repo: VocabRepository,
        reading_path: Option<PathBuf>,
        events_tx: Sender<AppEvent>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = HubMenu::new(theme);

        let completed_tx = events_tx.clone();
        let switch_tx = events_tx.clone();
        let coordinator = SessionCoordinator::new(
            FocusGuard::new(Box::new(TermControl)),
            Box::new(move || {
                let _ = completed_tx.send(AppEvent::HostCompleted);
            }),
            Box::new(move |module| {
                let _ = switch_tx.send(AppEvent::HostSwitch(module));
            }),
        );

        Self {
            screen: AppScreen::Hub,
            dialog: None,
            menu,
            theme,
            config,
            repo,
            coordinator,
            drill: None,
            reading: None,
            manager: ManagerUi::new(),
            hub_feedback: None,
            should_quit: false,
            reading_path,
            manager_return: AppScreen::Hub,
            events_tx,
            rng: SmallRng::from_entropy(),
        }
    }

    // ---- screens & dialogs -------------------------------------------------

    /// All screen changes funnel through here so the vocabulary manager's
    /// guard interruption is always paired, however the view is left.
    fn set_screen(&mut self, next: AppScreen) {
        if self.screen == AppScreen::VocabManager && next != AppScreen::VocabManager {
            self.coordinator.guard.end_interruption();
        }
        if next == AppScreen::VocabManager && self.screen != AppScreen::VocabManager {
            self.coordinator.guard.begin_interruption();
        }
        self.screen = next;
    }

    /// All dialogs funnel through here for the same pairing guarantee.
    pub fn show_dialog(&mut self, dialog: Dialog) {
        if self.dialog.is_none() {
            self.coordinator.guard.begin_interruption();
        }
        self.dialog = Some(dialog);
    }

    pub fn dismiss_dialog(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        self.coordinator.guard.end_interruption();
        if let Dialog::Notice { then, .. } = dialog {
            match then {
                AfterNotice::Stay => {}
                AfterNotice::GoHub => self.go_to_hub(),
                AfterNotice::Quit => self.should_quit = true,
            }
        }
    }

    fn notice(&mut self, title: &str, body: String, then: AfterNotice) {
        self.show_dialog(Dialog::Notice {
            title: title.to_string(),
            body,
            then,
        });
    }

    pub fn go_to_hub(&mut self) {
        self.set_screen(AppScreen::Hub);
    }

    // ---- vocabulary module -------------------------------------------------

    pub fn enter_vocab_module(&mut self) {
        self.hub_feedback = None;
        match DrillScheduler::start(&self.repo, self.config.target_correct, &mut self.rng) {
            Ok(mut scheduler) => {
                scheduler.next(&mut self.rng);
                self.drill = Some(DrillUi {
                    scheduler,
                    answer: LineInput::new(""),
                    sentence: LineInput::new(""),
                    feedback: None,
                    judge_feedback: None,
                    judging: false,
                    advance_at: None,
                });
                self.set_screen(AppScreen::Drill);
            }
            Err(e) => {
                info!(error = %e, "vocabulary module refused to start");
                self.notice(
                    "Cannot start vocabulary drill",
                    format!("{e}.\nAdd word pairs from the hub with [m] first."),
                    AfterNotice::Stay,
                );
            }
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        if drill.advance_at.is_some() {
            return; // verdict still on display
        }
        let verdict = drill.scheduler.submit(drill.answer.value(), &self.repo);
        match verdict {
            Submission::NoAnswer => {
                let e = SessionError::Validation("You didn't enter anything.".to_string());
                drill.feedback = Some((e.to_string(), Tone::Warning));
            }
            Submission::Correct { complete } => {
                drill.answer.clear();
                let n = drill.scheduler.correct_count();
                let target = drill.scheduler.target_correct();
                if complete {
                    drill.feedback = Some((
                        format!("Correct! {n} / {target} — module unlocked."),
                        Tone::Success,
                    ));
                    self.vocab_module_completed();
                } else {
                    drill.feedback = Some((
                        format!("Correct! {n} / {target}. Next question coming up…"),
                        Tone::Success,
                    ));
                    drill.advance_at =
                        Some(Instant::now() + Duration::from_millis(self.config.reveal_delay_ms));
                }
            }
            Submission::Incorrect { expected } => {
                drill.feedback = Some((
                    format!("Wrong. The answer was: {expected}"),
                    Tone::Error,
                ));
                drill.sentence.clear();
                drill.judge_feedback = None;
            }
            Submission::NotAsking => {}
        }
    }

    fn vocab_module_completed(&mut self) {
        info!("vocabulary module completed");
        self.coordinator.mark_module_complete(StudyModule::Vocabulary);
        self.notice(
            "Vocabulary complete",
            "You answered enough terms correctly.\nThis module is unlocked.".to_string(),
            AfterNotice::GoHub,
        );
    }

    pub fn submit_sentence(&mut self) {
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        if drill.judging {
            return;
        }
        let Phase::Remediation { index } = drill.scheduler.phase() else {
            return;
        };
        let sentence = drill.sentence.value().trim().to_string();
        if sentence.is_empty() {
            drill.judge_feedback = Some((
                "Write a sentence first.".to_string(),
                Tone::Warning,
            ));
            return;
        }
        let term = match self.repo.get(index) {
            Some(item) => item.term.clone(),
            None => return,
        };

        #[cfg(feature = "network")]
        if !self.config.grader_url.is_empty() {
            drill.judging = true;
            drill.judge_feedback = None;
            // Paired in on_sentence_verdict; the worker always reports back.
            self.coordinator.guard.begin_interruption();
            remote::spawn_review(
                self.config.grader_url.clone(),
                term,
                sentence,
                self.events_tx.clone(),
            );
            return;
        }

        let review = remote::local_review(&term, &sentence);
        self.apply_review(review);
    }

    pub fn on_sentence_verdict(&mut self, result: Result<SentenceReview, String>) {
        self.coordinator.guard.end_interruption();
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        drill.judging = false;
        match result {
            Ok(review) => self.apply_review(review),
            Err(message) => {
                let e = SessionError::RemoteCall(message);
                let hint = if e.is_retryable() {
                    " Press Enter to resubmit."
                } else {
                    ""
                };
                if let Some(drill) = self.drill.as_mut() {
                    drill.judge_feedback = Some((format!("{e}{hint}"), Tone::Error));
                }
            }
        }
    }

    fn apply_review(&mut self, review: SentenceReview) {
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        if review.is_correct_usage {
            drill.sentence.clear();
            drill.judge_feedback = None;
            drill.feedback = None;
            drill.scheduler.resolve_remediation(true, &mut self.rng);
        } else {
            let mut message = review.feedback;
            if !review.suggested_sentence.is_empty() {
                message = format!("{message} Suggestion: {}", review.suggested_sentence);
            }
            drill.judge_feedback = Some((message, Tone::Error));
        }
    }

    // ---- reading module ----------------------------------------------------

    pub fn enter_reading_module(&mut self) {
        self.hub_feedback = None;
        if self.reading.is_none() {
            let loaded = match &self.reading_path {
                Some(path) => ComprehensionTest::load(path),
                None => ComprehensionTest::load_bundled(),
            };
            match loaded {
                Ok(test) => {
                    let slots = reading::question_slots(&test);
                    let responses = vec![None; slots.len()];
                    self.reading = Some(ReadingUi {
                        test,
                        slots,
                        responses,
                        selected: 0,
                        scroll: 0,
                        last_grade: None,
                        feedback: None,
                    });
                }
                Err(e) => {
                    info!(error = %e, "reading module refused to start");
                    self.notice("Cannot start reading practice", e.to_string(), AfterNotice::Stay);
                    return;
                }
            }
        }
        self.set_screen(AppScreen::Reading);
    }

    /// Cycle the selected question's answer through its option keys.
    pub fn reading_cycle(&mut self, forward: bool) {
        let Some(reading) = self.reading.as_mut() else {
            return;
        };
        let Some(slot) = reading.slots.get(reading.selected) else {
            return;
        };
        if slot.options.is_empty() {
            return;
        }
        let current = reading.responses[reading.selected].as_deref();
        let position = current.and_then(|c| slot.options.iter().position(|o| o == c));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => slot.options.len() - 1,
            (Some(p), true) => (p + 1) % slot.options.len(),
            (Some(p), false) => (p + slot.options.len() - 1) % slot.options.len(),
        };
        reading.responses[reading.selected] = Some(slot.options[next].clone());
        reading.feedback = None;
    }

    pub fn reading_clear_answer(&mut self) {
        if let Some(reading) = self.reading.as_mut() {
            if let Some(response) = reading.responses.get_mut(reading.selected) {
                *response = None;
            }
        }
    }

    pub fn reading_select(&mut self, delta: isize) {
        if let Some(reading) = self.reading.as_mut() {
            let len = reading.slots.len();
            if len == 0 {
                return;
            }
            let current = reading.selected as isize;
            reading.selected = (current + delta).clamp(0, len as isize - 1) as usize;
        }
    }

    pub fn reading_scroll(&mut self, delta: i16) {
        if let Some(reading) = self.reading.as_mut() {
            reading.scroll = reading.scroll.saturating_add_signed(delta);
        }
    }

    pub fn grade_reading(&mut self) {
        let Some(reading) = self.reading.as_mut() else {
            return;
        };
        let summary = grader::grade(&reading.test, &reading.responses);
        reading.last_grade = Some(summary);
        if summary.is_passing() {
            info!("reading module completed");
            self.coordinator.mark_module_complete(StudyModule::Reading);
            self.notice(
                "Reading complete",
                "Every question answered correctly.\nThis module is unlocked.".to_string(),
                AfterNotice::GoHub,
            );
        } else if summary.unanswered > 0 {
            reading.feedback = Some((
                format!("{} question(s) still unanswered.", summary.unanswered),
                Tone::Warning,
            ));
        } else {
            reading.feedback = Some((
                "Not all answers are right yet. Re-read the passage and adjust.".to_string(),
                Tone::Error,
            ));
        }
    }

    // ---- vocabulary manager ------------------------------------------------

    pub fn open_manager(&mut self) {
        self.manager = ManagerUi::new();
        self.manager_return = self.screen;
        self.set_screen(AppScreen::VocabManager);
    }

    pub fn close_manager(&mut self) {
        let return_to = self.manager_return;
        if return_to == AppScreen::Drill {
            if self.repo.is_empty() {
                self.drill = None;
                self.set_screen(AppScreen::Hub);
                self.notice(
                    "No vocabulary left",
                    "The drill cannot continue without word pairs.".to_string(),
                    AfterNotice::Stay,
                );
                return;
            }
            self.set_screen(AppScreen::Drill);
            if let Some(drill) = self.drill.as_mut() {
                if drill.scheduler.phase() == Phase::Idle {
                    drill.scheduler.next(&mut self.rng);
                    drill.answer.clear();
                    drill.feedback = None;
                }
            }
        } else {
            self.set_screen(AppScreen::Hub);
        }
    }

    pub fn manager_select(&mut self, delta: isize) {
        if self.repo.is_empty() {
            return;
        }
        let len = self.repo.len() as isize;
        let next = match self.manager.selected {
            None => {
                if delta >= 0 {
                    0
                } else {
                    len - 1
                }
            }
            Some(current) => (current as isize + delta).clamp(0, len - 1),
        } as usize;
        self.manager.selected = Some(next);
        if let Some(item) = self.repo.get(next) {
            self.manager.term.set(&item.term);
            self.manager.translation.set(&item.translation);
        }
        self.manager.feedback = None;
    }

    pub fn manager_new_entry(&mut self) {
        self.manager.selected = None;
        self.manager.term.clear();
        self.manager.translation.clear();
        self.manager.field = ManagerField::Term;
        self.manager.feedback = None;
    }

    pub fn manager_apply(&mut self) {
        let term = self.manager.term.value().trim().to_string();
        let translation = self.manager.translation.value().trim().to_string();
        if term.is_empty() || translation.is_empty() {
            let e = SessionError::Validation(
                "Both the English and Vietnamese fields are required.".to_string(),
            );
            self.manager.feedback = Some((e.to_string(), Tone::Warning));
            return;
        }
        let result = match self.manager.selected {
            Some(index) => self.repo.update(index, &term, &translation),
            None => self.repo.add(&term, &translation),
        };
        match result {
            Ok(()) => {
                self.manager.feedback = Some(("Saved.".to_string(), Tone::Success));
                if self.manager.selected.is_none() {
                    self.manager_new_entry();
                    self.manager.feedback = Some(("Added.".to_string(), Tone::Success));
                }
                self.notify_vocab_changed();
            }
            Err(e) => {
                self.manager.feedback =
                    Some((format!("Could not save vocabulary: {e}"), Tone::Error));
            }
        }
    }

    pub fn manager_request_delete(&mut self) {
        let Some(index) = self.manager.selected else {
            self.manager.feedback = Some((
                "Pick an entry on the left first.".to_string(),
                Tone::Warning,
            ));
            return;
        };
        if self.repo.len() <= 1 {
            self.manager.feedback = Some((
                "Cannot delete the last remaining word.".to_string(),
                Tone::Warning,
            ));
            return;
        }
        self.show_dialog(Dialog::ConfirmDelete { index });
    }

    pub fn manager_delete_confirmed(&mut self, index: usize) {
        match self.repo.delete(index) {
            Ok(()) => {
                self.manager_new_entry();
                self.manager.feedback = Some(("Deleted.".to_string(), Tone::Success));
                self.notify_vocab_changed();
            }
            Err(e) => {
                self.manager.feedback =
                    Some((format!("Could not delete: {e}"), Tone::Error));
            }
        }
    }

    /// Structural vocabulary changes invalidate the scheduler's held indices.
    fn notify_vocab_changed(&mut self) {
        if let Some(drill) = self.drill.as_mut() {
            drill.scheduler.on_vocabulary_changed(self.repo.len());
            if drill.scheduler.phase() == Phase::Idle {
                drill.advance_at = None;
                drill.feedback = None;
            }
        }
    }

    // ---- session exit paths ------------------------------------------------

    pub fn request_quit(&mut self) {
        match self.coordinator.request_close() {
            CloseDecision::Allowed => self.should_quit = true,
            CloseDecision::Suppressed => {
                let message =
                    "Locked: finish both modules first, or press Ctrl+E for the emergency exit.";
                let feedback = Some((message.to_string(), Tone::Warning));
                match self.screen {
                    AppScreen::Hub => self.hub_feedback = feedback,
                    AppScreen::Drill => {
                        if let Some(drill) = self.drill.as_mut() {
                            drill.feedback = feedback;
                        }
                    }
                    AppScreen::Reading => {
                        if let Some(reading) = self.reading.as_mut() {
                            reading.feedback = feedback;
                        }
                    }
                    AppScreen::VocabManager => self.manager.feedback = feedback,
                }
            }
        }
    }

    pub fn request_emergency(&mut self) {
        self.show_dialog(Dialog::EmergencyConfirm);
    }

    /// The sanctioned escape valve. From the hub it abandons the whole
    /// session; from inside a module it tears down just that module.
    pub fn emergency_confirmed(&mut self) {
        info!(screen = ?self.screen, "emergency override confirmed");
        match self.screen {
            AppScreen::Hub => {
                self.coordinator.emergency_release();
                self.should_quit = true;
            }
            AppScreen::Drill | AppScreen::VocabManager => {
                self.drill = None;
                self.set_screen(AppScreen::Hub);
                self.hub_feedback = Some((
                    "Vocabulary drill abandoned via emergency exit.".to_string(),
                    Tone::Warning,
                ));
            }
            AppScreen::Reading => {
                self.reading = None;
                self.set_screen(AppScreen::Hub);
                self.hub_feedback = Some((
                    "Reading practice abandoned via emergency exit.".to_string(),
                    Tone::Warning,
                ));
            }
        }
    }

    pub fn request_switch_module(&mut self) {
        let target = match self.screen {
            AppScreen::Drill | AppScreen::VocabManager => StudyModule::Reading,
            AppScreen::Reading => StudyModule::Vocabulary,
            AppScreen::Hub => return,
        };
        self.coordinator.request_switch(target);
    }

    /// Host-side switch handling: tear down the current module view, then
    /// enter the requested one.
    pub fn switch_to(&mut self, module: StudyModule) {
        match self.screen {
            AppScreen::Drill | AppScreen::VocabManager => self.drill = None,
            AppScreen::Reading => self.reading = None,
            AppScreen::Hub => {}
        }
        self.set_screen(AppScreen::Hub);
        match module {
            StudyModule::Vocabulary => self.enter_vocab_module(),
            StudyModule::Reading => self.enter_reading_module(),
        }
    }

    pub fn on_all_complete(&mut self) {
        self.notice(
            "All done",
            "You finished both the vocabulary drill and the reading practice.\nThe session is unlocked and will now close.".to_string(),
            AfterNotice::Quit,
        );
    }

    // ---- clock -------------------------------------------------------------

    /// Deferred work driven from the event loop's tick: focus re-assertion
    /// and the post-verdict advance to the next question.
    pub fn on_tick(&mut self, now: Instant) {
        self.coordinator.guard.poll(now);
        if let Some(drill) = self.drill.as_mut() {
            if let Some(at) = drill.advance_at {
                if now >= at {
                    drill.advance_at = None;
                    drill.feedback = None;
                    drill.scheduler.next(&mut self.rng);
                }
            }
        }
    }
}

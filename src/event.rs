use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::coordinator::StudyModule;
use crate::remote::SentenceReview;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    FocusGained,
    FocusLost,
    /// Completion of a background sentence-grading call; `Err` carries the
    /// user-displayable failure message.
    SentenceVerdict(Result<SentenceReview, String>),
    /// The coordinator's completion callback fired: both modules done.
    HostCompleted,
    /// The coordinator relayed a request to move to a sibling module.
    HostSwitch(StudyModule),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if input_tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if input_tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::FocusGained) => {
                            if input_tx.send(AppEvent::FocusGained).is_err() {
                                return;
                            }
                        }
                        Ok(Event::FocusLost) => {
                            if input_tx.send(AppEvent::FocusLost).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }

    /// A sender for background work (the remote grading thread) to post its
    /// completion back onto the event loop.
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }
}

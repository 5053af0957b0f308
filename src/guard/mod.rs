use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::SessionError;

/// Re-assertion happens a beat after focus loss rather than immediately, so
/// the guard never fights a modal that is about to take over.
const REFOCUS_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
    /// Window is forced frontmost on focus loss; close requests suppressed.
    Locked,
    /// A legitimate modal interaction is in progress; the guard stands down
    /// until every interruption ends.
    TemporarilyUnlocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseDecision {
    Suppressed,
    Allowed,
}

/// The platform seam. Every operation is best-effort: failures are reported
/// as `FocusOperationError` and the guard swallows and logs them, so the
/// session survives on terminals that ignore these controls entirely.
pub trait WindowControl {
    fn assert_foreground(&mut self) -> Result<(), SessionError>;
    fn suppress_close(&mut self) -> Result<(), SessionError>;
    fn allow_close(&mut self) -> Result<(), SessionError>;
}

/// Escape prevention for the locked session.
///
/// Owns the `Locked`/`TemporarilyUnlocked` state, schedules delayed focus
/// re-assertion, and gates close requests on the caller-supplied completion
/// verdict. Interruptions nest; the lock is restored only when the last one
/// ends.
pub struct FocusGuard {
    control: Box<dyn WindowControl>,
    state: FocusState,
    interruptions: usize,
    refocus_at: Option<Instant>,
}

impl FocusGuard {
    pub fn new(mut control: Box<dyn WindowControl>) -> Self {
        quiet(control.suppress_close(), "suppress_close");
        Self {
            control,
            state: FocusState::Locked,
            interruptions: 0,
            refocus_at: None,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    /// The window lost focus. While locked, schedule a re-assertion shortly;
    /// while temporarily unlocked, let the modal have it.
    pub fn on_focus_lost(&mut self) {
        if self.state == FocusState::Locked {
            self.refocus_at = Some(Instant::now() + REFOCUS_DELAY);
        }
    }

    pub fn on_focus_gained(&mut self) {
        self.refocus_at = None;
    }

    /// Drive pending deadlines. Called from the event loop on every tick.
    pub fn poll(&mut self, now: Instant) {
        if self.state != FocusState::Locked {
            self.refocus_at = None;
            return;
        }
        if let Some(at) = self.refocus_at {
            if now >= at {
                self.refocus_at = None;
                quiet(self.control.assert_foreground(), "assert_foreground");
            }
        }
    }

    /// Enter a legitimate modal interaction. Must be paired with
    /// `end_interruption` on every exit path; prefer [`FocusGuard::interruption`]
    /// where the interaction fits one scope.
    pub fn begin_interruption(&mut self) {
        self.interruptions += 1;
        if self.interruptions == 1 {
            self.state = FocusState::TemporarilyUnlocked;
            self.refocus_at = None;
        }
    }

    pub fn end_interruption(&mut self) {
        self.interruptions = self.interruptions.saturating_sub(1);
        if self.interruptions == 0 {
            self.state = FocusState::Locked;
            quiet(self.control.suppress_close(), "suppress_close");
        }
    }

    /// Scoped interruption: relocks when the returned guard drops, on every
    /// exit path including unwinding. For modals that span multiple event-loop
    /// turns, use the begin/end pair through a single choke point instead.
    #[allow(dead_code)] // Used by library consumers and tests
    pub fn interruption(&mut self) -> InterruptionScope<'_> {
        self.begin_interruption();
        InterruptionScope { guard: self }
    }

    /// A close request arrived. Allowed only once the session-completion
    /// predicate (owned by the coordinator) holds.
    pub fn request_close(&mut self, session_complete: bool) -> CloseDecision {
        if session_complete {
            quiet(self.control.allow_close(), "allow_close");
            CloseDecision::Allowed
        } else {
            CloseDecision::Suppressed
        }
    }

    /// Unconditional teardown for the emergency override: stop guarding and
    /// let the window go, regardless of completion or current state.
    pub fn release(&mut self) {
        self.interruptions = 0;
        self.state = FocusState::TemporarilyUnlocked;
        self.refocus_at = None;
        quiet(self.control.allow_close(), "allow_close");
    }
}

pub struct InterruptionScope<'a> {
    guard: &'a mut FocusGuard,
}

impl Drop for InterruptionScope<'_> {
    fn drop(&mut self) {
        self.guard.end_interruption();
    }
}

fn quiet(result: Result<(), SessionError>, operation: &str) {
    if let Err(e) = result {
        warn!(operation, error = %e, "focus operation failed");
    }
}

/// Terminal-backed control. Raising uses the xterm de-iconify and raise
/// reports; terminals that do not implement them ignore the bytes. The
/// terminal offers no hook to veto its own close, so close suppression is
/// enforced at the key-event layer and these calls only need to not fail.
pub struct TermControl;

impl WindowControl for TermControl {
    fn assert_foreground(&mut self) -> Result<(), SessionError> {
        let mut out = io::stdout();
        out.write_all(b"\x1b[1t\x1b[5t")
            .and_then(|_| out.flush())
            .map_err(|e| SessionError::FocusOperation(e.to_string()))
    }

    fn suppress_close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn allow_close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

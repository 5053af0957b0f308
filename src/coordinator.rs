use crate::guard::{CloseDecision, FocusGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyModule {
    Vocabulary,
    Reading,
}

impl StudyModule {
    pub fn label(self) -> &'static str {
        match self {
            StudyModule::Vocabulary => "Vocabulary",
            StudyModule::Reading => "Reading",
        }
    }

    pub fn sibling(self) -> Self {
        match self {
            StudyModule::Vocabulary => StudyModule::Reading,
            StudyModule::Reading => StudyModule::Vocabulary,
        }
    }
}

/// Composes the module results with the focus guard and mediates the host
/// contract: `on_completed` fires exactly once, when both modules first
/// report done; `on_request_switch` forwards the learner's wish to move to a
/// sibling module. Exit decisions stay with the host.
pub struct SessionCoordinator {
    pub guard: FocusGuard,
    vocab_done: bool,
    reading_done: bool,
    completed_emitted: bool,
    on_completed: Box<dyn FnMut()>,
    on_request_switch: Box<dyn FnMut(StudyModule)>,
}

impl SessionCoordinator {
    pub fn new(
        guard: FocusGuard,
        on_completed: Box<dyn FnMut()>,
        on_request_switch: Box<dyn FnMut(StudyModule)>,
    ) -> Self {
        Self {
            guard,
            vocab_done: false,
            reading_done: false,
            completed_emitted: false,
            on_completed,
            on_request_switch,
        }
    }

    pub fn is_module_done(&self, module: StudyModule) -> bool {
        match module {
            StudyModule::Vocabulary => self.vocab_done,
            StudyModule::Reading => self.reading_done,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.vocab_done && self.reading_done
    }

    pub fn mark_module_complete(&mut self, module: StudyModule) {
        match module {
            StudyModule::Vocabulary => self.vocab_done = true,
            StudyModule::Reading => self.reading_done = true,
        }
        if self.is_complete() && !self.completed_emitted {
            self.completed_emitted = true;
            (self.on_completed)();
        }
    }

    /// Close permission, gated on the completion predicate.
    pub fn request_close(&mut self) -> CloseDecision {
        let complete = self.is_complete();
        self.guard.request_close(complete)
    }

    pub fn request_switch(&mut self, target: StudyModule) {
        (self.on_request_switch)(target);
    }

    /// The emergency override's final step: stop guarding unconditionally.
    pub fn emergency_release(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::SessionError;
    use crate::guard::WindowControl;

    struct NullControl;
    impl WindowControl for NullControl {
        fn assert_foreground(&mut self) -> Result<(), SessionError> {
            Ok(())
        }
        fn suppress_close(&mut self) -> Result<(), SessionError> {
            Ok(())
        }
        fn allow_close(&mut self) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn coordinator() -> (SessionCoordinator, Rc<RefCell<u32>>, Rc<RefCell<Vec<StudyModule>>>) {
        let completed = Rc::new(RefCell::new(0));
        let switches = Rc::new(RefCell::new(Vec::new()));
        let completed_cb = Rc::clone(&completed);
        let switches_cb = Rc::clone(&switches);
        let coordinator = SessionCoordinator::new(
            FocusGuard::new(Box::new(NullControl)),
            Box::new(move || *completed_cb.borrow_mut() += 1),
            Box::new(move |m| switches_cb.borrow_mut().push(m)),
        );
        (coordinator, completed, switches)
    }

    #[test]
    fn completion_fires_once_when_both_modules_done() {
        let (mut c, completed, _) = coordinator();
        c.mark_module_complete(StudyModule::Vocabulary);
        assert_eq!(*completed.borrow(), 0);
        c.mark_module_complete(StudyModule::Reading);
        assert_eq!(*completed.borrow(), 1);

        // Re-marking never re-fires.
        c.mark_module_complete(StudyModule::Vocabulary);
        c.mark_module_complete(StudyModule::Reading);
        assert_eq!(*completed.borrow(), 1);
    }

    #[test]
    fn close_gated_on_both_modules() {
        let (mut c, _, _) = coordinator();
        assert_eq!(c.request_close(), CloseDecision::Suppressed);
        c.mark_module_complete(StudyModule::Vocabulary);
        assert_eq!(c.request_close(), CloseDecision::Suppressed);
        c.mark_module_complete(StudyModule::Reading);
        assert_eq!(c.request_close(), CloseDecision::Allowed);
    }

    #[test]
    fn switch_forwards_target() {
        let (mut c, _, switches) = coordinator();
        c.request_switch(StudyModule::Reading);
        c.request_switch(StudyModule::Vocabulary);
        assert_eq!(
            *switches.borrow(),
            vec![StudyModule::Reading, StudyModule::Vocabulary]
        );
    }

    #[test]
    fn sibling_pairs() {
        assert_eq!(StudyModule::Vocabulary.sibling(), StudyModule::Reading);
        assert_eq!(StudyModule::Reading.sibling(), StudyModule::Vocabulary);
    }
}

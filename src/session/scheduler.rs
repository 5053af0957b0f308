use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::SessionError;
use crate::session::normalize::normalize;
use crate::store::vocab::VocabRepository;

/// Drill progression as explicit states. The scheduler can never be asking a
/// new question while remediation is owed; that combination simply does not
/// exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No question drawn yet (fresh start, or after a vocabulary reset).
    Idle,
    /// A question is on screen awaiting an answer.
    Asking { index: usize },
    /// The answer was correct; the verdict is displayed until a deferred
    /// `next()` advances.
    Advancing { index: usize },
    /// The answer was wrong; a sentence-production task for this item must
    /// succeed before a new question may be drawn.
    Remediation { index: usize },
    /// Target reached. Terminal.
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Input normalized to nothing; state unchanged.
    NoAnswer,
    Correct { complete: bool },
    Incorrect { expected: String },
    /// No question is currently being asked; state unchanged.
    NotAsking,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextOutcome {
    /// A fresh question was drawn.
    Question { index: usize },
    /// Remediation is owed; nothing was drawn.
    RemediationPending { index: usize },
    /// The session already completed.
    Complete,
    /// The pool cannot be refilled (vocabulary emptied underneath us).
    Exhausted,
}

/// The graded-drill state machine.
///
/// One round draws every index from `pool`; indices missed during the round
/// collect in `missed` and become the next round's pool (a review round).
/// When nothing was missed, the next round reshuffles the full index range.
pub struct DrillScheduler {
    item_count: usize,
    target_correct: u32,
    correct_count: u32,
    pool: Vec<usize>,
    missed: Vec<usize>,
    last_index: Option<usize>,
    phase: Phase,
    round: u32,
    reviewing: bool,
}

impl DrillScheduler {
    pub fn start(repo: &VocabRepository, target_correct: u32, rng: &mut impl Rng) -> Result<Self, SessionError> {
        if repo.is_empty() {
            return Err(SessionError::Data(
                "no usable vocabulary entries were found".to_string(),
            ));
        }
        let mut pool: Vec<usize> = (0..repo.len()).collect();
        pool.shuffle(rng);
        Ok(Self {
            item_count: repo.len(),
            target_correct,
            correct_count: 0,
            pool,
            missed: Vec::new(),
            last_index: None,
            phase: Phase::Idle,
            round: 1,
            reviewing: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn target_correct(&self) -> u32 {
        self.target_correct
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_review_round(&self) -> bool {
        self.reviewing
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Asking { index } | Phase::Advancing { index } | Phase::Remediation { index } => {
                Some(index)
            }
            Phase::Idle | Phase::Complete => None,
        }
    }

    /// The translation to display for the current question.
    pub fn current_prompt<'a>(&self, repo: &'a VocabRepository) -> Option<&'a str> {
        self.current_index()
            .and_then(|i| repo.get(i))
            .map(|item| item.translation.as_str())
    }

    /// Draw the next question. A no-op while remediation is owed or after
    /// completion.
    pub fn next(&mut self, rng: &mut impl Rng) -> NextOutcome {
        match self.phase {
            Phase::Remediation { index } => return NextOutcome::RemediationPending { index },
            Phase::Complete => return NextOutcome::Complete,
            Phase::Idle | Phase::Asking { .. } | Phase::Advancing { .. } => {}
        }

        if self.pool.is_empty() {
            if !self.missed.is_empty() {
                // Review round: only the items missed this round come back.
                self.pool = std::mem::take(&mut self.missed);
                self.pool.shuffle(rng);
                self.reviewing = true;
            } else {
                if self.item_count == 0 {
                    return NextOutcome::Exhausted;
                }
                self.pool = (0..self.item_count).collect();
                self.pool.shuffle(rng);
                self.reviewing = false;
            }
            self.round += 1;
        }

        let pos = self.draw_position(rng);
        let index = self.pool.swap_remove(pos);
        self.last_index = Some(index);
        self.phase = Phase::Asking { index };
        NextOutcome::Question { index }
    }

    /// Pick a pool position, avoiding an immediate repeat of the previous
    /// index when at least two distinct candidates exist. Redraw is bounded
    /// by the pool size; since pool entries are distinct, any neighboring
    /// position differs from the repeat, so the fallback is deterministic.
    fn draw_position(&self, rng: &mut impl Rng) -> usize {
        let len = self.pool.len();
        let mut pos = rng.gen_range(0..len);
        if len < 2 {
            return pos;
        }
        let mut attempts = 0;
        while Some(self.pool[pos]) == self.last_index && attempts < len {
            pos = rng.gen_range(0..len);
            attempts += 1;
        }
        if Some(self.pool[pos]) == self.last_index {
            pos = (pos + 1) % len;
        }
        pos
    }

    /// Grade a raw answer against the current question.
    pub fn submit(&mut self, raw_answer: &str, repo: &VocabRepository) -> Submission {
        let Phase::Asking { index } = self.phase else {
            return Submission::NotAsking;
        };
        let answer = normalize(raw_answer);
        if answer.is_empty() {
            return Submission::NoAnswer;
        }
        let Some(item) = repo.get(index) else {
            // Vocabulary shrank underneath us; treat as a reset trigger.
            return Submission::NotAsking;
        };

        if answer == normalize(&item.term) {
            self.correct_count += 1;
            if self.correct_count >= self.target_correct {
                self.phase = Phase::Complete;
                Submission::Correct { complete: true }
            } else {
                self.phase = Phase::Advancing { index };
                Submission::Correct { complete: false }
            }
        } else {
            if !self.missed.contains(&index) {
                self.missed.push(index);
            }
            self.phase = Phase::Remediation { index };
            Submission::Incorrect {
                expected: item.term.clone(),
            }
        }
    }

    /// Report the outcome of the forced sentence-production task. Success
    /// clears the gate and draws the next question; failure leaves the gate
    /// in place (remediation may be retried indefinitely).
    pub fn resolve_remediation(&mut self, success: bool, rng: &mut impl Rng) -> NextOutcome {
        let Phase::Remediation { index } = self.phase else {
            return match self.phase {
                Phase::Complete => NextOutcome::Complete,
                _ => NextOutcome::Exhausted,
            };
        };
        if !success {
            return NextOutcome::RemediationPending { index };
        }
        self.phase = Phase::Idle;
        self.next(rng)
    }

    /// The backing vocabulary was mutated externally. A size change discards
    /// every held index (they may be stale) and queues a fresh full round;
    /// the correct-count earned so far is kept.
    pub fn on_vocabulary_changed(&mut self, new_count: usize) {
        if new_count == self.item_count {
            return;
        }
        self.item_count = new_count;
        self.pool.clear();
        self.missed.clear();
        self.last_index = None;
        self.reviewing = false;
        if self.phase != Phase::Complete {
            self.phase = Phase::Idle;
        }
    }

    #[cfg(test)]
    fn assert_conserved(&self) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for &i in self.pool.iter().chain(self.missed.iter()) {
            assert!(i < self.item_count, "stale index {i}");
            assert!(seen.insert(i), "index {i} held twice");
        }
        if let Some(current) = self.current_index() {
            assert!(!seen.contains(&current), "current index {current} also pooled");
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::store::vocab::VocabItem;

    fn repo(pairs: &[(&str, &str)]) -> VocabRepository {
        VocabRepository::in_memory(
            pairs
                .iter()
                .map(|(en, vi)| VocabItem {
                    term: en.to_string(),
                    translation: vi.to_string(),
                })
                .collect(),
        )
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn sample() -> VocabRepository {
        repo(&[("apple", "quả táo"), ("book", "sách"), ("improve", "cải thiện")])
    }

    #[test]
    fn start_rejects_empty_vocabulary() {
        let empty = repo(&[]);
        assert!(matches!(
            DrillScheduler::start(&empty, 3, &mut rng()),
            Err(SessionError::Data(_))
        ));
    }

    #[test]
    fn no_immediate_repeat_with_two_items() {
        let repo = repo(&[("apple", "quả táo"), ("book", "sách")]);
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 100, &mut rng).unwrap();
        let mut last = None;
        for _ in 0..200 {
            let NextOutcome::Question { index } = sched.next(&mut rng) else {
                panic!("expected a question");
            };
            assert_ne!(Some(index), last, "immediate repeat drawn");
            last = Some(index);
            sched.assert_conserved();
        }
    }

    #[test]
    fn single_item_repeats() {
        let repo = repo(&[("apple", "quả táo")]);
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 10, &mut rng).unwrap();
        assert_eq!(sched.next(&mut rng), NextOutcome::Question { index: 0 });
        assert_eq!(sched.next(&mut rng), NextOutcome::Question { index: 0 });
    }

    #[test]
    fn normalized_match_counts_and_completes() {
        let repo = repo(&[("apple", "quả táo"), ("book", "sách")]);
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 1, &mut rng).unwrap();
        sched.next(&mut rng);
        let idx = sched.current_index().unwrap();
        let answer = if idx == 0 { "  Apple " } else { " BOOK" };
        assert_eq!(sched.submit(answer, &repo), Submission::Correct { complete: true });
        assert!(sched.is_complete());
        assert_eq!(sched.next(&mut rng), NextOutcome::Complete);
    }

    #[test]
    fn incorrect_queues_remediation_and_missed_once() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 3, &mut rng).unwrap();
        sched.next(&mut rng);
        let idx = sched.current_index().unwrap();

        let verdict = sched.submit("xyz", &repo);
        assert!(matches!(verdict, Submission::Incorrect { .. }));
        assert_eq!(sched.phase(), Phase::Remediation { index: idx });
        assert_eq!(sched.missed, vec![idx]);

        // next() is a no-op while remediation is owed.
        assert_eq!(sched.next(&mut rng), NextOutcome::RemediationPending { index: idx });
        assert_eq!(sched.phase(), Phase::Remediation { index: idx });

        // Failing remediation keeps the gate; it can be retried.
        assert_eq!(
            sched.resolve_remediation(false, &mut rng),
            NextOutcome::RemediationPending { index: idx }
        );

        // Success draws a new question; missed entry stays for the review round.
        let NextOutcome::Question { index } = sched.resolve_remediation(true, &mut rng) else {
            panic!("expected a question after remediation");
        };
        assert_ne!(index, idx);
        assert_eq!(sched.missed, vec![idx]);
        sched.assert_conserved();
    }

    #[test]
    fn empty_answer_changes_nothing() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 3, &mut rng).unwrap();
        sched.next(&mut rng);
        let phase = sched.phase();
        assert_eq!(sched.submit("   (verb) ", &repo), Submission::NoAnswer);
        assert_eq!(sched.phase(), phase);
        assert_eq!(sched.correct_count(), 0);
    }

    #[test]
    fn missed_items_form_review_round() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 100, &mut rng).unwrap();

        // Miss every item in the first round.
        let mut missed = Vec::new();
        for _ in 0..repo.len() {
            sched.next(&mut rng);
            let idx = sched.current_index().unwrap();
            missed.push(idx);
            assert!(matches!(sched.submit("wrong", &repo), Submission::Incorrect { .. }));
            sched.resolve_remediation(true, &mut rng);
            // resolve_remediation already drew the next question except when
            // it had to refill; either way remediation is cleared.
            assert!(!matches!(sched.phase(), Phase::Remediation { .. }));
        }

        // By now we are drawing from the review round: every drawn index must
        // be one of the missed ones until that pool drains.
        assert!(sched.is_review_round());
        let idx = sched.current_index().unwrap();
        assert!(missed.contains(&idx));
        sched.assert_conserved();
    }

    #[test]
    fn completion_after_exactly_target_correct() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 3, &mut rng).unwrap();

        let mut corrects = 0;
        let mut guard = 0;
        while !sched.is_complete() {
            guard += 1;
            assert!(guard < 100, "session failed to converge");
            sched.next(&mut rng);
            let idx = sched.current_index().unwrap();
            // Interleave a miss before every correct answer.
            if guard % 2 == 0 {
                sched.submit("nope", &repo);
                sched.resolve_remediation(true, &mut rng);
                continue;
            }
            let term = repo.get(idx).unwrap().term.clone();
            let verdict = sched.submit(&term, &repo);
            corrects += 1;
            match verdict {
                Submission::Correct { complete } => {
                    assert_eq!(complete, corrects == 3, "completed at the wrong count")
                }
                other => panic!("expected correct, got {other:?}"),
            }
        }
        assert_eq!(corrects, 3);
        assert_eq!(sched.correct_count(), 3);
    }

    #[test]
    fn vocabulary_change_resets_pools_keeps_score() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 10, &mut rng).unwrap();
        sched.next(&mut rng);
        let idx = sched.current_index().unwrap();
        let term = repo.get(idx).unwrap().term.clone();
        sched.submit(&term, &repo);
        assert_eq!(sched.correct_count(), 1);

        let shrunk = repo_from(&repo, 2);
        sched.on_vocabulary_changed(shrunk.len());
        assert_eq!(sched.phase(), Phase::Idle);
        assert_eq!(sched.correct_count(), 1);

        for _ in 0..50 {
            let NextOutcome::Question { index } = sched.next(&mut rng) else {
                panic!("expected a question");
            };
            assert!(index < shrunk.len(), "stale index {index} drawn");
        }
    }

    #[test]
    fn vocabulary_change_same_count_is_noop() {
        let repo = sample();
        let mut rng = rng();
        let mut sched = DrillScheduler::start(&repo, 10, &mut rng).unwrap();
        sched.next(&mut rng);
        let phase = sched.phase();
        let pool = sched.pool.clone();
        sched.on_vocabulary_changed(repo.len());
        assert_eq!(sched.phase(), phase);
        assert_eq!(sched.pool, pool);
    }

    fn repo_from(repo: &VocabRepository, take: usize) -> VocabRepository {
        VocabRepository::in_memory(repo.items()[..take].to_vec())
    }
}

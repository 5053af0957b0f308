use crate::reading::ComprehensionTest;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GradeSummary {
    pub correct: usize,
    pub total: usize,
    pub unanswered: usize,
}

impl GradeSummary {
    /// The module-completion predicate: everything answered, everything right.
    pub fn is_passing(&self) -> bool {
        self.correct == self.total && self.unanswered == 0
    }
}

/// Score a response set against the test's answer keys. Pure: neither input
/// is mutated, and grading the same pair twice gives the same summary.
///
/// `responses` parallels the flattened question order (groups in descriptor
/// order, questions in group order). A missing, empty, or whitespace-only
/// response counts as unanswered and as incorrect. Comparison is
/// case-insensitive exact match on the trimmed key.
pub fn grade(test: &ComprehensionTest, responses: &[Option<String>]) -> GradeSummary {
    let mut summary = GradeSummary::default();
    let mut cursor = 0;

    for group in &test.groups {
        for key in group.answer_keys() {
            let response = responses.get(cursor).and_then(|r| r.as_deref());
            cursor += 1;
            summary.total += 1;

            match response.map(str::trim).filter(|r| !r.is_empty()) {
                None => summary.unanswered += 1,
                Some(given) => {
                    if given.to_lowercase() == key.trim().to_lowercase() {
                        summary.correct += 1;
                    }
                }
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{CodedText, KeyedOption, McQuestion, NumberedName, QuestionGroup};

    fn test_fixture() -> ComprehensionTest {
        ComprehensionTest {
            title: "fixture".to_string(),
            passage: "passage".to_string(),
            groups: vec![
                QuestionGroup::MatchingHeading {
                    sections: vec!["s1".into(), "s2".into()],
                    headings: vec![
                        CodedText { code: "i".into(), text: "h1".into() },
                        CodedText { code: "ii".into(), text: "h2".into() },
                    ],
                    answers: vec!["i".into(), "ii".into()],
                },
                QuestionGroup::MatchingPerson {
                    items: vec![NumberedName { number: 1, name: "Tom".into() }],
                    statements: vec![CodedText { code: "A".into(), text: "reads".into() }],
                    answers: vec!["1".into()],
                },
                QuestionGroup::MultipleChoiceSingle {
                    questions: vec![McQuestion {
                        number: 1,
                        prompt: "when?".into(),
                        options: vec![
                            KeyedOption { key: "A".into(), text: "morning".into() },
                            KeyedOption { key: "B".into(), text: "night".into() },
                        ],
                        answer: "A".into(),
                    }],
                },
            ],
        }
    }

    fn responses(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    None
                } else {
                    Some(v.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn total_is_sum_of_group_counts() {
        let test = test_fixture();
        let summary = grade(&test, &responses(&["i", "ii", "1", "A"]));
        assert_eq!(summary.total, test.total_questions());
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn all_blank_is_all_unanswered() {
        let test = test_fixture();
        let summary = grade(&test, &[]);
        assert_eq!(summary.unanswered, summary.total);
        assert_eq!(summary.correct, 0);
        assert!(!summary.is_passing());
    }

    #[test]
    fn case_insensitive_exact_match() {
        let test = test_fixture();
        let summary = grade(&test, &responses(&["I", "II", "1", "a"]));
        assert_eq!(summary.correct, 4);
        assert!(summary.is_passing());
    }

    #[test]
    fn empty_response_is_unanswered_and_incorrect() {
        let test = test_fixture();
        let summary = grade(&test, &responses(&["i", "  ", "1", "A"]));
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.unanswered, 1);
        assert!(!summary.is_passing());
    }

    #[test]
    fn wrong_answer_is_answered_but_incorrect() {
        let test = test_fixture();
        let summary = grade(&test, &responses(&["ii", "ii", "1", "A"]));
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.unanswered, 0);
    }

    #[test]
    fn grading_does_not_mutate_and_repeats() {
        let test = test_fixture();
        let rs = responses(&["i", "ii", "1", "A"]);
        assert_eq!(grade(&test, &rs), grade(&test, &rs));
    }
}

pub mod grader;

use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde::Deserialize;

use crate::error::SessionError;

#[derive(Embed)]
#[folder = "assets/reading/"]
struct ReadingAssets;

/// On-disk test descriptor. `passage` and `passage_file` are mutually
/// exclusive in practice; inline text wins when both are present.
#[derive(Clone, Debug, Deserialize)]
pub struct TestDescriptor {
    pub title: String,
    #[serde(default)]
    pub passage: Option<String>,
    #[serde(default)]
    pub passage_file: Option<String>,
    pub question_groups: Vec<QuestionGroup>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionGroup {
    MatchingHeading {
        sections: Vec<String>,
        headings: Vec<CodedText>,
        answers: Vec<String>,
    },
    MatchingPerson {
        items: Vec<NumberedName>,
        statements: Vec<CodedText>,
        answers: Vec<String>,
    },
    MultipleChoiceSingle {
        questions: Vec<McQuestion>,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct CodedText {
    pub code: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NumberedName {
    pub number: u32,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct McQuestion {
    pub number: u32,
    pub prompt: String,
    pub options: Vec<KeyedOption>,
    pub answer: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeyedOption {
    pub key: String,
    pub text: String,
}

impl QuestionGroup {
    pub fn question_count(&self) -> usize {
        match self {
            QuestionGroup::MatchingHeading { answers, .. } => answers.len(),
            QuestionGroup::MatchingPerson { answers, .. } => answers.len(),
            QuestionGroup::MultipleChoiceSingle { questions } => questions.len(),
        }
    }

    /// The expected answers in display order. The grader consumes these
    /// uniformly, indifferent to which variant produced them.
    pub fn answer_keys(&self) -> Vec<&str> {
        match self {
            QuestionGroup::MatchingHeading { answers, .. }
            | QuestionGroup::MatchingPerson { answers, .. } => {
                answers.iter().map(String::as_str).collect()
            }
            QuestionGroup::MultipleChoiceSingle { questions } => {
                questions.iter().map(|q| q.answer.as_str()).collect()
            }
        }
    }
}

/// One answerable question flattened out of its group: what to show and
/// which answer keys the learner may cycle through.
#[derive(Clone, Debug)]
pub struct QuestionSlot {
    pub label: String,
    pub options: Vec<String>,
}

/// Flatten the test into display order: groups in descriptor order,
/// questions in group order. Parallel to the grader's response layout.
pub fn question_slots(test: &ComprehensionTest) -> Vec<QuestionSlot> {
    let mut slots = Vec::with_capacity(test.total_questions());
    for group in &test.groups {
        match group {
            QuestionGroup::MatchingHeading { sections, headings, answers } => {
                let options: Vec<String> = headings.iter().map(|h| h.code.clone()).collect();
                for section in sections.iter().take(answers.len()) {
                    slots.push(QuestionSlot {
                        label: format!("Heading for \"{section}\""),
                        options: options.clone(),
                    });
                }
            }
            QuestionGroup::MatchingPerson { items, statements, answers } => {
                let options: Vec<String> = items.iter().map(|p| p.number.to_string()).collect();
                for statement in statements.iter().take(answers.len()) {
                    slots.push(QuestionSlot {
                        label: format!("{}. {}", statement.code, statement.text),
                        options: options.clone(),
                    });
                }
            }
            QuestionGroup::MultipleChoiceSingle { questions } => {
                for q in questions {
                    slots.push(QuestionSlot {
                        label: format!("{}. {}", q.number, q.prompt),
                        options: q.options.iter().map(|o| o.key.clone()).collect(),
                    });
                }
            }
        }
    }
    slots
}

/// A loaded, immutable comprehension test: descriptor with the passage
/// resolved to text.
#[derive(Clone, Debug)]
pub struct ComprehensionTest {
    pub title: String,
    pub passage: String,
    pub groups: Vec<QuestionGroup>,
}

impl ComprehensionTest {
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = fs::read_to_string(path)
            .map_err(|e| SessionError::Data(format!("cannot read {}: {e}", path.display())))?;
        let descriptor: TestDescriptor = serde_json::from_str(&content)
            .map_err(|e| SessionError::Data(format!("malformed test descriptor: {e}")))?;
        Self::from_descriptor(descriptor, path.parent())
    }

    /// The sample test bundled into the binary.
    pub fn load_bundled() -> Result<Self, SessionError> {
        let file = ReadingAssets::get("sample_test.json")
            .ok_or_else(|| SessionError::Data("bundled reading test missing".to_string()))?;
        let descriptor: TestDescriptor = serde_json::from_slice(file.data.as_ref())
            .map_err(|e| SessionError::Data(format!("malformed bundled test: {e}")))?;
        Self::from_descriptor(descriptor, None)
    }

    fn from_descriptor(
        descriptor: TestDescriptor,
        base_dir: Option<&Path>,
    ) -> Result<Self, SessionError> {
        let passage = match (descriptor.passage, descriptor.passage_file) {
            (Some(text), _) => text,
            (None, Some(reference)) => {
                let path = match base_dir {
                    Some(dir) => dir.join(&reference),
                    None => Path::new(&reference).to_path_buf(),
                };
                fs::read_to_string(&path).map_err(|e| {
                    SessionError::Data(format!(
                        "cannot extract passage from {}: {e}",
                        path.display()
                    ))
                })?
            }
            (None, None) => {
                return Err(SessionError::Data(
                    "test descriptor has neither passage nor passage_file".to_string(),
                ));
            }
        };
        if descriptor.question_groups.is_empty() {
            return Err(SessionError::Data(
                "test descriptor has no question groups".to_string(),
            ));
        }
        Ok(Self {
            title: descriptor.title,
            passage,
            groups: descriptor.question_groups,
        })
    }

    pub fn total_questions(&self) -> usize {
        self.groups.iter().map(QuestionGroup::question_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"{
        "title": "Morning Reading",
        "passage": "Tom reads English articles every morning.",
        "question_groups": [
            {
                "type": "matching_heading",
                "sections": ["Section 1", "Section 2"],
                "headings": [
                    {"code": "i", "text": "Daily habits"},
                    {"code": "ii", "text": "Long-term results"},
                    {"code": "iii", "text": "Unused"}
                ],
                "answers": ["i", "ii"]
            },
            {
                "type": "multiple_choice_single",
                "questions": [
                    {
                        "number": 1,
                        "prompt": "When does Tom read?",
                        "options": [
                            {"key": "A", "text": "morning"},
                            {"key": "B", "text": "evening"}
                        ],
                        "answer": "A"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_descriptor_and_counts() {
        let descriptor: TestDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();
        let test = ComprehensionTest::from_descriptor(descriptor, None).unwrap();
        assert_eq!(test.total_questions(), 3);
        assert_eq!(test.groups[0].answer_keys(), vec!["i", "ii"]);
    }

    #[test]
    fn slots_flatten_in_grading_order() {
        let descriptor: TestDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();
        let test = ComprehensionTest::from_descriptor(descriptor, None).unwrap();
        let slots = question_slots(&test);
        assert_eq!(slots.len(), test.total_questions());
        assert_eq!(slots[0].options, vec!["i", "ii", "iii"]);
        assert!(slots[0].label.contains("Section 1"));
        assert_eq!(slots[2].options, vec!["A", "B"]);
    }

    #[test]
    fn unknown_group_tag_is_data_error() {
        let bad = r#"{
            "title": "t",
            "passage": "p",
            "question_groups": [{"type": "essay", "prompt": "why"}]
        }"#;
        assert!(serde_json::from_str::<TestDescriptor>(bad).is_err());
    }

    #[test]
    fn missing_passage_is_data_error() {
        let descriptor: TestDescriptor = serde_json::from_str(
            r#"{"title": "t", "question_groups": [
                {"type": "multiple_choice_single", "questions": []}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(
            ComprehensionTest::from_descriptor(descriptor, None),
            Err(SessionError::Data(_))
        ));
    }

    #[test]
    fn passage_file_resolves_relative_to_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("passage.txt"), "Extracted text.").unwrap();
        let descriptor_path = dir.path().join("test.json");
        std::fs::write(
            &descriptor_path,
            r#"{"title": "t", "passage_file": "passage.txt", "question_groups": [
                {"type": "multiple_choice_single", "questions": [
                    {"number": 1, "prompt": "?", "options": [{"key": "A", "text": "a"}], "answer": "A"}
                ]}
            ]}"#,
        )
        .unwrap();

        let test = ComprehensionTest::load(&descriptor_path).unwrap();
        assert_eq!(test.passage, "Extracted text.");
    }

    #[test]
    fn bundled_sample_loads() {
        let test = ComprehensionTest::load_bundled().unwrap();
        assert!(test.total_questions() > 0);
        assert!(!test.passage.is_empty());
    }
}

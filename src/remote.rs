//! Sentence-grading collaborator for the remediation task.
//!
//! The remote judge is an HTTP service; the call runs on its own thread and
//! reports back through the app event channel so the event loop never
//! blocks. Every transport or parse failure becomes a displayed message,
//! never a fault. Without the `network` feature (or with no endpoint
//! configured) a local heuristic stands in, so remediation always has a
//! reachable success path.

use serde::{Deserialize, Serialize};

use crate::session::normalize::normalize;

#[derive(Debug, Serialize)]
pub struct SentenceRequest<'a> {
    pub target_term: &'a str,
    pub learner_sentence: &'a str,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SentenceReview {
    pub is_correct_usage: bool,
    pub score: f64,
    pub feedback: String,
    pub suggested_sentence: String,
}

/// Offline judge: the sentence must actually use the target term and be more
/// than a bare fragment.
pub fn local_review(target_term: &str, learner_sentence: &str) -> SentenceReview {
    let term = normalize(target_term);
    let sentence = normalize(learner_sentence);
    let uses_term = !term.is_empty() && sentence.contains(&term);
    let long_enough = sentence.split_whitespace().count() >= 3;

    if uses_term && long_enough {
        SentenceReview {
            is_correct_usage: true,
            score: 1.0,
            feedback: format!("Good — your sentence uses \"{target_term}\"."),
            suggested_sentence: String::new(),
        }
    } else if !uses_term {
        SentenceReview {
            is_correct_usage: false,
            score: 0.0,
            feedback: format!("Your sentence must use the word \"{target_term}\"."),
            suggested_sentence: format!("Try: I want to {target_term} every day."),
        }
    } else {
        SentenceReview {
            is_correct_usage: false,
            score: 0.2,
            feedback: "Write a full sentence, not just the word.".to_string(),
            suggested_sentence: format!("Try: I want to {target_term} every day."),
        }
    }
}

#[cfg(feature = "network")]
pub use network::spawn_review;

#[cfg(feature = "network")]
mod network {
    use std::sync::mpsc::Sender;
    use std::thread;
    use std::time::Duration;

    use super::{SentenceRequest, SentenceReview};
    use crate::error::SessionError;
    use crate::event::AppEvent;

    /// Fire the grading request on a worker thread; the verdict (or the
    /// failure message) arrives back on the event loop as
    /// [`AppEvent::SentenceVerdict`].
    pub fn spawn_review(endpoint: String, target_term: String, sentence: String, tx: Sender<AppEvent>) {
        thread::spawn(move || {
            let result =
                request_review(&endpoint, &target_term, &sentence).map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::SentenceVerdict(result));
        });
    }

    fn request_review(
        endpoint: &str,
        target_term: &str,
        sentence: &str,
    ) -> Result<SentenceReview, SessionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| SessionError::RemoteCall(e.to_string()))?;
        let response = client
            .post(endpoint)
            .json(&SentenceRequest {
                target_term,
                learner_sentence: sentence,
            })
            .send()
            .map_err(|e| SessionError::RemoteCall(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SessionError::RemoteCall(format!(
                "grading service returned HTTP {}",
                response.status()
            )));
        }
        let mut review: SentenceReview = response
            .json()
            .map_err(|e| SessionError::RemoteCall(format!("malformed response: {e}")))?;
        review.score = review.score.clamp(0.0, 1.0);
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_contract_round_trips() {
        let request = SentenceRequest {
            target_term: "improve",
            learner_sentence: "I improve my English every day.",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["target_term"], "improve");
        assert_eq!(json["learner_sentence"], "I improve my English every day.");

        let review: SentenceReview = serde_json::from_str(
            r#"{
                "is_correct_usage": true,
                "score": 0.9,
                "feedback": "Natural usage.",
                "suggested_sentence": "I try to improve a little every day."
            }"#,
        )
        .unwrap();
        assert!(review.is_correct_usage);
        assert!((review.score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_response_is_an_error_not_a_panic() {
        assert!(serde_json::from_str::<SentenceReview>(r#"{"score": "high"}"#).is_err());
    }

    #[test]
    fn local_judge_accepts_real_usage() {
        let review = local_review("improve", "I want to improve my English.");
        assert!(review.is_correct_usage);
    }

    #[test]
    fn local_judge_rejects_missing_term() {
        let review = local_review("improve", "I like reading books a lot.");
        assert!(!review.is_correct_usage);
        assert!(review.feedback.contains("improve"));
    }

    #[test]
    fn local_judge_rejects_fragment() {
        let review = local_review("improve", "improve");
        assert!(!review.is_correct_usage);
    }

    #[test]
    fn local_judge_ignores_case_and_annotations() {
        let review = local_review("Rule out (verb)", "Doctors rule out the flu first.");
        assert!(review.is_correct_usage);
    }
}

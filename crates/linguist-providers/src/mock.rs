//! Mock generator for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use linguist_core::error::GeneratorError;
use linguist_core::model::ExerciseSeed;
use linguist_core::payload::parse_exercise_payload;
use linguist_core::traits::{ContentGenerator, TutorTurn};

/// A mock generator for exercising the authoring and player flows without
/// real API calls.
///
/// Payloads are raw reply strings and go through the same parsing and
/// validation as real backend output, so the mock cannot hand out content a
/// real backend could not.
pub struct MockGenerator {
    /// Map of source-text substring -> raw reply payload.
    payloads: HashMap<String, String>,
    /// Default payload if no source text matches.
    default_payload: String,
    /// Canned tutor reply.
    tutor_reply: String,
    /// When set, every call fails the way a dead backend would.
    failing: bool,
    /// Number of generation calls made.
    call_count: AtomicU32,
    /// Last source text received.
    last_source: Mutex<Option<String>>,
}

const DEFAULT_PAYLOAD: &str = r#"[
    {
        "type": "multiple_choice",
        "instruction": "Choose the correct option.",
        "content": {
            "question": "Placeholder question?",
            "options": ["yes", "no"],
            "correctAnswer": "yes"
        },
        "points": 5
    }
]"#;

impl MockGenerator {
    /// Create a mock with the given source-substring -> payload mappings.
    pub fn new(payloads: HashMap<String, String>) -> Self {
        Self {
            payloads,
            default_payload: DEFAULT_PAYLOAD.to_string(),
            tutor_reply: "Let's look at that together.".to_string(),
            failing: false,
            call_count: AtomicU32::new(0),
            last_source: Mutex::new(None),
        }
    }

    /// Create a mock that always replies with the same payload.
    pub fn with_fixed_payload(payload: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_payload = payload.to_string();
        mock
    }

    /// Create a mock whose every call fails like an unreachable backend.
    pub fn failing() -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.failing = true;
        mock
    }

    pub fn with_tutor_reply(mut self, reply: &str) -> Self {
        self.tutor_reply = reply.to_string();
        self
    }

    /// Number of generation calls made against this mock.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last source text passed to `generate_exercises`.
    pub fn last_source(&self) -> Option<String> {
        self.last_source.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_exercises(&self, source_text: &str) -> anyhow::Result<Vec<ExerciseSeed>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_source.lock().unwrap() = Some(source_text.to_string());

        if self.failing {
            return Err(GeneratorError::NetworkError("mock backend unreachable".into()).into());
        }

        let payload = self
            .payloads
            .iter()
            .find(|(key, _)| source_text.contains(key.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| self.default_payload.clone());

        Ok(parse_exercise_payload(&payload)?)
    }

    async fn tutor_reply(&self, _message: &str, _history: &[TutorTurn]) -> anyhow::Result<String> {
        if self.failing {
            return Err(GeneratorError::NetworkError("mock backend unreachable".into()).into());
        }
        Ok(self.tutor_reply.clone())
    }
}

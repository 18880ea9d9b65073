//! Core trait definition for generative-language backends.
//!
//! Implemented by the `linguist-providers` crate. The backend is a black-box
//! request/response collaborator: it authors exercise batches from source
//! text and produces tutor chat replies. At most one call is in flight per
//! screen at a time and there is no cancellation; the caller disables its
//! trigger instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::ExerciseSeed;

/// Trait for backends that generate teaching content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Turn free-form source text into a batch of exercises.
    ///
    /// Returned seeds carry no ids; the authoring flow assigns fresh ones.
    /// An empty or malformed reply is an error, never an empty batch.
    async fn generate_exercises(&self, source_text: &str) -> anyhow::Result<Vec<ExerciseSeed>>;

    /// One tutor chat reply given the running conversation.
    async fn tutor_reply(&self, message: &str, history: &[TutorTurn]) -> anyhow::Result<String>;
}

/// Who produced a turn in the tutor conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TutorRole {
    User,
    Model,
}

/// One prior turn of the tutor conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorTurn {
    pub role: TutorRole,
    pub text: String,
}

/// Fixed instruction sent with every exercise-generation request. The
/// backend must reply with a JSON array matching the two supported content
/// shapes exactly; `payload::parse_exercise_payload` enforces the contract.
pub const EXERCISE_PROMPT: &str = "\
You are generating English practice exercises from a source text. \
Respond ONLY with a JSON array. Each element must be an object with these fields: \
\"type\" (either \"multiple_choice\" or \"fill_blank\"), \
\"instruction\" (a short learner-facing prompt), \
\"points\" (a positive integer), and \"content\". \
For \"multiple_choice\", \"content\" has \"question\" (string), \
\"options\" (an array of at least two distinct strings), and \
\"correctAnswer\" (exactly one of the options). \
For \"fill_blank\", \"content\" has \"textWithBlanks\" (a sentence with \
positional markers {1}, {2}, ... in ascending order with no gaps) and \
\"correctAnswer\" (an array of strings, one per marker, in marker order). \
Do not include ids, explanations, or any text outside the JSON array.";

/// System instruction for the tutor chat.
pub const TUTOR_SYSTEM_PROMPT: &str = "\
You are an expert English Language Tutor at 'Study Link'. \
Your goal is to help students with grammar, vocabulary, pronunciation tips, and writing. \
Keep your tone encouraging, professional, and educational. \
When explaining grammar, provide examples. \
If asked about center policies, suggest they contact their curator.";

/// Extract a JSON payload from a markdown-formatted model response.
///
/// Handles:
/// - Single or multiple ```json``` blocks (first one wins)
/// - Generic ``` blocks (if no json-specific block is found)
/// - Raw JSON with no markdown fences (returned as-is)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) fence: treat the accumulated content as a block.
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else {
            generic_blocks.push(current_block);
        }
    }

    if let Some(block) = json_blocks.into_iter().next() {
        return block;
    }
    if let Some(block) = generic_blocks.into_iter().next() {
        return block;
    }

    response.to_string()
}

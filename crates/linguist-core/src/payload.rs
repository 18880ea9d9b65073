//! Generator payload parsing and validation.
//!
//! The backend replies with free text that is supposed to contain a JSON
//! array of exercises. This module enforces the contract: strip markdown
//! fences, parse strictly into [`ExerciseSeed`]s, then validate the content
//! semantics. Anything that fails is a generation failure — the caller gets
//! zero exercises and must not publish.

use std::collections::HashSet;

use crate::error::GeneratorError;
use crate::model::{blank_markers, ExerciseContent, ExerciseSeed};
use crate::traits::extract_json_from_markdown;

/// Parse a raw backend reply into validated exercise seeds.
pub fn parse_exercise_payload(raw: &str) -> Result<Vec<ExerciseSeed>, GeneratorError> {
    let payload = extract_json_from_markdown(raw);
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(GeneratorError::EmptyPayload);
    }

    let seeds: Vec<ExerciseSeed> = serde_json::from_str(trimmed)
        .map_err(|err| GeneratorError::MalformedPayload(err.to_string()))?;

    if seeds.is_empty() {
        return Err(GeneratorError::EmptyPayload);
    }

    for (index, seed) in seeds.iter().enumerate() {
        validate_content(&seed.content).map_err(|reason| {
            GeneratorError::MalformedPayload(format!("exercise {index}: {reason}"))
        })?;
    }

    Ok(seeds)
}

/// Validate one exercise content payload against the authoring rules.
///
/// Shared between generated seeds and hand-entered exercises, so both paths
/// reject the same malformed shapes.
pub fn validate_content(content: &ExerciseContent) -> Result<(), String> {
    match content {
        ExerciseContent::MultipleChoice {
            options,
            correct_answer,
            ..
        } => {
            if options.len() < 2 {
                return Err("needs at least two options".into());
            }
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.as_str()) {
                    return Err(format!("duplicate option: {option}"));
                }
            }
            if !options.contains(correct_answer) {
                return Err("correctAnswer must equal one of the options".into());
            }
            Ok(())
        }
        ExerciseContent::FillBlank {
            text_with_blanks,
            correct_answer,
        } => {
            let markers = blank_markers(text_with_blanks);
            if markers.is_empty() {
                return Err("needs at least one {n} marker".into());
            }
            let expected: Vec<usize> = (1..=markers.len()).collect();
            if markers != expected {
                return Err("markers must be {1}, {2}, ... in ascending order with no gaps".into());
            }
            if correct_answer.len() != markers.len() {
                return Err(format!(
                    "marker count {} does not match answer count {}",
                    markers.len(),
                    correct_answer.len()
                ));
            }
            Ok(())
        }
    }
}

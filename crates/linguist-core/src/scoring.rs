//! Deterministic scoring over (exercises, answers).
//!
//! Pure functions with no side effects: the same inputs always produce the
//! same score, so the submit path and a later review re-display compute
//! through the exact same code and can never drift apart.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, AnswerSet, Exercise, ExerciseContent};

/// Per-exercise outcome classification for review display.
///
/// Derived from the same comparisons as the numeric score, never computed
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Full credit.
    Correct,
    /// Fill-blank with some but not all blanks correct.
    Partial,
    /// Wrong choice, or fill-blank with zero correct blanks.
    Incorrect,
    /// No stored answer for the exercise.
    Unanswered,
}

/// Score of a single exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseScore {
    pub exercise_id: String,
    pub earned: u32,
    pub max: u32,
    pub outcome: Outcome,
}

/// Score of a whole answer set against an assignment's exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub max: u32,
    /// One entry per exercise, in display order.
    pub exercises: Vec<ExerciseScore>,
}

impl ScoreSummary {
    pub fn outcome_for(&self, exercise_id: &str) -> Option<Outcome> {
        self.exercises
            .iter()
            .find(|score| score.exercise_id == exercise_id)
            .map(|score| score.outcome)
    }
}

/// Blank comparison: case-insensitive, whitespace-trimmed equality.
pub fn blank_matches(given: &str, correct: &str) -> bool {
    given.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// Score one exercise against the learner's stored answer, if any.
///
/// Anomalous input is treated permissively: a missing answer, or an answer
/// whose shape does not match the exercise kind, contributes 0 and never
/// raises.
pub fn score_exercise(exercise: &Exercise, answer: Option<&Answer>) -> ExerciseScore {
    let max = exercise.points;
    let (earned, outcome) = match (&exercise.content, answer) {
        (_, None) => (0, Outcome::Unanswered),
        (ExerciseContent::MultipleChoice { correct_answer, .. }, Some(Answer::Choice(given))) => {
            // Choices are exact, case-sensitive string matches.
            if given == correct_answer {
                (max, Outcome::Correct)
            } else {
                (0, Outcome::Incorrect)
            }
        }
        (ExerciseContent::FillBlank { correct_answer, .. }, Some(Answer::Blanks(given))) => {
            score_blanks(exercise.points, correct_answer, given)
        }
        // Answer shape does not match the exercise kind.
        (_, Some(_)) => (0, Outcome::Incorrect),
    };

    ExerciseScore {
        exercise_id: exercise.id.clone(),
        earned,
        max,
        outcome,
    }
}

/// Per-blank weight is `points / blank_count`; the exercise total is the
/// floor of the summed matched weights. Computed as integer
/// `points * matched / blanks`, which is exactly that floor with no
/// floating-point drift.
fn score_blanks(points: u32, correct: &[String], given: &[String]) -> (u32, Outcome) {
    let blanks = correct.len() as u32;
    if blanks == 0 {
        return (0, Outcome::Incorrect);
    }

    let matched = correct
        .iter()
        .enumerate()
        .filter(|(index, expected)| {
            given
                .get(*index)
                .is_some_and(|value| blank_matches(value, expected))
        })
        .count() as u32;

    let outcome = if matched == blanks {
        Outcome::Correct
    } else if matched > 0 {
        Outcome::Partial
    } else {
        Outcome::Incorrect
    };

    (points * matched / blanks, outcome)
}

/// Score a full assignment. Answers for unknown exercise ids are ignored.
pub fn score_assignment(exercises: &[Exercise], answers: &AnswerSet) -> ScoreSummary {
    let per_exercise: Vec<ExerciseScore> = exercises
        .iter()
        .map(|exercise| score_exercise(exercise, answers.get(&exercise.id)))
        .collect();

    ScoreSummary {
        total: per_exercise.iter().map(|score| score.earned).sum(),
        max: exercises.iter().map(|exercise| exercise.points).sum(),
        exercises: per_exercise,
    }
}

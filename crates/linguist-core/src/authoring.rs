//! Assignment authoring: generation handoff and publish validation.
//!
//! The builder flow is two steps: turn source text into exercises via the
//! generator (or enter them by hand), then validate and publish the bundle
//! as an immutable assignment. A generation failure leaves the exercise
//! list empty and publishing blocked; retry is a manual author action.

use thiserror::Error;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::{
    Assignment, AssignmentKind, AssignmentStatus, Exercise, ExerciseSeed,
};
use crate::payload::validate_content;
use crate::store::AssignmentStore;
use crate::traits::ContentGenerator;

/// Category label stamped on generated assignments.
pub const GENERATED_COURSE_ID: &str = "ENG-AI-GEN";

/// A publish request that blocks locally instead of producing a bad
/// assignment. No state changes when one of these fires.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("a target group is required")]
    MissingGroup,

    #[error("an assignment needs at least one exercise")]
    NoExercises,

    #[error("exercise {index} is invalid: {reason}")]
    InvalidExercise { index: usize, reason: String },
}

/// Everything an author fills in before publishing.
#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub group_id: String,
    pub exercises: Vec<Exercise>,
}

/// Ask the generator for exercises and stamp fresh ids on whatever comes
/// back. On failure the caller keeps its current (empty) exercise list.
pub async fn generate_exercises(
    generator: &dyn ContentGenerator,
    source_text: &str,
) -> anyhow::Result<Vec<Exercise>> {
    let seeds = generator.generate_exercises(source_text).await?;
    tracing::debug!(backend = generator.name(), count = seeds.len(), "generated exercises");
    Ok(assign_ids(seeds))
}

/// Stamp fresh unique ids onto generated seeds. Generator ids are never
/// trusted to be globally unique.
pub fn assign_ids(seeds: Vec<ExerciseSeed>) -> Vec<Exercise> {
    seeds
        .into_iter()
        .map(|seed| Exercise {
            id: Uuid::new_v4().to_string(),
            instruction: seed.instruction,
            content: seed.content,
            points: seed.points,
        })
        .collect()
}

/// Validate a draft and seal it into a publishable assignment.
///
/// Points are the sum of the exercises' points; the assignment gets a fresh
/// id, `interactive` kind, and PENDING status.
pub fn publish(draft: AssignmentDraft) -> Result<Assignment, ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if draft.group_id.trim().is_empty() {
        return Err(ValidationError::MissingGroup);
    }
    if draft.exercises.is_empty() {
        return Err(ValidationError::NoExercises);
    }
    for (index, exercise) in draft.exercises.iter().enumerate() {
        validate_content(&exercise.content)
            .map_err(|reason| ValidationError::InvalidExercise { index, reason })?;
    }

    let points = draft.exercises.iter().map(|exercise| exercise.points).sum();

    Ok(Assignment {
        id: Uuid::new_v4().to_string(),
        title: draft.title,
        description: draft.description,
        due_date: draft.due_date,
        course_id: GENERATED_COURSE_ID.to_string(),
        group_id: Some(draft.group_id),
        status: AssignmentStatus::Pending,
        kind: AssignmentKind::Interactive,
        exercises: draft.exercises,
        points,
    })
}

/// Publish and append to the persisted collection in one step.
pub fn publish_into(
    store: &mut dyn AssignmentStore,
    draft: AssignmentDraft,
) -> anyhow::Result<Assignment> {
    let assignment = publish(draft)?;
    store.append_assignment(assignment.clone())?;
    tracing::info!(assignment_id = %assignment.id, points = assignment.points, "published assignment");
    Ok(assignment)
}

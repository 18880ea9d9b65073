//! Core data model types for the Study Link platform.
//!
//! These are the fundamental types the whole system exchanges: exercises,
//! assignments, grade records, and the roster. Wire field names are
//! camelCase so exported collections stay readable by the web client.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// A cohort of students taught by one teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    /// Human-readable name (e.g. "Beginner A1").
    pub name: String,
    /// CEFR-style level label.
    pub level: String,
    pub teacher_id: String,
}

/// One account in the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: UserRole,
    /// Level label for students.
    #[serde(default)]
    pub level: Option<String>,
    /// Links a student to a group; staff accounts carry none.
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Variant payload of an exercise, keyed by `type` on the wire.
///
/// Each kind holds only its own fields, so a content shape that does not
/// match its declared type is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ExerciseContent {
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        question: String,
        /// Ordered answer options; at least two, all distinct.
        options: Vec<String>,
        /// Must equal exactly one of `options`.
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    FillBlank {
        /// Template with positional markers: "London is the {1} of the {2}."
        text_with_blanks: String,
        /// One expected answer per marker, in marker order.
        correct_answer: Vec<String>,
    },
}

impl ExerciseContent {
    /// Wire name of the variant, as stored in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ExerciseContent::MultipleChoice { .. } => "multiple_choice",
            ExerciseContent::FillBlank { .. } => "fill_blank",
        }
    }

    /// Number of blanks a learner has to fill; zero for multiple choice.
    pub fn blank_count(&self) -> usize {
        match self {
            ExerciseContent::MultipleChoice { .. } => 0,
            ExerciseContent::FillBlank { correct_answer, .. } => correct_answer.len(),
        }
    }
}

/// One gradable question unit within an interactive assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier, assigned at creation and never reused.
    pub id: String,
    /// Learner-facing prompt text.
    pub instruction: String,
    #[serde(flatten)]
    pub content: ExerciseContent,
    /// Maximum contribution to the assignment total.
    pub points: u32,
}

/// An exercise as returned by the generator, before an id is assigned.
///
/// Generator output is never trusted to carry globally-unique ids; the
/// authoring flow stamps fresh ones (see `authoring::assign_ids`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSeed {
    pub instruction: String,
    #[serde(flatten)]
    pub content: ExerciseContent,
    pub points: u32,
}

/// Assignment lifecycle status as shown to a viewer.
///
/// Not authoritative on the record itself: for a student the displayed
/// status is derived from grade existence via [`derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

/// Whether an assignment carries interactive exercises or is a plain
/// worksheet-style entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Legacy,
    Interactive,
}

/// A gradable unit of work, immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    /// Category label ("Unit" in the UI).
    pub course_id: String,
    /// Restricts visibility to one cohort; ungrouped assignments are
    /// visible to everyone.
    #[serde(default)]
    pub group_id: Option<String>,
    pub status: AssignmentStatus,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    /// Display and scoring order. Empty for legacy assignments.
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Must equal the sum of exercise points when interactive.
    pub points: u32,
}

/// A learner's raw answer to one exercise.
///
/// Untagged on the wire: a bare string for multiple choice, an array of
/// strings (one per blank) for fill-blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(String),
    Blanks(Vec<String>),
}

/// Answers keyed by exercise id.
pub type AnswerSet = BTreeMap<String, Answer>;

/// One learner's outcome for one assignment.
///
/// At most one record exists per (student, assignment) pair; a resubmission
/// replaces the prior record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: String,
    pub student_id: String,
    /// Denormalized snapshot of the student's name at submission time.
    pub student_name: String,
    pub assignment_id: String,
    /// Denormalized snapshot of the assignment title.
    pub assignment_title: String,
    pub score: u32,
    pub max_score: u32,
    /// Submission time.
    pub date: DateTime<Utc>,
    /// Snapshot of the learner's answers, for later review.
    #[serde(default)]
    pub answers: AnswerSet,
}

/// Status an assignment should display for a particular viewer.
///
/// GRADED once a matching grade record exists; otherwise the stored status
/// stands (SUBMITTED-without-grade is not reachable here since grading is
/// synchronous, but stored legacy entries may carry it).
pub fn derive_status(assignment: &Assignment, grade: Option<&GradeRecord>) -> AssignmentStatus {
    match grade {
        Some(_) => AssignmentStatus::Graded,
        None => assignment.status,
    }
}

/// One piece of a fill-blank template: literal text or a blank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankSegment<'a> {
    Text(&'a str),
    /// Zero-based blank index (`{1}` in the template is index 0).
    Blank(usize),
}

/// Split a fill-blank template into text and blank segments.
///
/// A marker is `{n}` with n >= 1; anything else, including stray braces,
/// is kept as literal text.
pub fn blank_segments(text: &str) -> Vec<BlankSegment<'_>> {
    let mut segments = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'{' {
            let mut end = pos + 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > pos + 1 && end < bytes.len() && bytes[end] == b'}' {
                // The digit run is ASCII, so the parse only fails on
                // overflow; treat that as literal text.
                if let Ok(number) = text[pos + 1..end].parse::<usize>() {
                    if number >= 1 {
                        if start < pos {
                            segments.push(BlankSegment::Text(&text[start..pos]));
                        }
                        segments.push(BlankSegment::Blank(number - 1));
                        pos = end + 1;
                        start = pos;
                        continue;
                    }
                }
            }
        }
        pos += 1;
    }

    if start < text.len() {
        segments.push(BlankSegment::Text(&text[start..]));
    }
    segments
}

/// Marker numbers in order of appearance (1-based, as written).
pub fn blank_markers(text: &str) -> Vec<usize> {
    blank_segments(text)
        .iter()
        .filter_map(|segment| match segment {
            BlankSegment::Blank(index) => Some(index + 1),
            BlankSegment::Text(_) => None,
        })
        .collect()
}

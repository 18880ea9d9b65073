//! Homework player session: answer capture, submission, review.
//!
//! One `PlayerSession` covers a single viewing of one assignment. The mode
//! progression is `Attempt -> Submitting -> Review`; "submission in flight"
//! is a first-class state rather than an ad hoc flag, so a second submit
//! while one is outstanding is rejected by the transition guard and can
//! never produce a duplicate grade record. Review is terminal for the
//! session — closing and reopening builds a fresh session.

use thiserror::Error;

use chrono::Utc;
use uuid::Uuid;

use crate::model::{
    blank_segments, Answer, AnswerSet, Assignment, BlankSegment, Exercise, ExerciseContent,
    GradeRecord, User, UserRole,
};
use crate::scoring::{score_assignment, Outcome, ScoreSummary};
use crate::store::{GradeStore, StoreError};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    /// The learner may edit answers.
    Attempt,
    /// A submission is outstanding; inputs are rejected.
    Submitting,
    /// Read-only; scores and correct answers are visible.
    Review,
}

/// Why a submit attempt was refused or failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A submission is already in flight; the duplicate attempt is dropped.
    #[error("a submission is already in progress")]
    InFlight,

    /// The session is already in review; nothing further can be submitted.
    #[error("this session has already been submitted")]
    AlreadySubmitted,

    /// Preview sessions have no submit affordance.
    #[error("only students may submit")]
    NotPermitted,

    /// Persisting the grade record failed; the session is back in attempt
    /// mode and the learner may retry.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One answer input from the learner.
#[derive(Debug, Clone)]
pub enum AnswerInput {
    /// Replaces the whole stored answer for a multiple-choice exercise.
    Choice(String),
    /// Replaces one blank of a fill-blank exercise, leaving the others
    /// untouched.
    Blank { index: usize, value: String },
}

/// A single viewing of one assignment by one viewer.
#[derive(Debug)]
pub struct PlayerSession {
    assignment: Assignment,
    viewer: User,
    answers: AnswerSet,
    mode: PlayerMode,
    summary: Option<ScoreSummary>,
}

impl PlayerSession {
    /// Open a session.
    ///
    /// Staff viewers always get a read-only preview scored against an empty
    /// answer set, so no option is ever marked as "your answer". A student
    /// reopening a graded assignment passes the stored answers and lands
    /// directly in review, reproducing the original score. Otherwise the
    /// session starts in attempt mode.
    pub fn open(assignment: Assignment, viewer: User, prior_answers: Option<AnswerSet>) -> Self {
        let (answers, review) = if viewer.role != UserRole::Student {
            (AnswerSet::new(), true)
        } else {
            match prior_answers {
                Some(prior) => (prior, true),
                None => (AnswerSet::new(), false),
            }
        };

        let summary = review.then(|| score_assignment(&assignment.exercises, &answers));

        Self {
            assignment,
            viewer,
            answers,
            mode: if review { PlayerMode::Review } else { PlayerMode::Attempt },
            summary,
        }
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// Present once the session is in review.
    pub fn summary(&self) -> Option<&ScoreSummary> {
        self.summary.as_ref()
    }

    /// Record one answer. A no-op outside attempt mode.
    ///
    /// Choices replace the stored answer wholesale. A blank write grows the
    /// answer sequence as needed, sparse-filling skipped positions with
    /// empty strings.
    pub fn record_answer(&mut self, exercise_id: &str, input: AnswerInput) {
        if self.mode != PlayerMode::Attempt {
            return;
        }

        match input {
            AnswerInput::Choice(value) => {
                self.answers.insert(exercise_id.to_string(), Answer::Choice(value));
            }
            AnswerInput::Blank { index, value } => {
                let entry = self
                    .answers
                    .entry(exercise_id.to_string())
                    .or_insert_with(|| Answer::Blanks(Vec::new()));
                if !matches!(entry, Answer::Blanks(_)) {
                    *entry = Answer::Blanks(Vec::new());
                }
                if let Answer::Blanks(blanks) = entry {
                    if blanks.len() <= index {
                        blanks.resize(index + 1, String::new());
                    }
                    blanks[index] = value;
                }
            }
        }
    }

    /// Submit the attempt: score it, persist the grade record (replacing any
    /// prior record for this learner and assignment), and move to review.
    ///
    /// Guarded so that exactly one submission is accepted per session. If
    /// the store write fails the session returns to attempt mode and the
    /// error is surfaced once; retry is a manual learner action.
    pub fn submit(&mut self, grades: &mut dyn GradeStore) -> Result<ScoreSummary, SubmitError> {
        match self.mode {
            PlayerMode::Submitting => return Err(SubmitError::InFlight),
            PlayerMode::Review => return Err(SubmitError::AlreadySubmitted),
            PlayerMode::Attempt => {}
        }
        if self.viewer.role != UserRole::Student {
            return Err(SubmitError::NotPermitted);
        }

        self.mode = PlayerMode::Submitting;
        let summary = score_assignment(&self.assignment.exercises, &self.answers);

        let record = GradeRecord {
            id: Uuid::new_v4().to_string(),
            student_id: self.viewer.id.clone(),
            student_name: self.viewer.name.clone(),
            assignment_id: self.assignment.id.clone(),
            assignment_title: self.assignment.title.clone(),
            score: summary.total,
            max_score: self.assignment.points,
            date: Utc::now(),
            answers: self.answers.clone(),
        };

        if let Err(err) = grades.upsert_grade(record) {
            tracing::warn!(assignment_id = %self.assignment.id, error = %err, "grade write failed");
            self.mode = PlayerMode::Attempt;
            return Err(err.into());
        }

        self.summary = Some(summary.clone());
        self.mode = PlayerMode::Review;
        Ok(summary)
    }

    /// Read-only correctness report for rendering. Only available in review.
    pub fn review_sheet(&self) -> Option<ReviewSheet> {
        if self.mode != PlayerMode::Review {
            return None;
        }
        let summary = self.summary.as_ref()?;

        let exercises = self
            .assignment
            .exercises
            .iter()
            .zip(&summary.exercises)
            .map(|(exercise, score)| ExerciseReview {
                exercise_id: exercise.id.clone(),
                instruction: exercise.instruction.clone(),
                outcome: score.outcome,
                earned: score.earned,
                max: score.max,
                detail: self.review_detail(exercise),
            })
            .collect();

        Some(ReviewSheet {
            total: summary.total,
            max: self.assignment.points,
            exercises,
        })
    }

    fn review_detail(&self, exercise: &Exercise) -> ReviewDetail {
        match &exercise.content {
            ExerciseContent::MultipleChoice {
                question,
                options,
                correct_answer,
            } => {
                let selected = match self.answers.get(&exercise.id) {
                    Some(Answer::Choice(value)) => Some(value.as_str()),
                    _ => None,
                };
                ReviewDetail::MultipleChoice {
                    question: question.clone(),
                    options: options
                        .iter()
                        .map(|option| OptionReview {
                            label: option.clone(),
                            selected: selected == Some(option.as_str()),
                            correct: option == correct_answer,
                        })
                        .collect(),
                }
            }
            ExerciseContent::FillBlank {
                text_with_blanks,
                correct_answer,
            } => {
                let given = match self.answers.get(&exercise.id) {
                    Some(Answer::Blanks(values)) => values.as_slice(),
                    _ => &[],
                };
                let blanks = correct_answer
                    .iter()
                    .enumerate()
                    .map(|(index, correct)| {
                        let value = given.get(index).cloned().unwrap_or_default();
                        let matched = crate::scoring::blank_matches(&value, correct);
                        BlankReview {
                            index,
                            given: value,
                            correct: correct.clone(),
                            matched,
                        }
                    })
                    .collect();
                ReviewDetail::FillBlank {
                    segments: blank_segments(text_with_blanks)
                        .into_iter()
                        .map(ReviewSegment::from)
                        .collect(),
                    blanks,
                }
            }
        }
    }
}

/// Read-only rendering model of a finished or previewed attempt.
#[derive(Debug, Clone)]
pub struct ReviewSheet {
    pub total: u32,
    pub max: u32,
    pub exercises: Vec<ExerciseReview>,
}

/// One exercise in the review sheet.
#[derive(Debug, Clone)]
pub struct ExerciseReview {
    pub exercise_id: String,
    pub instruction: String,
    pub outcome: Outcome,
    pub earned: u32,
    pub max: u32,
    pub detail: ReviewDetail,
}

/// Kind-specific correctness detail.
#[derive(Debug, Clone)]
pub enum ReviewDetail {
    MultipleChoice {
        question: String,
        options: Vec<OptionReview>,
    },
    FillBlank {
        segments: Vec<ReviewSegment>,
        blanks: Vec<BlankReview>,
    },
}

/// One option row: what was selected vs. what is correct.
#[derive(Debug, Clone)]
pub struct OptionReview {
    pub label: String,
    pub selected: bool,
    pub correct: bool,
}

/// One blank: the learner's value against the expected one.
#[derive(Debug, Clone)]
pub struct BlankReview {
    pub index: usize,
    pub given: String,
    pub correct: String,
    pub matched: bool,
}

/// Owned counterpart of [`BlankSegment`] for the rendering model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewSegment {
    Text(String),
    Blank(usize),
}

impl From<BlankSegment<'_>> for ReviewSegment {
    fn from(segment: BlankSegment<'_>) -> Self {
        match segment {
            BlankSegment::Text(text) => ReviewSegment::Text(text.to_string()),
            BlankSegment::Blank(index) => ReviewSegment::Blank(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssignmentKind, AssignmentStatus, GradeRecord, Group};
    use crate::store::{AssignmentStore, MemoryStore, RosterStore};
    use chrono::NaiveDate;

    fn interactive_assignment() -> Assignment {
        Assignment {
            id: "a1".into(),
            title: "Mixed Practice".into(),
            description: "Two questions.".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            course_id: "ENG-AI-GEN".into(),
            group_id: Some("g1".into()),
            status: AssignmentStatus::Pending,
            kind: AssignmentKind::Interactive,
            exercises: vec![
                Exercise {
                    id: "mc".into(),
                    instruction: "Choose one.".into(),
                    content: ExerciseContent::MultipleChoice {
                        question: "Pick".into(),
                        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                        correct_answer: "B".into(),
                    },
                    points: 10,
                },
                Exercise {
                    id: "fb".into(),
                    instruction: "Fill in.".into(),
                    content: ExerciseContent::FillBlank {
                        text_with_blanks: "{1} is {2}.".into(),
                        correct_answer: vec!["Paris".into(), "pretty".into()],
                    },
                    points: 10,
                },
            ],
            points: 20,
        }
    }

    fn student() -> User {
        User {
            id: "s1".into(),
            name: "Aziza".into(),
            email: "aziza@example.com".into(),
            phone_number: "1234".into(),
            role: UserRole::Student,
            level: Some("A2".into()),
            group_id: Some("g1".into()),
        }
    }

    fn teacher() -> User {
        User {
            id: "t1".into(),
            name: "Mr. Karimov".into(),
            email: "k@example.com".into(),
            phone_number: "5678".into(),
            role: UserRole::Teacher,
            level: None,
            group_id: None,
        }
    }

    /// Store that always fails writes, for the failure path.
    struct BrokenGradeStore;

    impl GradeStore for BrokenGradeStore {
        fn load_grades(&self) -> Result<Vec<GradeRecord>, StoreError> {
            Ok(vec![])
        }

        fn upsert_grade(&mut self, _: GradeRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn find_grade(&self, _: &str, _: &str) -> Result<Option<GradeRecord>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn fresh_student_session_starts_in_attempt() {
        let session = PlayerSession::open(interactive_assignment(), student(), None);
        assert_eq!(session.mode(), PlayerMode::Attempt);
        assert!(session.summary().is_none());
    }

    #[test]
    fn staff_preview_is_read_only_and_unanswered() {
        let mut session = PlayerSession::open(interactive_assignment(), teacher(), None);
        assert_eq!(session.mode(), PlayerMode::Review);
        let summary = session.summary().unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary
            .exercises
            .iter()
            .all(|score| score.outcome == Outcome::Unanswered));

        // No submit affordance for previews.
        let mut store = MemoryStore::new();
        assert!(matches!(
            session.submit(&mut store),
            Err(SubmitError::AlreadySubmitted)
        ));
        assert!(store.grades.is_empty());
    }

    #[test]
    fn answers_replace_and_sparse_fill() {
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);

        session.record_answer("mc", AnswerInput::Choice("A".into()));
        session.record_answer("mc", AnswerInput::Choice("B".into()));
        assert_eq!(session.answers().get("mc"), Some(&Answer::Choice("B".into())));

        // Writing blank 2 first grows the sequence with an empty slot.
        session.record_answer("fb", AnswerInput::Blank { index: 1, value: "ugly".into() });
        assert_eq!(
            session.answers().get("fb"),
            Some(&Answer::Blanks(vec![String::new(), "ugly".into()]))
        );
        session.record_answer("fb", AnswerInput::Blank { index: 0, value: "paris".into() });
        assert_eq!(
            session.answers().get("fb"),
            Some(&Answer::Blanks(vec!["paris".into(), "ugly".into()]))
        );
    }

    #[test]
    fn submit_persists_and_moves_to_review() {
        let mut store = MemoryStore::new();
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);
        session.record_answer("mc", AnswerInput::Choice("B".into()));
        session.record_answer("fb", AnswerInput::Blank { index: 0, value: "paris".into() });
        session.record_answer("fb", AnswerInput::Blank { index: 1, value: "ugly".into() });

        let summary = session.submit(&mut store).unwrap();
        assert_eq!(summary.total, 15);
        assert_eq!(session.mode(), PlayerMode::Review);

        let record = store.find_grade("s1", "a1").unwrap().unwrap();
        assert_eq!(record.score, 15);
        assert_eq!(record.max_score, 20);
        assert_eq!(record.student_name, "Aziza");
        assert_eq!(record.assignment_title, "Mixed Practice");
        assert_eq!(record.answers, *session.answers());

        // Inputs after review are dropped.
        session.record_answer("mc", AnswerInput::Choice("D".into()));
        assert_eq!(session.answers().get("mc"), Some(&Answer::Choice("B".into())));
    }

    #[test]
    fn second_submit_in_a_session_is_rejected() {
        let mut store = MemoryStore::new();
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);
        session.record_answer("mc", AnswerInput::Choice("B".into()));

        session.submit(&mut store).unwrap();
        assert!(matches!(
            session.submit(&mut store),
            Err(SubmitError::AlreadySubmitted)
        ));
        assert_eq!(store.grades.len(), 1);
    }

    #[test]
    fn resubmission_in_a_new_session_overwrites_the_record() {
        let mut store = MemoryStore::new();

        let mut first = PlayerSession::open(interactive_assignment(), student(), None);
        first.record_answer("mc", AnswerInput::Choice("A".into()));
        first.submit(&mut store).unwrap();

        let mut second = PlayerSession::open(interactive_assignment(), student(), None);
        second.record_answer("mc", AnswerInput::Choice("B".into()));
        second.record_answer("fb", AnswerInput::Blank { index: 0, value: "Paris".into() });
        second.record_answer("fb", AnswerInput::Blank { index: 1, value: "pretty".into() });
        second.submit(&mut store).unwrap();

        assert_eq!(store.grades.len(), 1);
        assert_eq!(store.find_grade("s1", "a1").unwrap().unwrap().score, 20);
    }

    #[test]
    fn store_failure_returns_session_to_attempt() {
        let mut broken = BrokenGradeStore;
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);
        session.record_answer("mc", AnswerInput::Choice("B".into()));

        assert!(matches!(
            session.submit(&mut broken),
            Err(SubmitError::Store(_))
        ));
        assert_eq!(session.mode(), PlayerMode::Attempt);

        // Manual retry against a healthy store succeeds.
        let mut store = MemoryStore::new();
        assert!(session.submit(&mut store).is_ok());
    }

    #[test]
    fn reopening_with_stored_answers_reproduces_the_score() {
        let mut store = MemoryStore::new();
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);
        session.record_answer("mc", AnswerInput::Choice("B".into()));
        session.record_answer("fb", AnswerInput::Blank { index: 0, value: " PARIS ".into() });
        let submitted = session.submit(&mut store).unwrap();

        let stored = store.find_grade("s1", "a1").unwrap().unwrap();
        let reopened = PlayerSession::open(
            interactive_assignment(),
            student(),
            Some(stored.answers.clone()),
        );
        assert_eq!(reopened.mode(), PlayerMode::Review);
        assert_eq!(reopened.summary().unwrap().total, submitted.total);
        assert_eq!(reopened.summary().unwrap(), &submitted);
    }

    #[test]
    fn review_sheet_marks_options_and_blanks() {
        let mut store = MemoryStore::new();
        let mut session = PlayerSession::open(interactive_assignment(), student(), None);
        session.record_answer("mc", AnswerInput::Choice("A".into()));
        session.record_answer("fb", AnswerInput::Blank { index: 0, value: "paris".into() });
        session.submit(&mut store).unwrap();

        let sheet = session.review_sheet().unwrap();
        assert_eq!(sheet.total, 5);
        assert_eq!(sheet.max, 20);

        let ReviewDetail::MultipleChoice { options, .. } = &sheet.exercises[0].detail else {
            panic!("expected a multiple-choice detail");
        };
        let selected: Vec<&str> = options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.label.as_str())
            .collect();
        let correct: Vec<&str> = options
            .iter()
            .filter(|option| option.correct)
            .map(|option| option.label.as_str())
            .collect();
        assert_eq!(selected, vec!["A"]);
        assert_eq!(correct, vec!["B"]);

        let ReviewDetail::FillBlank { blanks, segments } = &sheet.exercises[1].detail else {
            panic!("expected a fill-blank detail");
        };
        assert!(blanks[0].matched);
        assert!(!blanks[1].matched);
        assert_eq!(blanks[1].correct, "pretty");
        assert_eq!(segments[0], ReviewSegment::Blank(0));
    }

    #[test]
    fn review_sheet_absent_during_attempt() {
        let session = PlayerSession::open(interactive_assignment(), student(), None);
        assert!(session.review_sheet().is_none());
    }

    // Keep the trait objects honest: MemoryStore must satisfy every store
    // seam the player and surrounding flows use.
    #[test]
    fn memory_store_is_usable_through_all_traits() {
        let mut store = MemoryStore::new();
        store.groups.push(Group {
            id: "g1".into(),
            name: "Beginner A1".into(),
            level: "A1".into(),
            teacher_id: "t1".into(),
        });
        store.users.push(student());

        let _: &mut dyn GradeStore = &mut store;
        let _: &mut dyn AssignmentStore = &mut store;
        assert_eq!(store.load_groups().unwrap().len(), 1);
        assert_eq!(store.load_users().unwrap().len(), 1);
    }
}

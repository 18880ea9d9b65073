//! Storage traits for the persisted collections.
//!
//! The platform keeps four flat collections — assignments, grades, users,
//! groups — each read and written wholesale, never relationally. The traits
//! here are the seam between the core flows and whatever holds the data:
//! `linguist-store` provides the file-backed implementation, and
//! [`MemoryStore`] is the substitutable in-memory one used by tests.

use thiserror::Error;

use crate::model::{Assignment, GradeRecord, Group, User, UserRole};

/// Errors from reading or writing a persisted collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("collection encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Whether an assignment is visible to a viewer.
///
/// Students only see assignments targeted at their group, plus ungrouped
/// ones; staff see everything.
pub fn visible_to(assignment: &Assignment, viewer: &User) -> bool {
    match viewer.role {
        UserRole::Student => match &assignment.group_id {
            Some(group_id) => viewer.group_id.as_deref() == Some(group_id.as_str()),
            None => true,
        },
        UserRole::Teacher | UserRole::Admin => true,
    }
}

/// Read/append access to the assignment collection.
pub trait AssignmentStore {
    /// Assignments visible to the viewer, in stored order.
    fn load_assignments(&self, viewer: &User) -> Result<Vec<Assignment>, StoreError>;

    /// Append a newly published assignment. Published assignments are never
    /// edited in place or deleted.
    fn append_assignment(&mut self, assignment: Assignment) -> Result<(), StoreError>;
}

/// Access to the grade collection, keyed by (student, assignment).
pub trait GradeStore {
    fn load_grades(&self) -> Result<Vec<GradeRecord>, StoreError>;

    /// Insert the record, replacing any existing one for the same
    /// (student, assignment) pair. Overwrite, not append: resubmission
    /// keeps exactly one record.
    fn upsert_grade(&mut self, record: GradeRecord) -> Result<(), StoreError>;

    fn find_grade(
        &self,
        student_id: &str,
        assignment_id: &str,
    ) -> Result<Option<GradeRecord>, StoreError>;
}

/// Read access to the roster collections.
pub trait RosterStore {
    fn load_users(&self) -> Result<Vec<User>, StoreError>;
    fn load_groups(&self) -> Result<Vec<Group>, StoreError>;
}

/// In-memory store over plain vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub assignments: Vec<Assignment>,
    pub grades: Vec<GradeRecord>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentStore for MemoryStore {
    fn load_assignments(&self, viewer: &User) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .assignments
            .iter()
            .filter(|assignment| visible_to(assignment, viewer))
            .cloned()
            .collect())
    }

    fn append_assignment(&mut self, assignment: Assignment) -> Result<(), StoreError> {
        self.assignments.push(assignment);
        Ok(())
    }
}

impl GradeStore for MemoryStore {
    fn load_grades(&self) -> Result<Vec<GradeRecord>, StoreError> {
        Ok(self.grades.clone())
    }

    fn upsert_grade(&mut self, record: GradeRecord) -> Result<(), StoreError> {
        match self.grades.iter_mut().find(|existing| {
            existing.student_id == record.student_id
                && existing.assignment_id == record.assignment_id
        }) {
            Some(existing) => *existing = record,
            None => self.grades.push(record),
        }
        Ok(())
    }

    fn find_grade(
        &self,
        student_id: &str,
        assignment_id: &str,
    ) -> Result<Option<GradeRecord>, StoreError> {
        Ok(self
            .grades
            .iter()
            .find(|grade| grade.student_id == student_id && grade.assignment_id == assignment_id)
            .cloned())
    }
}

impl RosterStore for MemoryStore {
    fn load_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.clone())
    }

    fn load_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.groups.clone())
    }
}

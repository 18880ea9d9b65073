//! Grade roll-ups for the gradebook and assignment-list views.
//!
//! Pure functions over loaded collections; the views render whatever these
//! return. Students see their own records, staff see everything.

use serde::Serialize;

use crate::model::{
    derive_status, Assignment, AssignmentStatus, GradeRecord, User, UserRole,
};

/// Aggregate numbers for the gradebook header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradebookSummary {
    pub total_earned: u32,
    pub total_possible: u32,
    /// Earned over possible, rounded to the nearest whole percent; zero
    /// when nothing has been graded yet.
    pub percentage: u32,
    pub submissions: usize,
}

/// Grade records the viewer is allowed to see.
pub fn grades_for_viewer(grades: &[GradeRecord], viewer: &User) -> Vec<GradeRecord> {
    match viewer.role {
        UserRole::Student => grades
            .iter()
            .filter(|grade| grade.student_id == viewer.id)
            .cloned()
            .collect(),
        UserRole::Teacher | UserRole::Admin => grades.to_vec(),
    }
}

/// Roll a set of grade records up into header numbers.
pub fn summarize(grades: &[GradeRecord]) -> GradebookSummary {
    let total_earned: u32 = grades.iter().map(|grade| grade.score).sum();
    let total_possible: u32 = grades.iter().map(|grade| grade.max_score).sum();
    let percentage = if total_possible > 0 {
        ((total_earned as f64 / total_possible as f64) * 100.0).round() as u32
    } else {
        0
    };

    GradebookSummary {
        total_earned,
        total_possible,
        percentage,
        submissions: grades.len(),
    }
}

/// An assignment-list row: the stored record plus the status and score the
/// viewer should see.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRow {
    pub assignment: Assignment,
    pub status: AssignmentStatus,
    /// The viewer's own score, present only for graded students.
    pub score: Option<u32>,
}

/// Overlay per-viewer status onto an assignment list.
///
/// For a student, an assignment shows GRADED with their score as soon as a
/// matching grade record exists; the stored status is never mutated. Staff
/// rows pass through unchanged.
pub fn assignment_rows(
    assignments: Vec<Assignment>,
    grades: &[GradeRecord],
    viewer: &User,
) -> Vec<AssignmentRow> {
    assignments
        .into_iter()
        .map(|assignment| {
            let grade = if viewer.role == UserRole::Student {
                grades.iter().find(|grade| {
                    grade.assignment_id == assignment.id && grade.student_id == viewer.id
                })
            } else {
                None
            };

            AssignmentRow {
                status: derive_status(&assignment, grade),
                score: grade.map(|grade| grade.score),
                assignment,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSet, AssignmentKind};
    use chrono::{NaiveDate, Utc};

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            phone_number: "0".into(),
            role,
            level: None,
            group_id: None,
        }
    }

    fn grade(student_id: &str, assignment_id: &str, score: u32, max: u32) -> GradeRecord {
        GradeRecord {
            id: format!("g-{student_id}-{assignment_id}"),
            student_id: student_id.into(),
            student_name: student_id.to_uppercase(),
            assignment_id: assignment_id.into(),
            assignment_title: "T".into(),
            score,
            max_score: max,
            date: Utc::now(),
            answers: AnswerSet::new(),
        }
    }

    fn assignment(id: &str) -> Assignment {
        Assignment {
            id: id.into(),
            title: format!("Assignment {id}"),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            course_id: "ENG-101".into(),
            group_id: None,
            status: AssignmentStatus::Pending,
            kind: AssignmentKind::Legacy,
            exercises: vec![],
            points: 100,
        }
    }

    #[test]
    fn students_see_only_their_own_grades() {
        let grades = vec![grade("s1", "a1", 85, 100), grade("s2", "a1", 48, 50)];

        let mine = grades_for_viewer(&grades, &user("s1", UserRole::Student));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].student_id, "s1");

        let all = grades_for_viewer(&grades, &user("t1", UserRole::Teacher));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn summary_math() {
        let grades = vec![grade("s1", "a1", 85, 100), grade("s1", "a2", 48, 50)];
        let summary = summarize(&grades);
        assert_eq!(summary.total_earned, 133);
        assert_eq!(summary.total_possible, 150);
        assert_eq!(summary.percentage, 89); // 88.67 rounds up
        assert_eq!(summary.submissions, 2);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(
            summarize(&[]),
            GradebookSummary {
                total_earned: 0,
                total_possible: 0,
                percentage: 0,
                submissions: 0,
            }
        );
    }

    #[test]
    fn rows_overlay_graded_status_for_the_student() {
        let grades = vec![grade("s1", "a1", 85, 100)];
        let rows = assignment_rows(
            vec![assignment("a1"), assignment("a2")],
            &grades,
            &user("s1", UserRole::Student),
        );

        assert_eq!(rows[0].status, AssignmentStatus::Graded);
        assert_eq!(rows[0].score, Some(85));
        assert_eq!(rows[1].status, AssignmentStatus::Pending);
        assert_eq!(rows[1].score, None);
    }

    #[test]
    fn rows_for_staff_pass_through_stored_status() {
        let grades = vec![grade("s1", "a1", 85, 100)];
        let rows = assignment_rows(vec![assignment("a1")], &grades, &user("t1", UserRole::Teacher));
        assert_eq!(rows[0].status, AssignmentStatus::Pending);
        assert_eq!(rows[0].score, None);
    }
}

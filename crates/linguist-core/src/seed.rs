//! Built-in demo roster and starter assignments.
//!
//! Used to bootstrap an empty data directory so a fresh install has
//! accounts to log in with and content on the dashboard. Ids here are
//! stable on purpose: the demo grade records reference them.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    AnswerSet, Assignment, AssignmentKind, AssignmentStatus, GradeRecord, Group, User, UserRole,
};

fn date(value: &str) -> NaiveDate {
    value.parse().expect("seed date literal")
}

fn timestamp(value: &str) -> DateTime<Utc> {
    value.parse().expect("seed timestamp literal")
}

/// Default accounts: one admin, one teacher, one student in the demo group.
pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: "u-admin".into(),
            name: "Administrator".into(),
            email: "admin@studylink.example".into(),
            phone_number: "0000".into(),
            role: UserRole::Admin,
            level: None,
            group_id: None,
        },
        User {
            id: "u-teacher".into(),
            name: "Dilnoza Karimova".into(),
            email: "dilnoza@studylink.example".into(),
            phone_number: "5555".into(),
            role: UserRole::Teacher,
            level: None,
            group_id: None,
        },
        User {
            id: "u-student".into(),
            name: "Aziz Rahimov".into(),
            email: "aziz@studylink.example".into(),
            phone_number: "1234".into(),
            role: UserRole::Student,
            level: Some("B1".into()),
            group_id: Some("grp-b1".into()),
        },
    ]
}

/// The single demo cohort.
pub fn default_groups() -> Vec<Group> {
    vec![Group {
        id: "grp-b1".into(),
        name: "Intermediate B1".into(),
        level: "B1".into(),
        teacher_id: "u-teacher".into(),
    }]
}

/// Legacy worksheet-style assignments shown on a fresh install.
pub fn legacy_assignments() -> Vec<Assignment> {
    vec![
        Assignment {
            id: "a-passive-voice".into(),
            title: "The Passive Voice Essay".into(),
            description: "Write a 500-word essay about the history of the industrial \
                          revolution using passive voice where appropriate."
                .into(),
            due_date: date("2024-06-20"),
            course_id: "ENG-302".into(),
            group_id: None,
            status: AssignmentStatus::Pending,
            kind: AssignmentKind::Legacy,
            exercises: vec![],
            points: 100,
        },
        Assignment {
            id: "a-idioms-quiz".into(),
            title: "Idioms and Phrasal Verbs Quiz".into(),
            description: "A 20-question quiz covering common business idioms.".into(),
            due_date: date("2024-06-22"),
            course_id: "ENG-101".into(),
            group_id: None,
            status: AssignmentStatus::Submitted,
            kind: AssignmentKind::Legacy,
            exercises: vec![],
            points: 50,
        },
        Assignment {
            id: "a-present-perfect".into(),
            title: "Present Perfect vs Past Simple".into(),
            description: "Complete the worksheet provided in the course materials.".into(),
            due_date: date("2024-06-15"),
            course_id: "ENG-205".into(),
            group_id: None,
            status: AssignmentStatus::Pending,
            kind: AssignmentKind::Legacy,
            exercises: vec![],
            points: 100,
        },
    ]
}

/// Demo grade history for the seed student.
pub fn demo_grades() -> Vec<GradeRecord> {
    vec![
        GradeRecord {
            id: "gr-present-perfect".into(),
            student_id: "u-student".into(),
            student_name: "Aziz Rahimov".into(),
            assignment_id: "a-present-perfect".into(),
            assignment_title: "Present Perfect vs Past Simple".into(),
            score: 85,
            max_score: 100,
            date: timestamp("2024-05-15T09:00:00Z"),
            answers: AnswerSet::new(),
        },
        GradeRecord {
            id: "gr-vocab-test".into(),
            student_id: "u-student".into(),
            student_name: "Aziz Rahimov".into(),
            assignment_id: "a-vocab-test".into(),
            assignment_title: "Unit 1 Vocab Test".into(),
            score: 48,
            max_score: 50,
            date: timestamp("2024-05-20T09:00:00Z"),
            answers: AnswerSet::new(),
        },
    ]
}

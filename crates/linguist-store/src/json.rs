//! File-backed JSON collections.
//!
//! One file per collection, each holding a flat JSON array that is read and
//! written wholesale. A missing file reads as an empty collection; writes
//! are pretty-printed so the data directory stays hand-inspectable.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use linguist_core::model::{Assignment, GradeRecord, Group, User};
use linguist_core::seed;
use linguist_core::store::{
    visible_to, AssignmentStore, GradeStore, RosterStore, StoreError,
};

const ASSIGNMENTS_FILE: &str = "assignments.json";
const GRADES_FILE: &str = "grades.json";
const USERS_FILE: &str = "users.json";
const GROUPS_FILE: &str = "groups.json";

/// Store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store, creating the data directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the built-in roster and starter assignments into any collection
    /// that does not exist yet. Existing files are left untouched, so this
    /// is safe to call on every startup.
    pub fn seed_if_empty(&mut self) -> Result<(), StoreError> {
        if !self.dir.join(USERS_FILE).exists() {
            self.write_collection(USERS_FILE, &seed::default_users())?;
        }
        if !self.dir.join(GROUPS_FILE).exists() {
            self.write_collection(GROUPS_FILE, &seed::default_groups())?;
        }
        if !self.dir.join(ASSIGNMENTS_FILE).exists() {
            self.write_collection(ASSIGNMENTS_FILE, &seed::legacy_assignments())?;
        }
        if !self.dir.join(GRADES_FILE).exists() {
            self.write_collection(GRADES_FILE, &seed::demo_grades())?;
        }
        tracing::debug!(dir = %self.dir.display(), "store ready");
        Ok(())
    }

    fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_collection<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(self.dir.join(file), json)?;
        Ok(())
    }
}

impl AssignmentStore for JsonStore {
    fn load_assignments(&self, viewer: &User) -> Result<Vec<Assignment>, StoreError> {
        let assignments: Vec<Assignment> = self.read_collection(ASSIGNMENTS_FILE)?;
        Ok(assignments
            .into_iter()
            .filter(|assignment| visible_to(assignment, viewer))
            .collect())
    }

    fn append_assignment(&mut self, assignment: Assignment) -> Result<(), StoreError> {
        let mut assignments: Vec<Assignment> = self.read_collection(ASSIGNMENTS_FILE)?;
        assignments.push(assignment);
        self.write_collection(ASSIGNMENTS_FILE, &assignments)
    }
}

impl GradeStore for JsonStore {
    fn load_grades(&self) -> Result<Vec<GradeRecord>, StoreError> {
        self.read_collection(GRADES_FILE)
    }

    fn upsert_grade(&mut self, record: GradeRecord) -> Result<(), StoreError> {
        let mut grades: Vec<GradeRecord> = self.read_collection(GRADES_FILE)?;
        match grades.iter_mut().find(|existing| {
            existing.student_id == record.student_id
                && existing.assignment_id == record.assignment_id
        }) {
            Some(existing) => *existing = record,
            None => grades.push(record),
        }
        self.write_collection(GRADES_FILE, &grades)
    }

    fn find_grade(
        &self,
        student_id: &str,
        assignment_id: &str,
    ) -> Result<Option<GradeRecord>, StoreError> {
        let grades: Vec<GradeRecord> = self.read_collection(GRADES_FILE)?;
        Ok(grades
            .into_iter()
            .find(|grade| grade.student_id == student_id && grade.assignment_id == assignment_id))
    }
}

impl RosterStore for JsonStore {
    fn load_users(&self) -> Result<Vec<User>, StoreError> {
        self.read_collection(USERS_FILE)
    }

    fn load_groups(&self) -> Result<Vec<Group>, StoreError> {
        self.read_collection(GROUPS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linguist_core::model::{
        AnswerSet, AssignmentKind, AssignmentStatus, UserRole,
    };

    fn student(group_id: Option<&str>) -> User {
        User {
            id: "s1".into(),
            name: "Student".into(),
            email: "s@example.com".into(),
            phone_number: "1234".into(),
            role: UserRole::Student,
            level: None,
            group_id: group_id.map(str::to_string),
        }
    }

    fn teacher() -> User {
        User {
            id: "t1".into(),
            name: "Teacher".into(),
            email: "t@example.com".into(),
            phone_number: "5678".into(),
            role: UserRole::Teacher,
            level: None,
            group_id: None,
        }
    }

    fn assignment(id: &str, group_id: Option<&str>) -> Assignment {
        Assignment {
            id: id.into(),
            title: format!("Assignment {id}"),
            description: String::new(),
            due_date: "2024-06-20".parse().unwrap(),
            course_id: "ENG-101".into(),
            group_id: group_id.map(str::to_string),
            status: AssignmentStatus::Pending,
            kind: AssignmentKind::Legacy,
            exercises: vec![],
            points: 10,
        }
    }

    fn grade(student_id: &str, assignment_id: &str, score: u32) -> GradeRecord {
        GradeRecord {
            id: format!("g-{student_id}-{assignment_id}-{score}"),
            student_id: student_id.into(),
            student_name: "Student".into(),
            assignment_id: assignment_id.into(),
            assignment_title: "T".into(),
            score,
            max_score: 10,
            date: Utc::now(),
            answers: AnswerSet::new(),
        }
    }

    #[test]
    fn empty_directory_reads_as_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();

        assert!(store.load_assignments(&teacher()).unwrap().is_empty());
        assert!(store.load_grades().unwrap().is_empty());
        assert!(store.load_users().unwrap().is_empty());
        assert!(store.load_groups().unwrap().is_empty());
    }

    #[test]
    fn append_then_reload_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        store.append_assignment(assignment("a1", Some("g1"))).unwrap();
        store.append_assignment(assignment("a2", None)).unwrap();

        // A second handle over the same directory sees the same data.
        let reopened = JsonStore::open(dir.path()).unwrap();
        let all = reopened.load_assignments(&teacher()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a1");
    }

    #[test]
    fn student_visibility_filter_applies_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        store.append_assignment(assignment("a1", Some("g1"))).unwrap();
        store.append_assignment(assignment("a2", Some("g2"))).unwrap();
        store.append_assignment(assignment("a3", None)).unwrap();

        let visible = store.load_assignments(&student(Some("g1"))).unwrap();
        let ids: Vec<&str> = visible.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn upsert_grade_overwrites_on_key_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        store.upsert_grade(grade("s1", "a1", 4)).unwrap();
        store.upsert_grade(grade("s1", "a1", 9)).unwrap();
        store.upsert_grade(grade("s1", "a2", 7)).unwrap();

        let grades = store.load_grades().unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(store.find_grade("s1", "a1").unwrap().unwrap().score, 9);
    }

    #[test]
    fn seed_if_empty_is_idempotent_and_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        store.seed_if_empty().unwrap();
        let users = store.load_users().unwrap();
        assert!(!users.is_empty());
        assert!(!store.load_assignments(&teacher()).unwrap().is_empty());

        // New data survives a second seeding pass.
        store.append_assignment(assignment("a-new", None)).unwrap();
        store.seed_if_empty().unwrap();
        assert!(store
            .load_assignments(&teacher())
            .unwrap()
            .iter()
            .any(|a| a.id == "a-new"));
        assert_eq!(store.load_users().unwrap().len(), users.len());
    }

    #[test]
    fn corrupt_collection_surfaces_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join(GRADES_FILE), "{not json").unwrap();

        assert!(matches!(
            store.load_grades(),
            Err(StoreError::Encoding(_))
        ));
    }
}

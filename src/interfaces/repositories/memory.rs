use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    domain::grading::Grade,
    entities::{
        query::{ListParams, StudentFilter},
        stats::{AverageMarks, GradeCount},
        student::{Student, StudentInsert},
    },
    errors::AppError,
    repositories::student::StudentRepository,
};

/// Process-local store with the same uniqueness and query semantics as the
/// Postgres adapter. Each write runs under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryStudentRepo {
    students: Arc<RwLock<HashMap<Uuid, Student>>>,
}

impl InMemoryStudentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record count. Used by the integration tests to inspect the store
    /// behind a running server.
    pub fn len(&self) -> usize {
        self.students.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.read().is_empty()
    }
}

/// The unique field `candidate` would collide on, ignoring the record itself.
fn duplicate_of(
    students: &HashMap<Uuid, Student>,
    candidate: &StudentInsert,
    exclude: Option<&Uuid>,
) -> Option<&'static str> {
    let others = students.values().filter(|s| Some(&s.id) != exclude);

    if others.clone().any(|s| s.student_id == candidate.student_id) {
        Some("studentId")
    } else if others.clone().any(|s| s.email == candidate.email) {
        Some("email")
    } else {
        None
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(values.sum::<f64>() / count as f64)
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_student(&self, student: &StudentInsert) -> Result<Student, AppError> {
        let mut students = self.students.write();

        if let Some(field) = duplicate_of(&students, student, None) {
            return Err(AppError::AlreadyExists(field.to_string()));
        }

        let created = Student::from_insert(Uuid::new_v4(), student, Utc::now());
        students.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_student_by_id(&self, id: &Uuid) -> Result<Option<Student>, AppError> {
        Ok(self.students.read().get(id).cloned())
    }

    async fn update_student(&self, id: &Uuid, student: &StudentInsert) -> Result<Student, AppError> {
        let mut students = self.students.write();

        if !students.contains_key(id) {
            return Err(AppError::NotFound("Student not found".into()));
        }
        if let Some(field) = duplicate_of(&students, student, Some(id)) {
            return Err(AppError::AlreadyExists(field.to_string()));
        }

        let existing = students
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
        existing.apply_update(student, Utc::now());

        Ok(existing.clone())
    }

    async fn delete_student(&self, id: &Uuid) -> Result<(), AppError> {
        match self.students.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Student not found".into())),
        }
    }

    async fn find_students(&self, params: &ListParams) -> Result<Vec<Student>, AppError> {
        let students = self.students.read();

        let mut matching: Vec<&Student> = students
            .values()
            .filter(|s| params.filter.matches(s))
            .collect();

        matching.sort_by(|a, b| {
            params
                .sort_order
                .apply(params.sort_field.compare(a, b))
                .then_with(|| a.id.cmp(&b.id))
        });

        let skip = usize::try_from(params.offset()).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(params.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_students(&self, filter: &StudentFilter) -> Result<i64, AppError> {
        let count = self
            .students
            .read()
            .values()
            .filter(|s| filter.matches(s))
            .count();

        Ok(count as i64)
    }

    async fn grade_distribution(&self) -> Result<Vec<GradeCount>, AppError> {
        let mut counts: HashMap<Grade, i64> = HashMap::new();
        for student in self.students.read().values() {
            *counts.entry(student.grade).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(grade, count)| GradeCount { grade, count })
            .collect())
    }

    async fn average_marks(&self) -> Result<AverageMarks, AppError> {
        let students = self.students.read();
        let n = students.len();
        let all = || students.values();

        Ok(AverageMarks {
            avg_english: mean(all().map(|s| f64::from(s.marks.english)), n),
            avg_maths: mean(all().map(|s| f64::from(s.marks.maths)), n),
            avg_science: mean(all().map(|s| f64::from(s.marks.science)), n),
            avg_total: mean(all().map(|s| f64::from(s.total_marks)), n),
            avg_percentage: mean(all().map(|s| s.percentage), n),
        })
    }
}

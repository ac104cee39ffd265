use validator::Validate;

use crate::{
    domain::grading::derive_scores,
    entities::{
        query::{ListParams, ListStudentsQuery, QueryDefaults, StudentFilter},
        stats::StudentStats,
        student::{DeleteStudentResponse, Student, StudentInsert, StudentListResponse, StudentRequest},
    },
    errors::AppError,
    repositories::student::StudentRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct StudentHandler<R>
where
    R: StudentRepository,
{
    pub student_repo: R,
    query_defaults: QueryDefaults,
}

impl<R> StudentHandler<R>
where
    R: StudentRepository,
{
    pub fn new(student_repo: R, query_defaults: QueryDefaults) -> Self {
        StudentHandler { student_repo, query_defaults }
    }

    /// Normalises and validates a submission, then computes its derived
    /// scores. Every write goes through here.
    fn prepare_write(request: StudentRequest) -> Result<StudentInsert, AppError> {
        let request = request.normalized();
        request.validate()?;

        let scores = derive_scores(&request.marks);
        Ok(StudentInsert::new(request, scores))
    }

    /// Searches, sorts and paginates the collection
    pub async fn list_students(&self, query: &ListStudentsQuery) -> Result<StudentListResponse, AppError> {
        let params = ListParams::resolve(query, &self.query_defaults)?;

        let total = self.student_repo.count_students(&params.filter).await?;
        let students = self.student_repo.find_students(&params).await?;

        Ok(StudentListResponse {
            students,
            total_pages: params.total_pages(total),
            current_page: i64::from(params.page),
            total,
        })
    }

    /// Retrieves a student by record id
    pub async fn get_student(&self, id: &str) -> Result<Student, AppError> {
        let valid_id = valid_uuid(id)?;

        self.student_repo
            .get_student_by_id(&valid_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    /// Creates a student, computing total, percentage and grade
    pub async fn create_student(&self, request: StudentRequest) -> Result<Student, AppError> {
        let insert = Self::prepare_write(request)?;

        let student = self.student_repo.create_student(&insert).await?;
        tracing::info!(id = %student.id, student_id = %student.student_id, "Student created");

        Ok(student)
    }

    /// Replaces a student record and recomputes its derived fields
    pub async fn update_student(&self, id: &str, request: StudentRequest) -> Result<Student, AppError> {
        let valid_id = valid_uuid(id)?;
        let insert = Self::prepare_write(request)?;

        let student = self.student_repo
            .update_student(&valid_id, &insert)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Student not found".to_string()),
                _ => e,
            })?;
        tracing::info!(id = %student.id, "Student updated");

        Ok(student)
    }

    /// Deletes a student by record id
    pub async fn delete_student(&self, id: &str) -> Result<DeleteStudentResponse, AppError> {
        let valid_id = valid_uuid(id)?;

        self.student_repo.delete_student(&valid_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("Student not found".to_string()),
            _ => e,
        })?;
        tracing::info!(id = %valid_id, "Student deleted");

        Ok(DeleteStudentResponse {
            message: "Student deleted successfully".to_string(),
        })
    }

    /// Grade histogram and subject averages over every student
    pub async fn student_stats(&self) -> Result<StudentStats, AppError> {
        let total_students = self.student_repo.count_students(&StudentFilter::all()).await?;
        let grade_distribution = self.student_repo.grade_distribution().await?;
        let average_marks = self.student_repo.average_marks().await?;

        Ok(StudentStats::new(total_students, grade_distribution, average_marks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Utc};
    use mockall::predicate::*;
    use uuid::Uuid;

    use crate::{
        domain::grading::Grade,
        entities::{
            query::SortField,
            stats::{AverageMarks, GradeCount},
            student::{Address, Marks},
        },
        repositories::student::MockStudentRepository,
    };

    fn request(student_id: &str, marks: Marks) -> StudentRequest {
        let year = Utc::now().date_naive().year() - 16;
        StudentRequest {
            student_id: student_id.to_string(),
            name: "Grace Hopper".into(),
            email: "Grace@Navy.MIL ".into(),
            phone: "+12025550147".into(),
            date_of_birth: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            address: Address {
                street: "1 Compiler Road".into(),
                city: "Arlington".into(),
                state: "Virginia".into(),
                zip_code: "22201".into(),
            },
            marks,
            enrollment_date: None,
        }
    }

    fn stored(insert: &StudentInsert) -> Student {
        Student::from_insert(Uuid::new_v4(), insert, Utc::now())
    }

    #[tokio::test]
    async fn create_computes_derived_fields_before_writing() {
        let mut repo = MockStudentRepository::new();
        repo.expect_create_student()
            .withf(|insert| {
                insert.total_marks == 210
                    && insert.percentage == 70.0
                    && insert.grade == Grade::BPlus
                    && insert.email == "grace@navy.mil"
            })
            .times(1)
            .returning(|insert| Ok(stored(insert)));

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let student = handler
            .create_student(request("STU100", Marks { english: 80, maths: 70, science: 60 }))
            .await
            .unwrap();

        assert_eq!(student.total_marks, 210);
        assert_eq!(student.grade, Grade::BPlus);
    }

    #[tokio::test]
    async fn invalid_submissions_never_reach_the_store() {
        let mut repo = MockStudentRepository::new();
        repo.expect_create_student().never();

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let err = handler
            .create_student(request("S1", Marks { english: 80, maths: 170, science: 60 }))
            .await
            .unwrap_err();

        let AppError::ValidationError(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["marks.maths", "studentId"]);
    }

    #[tokio::test]
    async fn duplicate_student_id_surfaces_as_field_conflict() {
        let mut repo = MockStudentRepository::new();
        repo.expect_create_student()
            .returning(|_| Err(AppError::AlreadyExists("studentId".into())));

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let err = handler
            .create_student(request("STU100", Marks { english: 1, maths: 2, science: 3 }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyExists(ref field) if field == "studentId"));
    }

    #[tokio::test]
    async fn update_recomputes_grade() {
        let id = Uuid::new_v4();
        let mut repo = MockStudentRepository::new();
        repo.expect_update_student()
            .with(eq(id), always())
            .times(1)
            .returning(|id, insert| {
                let mut student = stored(insert);
                student.id = *id;
                Ok(student)
            });

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let student = handler
            .update_student(&id.to_string(), request("STU100", Marks { english: 90, maths: 90, science: 89 }))
            .await
            .unwrap();

        assert_eq!(student.id, id);
        assert_eq!(student.percentage, 89.67);
        assert_eq!(student.grade, Grade::A);
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_lookup() {
        let mut repo = MockStudentRepository::new();
        repo.expect_get_student_by_id().never();
        repo.expect_delete_student().never();

        let handler = StudentHandler::new(repo, QueryDefaults::default());

        assert!(matches!(handler.get_student("not-a-uuid").await, Err(AppError::InvalidInput(_))));
        assert!(matches!(handler.delete_student("42").await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn missing_students_are_not_found() {
        let mut repo = MockStudentRepository::new();
        repo.expect_get_student_by_id().returning(|_| Ok(None));
        repo.expect_delete_student()
            .returning(|_| Err(AppError::NotFound("Record not found".into())));

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let id = Uuid::new_v4().to_string();

        assert!(matches!(handler.get_student(&id).await, Err(AppError::NotFound(_))));
        match handler.delete_student(&id).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Student not found"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.message)),
        }
    }

    #[tokio::test]
    async fn listing_uses_configured_defaults_and_filtered_count() {
        let defaults = QueryDefaults {
            sort_field: SortField::TotalMarks,
            page_size: 10,
            max_page_size: 100,
        };

        let mut repo = MockStudentRepository::new();
        repo.expect_count_students()
            .withf(|filter| filter.search() == Some("kochi"))
            .returning(|_| Ok(25));
        repo.expect_find_students()
            .withf(|params| params.sort_field == SortField::TotalMarks && params.page == 3 && params.limit == 10)
            .returning(|_| Ok(Vec::new()));

        let handler = StudentHandler::new(repo, defaults);
        let query = ListStudentsQuery {
            search: Some(" kochi ".into()),
            page: Some("3".into()),
            ..Default::default()
        };
        let page = handler.list_students(&query).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
    }

    #[tokio::test]
    async fn stats_on_empty_collection() {
        let mut repo = MockStudentRepository::new();
        repo.expect_count_students().returning(|_| Ok(0));
        repo.expect_grade_distribution().returning(|| Ok(Vec::new()));
        repo.expect_average_marks().returning(|| Ok(AverageMarks::default()));

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let stats = handler.student_stats().await.unwrap();

        assert_eq!(stats.total_students, 0);
        assert!(stats.grade_distribution.is_empty());
        assert_eq!(stats.average_marks.or_zero().avg_english, Some(0.0));
    }

    #[tokio::test]
    async fn stats_sort_the_histogram() {
        let mut repo = MockStudentRepository::new();
        repo.expect_count_students().returning(|_| Ok(3));
        repo.expect_grade_distribution().returning(|| {
            Ok(vec![
                GradeCount { grade: Grade::C, count: 1 },
                GradeCount { grade: Grade::APlus, count: 1 },
                GradeCount { grade: Grade::A, count: 1 },
            ])
        });
        repo.expect_average_marks().returning(|| Ok(AverageMarks::default()));

        let handler = StudentHandler::new(repo, QueryDefaults::default());
        let stats = handler.student_stats().await.unwrap();

        let grades: Vec<_> = stats.grade_distribution.iter().map(|g| g.grade).collect();
        assert_eq!(grades, vec![Grade::A, Grade::APlus, Grade::C]);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    domain::grading::Grade,
    entities::{
        query::{ListParams, StudentFilter},
        stats::{AverageMarks, GradeCount},
        student::{Student, StudentInsert, StudentRow},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxStudentRepo,
};

/// Persistence seam for student records.
///
/// Implementations enforce uniqueness of `student_id` and `email` and report
/// a violation as [`AppError::AlreadyExists`] naming the API field.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn create_student(&self, student: &StudentInsert) -> Result<Student, AppError>;
    async fn get_student_by_id(&self, id: &Uuid) -> Result<Option<Student>, AppError>;

    /// Replaces the record. Fails with `NotFound` if the id is unknown.
    async fn update_student(&self, id: &Uuid, student: &StudentInsert) -> Result<Student, AppError>;

    /// Removes the record. Fails with `NotFound` if the id is unknown.
    async fn delete_student(&self, id: &Uuid) -> Result<(), AppError>;

    async fn find_students(&self, params: &ListParams) -> Result<Vec<Student>, AppError>;
    async fn count_students(&self, filter: &StudentFilter) -> Result<i64, AppError>;
    async fn grade_distribution(&self) -> Result<Vec<GradeCount>, AppError>;
    async fn average_marks(&self) -> Result<AverageMarks, AppError>;
}

pub type SharedStudentRepo = Arc<dyn StudentRepository>;

#[async_trait]
impl<R> StudentRepository for Arc<R>
where
    R: StudentRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn create_student(&self, student: &StudentInsert) -> Result<Student, AppError> {
        (**self).create_student(student).await
    }

    async fn get_student_by_id(&self, id: &Uuid) -> Result<Option<Student>, AppError> {
        (**self).get_student_by_id(id).await
    }

    async fn update_student(&self, id: &Uuid, student: &StudentInsert) -> Result<Student, AppError> {
        (**self).update_student(id, student).await
    }

    async fn delete_student(&self, id: &Uuid) -> Result<(), AppError> {
        (**self).delete_student(id).await
    }

    async fn find_students(&self, params: &ListParams) -> Result<Vec<Student>, AppError> {
        (**self).find_students(params).await
    }

    async fn count_students(&self, filter: &StudentFilter) -> Result<i64, AppError> {
        (**self).count_students(filter).await
    }

    async fn grade_distribution(&self) -> Result<Vec<GradeCount>, AppError> {
        (**self).grade_distribution().await
    }

    async fn average_marks(&self) -> Result<AverageMarks, AppError> {
        (**self).average_marks().await
    }
}

impl SqlxStudentRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxStudentRepo { pool }
    }
}

/// Escapes `LIKE` metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, filter: &StudentFilter) {
    if let Some(term) = filter.search() {
        let pattern = format!("%{}%", escape_like(term));

        builder.push(" WHERE (name ILIKE ").push_bind(pattern.clone());
        builder.push(" OR student_id ILIKE ").push_bind(pattern.clone());
        builder.push(" OR email ILIKE ").push_bind(pattern.clone());
        builder.push(" OR city ILIKE ").push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl StudentRepository for SqlxStudentRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn create_student(&self, student: &StudentInsert) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (
                student_id, name, email, phone, date_of_birth,
                street, city, state, zip_code,
                english, maths, science,
                total_marks, percentage, grade, enrollment_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, COALESCE($16, NOW()))
            RETURNING *
            "#
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.date_of_birth)
        .bind(&student.address.street)
        .bind(&student.address.city)
        .bind(&student.address.state)
        .bind(&student.address.zip_code)
        .bind(student.marks.english)
        .bind(student.marks.maths)
        .bind(student.marks.science)
        .bind(student.total_marks)
        .bind(student.percentage)
        .bind(student.grade.as_str())
        .bind(student.enrollment_date)
        .fetch_one(&self.pool)
        .await?;

        Student::try_from(row)
    }

    async fn get_student_by_id(&self, id: &Uuid) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Student::try_from).transpose()
    }

    async fn update_student(&self, id: &Uuid, student: &StudentInsert) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            UPDATE students SET
                student_id = $1,
                name = $2,
                email = $3,
                phone = $4,
                date_of_birth = $5,
                street = $6,
                city = $7,
                state = $8,
                zip_code = $9,
                english = $10,
                maths = $11,
                science = $12,
                total_marks = $13,
                percentage = $14,
                grade = $15,
                enrollment_date = COALESCE($16, enrollment_date),
                updated_at = NOW()
            WHERE id = $17
            RETURNING *
            "#
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.date_of_birth)
        .bind(&student.address.street)
        .bind(&student.address.city)
        .bind(&student.address.state)
        .bind(&student.address.zip_code)
        .bind(student.marks.english)
        .bind(student.marks.maths)
        .bind(student.marks.science)
        .bind(student.total_marks)
        .bind(student.percentage)
        .bind(student.grade.as_str())
        .bind(student.enrollment_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

        Student::try_from(row)
    }

    async fn delete_student(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Student not found".into()));
        }

        Ok(())
    }

    async fn find_students(&self, params: &ListParams) -> Result<Vec<Student>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM students");
        push_search(&mut builder, &params.filter);

        builder
            .push(" ORDER BY ")
            .push(params.sort_field.column())
            .push(" ")
            .push(params.sort_order.keyword())
            .push(", id ASC");
        builder.push(" LIMIT ").push_bind(i64::from(params.limit));
        builder.push(" OFFSET ").push_bind(params.offset());

        let rows: Vec<StudentRow> = builder
            .build_query_as::<StudentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Student::try_from).collect()
    }

    async fn count_students(&self, filter: &StudentFilter) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM students");
        push_search(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn grade_distribution(&self) -> Result<Vec<GradeCount>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT grade, COUNT(*) FROM students GROUP BY grade"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(grade, count)| {
                let grade = grade.parse::<Grade>().map_err(AppError::InternalError)?;
                Ok(GradeCount { grade, count })
            })
            .collect()
    }

    async fn average_marks(&self) -> Result<AverageMarks, AppError> {
        let averages = sqlx::query_as::<_, AverageMarks>(
            r#"
            SELECT
                AVG(english)::float8 AS avg_english,
                AVG(maths)::float8 AS avg_maths,
                AVG(science)::float8 AS avg_science,
                AVG(total_marks)::float8 AS avg_total,
                AVG(percentage)::float8 AS avg_percentage
            FROM students
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(averages)
    }
}

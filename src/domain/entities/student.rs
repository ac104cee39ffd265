use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        grading::{DerivedScores, Grade},
        validation::{
            validate_city, validate_date_of_birth, validate_person_name, validate_phone,
            validate_state, validate_zip_code,
        },
    },
    errors::AppError,
};

// ───── Constants ──────────────────────────────────────────────────────
const MIN_STUDENT_ID_LENGTH: u64 = 3;
const MAX_STUDENT_ID_LENGTH: u64 = 20;
const MIN_NAME_LENGTH: u64 = 2;
const MAX_NAME_LENGTH: u64 = 100;
const MAX_EMAIL_LENGTH: u64 = 255;

// ───── Value Objects ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, message = "Street address is required"))]
    pub street: String,

    #[validate(
        length(min = 1, message = "City is required"),
        custom(function = "validate_city")
    )]
    pub city: String,

    #[validate(
        length(min = 1, message = "State is required"),
        custom(function = "validate_state")
    )]
    pub state: String,

    #[validate(custom(function = "validate_zip_code"))]
    pub zip_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Marks {
    #[validate(range(min = 0, max = 100, message = "English marks must be between 0 and 100"))]
    pub english: i32,

    #[validate(range(min = 0, max = 100, message = "Maths marks must be between 0 and 100"))]
    pub maths: i32,

    #[validate(range(min = 0, max = 100, message = "Science marks must be between 0 and 100"))]
    pub science: i32,
}

// ───── Stored Record ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
    pub marks: Marks,
    pub total_marks: i32,
    pub percentage: f64,
    pub grade: Grade,
    pub enrollment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn from_insert(id: Uuid, insert: &StudentInsert, now: DateTime<Utc>) -> Self {
        Student {
            id,
            student_id: insert.student_id.clone(),
            name: insert.name.clone(),
            email: insert.email.clone(),
            phone: insert.phone.clone(),
            date_of_birth: insert.date_of_birth,
            address: insert.address.clone(),
            marks: insert.marks,
            total_marks: insert.total_marks,
            percentage: insert.percentage,
            grade: insert.grade,
            enrollment_date: insert.enrollment_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every authored and derived field, keeping identity and
    /// creation metadata.
    pub fn apply_update(&mut self, insert: &StudentInsert, now: DateTime<Utc>) {
        self.student_id = insert.student_id.clone();
        self.name = insert.name.clone();
        self.email = insert.email.clone();
        self.phone = insert.phone.clone();
        self.date_of_birth = insert.date_of_birth;
        self.address = insert.address.clone();
        self.marks = insert.marks;
        self.total_marks = insert.total_marks;
        self.percentage = insert.percentage;
        self.grade = insert.grade;
        if let Some(enrollment_date) = insert.enrollment_date {
            self.enrollment_date = enrollment_date;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub english: i32,
    pub maths: i32,
    pub science: i32,
    pub total_marks: i32,
    pub percentage: f64,
    pub grade: String,
    pub enrollment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = AppError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let grade = row.grade.parse::<Grade>().map_err(AppError::InternalError)?;

        Ok(Student {
            id: row.id,
            student_id: row.student_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            address: Address {
                street: row.street,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
            },
            marks: Marks {
                english: row.english,
                maths: row.maths,
                science: row.science,
            },
            total_marks: row.total_marks,
            percentage: row.percentage,
            grade,
            enrollment_date: row.enrollment_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A validated submission with its derived scores, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInsert {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
    pub marks: Marks,
    pub total_marks: i32,
    pub percentage: f64,
    pub grade: Grade,
    pub enrollment_date: Option<DateTime<Utc>>,
}

impl StudentInsert {
    pub fn new(request: StudentRequest, scores: DerivedScores) -> Self {
        StudentInsert {
            student_id: request.student_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            date_of_birth: request.date_of_birth,
            address: request.address,
            marks: request.marks,
            total_marks: scores.total_marks,
            percentage: scores.percentage,
            grade: scores.grade,
            enrollment_date: request.enrollment_date,
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

/// Body of `POST /students` and `PUT /students/{id}`.
///
/// Derived fields are deliberately absent: anything a client sends for
/// `totalMarks`, `percentage` or `grade` is ignored during decoding.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    #[validate(length(
        min = MIN_STUDENT_ID_LENGTH,
        max = MAX_STUDENT_ID_LENGTH,
        message = "Student ID must be between 3 and 20 characters"
    ))]
    pub student_id: String,

    #[validate(
        length(
            min = MIN_NAME_LENGTH,
            max = MAX_NAME_LENGTH,
            message = "Name must be between 2 and 100 characters"
        ),
        custom(function = "validate_person_name")
    )]
    pub name: String,

    #[validate(
        email(message = "Please provide a valid email"),
        length(max = MAX_EMAIL_LENGTH, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[serde(deserialize_with = "deserialize_birth_date")]
    #[validate(custom(function = "validate_date_of_birth"))]
    pub date_of_birth: NaiveDate,

    #[validate(nested)]
    pub address: Address,

    #[validate(nested)]
    pub marks: Marks,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<DateTime<Utc>>,
}

impl StudentRequest {
    /// Trims every text field and lower-cases the email.
    pub fn normalized(self) -> Self {
        StudentRequest {
            student_id: self.student_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            address: Address {
                street: self.address.street.trim().to_string(),
                city: self.address.city.trim().to_string(),
                state: self.address.state.trim().to_string(),
                zip_code: self.address.zip_code.trim().to_string(),
            },
            ..self
        }
    }
}

/// Accepts a calendar date (`2008-04-21`) or a full RFC 3339 timestamp.
fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| serde::de::Error::custom("Please provide a valid date of birth"))
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListResponse {
    pub students: Vec<Student>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteStudentResponse {
    pub message: String,
}

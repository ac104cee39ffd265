use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

const UNIQUE_VIOLATION: &str = "23505";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const CHARACTER_NOT_IN_REPERTOIRE: &str = "22021";

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    InvalidInput(String),
    /// A unique field (`studentId`, `email`) is already taken by another record.
    AlreadyExists(String),
    Conflict(String),
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::AlreadyExists(field) => write!(f, "{} already exists", field),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            AppError::AlreadyExists(field) => {
                serde_json::json!({
                    "error": format!("Duplicate {}", field),
                    "message": self.to_string(),
                    "field": field
                })
            }
            AppError::InternalError(msg) => {
                tracing::error!("Request failed: {}", msg);
                serde_json::json!({"error": "Internal server error"})
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = Vec::new();
        collect_field_errors(None, &errors, &mut field_errors);
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

/// Flattens nested validation errors into `address.city` style paths.
fn collect_field_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = to_camel_case(field);
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name,
        };

        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(Some(&format!("{}[{}]", path, index)), inner, out);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Maps a unique constraint name to the API field it protects.
pub fn duplicate_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "students_student_id_key" => Some("studentId"),
        "students_email_key" => Some("email"),
        _ => None,
    }
}

/// Errors Postgres raises because of the submitted data rather than the
/// server. Anything not listed here is an internal error.
pub fn rejected_by_database(code: &str, constraint: Option<&str>) -> Option<AppError> {
    match code {
        UNIQUE_VIOLATION => Some(match duplicate_field(constraint) {
            Some(field) => AppError::AlreadyExists(field.to_string()),
            None => AppError::Conflict("Database conflict occurred".into()),
        }),
        STRING_DATA_RIGHT_TRUNCATION => Some(AppError::InvalidInput(
            "A value exceeds the maximum length for its field".into(),
        )),
        CHARACTER_NOT_IN_REPERTOIRE => Some(AppError::InvalidInput(
            "Text contains characters that cannot be stored".into(),
        )),
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref e) => e
                .code()
                .and_then(|code| rejected_by_database(code.as_ref(), e.constraint()))
                .unwrap_or_else(|| AppError::InternalError(format!("Database error: {}", err))),
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

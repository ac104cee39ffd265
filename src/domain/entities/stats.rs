use serde::{Deserialize, Serialize};

use crate::domain::grading::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub count: i64,
}

/// Per-field means over the whole collection.
///
/// Every field is `None` when there are no students, which serialises as
/// `{}`; use [`AverageMarks::or_zero`] when a number is needed for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AverageMarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_english: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_maths: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_science: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_percentage: Option<f64>,
}

impl AverageMarks {
    pub fn is_empty(&self) -> bool {
        self.avg_english.is_none()
            && self.avg_maths.is_none()
            && self.avg_science.is_none()
            && self.avg_total.is_none()
            && self.avg_percentage.is_none()
    }

    pub fn or_zero(&self) -> Self {
        AverageMarks {
            avg_english: Some(self.avg_english.unwrap_or(0.0)),
            avg_maths: Some(self.avg_maths.unwrap_or(0.0)),
            avg_science: Some(self.avg_science.unwrap_or(0.0)),
            avg_total: Some(self.avg_total.unwrap_or(0.0)),
            avg_percentage: Some(self.avg_percentage.unwrap_or(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total_students: i64,
    pub grade_distribution: Vec<GradeCount>,
    pub average_marks: AverageMarks,
}

impl StudentStats {
    /// Orders the histogram by grade label (`A`, `A+`, `B`, `B+`, ...) and
    /// drops empty buckets.
    pub fn new(total_students: i64, mut grade_distribution: Vec<GradeCount>, average_marks: AverageMarks) -> Self {
        grade_distribution.retain(|bucket| bucket.count > 0);
        grade_distribution.sort_by(|a, b| a.grade.as_str().cmp(b.grade.as_str()));

        StudentStats {
            total_students,
            grade_distribution,
            average_marks,
        }
    }
}

use std::{cmp::Ordering, str::FromStr};

use serde::Deserialize;

use crate::{entities::student::Student, errors::AppError};

/// Fields a student listing can be ordered by, named as the API exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    StudentId,
    Email,
    Phone,
    DateOfBirth,
    City,
    State,
    English,
    Maths,
    Science,
    TotalMarks,
    Percentage,
    Grade,
    EnrollmentDate,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    const ALL: [SortField; 16] = [
        SortField::Name,
        SortField::StudentId,
        SortField::Email,
        SortField::Phone,
        SortField::DateOfBirth,
        SortField::City,
        SortField::State,
        SortField::English,
        SortField::Maths,
        SortField::Science,
        SortField::TotalMarks,
        SortField::Percentage,
        SortField::Grade,
        SortField::EnrollmentDate,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::StudentId => "studentId",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::DateOfBirth => "dateOfBirth",
            SortField::City => "address.city",
            SortField::State => "address.state",
            SortField::English => "marks.english",
            SortField::Maths => "marks.maths",
            SortField::Science => "marks.science",
            SortField::TotalMarks => "totalMarks",
            SortField::Percentage => "percentage",
            SortField::Grade => "grade",
            SortField::EnrollmentDate => "enrollmentDate",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Column in the `students` table. Only these literals ever reach SQL.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::StudentId => "student_id",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::DateOfBirth => "date_of_birth",
            SortField::City => "city",
            SortField::State => "state",
            SortField::English => "english",
            SortField::Maths => "maths",
            SortField::Science => "science",
            SortField::TotalMarks => "total_marks",
            SortField::Percentage => "percentage",
            SortField::Grade => "grade",
            SortField::EnrollmentDate => "enrollment_date",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::StudentId => a.student_id.cmp(&b.student_id),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Phone => a.phone.cmp(&b.phone),
            SortField::DateOfBirth => a.date_of_birth.cmp(&b.date_of_birth),
            SortField::City => a.address.city.cmp(&b.address.city),
            SortField::State => a.address.state.cmp(&b.address.state),
            SortField::English => a.marks.english.cmp(&b.marks.english),
            SortField::Maths => a.marks.maths.cmp(&b.marks.maths),
            SortField::Science => a.marks.science.cmp(&b.marks.science),
            SortField::TotalMarks => a.total_marks.cmp(&b.total_marks),
            SortField::Percentage => a.percentage.total_cmp(&b.percentage),
            SortField::Grade => a.grade.as_str().cmp(b.grade.as_str()),
            SortField::EnrollmentDate => a.enrollment_date.cmp(&b.enrollment_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AppError::field("sortBy", format!("Unsupported sort field: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only the exact value `desc` sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Listing defaults, taken from configuration rather than baked into the
/// storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub sort_field: SortField,
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        QueryDefaults {
            sort_field: SortField::Name,
            page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Raw `GET /students` query string. Numbers stay strings so a malformed
/// value falls back to its default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStudentsQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Case-insensitive substring filter over name, student id, email and city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    search: Option<String>,
}

impl StudentFilter {
    pub fn new(search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);

        StudentFilter { search }
    }

    pub fn all() -> Self {
        StudentFilter::default()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn matches(&self, student: &Student) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        let term = term.to_lowercase();

        [
            &student.name,
            &student.student_id,
            &student.email,
            &student.address.city,
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(&term))
    }
}

/// A fully resolved listing request: filter, single-field sort and page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub filter: StudentFilter,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ListParams {
    pub fn resolve(query: &ListStudentsQuery, defaults: &QueryDefaults) -> Result<Self, AppError> {
        let sort_field = match query.sort_by.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<SortField>()?,
            _ => defaults.sort_field,
        };

        let page = parse_positive(query.page.as_deref()).unwrap_or(1).max(1);
        let limit = parse_positive(query.limit.as_deref())
            .unwrap_or(defaults.page_size)
            .clamp(1, defaults.max_page_size.max(1));

        Ok(ListParams {
            filter: StudentFilter::new(query.search.as_deref()),
            sort_field,
            sort_order: SortOrder::parse(query.sort_order.as_deref()),
            page,
            limit,
        })
    }

    /// Rows to skip for the 1-based page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        total_pages(total, self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
}

pub fn total_pages(total: i64, limit: u32) -> i64 {
    if total <= 0 || limit == 0 {
        return 0;
    }
    let limit = i64::from(limit);
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListStudentsQuery {
        let mut q = ListStudentsQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => q.search = value,
                "sortBy" => q.sort_by = value,
                "sortOrder" => q.sort_order = value,
                "page" => q.page = value,
                "limit" => q.limit = value,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn defaults_come_from_configuration() {
        let defaults = QueryDefaults {
            sort_field: SortField::Percentage,
            page_size: 25,
            max_page_size: 50,
        };
        let params = ListParams::resolve(&ListStudentsQuery::default(), &defaults).unwrap();

        assert_eq!(params.sort_field, SortField::Percentage);
        assert_eq!(params.sort_order, SortOrder::Asc);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 25);
        assert_eq!(params.filter, StudentFilter::all());
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let defaults = QueryDefaults::default();

        let params = ListParams::resolve(&query(&[("page", "0"), ("limit", "1000")]), &defaults).unwrap();
        assert_eq!((params.page, params.limit), (1, 100));

        let params = ListParams::resolve(&query(&[("page", "-3"), ("limit", "0")]), &defaults).unwrap();
        assert_eq!((params.page, params.limit), (1, 1));

        let params = ListParams::resolve(&query(&[("page", "two"), ("limit", "ten")]), &defaults).unwrap();
        assert_eq!((params.page, params.limit), (1, 10));
    }

    #[test]
    fn sort_fields_use_api_names() {
        let defaults = QueryDefaults::default();
        let params = ListParams::resolve(
            &query(&[("sortBy", "marks.maths"), ("sortOrder", "desc")]),
            &defaults,
        )
        .unwrap();

        assert_eq!(params.sort_field, SortField::Maths);
        assert_eq!(params.sort_field.column(), "maths");
        assert_eq!(params.sort_order, SortOrder::Desc);
    }

    #[test]
    fn unknown_sort_field_is_a_validation_error() {
        let err = ListParams::resolve(&query(&[("sortBy", "password")]), &QueryDefaults::default())
            .unwrap_err();

        let AppError::ValidationError(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].field, "sortBy");
    }

    #[test]
    fn anything_but_desc_is_ascending() {
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some(" desc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("down")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
    }

    #[test]
    fn blank_search_means_no_filter() {
        assert_eq!(StudentFilter::new(Some("   ")), StudentFilter::all());
        assert_eq!(StudentFilter::new(Some(" ada ")).search(), Some("ada"));
    }

    #[test]
    fn offsets_and_page_counts() {
        let params = ListParams::resolve(&query(&[("page", "3"), ("limit", "10")]), &QueryDefaults::default()).unwrap();

        assert_eq!(params.offset(), 20);
        assert_eq!(params.total_pages(25), 3);
        assert_eq!(params.total_pages(30), 3);
        assert_eq!(params.total_pages(31), 4);
        assert_eq!(params.total_pages(0), 0);
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::entities::student::Marks;

/// Highest total a student can score across the three subjects.
pub const MAX_TOTAL: i32 = 300;

/// Grade thresholds in hundredths of a percent, highest first.
const THRESHOLDS: [(i32, Grade); 6] = [
    (9000, Grade::APlus),
    (8000, Grade::A),
    (7000, Grade::BPlus),
    (6000, Grade::B),
    (5000, Grade::C),
    (4000, Grade::D),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::APlus,
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::F,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// First threshold the percentage reaches, evaluated high to low.
    fn from_hundredths(hundredths: i32) -> Self {
        THRESHOLDS
            .iter()
            .find(|(min, _)| hundredths >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("Unknown grade: {}", s))
    }
}

/// Values computed from a student's marks. Never accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedScores {
    pub total_marks: i32,
    pub percentage: f64,
    pub grade: Grade,
}

/// Computes total, percentage (two decimals, half-up) and grade.
///
/// Marks are expected to have been validated into `0..=100` already.
pub fn derive_scores(marks: &Marks) -> DerivedScores {
    let total_marks = marks.english + marks.maths + marks.science;

    // total / 300 * 100 in hundredths, rounded half-up
    let hundredths = (total_marks * 10_000 + MAX_TOTAL / 2) / MAX_TOTAL;

    DerivedScores {
        total_marks,
        percentage: f64::from(hundredths) / 100.0,
        grade: Grade::from_hundredths(hundredths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(english: i32, maths: i32, science: i32) -> Marks {
        Marks { english, maths, science }
    }

    fn grade_for(percentage: f64) -> Grade {
        match percentage {
            p if p >= 90.0 => Grade::APlus,
            p if p >= 80.0 => Grade::A,
            p if p >= 70.0 => Grade::BPlus,
            p if p >= 60.0 => Grade::B,
            p if p >= 50.0 => Grade::C,
            p if p >= 40.0 => Grade::D,
            _ => Grade::F,
        }
    }

    #[test]
    fn mixed_marks_produce_b_plus() {
        let scores = derive_scores(&marks(80, 70, 60));

        assert_eq!(scores.total_marks, 210);
        assert_eq!(scores.percentage, 70.0);
        assert_eq!(scores.grade, Grade::BPlus);
    }

    #[test]
    fn ninety_percent_boundary() {
        let at = derive_scores(&marks(90, 90, 90));
        assert_eq!(at.total_marks, 270);
        assert_eq!(at.percentage, 90.0);
        assert_eq!(at.grade, Grade::APlus);

        let below = derive_scores(&marks(90, 90, 89));
        assert_eq!(below.total_marks, 269);
        assert_eq!(below.percentage, 89.67);
        assert_eq!(below.grade, Grade::A);
    }

    #[test]
    fn extremes() {
        let zero = derive_scores(&marks(0, 0, 0));
        assert_eq!((zero.total_marks, zero.percentage, zero.grade), (0, 0.0, Grade::F));

        let full = derive_scores(&marks(100, 100, 100));
        assert_eq!((full.total_marks, full.percentage, full.grade), (300, 100.0, Grade::APlus));
    }

    #[test]
    fn every_boundary_total_lands_on_its_grade() {
        let cases = [
            (240, Grade::A),
            (239, Grade::BPlus),
            (210, Grade::BPlus),
            (209, Grade::B),
            (180, Grade::B),
            (179, Grade::C),
            (150, Grade::C),
            (149, Grade::D),
            (120, Grade::D),
            (119, Grade::F),
        ];

        for (total, expected) in cases {
            let english = total.min(100);
            let maths = (total - english).min(100);
            let science = total - english - maths;
            let scores = derive_scores(&marks(english, maths, science));
            assert_eq!(scores.grade, expected, "total {}", total);
        }
    }

    #[test]
    fn matches_float_formula_for_every_total() {
        for total in 0..=MAX_TOTAL {
            let english = total.min(100);
            let maths = (total - english).min(100);
            let science = total - english - maths;
            let scores = derive_scores(&marks(english, maths, science));

            let expected = (f64::from(total) / 300.0 * 100.0 * 100.0).round() / 100.0;
            assert_eq!(scores.total_marks, total);
            assert!((scores.percentage - expected).abs() < 1e-9, "total {}", total);
            assert_eq!(scores.grade, grade_for(expected), "total {}", total);
        }
    }

    #[test]
    fn recomputation_is_stable() {
        let m = marks(55, 61, 73);
        assert_eq!(derive_scores(&m), derive_scores(&m));
    }

    #[test]
    fn grade_labels_round_trip() {
        for grade in Grade::ALL {
            assert_eq!(grade.as_str().parse::<Grade>(), Ok(grade));
        }
        assert!("E".parse::<Grade>().is_err());
    }
}

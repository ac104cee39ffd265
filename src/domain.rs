pub mod entities;
pub mod grading;
pub mod use_cases;
pub mod validation;

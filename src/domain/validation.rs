use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

pub const MIN_AGE_YEARS: i32 = 5;
pub const MAX_AGE_YEARS: i32 = 100;

static LETTERS_AND_SPACES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z\s]+$").expect("letters regex is valid")
});
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone regex is valid")
});
static ZIP_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{5,10}$").expect("zip code regex is valid")
});

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    if LETTERS_AND_SPACES.is_match(name) {
        Ok(())
    } else {
        Err(invalid("name_chars", "Name can only contain letters and spaces"))
    }
}

pub fn validate_city(city: &str) -> Result<(), ValidationError> {
    if LETTERS_AND_SPACES.is_match(city) {
        Ok(())
    } else {
        Err(invalid("city_chars", "City can only contain letters and spaces"))
    }
}

pub fn validate_state(state: &str) -> Result<(), ValidationError> {
    if LETTERS_AND_SPACES.is_match(state) {
        Ok(())
    } else {
        Err(invalid("state_chars", "State can only contain letters and spaces"))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE.is_match(phone) {
        Ok(())
    } else {
        Err(invalid("phone_format", "Please provide a valid phone number"))
    }
}

pub fn validate_zip_code(zip: &str) -> Result<(), ValidationError> {
    if ZIP_CODE.is_match(zip) {
        Ok(())
    } else {
        Err(invalid("zip_format", "Zip code must be between 5 and 10 digits"))
    }
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn validate_age_on(birth: &NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    let age = age_on(*birth, today);
    if (MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
        Ok(())
    } else {
        Err(invalid("age_range", "Age must be between 5 and 100 years"))
    }
}

pub fn validate_date_of_birth(birth: &NaiveDate) -> Result<(), ValidationError> {
    validate_age_on(birth, Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_whole_years() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(2019, 6, 15), today), 5);
        assert_eq!(age_on(date(2019, 6, 16), today), 4);
        assert_eq!(age_on(date(1924, 6, 15), today), 100);
        assert_eq!(age_on(date(1924, 6, 14), today), 100);
        assert_eq!(age_on(date(1923, 6, 14), today), 101);
    }

    #[test]
    fn age_window_is_inclusive() {
        let today = date(2024, 6, 15);
        assert!(validate_age_on(&date(2019, 6, 15), today).is_ok());
        assert!(validate_age_on(&date(2019, 6, 16), today).is_err());
        assert!(validate_age_on(&date(1924, 1, 1), today).is_ok());
        assert!(validate_age_on(&date(1920, 1, 1), today).is_err());
    }

    #[test]
    fn names_allow_letters_and_spaces_only() {
        assert!(validate_person_name("Ada Lovelace").is_ok());
        assert!(validate_person_name("R2 D2").is_err());
        assert!(validate_person_name("O'Brien").is_err());
        assert!(validate_city("New York").is_ok());
        assert!(validate_state("Tamil-Nadu").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("+14155550123").is_ok());
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("0123456").is_err());
        assert!(validate_phone("+1 415 555").is_err());
        assert!(validate_phone("12345678901234567").is_err());
    }

    #[test]
    fn zip_codes() {
        assert!(validate_zip_code("12345").is_ok());
        assert!(validate_zip_code("1234567890").is_ok());
        assert!(validate_zip_code("1234").is_err());
        assert!(validate_zip_code("12345-678").is_err());
    }

    #[test]
    fn only_ascii_digits_count() {
        assert!(validate_zip_code("١٢٣٤٥").is_err());
        assert!(validate_zip_code("１２３４５").is_err());
        assert!(validate_phone("+٩٨٧٦٥٤٣٢١٠").is_err());
        assert!(validate_phone("9८७६५४३२१०").is_err());
    }

    #[test]
    fn error_messages_are_attached() {
        let err = validate_zip_code("abc").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Zip code must be between 5 and 10 digits"));
    }
}

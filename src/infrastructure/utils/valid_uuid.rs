use uuid::Uuid;

use crate::errors::AppError;

/// Parses a record id taken from the request path
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::InvalidInput("Invalid student ID format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["", "42", "64b7f0c2e1d3a9f1c2b3d4e5", "not-a-uuid"] {
            assert!(matches!(valid_uuid(raw), Err(AppError::InvalidInput(_))), "{raw}");
        }
    }
}

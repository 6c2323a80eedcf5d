pub mod auth;
pub mod colleges;
pub mod programs;
pub mod students;

use crate::db::SENTINEL_CODE;
use crate::error::AppError;

/// Codes are stored upper-case; every code a caller sends is normalised the same way.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The sentinel row only ever changes through the reassign-on-delete path.
pub fn reject_sentinel(code: &str, entity: &str) -> Result<(), AppError> {
    if code == SENTINEL_CODE {
        return Err(AppError::Conflict(format!(
            "The {} code '{}' is reserved",
            entity, SENTINEL_CODE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_and_reserved() {
        assert_eq!(normalize_code("  eng "), "ENG");
        assert!(reject_sentinel("n/a".to_uppercase().as_str(), "college").is_err());
        assert!(reject_sentinel("ENG", "college").is_ok());
    }
}

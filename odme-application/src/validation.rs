use crate::AppError;

/// Rejects empty or whitespace-only values for required text fields.
pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Maps empty or whitespace-only values to `None`; anything else is kept as is.
pub fn drop_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_rejects_blank_values() {
        let err = require_text("category", "   ").expect_err("blank is rejected");
        match err {
            AppError::BadRequest(message) => assert!(message.contains("category")),
            _ => panic!("unexpected error type"),
        }
        assert!(require_text("category", "Elementál").is_ok());
    }

    #[test]
    fn drop_blank_keeps_padded_values_untouched() {
        assert_eq!(drop_blank(None), None);
        assert_eq!(drop_blank(Some("  ".to_string())), None);
        assert_eq!(
            drop_blank(Some(" Elementál ".to_string())),
            Some(" Elementál ".to_string())
        );
    }
}

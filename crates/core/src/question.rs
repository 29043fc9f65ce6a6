//! Question resource constants and outcome messages.
//!
//! Centralizes the field allow-list used by partial updates and the
//! human-readable messages returned by update/delete endpoints.

use crate::error::CoreError;
use crate::types::DbId;

/// Entity name used in `NotFound` errors.
pub const ENTITY: &str = "Question";

/// Multipart field carrying the uploaded image file.
pub const IMAGE_FIELD: &str = "image";

/// Form/JSON flag requesting that the current image be removed.
pub const REMOVE_IMAGE_FIELD: &str = "remove_image";

/// Fields a client may write. Anything else in a request body is ignored.
pub const WRITABLE_FIELDS: &[&str] = &[
    "test_id",
    "section",
    "question_text",
    "hint",
    "explanation",
];

/// Returns `true` if `field` is on the writable allow-list.
pub fn is_writable_field(field: &str) -> bool {
    WRITABLE_FIELDS.contains(&field)
}

/// Parse a textual boolean flag as sent by HTML forms.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (case-insensitive).
pub fn parse_flag(field: &str, value: &str) -> Result<bool, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(CoreError::Validation(format!(
            "{field} must be a boolean, got '{other}'"
        ))),
    }
}

/// Parse a test identifier sent as a form field.
pub fn parse_test_id(value: &str) -> Result<DbId, CoreError> {
    value
        .trim()
        .parse::<DbId>()
        .map_err(|_| CoreError::Validation(format!("test_id must be an integer, got '{value}'")))
}

pub fn updated_message() -> String {
    "Question was updated successfully.".to_string()
}

pub fn not_updated_message(id: DbId) -> String {
    format!("Cannot update Question with id={id}. Maybe Question was not found or the request body is empty!")
}

pub fn deleted_message() -> String {
    "Question was deleted successfully!".to_string()
}

pub fn not_deleted_message(id: DbId) -> String {
    format!("Cannot delete Question with id={id}. Maybe Question was not found!")
}

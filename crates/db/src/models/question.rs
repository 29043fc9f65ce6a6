//! Question entity model and DTOs for the `sat_questions` table.

use satprep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `sat_questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub question_id: DbId,
    pub test_id: DbId,
    pub section: String,
    pub question_text: String,
    pub hint: Option<String>,
    /// Location of the image object in the bucket, if any.
    pub image: Option<String>,
    pub explanation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a question.
///
/// Also the payload of a full update (PUT), which replaces every writable
/// field. The image is never taken from the body; it is resolved from the
/// uploaded file by the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestion {
    pub test_id: DbId,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub section: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question_text: String,
    pub hint: Option<String>,
    pub explanation: Option<String>,
}

/// DTO for a partial update (PATCH). Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PatchQuestion {
    pub test_id: Option<DbId>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub section: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question_text: Option<String>,
    pub hint: Option<String>,
    pub explanation: Option<String>,
}

impl PatchQuestion {
    /// Returns `true` if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.test_id.is_none()
            && self.section.is_none()
            && self.question_text.is_none()
            && self.hint.is_none()
            && self.explanation.is_none()
    }
}

/// How a write should treat the `image` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageColumn<'a> {
    /// Leave the stored reference untouched.
    Keep,
    /// Store this reference, or NULL.
    Set(Option<&'a str>),
}

impl<'a> ImageColumn<'a> {
    /// Split into the `(should_write, value)` pair bound by the SQL layer.
    pub(crate) fn bind_parts(self) -> (bool, Option<&'a str>) {
        match self {
            ImageColumn::Keep => (false, None),
            ImageColumn::Set(value) => (true, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(PatchQuestion::default().is_empty());
        let patch = PatchQuestion {
            hint: Some("Draw the triangle".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_rejects_blank_section() {
        let patch = PatchQuestion {
            section: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn create_requires_question_text() {
        let input = CreateQuestion {
            test_id: 1,
            section: "math".into(),
            question_text: String::new(),
            hint: None,
            explanation: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("question_text"));
    }

    #[test]
    fn image_column_bind_parts() {
        assert_eq!(ImageColumn::Keep.bind_parts(), (false, None));
        assert_eq!(ImageColumn::Set(None).bind_parts(), (true, None));
        assert_eq!(
            ImageColumn::Set(Some("https://b/questions/x.png")).bind_parts(),
            (true, Some("https://b/questions/x.png"))
        );
    }
}

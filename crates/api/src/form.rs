//! Request body extraction for question writes.
//!
//! Create, full update and partial update accept either
//! `multipart/form-data` (text fields plus an optional `image` file),
//! `application/x-www-form-urlencoded`, or a JSON object. Only fields on
//! the writable allow-list are kept; anything else is dropped.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use bytes::Bytes;
use satprep_core::error::CoreError;
use satprep_core::question::{
    is_writable_field, parse_flag, parse_test_id, IMAGE_FIELD, REMOVE_IMAGE_FIELD,
};
use satprep_db::models::question::{CreateQuestion, PatchQuestion};
use satprep_storage::{ImageAction, ImageUpload};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Content type recorded for files uploaded without one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Parsed body of a question write request.
#[derive(Debug, Default)]
pub struct QuestionForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
    remove_image: bool,
}

impl QuestionForm {
    /// Build a form from already extracted text fields, applying the allow-list.
    pub fn from_fields<I, K, V>(fields: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (name, value) in fields {
            form.insert_text(name.into(), value.into())?;
        }
        Ok(form)
    }

    /// Build a form from a JSON object body.
    ///
    /// Strings, numbers and booleans are accepted as field values; `null`
    /// is treated as an absent field.
    pub fn from_json(body: Value) -> AppResult<Self> {
        let Value::Object(map) = body else {
            return Err(AppError::BadRequest("Request body must be a JSON object".into()));
        };

        let mut form = Self::default();
        for (name, value) in map {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    if is_writable_field(&name) || name == REMOVE_IMAGE_FIELD {
                        return Err(AppError::Core(CoreError::Validation(format!(
                            "{name} must be a scalar value"
                        ))));
                    }
                    continue;
                }
            };
            form.insert_text(name, text)?;
        }
        Ok(form)
    }

    /// Build a form from a multipart body.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;

                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
                continue;
            }

            if !is_writable_field(&name) && name != REMOVE_IMAGE_FIELD {
                tracing::debug!(field = %name, "Ignoring unknown form field");
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            form.insert_text(name, text)?;
        }

        Ok(form)
    }

    /// Payload and image for a create request.
    pub fn into_create(mut self) -> AppResult<(CreateQuestion, Option<ImageUpload>)> {
        let input = self.take_full()?;
        Ok((input, self.image))
    }

    /// Payload and image action for a full update (PUT).
    pub fn into_update(mut self) -> AppResult<(CreateQuestion, ImageAction)> {
        let input = self.take_full()?;
        let action = self.image_action()?;
        Ok((input, action))
    }

    /// Payload and image action for a partial update (PATCH).
    pub fn into_patch(mut self) -> AppResult<(PatchQuestion, ImageAction)> {
        let test_id = self
            .fields
            .remove("test_id")
            .map(|v| parse_test_id(&v))
            .transpose()?;
        let input = PatchQuestion {
            test_id,
            section: self.fields.remove("section"),
            question_text: self.fields.remove("question_text"),
            hint: self.fields.remove("hint"),
            explanation: self.fields.remove("explanation"),
        };
        let action = self.image_action()?;
        Ok((input, action))
    }

    fn insert_text(&mut self, name: String, value: String) -> AppResult<()> {
        if name == REMOVE_IMAGE_FIELD {
            self.remove_image = parse_flag(REMOVE_IMAGE_FIELD, &value)?;
        } else if is_writable_field(&name) {
            self.fields.insert(name, value);
        }
        Ok(())
    }

    /// Fields required by create and full update.
    fn take_full(&mut self) -> AppResult<CreateQuestion> {
        let test_id = parse_test_id(&self.require("test_id")?)?;
        Ok(CreateQuestion {
            test_id,
            section: self.require("section")?,
            question_text: self.require("question_text")?,
            hint: self.fields.remove("hint"),
            explanation: self.fields.remove("explanation"),
        })
    }

    fn require(&mut self, field: &str) -> AppResult<String> {
        self.fields
            .remove(field)
            .ok_or_else(|| AppError::Core(CoreError::Validation(format!("{field} is required"))))
    }

    fn image_action(&mut self) -> AppResult<ImageAction> {
        match (self.image.take(), self.remove_image) {
            (Some(_), true) => Err(AppError::Core(CoreError::Validation(format!(
                "Cannot upload an {IMAGE_FIELD} and set {REMOVE_IMAGE_FIELD} in the same request"
            )))),
            (Some(upload), false) => Ok(ImageAction::Replace(upload)),
            (None, true) => Ok(ImageAction::Clear),
            (None, false) => Ok(ImageAction::Keep),
        }
    }
}

impl<S> FromRequest<S> for QuestionForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_fields(fields);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let json: Value = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        Self::from_json(json)
    }
}

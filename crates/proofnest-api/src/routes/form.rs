//! Multipart form reading shared by `/register` and `/verify-file`.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use proofnest_core::ProofError;

use crate::error::AppError;

/// Name of the part carrying the uploaded bytes.
pub const FILE_FIELD: &str = "file";

/// The uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A parsed multipart form: one file part plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part. The file part is measured against `limit` as soon
    /// as it is buffered; oversize is [`ProofError::PayloadTooLarge`].
    pub async fn read(mut multipart: Multipart, limit: usize) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(e, limit))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::from_multipart(e, limit))?;
                if bytes.len() > limit {
                    return Err(ProofError::PayloadTooLarge {
                        size: bytes.len(),
                        limit,
                    }
                    .into());
                }
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            } else if !name.is_empty() {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::from_multipart(e, limit))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The file part, or 400 when it is missing.
    pub fn take_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::bad_request("file is required"))
    }

    /// A text field, trimmed. Blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// A boolean field. Absent yields `default`.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, AppError> {
        match self.text(name) {
            None => Ok(default),
            Some(v) => parse_flag(&v)
                .ok_or_else(|| AppError::bad_request(format!("{name} must be true or false, got '{v}'"))),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_html_form_values() {
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn blank_text_is_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("name".into(), "   ".into());
        form.fields.insert("ownerDob".into(), " 1990-01-01\n".into());
        assert_eq!(form.text("name"), None);
        assert_eq!(form.text("ownerDob").as_deref(), Some("1990-01-01"));
        assert!(form.flag("hasRoyalty", false).is_ok_and(|v| !v));
        assert!(form.take_file().is_err());
    }
}

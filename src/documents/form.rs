//! The upload form: multipart parsing and field validation.

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, FieldErrors, Result};
use crate::router::Context;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Longest accepted value for any text field.
pub const MAX_FIELD_LEN: usize = 255;

/// Name of the file input.
pub const FILE_FIELD: &str = "document";

/// Text inputs in display order, with their labels.
pub const TEXT_FIELDS: [(&str, &str); 5] = [
    ("title", "Title"),
    ("author", "Author"),
    ("description", "Description"),
    ("school_level", "School level"),
    ("school_subject", "School subject"),
];

const REQUIRED: &str = "This field is required.";

/// A file received in the form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content: Bytes,
}

/// Submitted values, valid or not.
#[derive(Debug, Clone, Default)]
pub struct DocumentForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub school_level: String,
    pub school_subject: String,
    pub upload: Option<Upload>,
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct CleanDocument {
    pub title: String,
    pub author: String,
    pub description: String,
    pub school_level: String,
    pub school_subject: String,
    pub upload: Upload,
}

/// One text input as the template sees it.
#[derive(Debug, Serialize)]
pub struct FieldView<'a> {
    pub name: &'static str,
    pub label: &'static str,
    pub value: &'a str,
    pub errors: &'a [String],
}

impl DocumentForm {
    /// Read the form from a `multipart/form-data` request body.
    ///
    /// Unknown parts are ignored. Text values are trimmed.
    pub async fn from_request(ctx: &Context) -> Result<Self> {
        if !ctx.content_type_is(MULTIPART_FORM_DATA) {
            return Err(Error::UnsupportedMediaType {
                expected: MULTIPART_FORM_DATA.to_string(),
            });
        }
        let boundary = multer::parse_boundary(ctx.header("Content-Type").unwrap_or_default())?;
        let body = ctx.body.clone();
        let stream =
            futures_util::stream::once(async move { Ok::<Bytes, std::convert::Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == FILE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await?;
                form.upload = Some(Upload { file_name, content });
            } else if let Some(slot) = form.text_mut(&name) {
                *slot = field.text().await?.trim().to_string();
            }
        }
        Ok(form)
    }

    fn text_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "title" => Some(&mut self.title),
            "author" => Some(&mut self.author),
            "description" => Some(&mut self.description),
            "school_level" => Some(&mut self.school_level),
            "school_subject" => Some(&mut self.school_subject),
            _ => None,
        }
    }

    fn text(&self, name: &str) -> &str {
        match name {
            "title" => &self.title,
            "author" => &self.author,
            "description" => &self.description,
            "school_level" => &self.school_level,
            "school_subject" => &self.school_subject,
            _ => "",
        }
    }

    /// Collect every problem with the submitted values.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, _) in TEXT_FIELDS {
            let value = self.text(name);
            let len = value.chars().count();
            if len == 0 {
                errors.entry(name).or_default().push(REQUIRED.to_string());
            } else if len > MAX_FIELD_LEN {
                errors.entry(name).or_default().push(format!(
                    "Ensure this value has at most {MAX_FIELD_LEN} characters (it has {len})."
                ));
            }
        }
        match &self.upload {
            None => errors
                .entry(FILE_FIELD)
                .or_default()
                .push("No file was submitted.".to_string()),
            Some(upload) if upload.file_name.is_empty() => errors
                .entry(FILE_FIELD)
                .or_default()
                .push("No file was submitted.".to_string()),
            Some(upload) if upload.content.is_empty() => errors
                .entry(FILE_FIELD)
                .or_default()
                .push("The submitted file is empty.".to_string()),
            Some(_) => {}
        }
        errors
    }

    /// Validate, handing back the form and its errors on failure.
    pub fn clean(self) -> std::result::Result<CleanDocument, (Self, FieldErrors)> {
        let errors = self.validate();
        match self.upload {
            Some(upload) if errors.is_empty() => Ok(CleanDocument {
                title: self.title,
                author: self.author,
                description: self.description,
                school_level: self.school_level,
                school_subject: self.school_subject,
                upload,
            }),
            upload => Err((Self { upload, ..self }, errors)),
        }
    }

    /// Text inputs with their current values and errors, for rendering.
    pub fn fields<'a>(&'a self, errors: &'a FieldErrors) -> Vec<FieldView<'a>> {
        TEXT_FIELDS
            .iter()
            .map(|&(name, label)| FieldView {
                name,
                label,
                value: self.text(name),
                errors: errors.get(name).map(Vec::as_slice).unwrap_or_default(),
            })
            .collect()
    }
}

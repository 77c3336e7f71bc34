//! Request handlers for the upload page.

use std::sync::Arc;

use hyper::{Method, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use super::form::{DocumentForm, FILE_FIELD};
use super::model::NewDocument;
use super::{storage, store};
use crate::error::{Error, FieldErrors, Result};
use crate::response::{self, HttpResponse};
use crate::router::Context;
use crate::templates::{self, Templates};
use crate::urls;

fn render(
    templates: &Templates,
    status: StatusCode,
    form: &DocumentForm,
    errors: &FieldErrors,
) -> Result<HttpResponse> {
    templates.page(
        status,
        templates::FILES_UPLOAD,
        &json!({
            "fields": form.fields(errors),
            "file_errors": errors.get(FILE_FIELD),
        }),
    )
}

/// `filesupload:files_upload`: GET shows the form, POST stores the document.
///
/// A valid submission writes the file, inserts the row and redirects home.
/// An invalid one re-renders the form with its errors and stores nothing.
pub async fn upload(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    if ctx.method != Method::POST {
        return render(&templates, StatusCode::OK, &DocumentForm::default(), &FieldErrors::new());
    }

    let clean = match DocumentForm::from_request(&ctx).await?.clean() {
        Ok(clean) => clean,
        Err((form, errors)) => {
            warn!(fields = ?errors.keys().collect::<Vec<_>>(), "Rejected document upload");
            if ctx.wants_json() {
                return Err(Error::Validation(errors));
            }
            return render(&templates, StatusCode::BAD_REQUEST, &form, &errors);
        }
    };

    let conn = ctx.connection()?;
    let root = &ctx.config.media.root;
    let reference = storage::save(root, &clean.upload.file_name, &clean.upload.content).await?;
    let new = NewDocument {
        title: clean.title,
        author: clean.author,
        description: clean.description,
        school_level: clean.school_level,
        school_subject: clean.school_subject,
        document: reference,
    };

    match store::insert(&conn, &new).await {
        Ok(document) => {
            info!(id = document.id, document = %document.document, "Stored document");
            response::redirect(&urls::home())
        }
        Err(e) => {
            if let Err(cleanup) = storage::remove(root, &new.document).await {
                warn!(document = %new.document, "Failed to remove orphaned upload: {cleanup}");
            }
            Err(e)
        }
    }
}

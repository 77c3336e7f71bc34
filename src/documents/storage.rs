//! Uploaded file storage under the media root.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};

/// Directory under the media root that receives uploads.
pub const UPLOAD_DIR: &str = "documents";

const MAX_STORED_NAME_LEN: usize = 100;

/// Reduce a client-supplied filename to a safe final path component.
///
/// Keeps the basename only and maps anything outside `[A-Za-z0-9._-]` to `_`.
/// Leading dots are dropped so the result is never hidden or a parent
/// reference.
pub fn safe_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    out = out.trim_start_matches('.').to_string();
    if out.len() > MAX_STORED_NAME_LEN {
        // Keep the extension.
        let ext = out
            .rfind('.')
            .map(|i| out[i..].to_string())
            .filter(|e| e.len() < 16)
            .unwrap_or_default();
        out.truncate(MAX_STORED_NAME_LEN - ext.len());
        out.push_str(&ext);
    }
    if out.is_empty() {
        out.push_str("upload");
    }
    out
}

/// Write `content` under `<root>/documents/` and return the stored path
/// relative to `root`.
pub async fn save(root: &Path, file_name: &str, content: &[u8]) -> Result<String> {
    let dir = root.join(UPLOAD_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let stored = format!("{}_{}", Uuid::new_v4().simple(), safe_file_name(file_name));
    tokio::fs::write(dir.join(&stored), content).await?;

    let reference = format!("{UPLOAD_DIR}/{stored}");
    tracing::debug!(reference = %reference, bytes = content.len(), "Stored upload");
    Ok(reference)
}

/// Absolute location of a stored reference.
pub fn resolve(root: &Path, reference: &str) -> Result<PathBuf> {
    let name = reference
        .strip_prefix(UPLOAD_DIR)
        .and_then(|r| r.strip_prefix('/'))
        .filter(|n| !n.is_empty() && safe_file_name(n) == *n)
        .ok_or_else(|| Error::BadRequest(format!("Not a stored document: {reference}")))?;
    Ok(root.join(UPLOAD_DIR).join(name))
}

/// Delete a stored file.
pub async fn remove(root: &Path, reference: &str) -> Result<()> {
    tokio::fs::remove_file(resolve(root, reference)?).await?;
    Ok(())
}

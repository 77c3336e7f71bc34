//! Document persistence.

use libsql::{Connection, params};

use super::model::{Document, NewDocument};
use crate::error::{Error, Result};

const SELECT: &str = "SELECT id, title, author, description, school_level, school_subject, document FROM documents";

/// Insert a document row and return it with its assigned id.
pub async fn insert(conn: &Connection, new: &NewDocument) -> Result<Document> {
    conn.execute(
        "INSERT INTO documents (title, author, description, school_level, school_subject, document)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.title.as_str(),
            new.author.as_str(),
            new.description.as_str(),
            new.school_level.as_str(),
            new.school_subject.as_str(),
            new.document.as_str()
        ],
    )
    .await?;
    let id = conn.last_insert_rowid();
    get(conn, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("document {id} vanished after insert")))
}

pub async fn get(conn: &Connection, id: i64) -> Result<Option<Document>> {
    let mut rows = conn
        .query(&format!("{SELECT} WHERE id = ?1"), params![id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(Document::from_row(&row)?)),
        None => Ok(None),
    }
}

/// Every document, oldest first.
pub async fn list(conn: &Connection) -> Result<Vec<Document>> {
    let mut rows = conn.query(&format!("{SELECT} ORDER BY id"), ()).await?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next().await? {
        documents.push(Document::from_row(&row)?);
    }
    Ok(documents)
}

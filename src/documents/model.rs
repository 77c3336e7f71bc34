//! The uploaded document record.

use serde::Serialize;

use crate::error::Result;

/// A stored document row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub school_level: String,
    pub school_subject: String,
    /// Path of the stored file, relative to the media root.
    pub document: String,
}

/// A document ready to be inserted. The file is already stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub author: String,
    pub description: String,
    pub school_level: String,
    pub school_subject: String,
    pub document: String,
}

impl Document {
    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            school_level: row.get(4)?,
            school_subject: row.get(5)?,
            document: row.get(6)?,
        })
    }
}

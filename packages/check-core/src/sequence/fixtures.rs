//! Fixture rows written to the live store and their guaranteed removal.

use rusqlite::{params, params_from_iter, Connection};

use crate::error::Result;

/// Article inserted only to exercise the retrieval function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRow {
    pub title: String,
    pub author: String,
    pub content: String,
    /// Explicit date; the store's current time when `None`
    pub date: Option<String>,
}

impl FixtureRow {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            content: content.into(),
            date: None,
        }
    }
}

/// Tracks every fixture id inserted through it and deletes whatever is
/// still tracked when dropped, so an early exit never leaves rows behind.
pub struct FixtureSet<'c> {
    conn: &'c Connection,
    table: String,
    ids: Vec<i64>,
}

impl<'c> FixtureSet<'c> {
    pub fn new(conn: &'c Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
            ids: Vec::new(),
        }
    }

    /// Inserts a fixture and returns its id.
    pub fn insert(&mut self, row: &FixtureRow) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} (title, author, content, date) \
             VALUES (?1, ?2, ?3, COALESCE(?4, datetime('now')))",
            self.table
        );
        self.conn.execute(
            &sql,
            params![row.title, row.author, row.content, row.date],
        )?;
        let id = self.conn.last_insert_rowid();
        self.ids.push(id);
        tracing::debug!("Inserted fixture {} into {}", id, self.table);
        Ok(id)
    }

    /// Deletes one fixture by id and stops tracking it. Deleting an id that
    /// is already gone affects no rows and is not an error.
    pub fn remove(&mut self, id: i64) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);
        let deleted = self.conn.execute(&sql, [id])?;
        self.ids.retain(|tracked| *tracked != id);
        tracing::debug!("Removed fixture {} ({} rows)", id, deleted);
        Ok(deleted)
    }

    /// Deletes every tracked fixture in one statement.
    pub fn cleanup(&mut self) -> Result<usize> {
        if self.ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; self.ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM {} WHERE id IN ({})",
            self.table, placeholders
        );
        let deleted = self.conn.execute(&sql, params_from_iter(self.ids.iter()))?;
        tracing::debug!("Cleaned up fixtures {:?} ({} rows)", self.ids, deleted);
        self.ids.clear();
        Ok(deleted)
    }

    /// Ids inserted and not yet removed.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

impl Drop for FixtureSet<'_> {
    fn drop(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        tracing::warn!("Removing {} leftover fixtures", self.ids.len());
        if let Err(e) = self.cleanup() {
            tracing::error!("Fixture cleanup failed for ids {:?}: {}", self.ids, e);
        }
    }
}

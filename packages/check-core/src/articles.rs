//! The article retrieval function under test.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::artifact::{AppLayout, INDEX};
use crate::error::{CheckError, Result};

/// Fields every returned article must carry.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "title", "author", "content", "date"];

/// One article as returned by the retrieval function: a column-name keyed
/// mapping, the shape a fetch-associative call hands back.
pub type ArticleRow = Map<String, Value>;

/// Source of the article list.
pub trait ArticleSource {
    /// Returns every article, most recently created (highest id) first.
    fn get_articles(&self, conn: &Connection) -> Result<Vec<ArticleRow>>;
}

/// Reads articles with one ordered query.
#[derive(Debug, Clone)]
pub struct SqlArticleSource {
    table: String,
}

impl Default for SqlArticleSource {
    fn default() -> Self {
        Self::new("articles")
    }
}

impl SqlArticleSource {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Loads the application: its entry page must exist in `app_dir`.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let entry = AppLayout::new(app_dir).path_of(INDEX);
        if !entry.is_file() {
            return Err(CheckError::AppNotFound(entry));
        }
        Ok(Self::default())
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl ArticleSource for SqlArticleSource {
    fn get_articles(&self, conn: &Connection) -> Result<Vec<ArticleRow>> {
        let sql = format!(
            "SELECT id, title, author, content, date FROM {} ORDER BY id DESC",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            let mut article = ArticleRow::new();
            for (idx, column) in columns.iter().enumerate() {
                article.insert(column.clone(), to_json(row.get_ref(idx)?));
            }
            articles.push(article);
        }
        tracing::debug!("Fetched {} articles from {}", articles.len(), self.table);
        Ok(articles)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// Names of required fields missing from `row`.
pub fn missing_fields(row: &ArticleRow) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !row.contains_key(*field))
        .collect()
}

/// The row's id, when it is an integer.
pub fn row_id(row: &ArticleRow) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

/// Text value of `field`, when it is a string.
pub fn row_text<'a>(row: &'a ArticleRow, field: &str) -> Option<&'a str> {
    row.get(field).and_then(Value::as_str)
}

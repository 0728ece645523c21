//! Shared fixtures: temporary app directories and article stores.

use std::fs;
use std::path::{Path, PathBuf};

use check_core::config::{HarnessConfig, DB_CONFIG_FILE};
use rusqlite::Connection;
use tempfile::TempDir;

pub const CLEAN_INDEX: &str = r#"<?php
require_once __DIR__ . '/db-config.php';

function getArticles(PDO $pdo): array
{
    $stmt = $pdo->query("SELECT id, title, author, content, date FROM articles ORDER BY id DESC");
    return $stmt->fetchAll(PDO::FETCH_ASSOC);
}
?>
<main>
<?php foreach (getArticles($pdo) as $article): ?>
  <h2><?= htmlspecialchars($article['title']) ?> <small><?= htmlspecialchars($article['date']) ?></small></h2>
  <p><?= htmlspecialchars($article['content']) ?></p>
  <cite><?= htmlspecialchars($article['author']) ?></cite>
<?php endforeach; ?>
</main>
"#;

pub const CLEAN_VALIDATION: &str = r#"<?php
if (!isset($_POST["title"]) || empty($_POST["title"])) {
    $error = "Title is required";
} elseif (!isset($_POST["author"]) || empty($_POST["author"])) {
    $error = "Author is required";
}
"#;

/// Creates the articles table in a new database file.
pub fn create_store(path: &Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            content TEXT NOT NULL,
            date TEXT NOT NULL
        );",
    )
    .unwrap();
    conn
}

pub fn article_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(id) FROM articles", [], |r| r.get(0))
        .unwrap()
}

pub fn seed(conn: &Connection, title: &str) {
    conn.execute(
        "INSERT INTO articles (title, author, content, date) VALUES (?1, 'seed', 'seed', '2024-01-01 00:00:00')",
        [title],
    )
    .unwrap();
}

pub fn sqlite_dsn(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// A temporary application directory with sources, a store and a config.
pub struct TestApp {
    pub dir: TempDir,
    pub db_path: PathBuf,
}

impl TestApp {
    pub fn new(index: &str, validation: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("blog.db");
        create_store(&db_path);
        fs::write(dir.path().join("index.php"), index).unwrap();
        fs::write(dir.path().join("validation.php"), validation).unwrap();
        let app = Self { dir, db_path };
        app.write_config(&format!(
            r#"{{ "dsn": "{}", "user": "blog", "password": "secret", "options": {{ "busy_timeout_ms": 1000 }} }}"#,
            sqlite_dsn(&app.db_path)
        ));
        app
    }

    pub fn clean() -> Self {
        Self::new(CLEAN_INDEX, CLEAN_VALIDATION)
    }

    pub fn write_config(&self, json: &str) {
        fs::write(self.dir.path().join(DB_CONFIG_FILE), json).unwrap();
    }

    pub fn remove(&self, file: &str) {
        fs::remove_file(self.dir.path().join(file)).unwrap();
    }

    pub fn connect(&self) -> Connection {
        Connection::open(&self.db_path).unwrap()
    }

    /// Harness settings for this app: no colors, no ordering pause, a
    /// latency limit generous enough for slow CI disks.
    pub fn harness(&self) -> HarnessConfig {
        HarnessConfig {
            latency_threshold_ms: 5_000,
            order_pause: std::time::Duration::ZERO,
            color: false,
            ..HarnessConfig::for_app_dir(self.dir.path())
        }
    }
}

//! Live-store scenario for the article retrieval function.
//!
//! The scenario runs strictly in order and stops at the first failed
//! assertion:
//! 1. fetch and check shape on whatever rows already exist
//! 2. insert one fixture, find it again, compare every field, remove it
//! 3. insert two fixtures back to back and check newest-first order by id
//! 4. insert a fixture full of markup, quotes and ampersands and compare it
//! 5. remove all remaining fixtures in one batch
//!
//! Fixtures live in a [`FixtureSet`], which deletes whatever it still
//! tracks when the scenario returns early.

mod fixtures;

pub use fixtures::{FixtureRow, FixtureSet};

use std::io::Write;
use std::thread;
use std::time::Duration;

use rusqlite::Connection;
use uuid::Uuid;

use crate::articles::{
    missing_fields, row_id, row_text, ArticleRow, ArticleSource, SqlArticleSource,
};
use crate::config::{ConnectionConfig, HarnessConfig};
use crate::connection;
use crate::error::CheckError;
use crate::outcome::TestOutcome;
use crate::runner::{RunSummary, Runner};

/// Why the scenario stopped.
#[derive(Debug)]
pub enum StepError {
    /// An assertion was false
    Failed(String),
    /// The store or the retrieval function faulted
    Fault(CheckError),
}

impl From<CheckError> for StepError {
    fn from(err: CheckError) -> Self {
        StepError::Fault(err)
    }
}

type StepResult<T = ()> = std::result::Result<T, StepError>;

/// Stops the scenario at the first false assertion, reporting each one
/// through a [`Runner`] as a `[PASS]`/`[FAIL]` line.
pub struct Steps<W: Write> {
    runner: Runner<W>,
}

impl<W: Write> Steps<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            runner: Runner::new(out, color),
        }
    }

    /// Records an assertion; a false one stops the scenario.
    pub fn assert(&mut self, condition: bool, name: &str) -> StepResult {
        let outcome = TestOutcome::check(condition, name);
        self.runner.step(name, &outcome);
        match outcome {
            TestOutcome::Pass => Ok(()),
            _ => Err(StepError::Failed(name.to_string())),
        }
    }

    /// Records an assertion that holds by construction.
    pub fn pass(&mut self, name: &str) {
        self.runner.step(name, &TestOutcome::Pass);
    }

    /// Records a fault as an `[ERROR]` line.
    pub fn fault(&mut self, message: &str) {
        self.runner.step(message, &TestOutcome::error(message));
    }

    pub fn note(&mut self, message: &str) {
        self.runner.note(message);
    }

    pub fn summary(&self) -> RunSummary {
        self.runner.summary()
    }

    pub fn into_inner(self) -> W {
        self.runner.into_inner()
    }
}

/// Fixture content and timing for the scenario.
#[derive(Debug, Clone)]
pub struct SequenceSettings {
    pub author: String,
    pub content: String,
    /// Pause between the two ordering fixtures
    pub order_pause: Duration,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            author: "Unit Tester".to_string(),
            content: "This is unit test content.".to_string(),
            order_pause: Duration::from_millis(100),
        }
    }
}

const FOUND_STEP: &str = "Inserted article is returned by getArticles()";

/// Title used by the fidelity fixture.
pub const SPECIAL_TITLE: &str = "Test <script> ' \" & chars";

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

fn position_of(articles: &[ArticleRow], id: i64) -> Option<usize> {
    articles.iter().position(|row| row_id(row) == Some(id))
}

/// The retrieval scenario over one exclusively held connection.
pub struct ArticleSequence<'a, S: ArticleSource> {
    conn: &'a Connection,
    source: &'a S,
    table: String,
    settings: SequenceSettings,
}

impl<'a, S: ArticleSource> ArticleSequence<'a, S> {
    pub fn new(conn: &'a Connection, source: &'a S, table: impl Into<String>) -> Self {
        Self {
            conn,
            source,
            table: table.into(),
            settings: SequenceSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SequenceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runs the scenario. Fixtures are removed on every exit path.
    pub fn run<W: Write>(&self, steps: &mut Steps<W>) -> TestOutcome {
        let mut fixtures = FixtureSet::new(self.conn, self.table.clone());
        let result = self.run_steps(&mut fixtures, steps);

        let outcome = match result {
            Ok(()) => TestOutcome::Pass,
            Err(StepError::Failed(name)) => TestOutcome::Fail(name),
            Err(StepError::Fault(err)) => {
                steps.fault(&err.to_string());
                TestOutcome::Error(err.to_string())
            }
        };

        if let Err(err) = fixtures.cleanup() {
            steps.fault(&format!("Fixture cleanup failed: {}", err));
            if outcome.is_pass() {
                return TestOutcome::Error(err.to_string());
            }
        }
        outcome
    }

    fn fetch(&self) -> StepResult<Vec<ArticleRow>> {
        Ok(self.source.get_articles(self.conn)?)
    }

    fn fixture(&self, title: &str) -> FixtureRow {
        FixtureRow::new(
            title,
            self.settings.author.clone(),
            self.settings.content.clone(),
        )
    }

    fn run_steps<W: Write>(
        &self,
        fixtures: &mut FixtureSet<'_>,
        steps: &mut Steps<W>,
    ) -> StepResult {
        // Shape of pre-existing data
        let existing = self.fetch()?;
        steps.pass("getArticles() returns a list");
        if !existing.is_empty() {
            steps.assert(
                existing.iter().all(|row| missing_fields(row).is_empty()),
                "Articles contain every required key (id, title, content, author, date)",
            )?;
        }

        // Single fixture round-trip
        let title = unique("Unit Test Title");
        let id = fixtures.insert(&self.fixture(&title))?;
        steps.pass("Test article inserted into the database");

        let articles = self.fetch()?;
        let found = match articles
            .iter()
            .find(|row| row_text(row, "title") == Some(title.as_str()))
        {
            Some(row) => row,
            None => return steps.assert(false, FOUND_STEP),
        };
        steps.pass(FOUND_STEP);

        steps.assert(
            missing_fields(found).is_empty(),
            "Returned article has every required key (id, title, content, author, date)",
        )?;
        steps.assert(row_id(found) == Some(id), "Returned id matches the inserted id")?;
        steps.assert(
            row_text(found, "author") == Some(self.settings.author.as_str()),
            "Author matches",
        )?;
        steps.assert(
            row_text(found, "content") == Some(self.settings.content.as_str()),
            "Content matches",
        )?;
        steps.assert(
            found.get("date").is_some_and(|date| !date.is_null()),
            "Date is present",
        )?;

        fixtures.remove(id)?;
        steps.note("Test data cleanup done.");

        // Ordering by id
        let first_id = fixtures.insert(&self.fixture(&unique("Test Order 1")))?;
        if !self.settings.order_pause.is_zero() {
            thread::sleep(self.settings.order_pause);
        }
        let second_id = fixtures.insert(&self.fixture(&unique("Test Order 2")))?;

        let articles = self.fetch()?;
        let first_pos = position_of(&articles, first_id);
        let second_pos = position_of(&articles, second_id);
        steps.assert(
            first_pos.is_some() && second_pos.is_some(),
            "Ordering test articles are returned",
        )?;
        steps.assert(
            second_pos < first_pos,
            &format!(
                "Newest article (ID {}) appears before the older one (ID {})",
                second_id, first_id
            ),
        )?;

        // Stored text fidelity
        let special = FixtureRow::new(
            SPECIAL_TITLE,
            "O'Brien & \"Sons\" <b>",
            "Line one\nLine <two> & 'three'  ",
        );
        let special_id = fixtures.insert(&special)?;
        let articles = self.fetch()?;
        let stored = position_of(&articles, special_id).map(|pos| &articles[pos]);
        steps.assert(
            stored.and_then(|row| row_text(row, "title")) == Some(special.title.as_str()),
            "Special characters in the title are stored faithfully",
        )?;
        steps.assert(
            stored.and_then(|row| row_text(row, "author")) == Some(special.author.as_str())
                && stored.and_then(|row| row_text(row, "content"))
                    == Some(special.content.as_str()),
            "Special characters in author and content are stored faithfully",
        )?;

        // Batch teardown
        let tracked = fixtures.ids().to_vec();
        let removed = fixtures.cleanup()?;
        let articles = self.fetch()?;
        steps.assert(
            removed == tracked.len()
                && tracked.iter().all(|id| position_of(&articles, *id).is_none()),
            "Remaining test articles removed",
        )?;

        Ok(())
    }
}

/// Loads the application and the connection, then runs the scenario.
///
/// Returns the scenario outcome and the per-assertion tally.
pub fn run_unit_checks<W: Write>(
    harness: &HarnessConfig,
    out: W,
) -> (TestOutcome, RunSummary) {
    let mut steps = Steps::new(out, harness.color);

    let source = match SqlArticleSource::load(&harness.app_dir) {
        Ok(source) => source,
        Err(err) => {
            steps.fault(&err.to_string());
            return (TestOutcome::Error(err.to_string()), steps.summary());
        }
    };
    steps.note("Environment loaded.");

    let opened =
        ConnectionConfig::load(&harness.db_config).and_then(|config| connection::open(&config));
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            let message = format!("Connection failed: {}", err);
            steps.fault(&message);
            return (TestOutcome::Error(message), steps.summary());
        }
    };
    steps.pass("Database connection established");

    let settings = SequenceSettings {
        order_pause: harness.order_pause,
        ..Default::default()
    };
    let sequence = ArticleSequence::new(&conn, &source, source.table()).with_settings(settings);
    let outcome = sequence.run(&mut steps);
    (outcome, steps.summary())
}

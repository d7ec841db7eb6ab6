//! SQLite archive of finished crawls
//!
//! Each report becomes one row in `runs`, tagged with the configuration
//! hash, plus its results in `pages` and its visitation order in `visits`.
//! Only final output is archived; nothing here is read back to resume a
//! crawl.

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::state::VisitState;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for the archive
pub const SCHEMA_SQL: &str = r#"
-- One row per archived crawl
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    cancelled INTEGER NOT NULL DEFAULT 0,
    pages_visited INTEGER NOT NULL,
    results INTEGER NOT NULL,
    site_title TEXT,
    site_description TEXT,
    favicon_url TEXT,
    combined_text TEXT NOT NULL
);

-- Results, in report order
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    kind TEXT NOT NULL,
    text TEXT,
    markdown TEXT,
    structured_data TEXT,
    error_message TEXT,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);
CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);

-- Visitation order and the decision made for each visited URL
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    state TEXT NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_visits_run ON visits(run_id);
"#;

/// Report writer backed by a SQLite database
pub struct SqliteArchive {
    conn: Connection,
    config_hash: String,
}

impl SqliteArchive {
    /// Opens (or creates) the archive at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration the crawl ran with
    pub fn open(path: &Path, config_hash: impl Into<String>) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn,
            config_hash: config_hash.into(),
        })
    }

    /// Creates an in-memory archive (for testing)
    pub fn open_in_memory(config_hash: impl Into<String>) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn,
            config_hash: config_hash.into(),
        })
    }

    /// Archives a report in a single transaction; returns the new run id
    pub fn archive(&self, report: &CrawlReport) -> OutputResult<i64> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO runs (start_url, started_at, finished_at, config_hash, cancelled,
                               pages_visited, results, site_title, site_description,
                               favicon_url, combined_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                report.start_url,
                report.started_at.to_rfc3339(),
                report.finished_at.to_rfc3339(),
                self.config_hash,
                report.cancelled,
                report.stats.pages_visited as i64,
                report.results.len() as i64,
                report.site_meta.title,
                report.site_meta.description,
                report.site_meta.favicon_url,
                report.combined_text,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, position, url, depth, kind, text, markdown,
                                    structured_data, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, page) in report.results.iter().enumerate() {
                let structured_data = if page.structured_data.is_empty() {
                    None
                } else {
                    Some(serde_json::to_string(&page.structured_data)?)
                };
                insert_page.execute(params![
                    run_id,
                    position as i64,
                    page.url,
                    page.depth,
                    page.kind.as_str(),
                    page.text,
                    page.markdown,
                    structured_data,
                    page.error,
                ])?;
            }

            let mut insert_visit = tx.prepare(
                "INSERT INTO visits (run_id, position, url, depth, state)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, visit) in report.visits.iter().enumerate() {
                insert_visit.execute(params![
                    run_id,
                    position as i64,
                    visit.url,
                    visit.depth,
                    visit.state.to_db_string(),
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Archived run {} ({} pages)", run_id, report.results.len());
        Ok(run_id)
    }

    /// Number of archived runs
    pub fn run_count(&self) -> OutputResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Visited URLs of a run with their recorded state, in visitation order
    pub fn visits(&self, run_id: i64) -> OutputResult<Vec<(String, VisitState)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, state FROM visits WHERE run_id = ?1 ORDER BY position")?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut visits = Vec::new();
        for row in rows {
            let (url, state) = row?;
            match VisitState::from_db_string(&state) {
                Some(state) => visits.push((url, state)),
                None => tracing::warn!("Unknown visit state '{}' for {}", state, url),
            }
        }
        Ok(visits)
    }
}

impl OutputHandler for SqliteArchive {
    fn name(&self) -> &'static str {
        "sqlite archive"
    }

    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        self.archive(report).map(|_| ())
    }
}

//! SQLite-backed record storage for plans, subjects, and chapters.
//!
//! Every write is a full-record replace keyed by id. Concurrent sessions for
//! the same user follow last-write-wins: losing an update costs one edit
//! session, never a half-applied record (e.g. a partially patched phase
//! list, which the replace rule makes impossible to store).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::chapter::{Chapter, Subject};
use crate::error::DatabaseError;
use crate::plan::StudyPlan;

/// A stored study plan with its record identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub plan: StudyPlan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SQLite database for plan, subject, and chapter records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::DataDir(e.to_string()))?;
        let path = dir.join("studyplan.db");
        let conn =
            Connection::open(&path).map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS plans (
                    id         TEXT PRIMARY KEY,
                    data       TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS subjects (
                    id         TEXT PRIMARY KEY,
                    name       TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS chapters (
                    id         TEXT PRIMARY KEY,
                    subject_id TEXT NOT NULL,
                    data       TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                -- Subject roll-ups read chapters grouped by owner
                CREATE INDEX IF NOT EXISTS idx_chapters_subject_id ON chapters(subject_id);
                CREATE INDEX IF NOT EXISTS idx_plans_updated_at ON plans(updated_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Plans ────────────────────────────────────────────────────────

    /// Insert or fully replace a stored plan.
    pub fn replace_plan(&self, record: &PlanRecord) -> Result<(), DatabaseError> {
        let data = to_json(&record.plan)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO plans (id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                data,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_plan(&self, id: &str) -> Result<Option<PlanRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, data, created_at, updated_at FROM plans WHERE id = ?1",
                params![id],
                plan_row,
            )
            .optional()?;
        row.map(into_plan_record).transpose()
    }

    /// The most recently updated plan, if any.
    pub fn latest_plan(&self) -> Result<Option<PlanRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, data, created_at, updated_at FROM plans
                 ORDER BY updated_at DESC LIMIT 1",
                [],
                plan_row,
            )
            .optional()?;
        row.map(into_plan_record).transpose()
    }

    // ── Subjects ─────────────────────────────────────────────────────

    /// Insert or fully replace a subject.
    pub fn replace_subject(&self, subject: &Subject) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO subjects (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![subject.id, subject.name, subject.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM subjects WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(id, name, created_at)| {
            Ok(Subject {
                id,
                name,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .transpose()
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM subjects ORDER BY created_at")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut subjects = Vec::new();
        for row in rows {
            let (id, name, created_at) = row?;
            subjects.push(Subject {
                id,
                name,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(subjects)
    }

    // ── Chapters ─────────────────────────────────────────────────────

    /// Insert or fully replace a chapter record.
    pub fn replace_chapter(&self, chapter: &Chapter) -> Result<(), DatabaseError> {
        let data = to_json(chapter)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO chapters (id, subject_id, data, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                chapter.id,
                chapter.subject_id,
                data,
                chapter.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, DatabaseError> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM chapters WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        data.map(|raw| from_json(&raw)).transpose()
    }

    pub fn list_chapters(&self) -> Result<Vec<Chapter>, DatabaseError> {
        self.collect_chapters("SELECT data FROM chapters ORDER BY updated_at", [])
    }

    pub fn list_chapters_by_subject(&self, subject_id: &str) -> Result<Vec<Chapter>, DatabaseError> {
        self.collect_chapters(
            "SELECT data FROM chapters WHERE subject_id = ?1 ORDER BY updated_at",
            params![subject_id],
        )
    }

    fn collect_chapters<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Chapter>, DatabaseError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

        let mut chapters = Vec::new();
        for row in rows {
            chapters.push(from_json(&row?)?);
        }
        Ok(chapters)
    }
}

type PlanRow = (String, String, String, String);

fn plan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
    ))
}

fn into_plan_record((id, data, created_at, updated_at): PlanRow) -> Result<PlanRecord, DatabaseError> {
    Ok(PlanRecord {
        id,
        plan: from_json(&data)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{raw}': {e}")))
}

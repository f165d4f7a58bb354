//! SQLite-based medication storage.
//!
//! Provides persistent storage for:
//! - Medication records
//! - A dose log (one row per dose taken)
//!
//! The engines never see this module; they take records by reference and
//! hand back values for the store to apply.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::events::Event;
use crate::medication::MedicationRecord;
use crate::supply;

/// One dose the user marked as taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseLogEntry {
    pub id: i64,
    pub medication_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub taken_at: DateTime<Utc>,
    pub status: String,
}

/// Owner of medication records.
///
/// Implementors supply the primitive operations; [`MedicationStore::take_dose`]
/// composes them with the supply tracker.
pub trait MedicationStore {
    fn add(&self, record: &MedicationRecord) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<MedicationRecord>>;

    /// All records, ordered by name then id.
    fn list(&self) -> Result<Vec<MedicationRecord>>;

    /// Returns whether a record was removed.
    fn remove(&self, id: &str) -> Result<bool>;

    fn set_supply(&self, id: &str, current_supply: Option<u32>) -> Result<()>;

    fn append_dose_log(&self, record: &MedicationRecord, taken_at: DateTime<Utc>) -> Result<i64>;

    /// Store the new supply and log the dose as one unit.
    ///
    /// The default runs the two primitives in sequence. Transactional stores
    /// override it.
    fn record_dose(
        &self,
        record: &MedicationRecord,
        updated_supply: Option<u32>,
        taken_at: DateTime<Utc>,
    ) -> Result<i64> {
        if updated_supply != record.current_supply {
            self.set_supply(&record.id, updated_supply)?;
        }
        self.append_dose_log(record, taken_at)
    }

    /// Newest first. `None` returns every medication's history.
    fn dose_history(&self, medication_id: Option<&str>) -> Result<Vec<DoseLogEntry>>;

    /// Mark one dose of `id` as taken at `taken_at`.
    ///
    /// Decrements supply through [`supply::consume_dose`], logs the dose,
    /// and reports a refill event when the new supply crosses the threshold.
    ///
    /// # Errors
    /// `NotFound` for an unknown id; storage and validation errors otherwise.
    fn take_dose(&self, id: &str, taken_at: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut record = self
            .get(id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let consumed = supply::consume_dose(&record);
        self.record_dose(&record, consumed.updated_supply, taken_at)?;
        record.current_supply = consumed.updated_supply;
        info!(medication = %id, remaining = ?consumed.updated_supply, "dose taken");

        let mut events = vec![Event::DoseConsumed {
            medication_id: record.id.clone(),
            remaining_supply: consumed.updated_supply,
            underflow: consumed.underflow,
            at: taken_at,
        }];

        if supply::evaluate(&record)?.refill_due {
            if let (Some(current_supply), Some(refill_threshold)) =
                (record.current_supply, record.refill_threshold)
            {
                events.push(Event::RefillDue {
                    medication_id: record.id.clone(),
                    medication_name: record.name.clone(),
                    current_supply,
                    refill_threshold,
                    at: taken_at,
                });
            }
        }
        Ok(events)
    }
}

/// SQLite database for medication storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/mediremind.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("mediremind.db");
        Self::open_at(&path)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS medications (
                    id                       TEXT PRIMARY KEY,
                    name                     TEXT NOT NULL,
                    dosage                   TEXT NOT NULL DEFAULT '',
                    frequency_id             TEXT NOT NULL,
                    duration_id              TEXT NOT NULL,
                    start_date               TEXT NOT NULL,
                    current_supply           INTEGER,
                    refill_threshold         INTEGER,
                    refill_reminders_enabled INTEGER NOT NULL DEFAULT 0,
                    reminders_enabled        INTEGER NOT NULL DEFAULT 1,
                    notes                    TEXT NOT NULL DEFAULT ''
                );

                CREATE TABLE IF NOT EXISTS dose_log (
                    id              INTEGER PRIMARY KEY AUTOINCREMENT,
                    medication_id   TEXT NOT NULL,
                    medication_name TEXT NOT NULL,
                    dosage          TEXT NOT NULL DEFAULT '',
                    taken_at        TEXT NOT NULL,
                    status          TEXT NOT NULL DEFAULT 'taken'
                );

                CREATE INDEX IF NOT EXISTS idx_dose_log_medication ON dose_log(medication_id);
                CREATE INDEX IF NOT EXISTS idx_dose_log_taken_at ON dose_log(taken_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }
}

fn corrupt(table: &str, message: impl Into<String>) -> CoreError {
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: message.into(),
    }
    .into()
}

/// Raw medication row before date parsing.
struct MedicationRow {
    record: MedicationRecord,
    start_date: String,
}

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<MedicationRow> {
    let start_date: String = row.get(5)?;
    Ok(MedicationRow {
        record: MedicationRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            dosage: row.get(2)?,
            frequency_id: row.get(3)?,
            duration_id: row.get(4)?,
            start_date: NaiveDate::MIN,
            current_supply: row.get(6)?,
            refill_threshold: row.get(7)?,
            refill_reminders_enabled: row.get(8)?,
            reminders_enabled: row.get(9)?,
            notes: row.get(10)?,
        },
        start_date,
    })
}

fn finish_medication(row: MedicationRow) -> Result<MedicationRecord> {
    let mut record = row.record;
    record.start_date = NaiveDate::parse_from_str(&row.start_date, "%Y-%m-%d")
        .map_err(|e| corrupt("medications", format!("start_date '{}': {e}", row.start_date)))?;
    Ok(record)
}

const MEDICATION_COLUMNS: &str = "id, name, dosage, frequency_id, duration_id, start_date,
     current_supply, refill_threshold, refill_reminders_enabled, reminders_enabled, notes";

impl MedicationStore for Database {
    fn add(&self, record: &MedicationRecord) -> Result<()> {
        record.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO medications ({MEDICATION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                record.id,
                record.name,
                record.dosage,
                record.frequency_id,
                record.duration_id,
                record.start_date.format("%Y-%m-%d").to_string(),
                record.current_supply,
                record.refill_threshold,
                record.refill_reminders_enabled,
                record.reminders_enabled,
                record.notes,
            ],
        )?;
        info!(medication = %record.id, name = %record.name, "medication added");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<MedicationRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1"),
                params![id],
                medication_from_row,
            )
            .optional()?;
        row.map(finish_medication).transpose()
    }

    fn list(&self) -> Result<Vec<MedicationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY name COLLATE NOCASE, id"
        ))?;
        let rows = stmt.query_map([], medication_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(finish_medication(row?)?);
        }
        Ok(out)
    }

    fn remove(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    fn set_supply(&self, id: &str, current_supply: Option<u32>) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE medications SET current_supply = ?2 WHERE id = ?1",
            params![id, current_supply],
        )?;
        if n == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn append_dose_log(&self, record: &MedicationRecord, taken_at: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO dose_log (medication_id, medication_name, dosage, taken_at, status)
             VALUES (?1, ?2, ?3, ?4, 'taken')",
            params![record.id, record.name, record.dosage, taken_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn record_dose(
        &self,
        record: &MedicationRecord,
        updated_supply: Option<u32>,
        taken_at: DateTime<Utc>,
    ) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        if updated_supply != record.current_supply {
            let n = tx.execute(
                "UPDATE medications SET current_supply = ?2 WHERE id = ?1",
                params![record.id, updated_supply],
            )?;
            if n == 0 {
                return Err(CoreError::NotFound(record.id.clone()));
            }
        }
        tx.execute(
            "INSERT INTO dose_log (medication_id, medication_name, dosage, taken_at, status)
             VALUES (?1, ?2, ?3, ?4, 'taken')",
            params![record.id, record.name, record.dosage, taken_at.to_rfc3339()],
        )?;
        let log_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(log_id)
    }

    fn dose_history(&self, medication_id: Option<&str>) -> Result<Vec<DoseLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, medication_id, medication_name, dosage, taken_at, status
             FROM dose_log
             WHERE ?1 IS NULL OR medication_id = ?1
             ORDER BY taken_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![medication_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, medication_id, medication_name, dosage, taken_at, status) = row?;
            let taken_at = DateTime::parse_from_rfc3339(&taken_at)
                .map_err(|e| corrupt("dose_log", format!("taken_at '{taken_at}': {e}")))?
                .with_timezone(&Utc);
            out.push(DoseLogEntry {
                id,
                medication_id,
                medication_name,
                dosage,
                taken_at,
                status,
            });
        }
        Ok(out)
    }
}

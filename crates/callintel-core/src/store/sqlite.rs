use super::{CallQuery, CallSnapshot, CallStore, PurposeCatalog};
use crate::error::Result;
use crate::events::{CompletedCall, MissedCall};
use crate::range::parse_instant;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Tables the store reads. Event times are ISO-8601 text.
pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS valid_calls (
        id INTEGER PRIMARY KEY,
        location_name TEXT NOT NULL,
        event_time TEXT NOT NULL,
        call_type TEXT,
        call_purpose TEXT
    );
    CREATE TABLE IF NOT EXISTS missed_calls (
        id INTEGER PRIMARY KEY,
        location_name TEXT NOT NULL,
        event_time TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS call_purposes (
        id INTEGER PRIMARY KEY,
        purpose TEXT NOT NULL
    );
";

/// Read-only view over a call database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn location_names(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT location_name FROM valid_calls
             UNION
             SELECT location_name FROM missed_calls",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .filter_map(|r| r.transpose())
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn completed_calls(conn: &Connection, query: &CallQuery) -> Result<Vec<CompletedCall>> {
        let mut stmt = conn.prepare(
            "SELECT location_name, event_time, call_type, call_purpose
             FROM valid_calls
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut calls = Vec::new();
        for row in rows {
            let (location_name, event_time, call_type, call_purpose) = row?;
            let Some((location_name, event_time)) =
                checked_row("valid_calls", location_name, event_time)
            else {
                continue;
            };
            if !query.matches_location(&location_name) {
                continue;
            }
            calls.push(CompletedCall {
                location_name,
                event_time,
                call_type,
                call_purpose,
            });
        }
        Ok(calls)
    }

    fn missed_calls(conn: &Connection, query: &CallQuery) -> Result<Vec<MissedCall>> {
        let mut stmt =
            conn.prepare("SELECT location_name, event_time FROM missed_calls ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
            ))
        })?;

        let mut calls = Vec::new();
        for row in rows {
            let (location_name, event_time) = row?;
            let Some((location_name, event_time)) =
                checked_row("missed_calls", location_name, event_time)
            else {
                continue;
            };
            if !query.matches_location(&location_name) {
                continue;
            }
            calls.push(MissedCall {
                location_name,
                event_time,
            });
        }
        Ok(calls)
    }
}

fn checked_row(
    table: &'static str,
    location_name: Option<String>,
    event_time: Option<String>,
) -> Option<(String, chrono::NaiveDateTime)> {
    let location_name = location_name?;
    let raw_time = event_time.unwrap_or_default();
    match parse_instant(&raw_time) {
        Some(time) => Some((location_name, time)),
        None => {
            tracing::warn!(
                table,
                event_time = %raw_time,
                "skipping row with unparseable event time"
            );
            None
        }
    }
}

impl CallStore for SqliteStore {
    fn snapshot(&self, query: &CallQuery) -> Result<CallSnapshot> {
        // Both sources are read inside one transaction so a concurrent
        // writer cannot land between them.
        let tx = self.conn.unchecked_transaction()?;
        let snapshot = CallSnapshot {
            location_names: Self::location_names(&tx)?,
            completed: Self::completed_calls(&tx, query)?,
            missed: Self::missed_calls(&tx, query)?,
        };
        tx.commit()?;

        tracing::debug!(
            locations = snapshot.location_names.len(),
            completed = snapshot.completed.len(),
            missed = snapshot.missed.len(),
            "read call snapshot from sqlite"
        );
        Ok(snapshot)
    }
}

impl PurposeCatalog for SqliteStore {
    fn purposes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT purpose FROM call_purposes ORDER BY id")?;
        let purposes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(purposes)
    }
}

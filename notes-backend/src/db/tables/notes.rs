//! Notes table operations

use chrono::Duration;
use notes_types::{Note, DEFAULT_TITLE};
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row, Transaction, TransactionBehavior};

use super::super::sqlite::{format_timestamp, now, parse_timestamp};
use super::super::Database;

const NOTE_COLUMNS: &str = "id, title, text, created_at, updated_at, user_id";

fn note_from_row(row: &Row) -> SqliteResult<Note> {
    let created_at_str: String = row.get(3)?;
    let updated_at_str: String = row.get(4)?;

    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        created_at: parse_timestamp(3, &created_at_str)?,
        updated_at: parse_timestamp(4, &updated_at_str)?,
        user_id: row.get(5)?,
    })
}

impl Database {
    /// Insert a note with the default title and empty text
    pub fn create_note(&self, user_id: Option<&str>) -> SqliteResult<Note> {
        self.with_conn(|conn| {
            let now = now();
            let now_str = format_timestamp(&now);

            conn.execute(
                "INSERT INTO notes (title, text, created_at, updated_at, user_id) VALUES (?1, ?2, ?3, ?3, ?4)",
                params![DEFAULT_TITLE, "", &now_str, user_id],
            )?;

            Ok(Note {
                id: conn.last_insert_rowid(),
                title: DEFAULT_TITLE.to_string(),
                text: String::new(),
                created_at: now,
                updated_at: now,
                user_id: user_id.map(|s| s.to_string()),
            })
        })
    }

    /// All notes, most recently updated first
    pub fn list_notes(&self) -> SqliteResult<Vec<Note>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM notes ORDER BY updated_at DESC, id DESC",
                NOTE_COLUMNS
            ))?;

            let notes = stmt
                .query_map([], note_from_row)?
                .collect::<SqliteResult<Vec<_>>>()?;
            Ok(notes)
        })
    }

    /// Notes owned by `user_id`, most recently updated first
    pub fn list_notes_for_user(&self, user_id: &str) -> SqliteResult<Vec<Note>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM notes WHERE user_id = ?1 ORDER BY updated_at DESC, id DESC",
                NOTE_COLUMNS
            ))?;

            let notes = stmt
                .query_map([user_id], note_from_row)?
                .collect::<SqliteResult<Vec<_>>>()?;
            Ok(notes)
        })
    }

    pub fn get_note(&self, id: i64) -> SqliteResult<Option<Note>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [id],
                note_from_row,
            )
            .optional()
        })
    }

    /// Overwrite title and/or text and bump `updated_at`.
    ///
    /// `None` fields keep their stored value. Returns `None` if no note has
    /// this id. The new `updated_at` is always strictly later than the old one,
    /// even when two writes land within the same clock tick.
    pub fn update_note(
        &self,
        id: i64,
        title: Option<&str>,
        text: Option<&str>,
    ) -> SqliteResult<Option<Note>> {
        self.with_conn(|conn| {
            // Take the write lock up front so the read and the write see the same row
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

            let previous: Option<String> = tx
                .query_row("SELECT updated_at FROM notes WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            let previous = match previous {
                Some(raw) => parse_timestamp(0, &raw)?,
                None => return Ok(None),
            };

            let mut updated_at = now();
            if updated_at <= previous {
                updated_at = previous + Duration::microseconds(1);
            }

            tx.execute(
                "UPDATE notes SET title = COALESCE(?1, title), text = COALESCE(?2, text), updated_at = ?3 WHERE id = ?4",
                params![title, text, format_timestamp(&updated_at), id],
            )?;

            let note = tx.query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [id],
                note_from_row,
            )?;
            tx.commit()?;

            Ok(Some(note))
        })
    }

    /// Hard delete. Returns whether a row was removed.
    pub fn delete_note(&self, id: i64) -> SqliteResult<bool> {
        self.with_conn(|conn| {
            let rows_affected = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
            Ok(rows_affected > 0)
        })
    }
}

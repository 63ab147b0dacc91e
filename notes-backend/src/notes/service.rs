//! NoteService is the async face of the notes table.
//!
//! Each call moves its SQLite work onto the blocking pool, where it opens and
//! closes its own connection. Calls never share state, so any number may run
//! concurrently; SQLite serializes the writes.

use notes_types::Note;
use std::sync::Arc;

use super::error::{NoteError, Result};
use crate::db::Database;

#[derive(Clone)]
pub struct NoteService {
    db: Arc<Database>,
}

impl NoteService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(db.as_ref()))
            .await
            .map_err(|e| NoteError::Task(e.to_string()))?
    }

    /// Create a note with default title/text, owned by `user_id` if given
    pub async fn create(&self, user_id: Option<String>) -> Result<Note> {
        self.run(move |db| Ok(db.create_note(user_id.as_deref())?)).await
    }

    pub async fn list_all(&self) -> Result<Vec<Note>> {
        self.run(|db| Ok(db.list_notes()?)).await
    }

    pub async fn list_by_user(&self, user_id: String) -> Result<Vec<Note>> {
        self.run(move |db| Ok(db.list_notes_for_user(&user_id)?)).await
    }

    /// `list_by_user` when an owner is given, otherwise `list_all`
    pub async fn list(&self, user_id: Option<String>) -> Result<Vec<Note>> {
        match user_id {
            Some(user_id) => self.list_by_user(user_id).await,
            None => self.list_all().await,
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Note> {
        self.run(move |db| db.get_note(id)?.ok_or(NoteError::NotFound(id)))
            .await
    }

    pub async fn update(&self, id: i64, title: Option<String>, text: Option<String>) -> Result<Note> {
        self.run(move |db| {
            db.update_note(id, title.as_deref(), text.as_deref())?
                .ok_or(NoteError::NotFound(id))
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.run(move |db| {
            if db.delete_note(id)? {
                Ok(())
            } else {
                Err(NoteError::NotFound(id))
            }
        })
        .await
    }
}

//! Shared types for the notes backend and its HTTP clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Title given to every freshly created note
pub const DEFAULT_TITLE: &str = "New Note";

// =====================================================
// Domain Types
// =====================================================

/// A title/text record with timestamps, optionally owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

// =====================================================
// Request Types
// =====================================================

/// Body of `POST /api/notes`. The whole body is optional.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// Owner of the new note. Accepts either a JSON string or a number.
    #[serde(default, deserialize_with = "user_id_lenient")]
    pub user_id: Option<String>,
}

/// Body of `PUT /api/notes/{id}`. Omitted fields keep their stored value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Query string accepted by the list and delete endpoints
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

/// Response of `POST /api/notes`: the refreshed list plus the id just assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteResponse {
    pub notes: Vec<Note>,
    pub new_note_id: i64,
}

/// Response of `DELETE /api/notes/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Older clients send numeric user ids; store them as text either way.
fn user_id_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Text(String),
        Int(i64),
    }

    Ok(Option::<RawUserId>::deserialize(deserializer)?.map(|raw| match raw {
        RawUserId::Text(s) => s,
        RawUserId::Int(n) => n.to_string(),
    }))
}

//! Note store service: async CRUD over the `notes` table.

pub mod error;
pub mod service;

pub use error::NoteError;
pub use service::NoteService;

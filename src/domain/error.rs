// src/domain/error.rs
use crate::domain::NoteId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("Record store error: {0}")]
    RecordStore(String),
    #[error("Blob store error for key '{key}': {message}")]
    BlobStore { key: String, message: String },
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not signed in. Run `cloudnotes login` first")]
    NotAuthenticated,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Operation cancelled: the session was closed")]
    Cancelled,
}

impl DomainError {
    pub fn blob(key: impl Into<String>, message: impl ToString) -> Self {
        Self::BlobStore {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

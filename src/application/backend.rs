// src/application/backend.rs
use crate::domain::{AuthSession, DomainError, NoteId, NoteRecord};
use async_trait::async_trait;
use url::Url;

/// Input of the create-note mutation. `image` is the uploaded file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNoteInput {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

/// Structured data store holding note records.
#[async_trait]
pub trait NoteApi: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, DomainError>;

    /// Returns the record as created, with its server-assigned id.
    async fn create_note(&self, input: CreateNoteInput) -> Result<NoteRecord, DomainError>;

    async fn delete_note(&self, id: &NoteId) -> Result<(), DomainError>;
}

/// Object storage for note images, keyed by note name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), DomainError>;

    /// Resolve a key to a URL the presentation layer can fetch.
    async fn url(&self, key: &str) -> Result<Url, DomainError>;

    async fn remove(&self, key: &str) -> Result<(), DomainError>;

    async fn exists(&self, key: &str) -> Result<bool, DomainError>;
}

/// External identity provider. Sign-in itself happens outside this crate;
/// we only keep and drop the resulting credentials.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn current_session(&self) -> Result<Option<AuthSession>, DomainError>;

    async fn sign_in(&self, username: &str, access_token: &str)
        -> Result<AuthSession, DomainError>;

    async fn sign_out(&self) -> Result<(), DomainError>;
}

// src/application/note_deleter.rs
use crate::application::{BlobStore, NoteApi};
use crate::domain::{DomainError, NoteId};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct NoteDeleter<A: NoteApi, B: BlobStore> {
    api: Arc<A>,
    blobs: Arc<B>,
}

impl<A: NoteApi, B: BlobStore> NoteDeleter<A, B> {
    pub fn new(api: Arc<A>, blobs: Arc<B>) -> Self {
        Self { api, blobs }
    }

    /// Remove the note's blob, then its record.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_note(&self, id: &NoteId, name: &str) -> Result<(), DomainError> {
        debug!(key = name, "Removing note image");
        self.blobs.remove(name).await?;
        self.api.delete_note(id).await?;

        info!(note_id = %id, "Deleted note");
        Ok(())
    }
}

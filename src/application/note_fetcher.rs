// src/application/note_fetcher.rs
use crate::application::{BlobStore, NoteApi};
use crate::domain::{DomainError, Note, NoteId, NoteRecord};
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// How image resolution failures affect a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationMode {
    /// One failed lookup fails the whole fetch.
    #[default]
    Strict,
    /// Failed lookups are reported and the note is shown without image.
    Partial,
}

/// Result of a fetch that tolerates per-note image failures.
#[derive(Debug)]
pub struct HydratedNotes {
    pub notes: Vec<Note>,
    pub failures: Vec<(NoteId, DomainError)>,
}

pub struct NoteFetcher<A: NoteApi, B: BlobStore> {
    api: Arc<A>,
    blobs: Arc<B>,
}

impl<A: NoteApi, B: BlobStore> NoteFetcher<A, B> {
    pub fn new(api: Arc<A>, blobs: Arc<B>) -> Self {
        Self { api, blobs }
    }

    /// List all notes and resolve every image to a fetchable URL.
    ///
    /// Lookups run concurrently; the first failure fails the whole fetch and
    /// no partial list is returned.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_notes(&self) -> Result<Vec<Note>, DomainError> {
        let records = self.api.list_notes().await?;
        debug!(count = records.len(), "Fetched note records");

        try_join_all(records.into_iter().map(|record| self.hydrate(record))).await
    }

    /// Like [`fetch_notes`](Self::fetch_notes), but collects lookup failures
    /// per note instead of failing the batch.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_notes_settled(&self) -> Result<HydratedNotes, DomainError> {
        let records = self.api.list_notes().await?;
        debug!(count = records.len(), "Fetched note records");

        let outcomes = join_all(records.into_iter().map(|record| async move {
            let fallback = record.clone();
            match self.hydrate(record).await {
                Ok(note) => (note, None),
                Err(e) => (Note::hydrated(fallback, None), Some(e)),
            }
        }))
        .await;

        let mut hydrated = HydratedNotes {
            notes: Vec::with_capacity(outcomes.len()),
            failures: vec![],
        };
        for (note, failure) in outcomes {
            if let Some(e) = failure {
                warn!(note_id = %note.id, error = %e, "Could not resolve note image");
                hydrated.failures.push((note.id.clone(), e));
            }
            hydrated.notes.push(note);
        }
        Ok(hydrated)
    }

    async fn hydrate(&self, record: NoteRecord) -> Result<Note, DomainError> {
        if !record.has_image() {
            return Ok(Note::hydrated(record, None));
        }
        let url = self.blobs.url(record.blob_key()).await?;
        Ok(Note::hydrated(record, Some(url)))
    }
}

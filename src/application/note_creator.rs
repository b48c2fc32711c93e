// src/application/note_creator.rs
use crate::application::{BlobStore, CreateNoteInput, NoteApi};
use crate::domain::{DomainError, NoteForm, NoteRecord};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct NoteCreator<A: NoteApi, B: BlobStore> {
    api: Arc<A>,
    blobs: Arc<B>,
}

impl<A: NoteApi, B: BlobStore> NoteCreator<A, B> {
    pub fn new(api: Arc<A>, blobs: Arc<B>) -> Self {
        Self { api, blobs }
    }

    /// Create a note from a form submission.
    ///
    /// An attached image is uploaded under the note name before the record
    /// is created, so no record ever points at an unwritten blob. If the
    /// record creation fails afterwards the blob is left behind.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub async fn create_note(&self, form: NoteForm) -> Result<NoteRecord, DomainError> {
        form.validate()?;

        let NoteForm {
            name,
            description,
            image,
        } = form;

        let filename = match image {
            Some(upload) => {
                debug!(key = %name, bytes = upload.bytes.len(), "Uploading note image");
                self.blobs.put(&name, upload.bytes).await?;
                Some(upload.filename)
            }
            None => None,
        };

        let record = self
            .api
            .create_note(CreateNoteInput {
                name,
                description,
                image: filename,
            })
            .await?;

        info!(note_id = %record.id, "Created note");
        Ok(record)
    }
}

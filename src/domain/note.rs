// src/domain/note.rs
use crate::domain::DomainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use url::Url;

/// Server-assigned note identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A note as the data API stores it.
///
/// `image` is the file name given at upload time, never a URL. The blob
/// itself lives in object storage under the note's `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

impl NoteRecord {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Storage key of the note's image blob.
    pub fn blob_key(&self) -> &str {
        &self.name
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// A note hydrated for display: `image` is a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    pub image: Option<Url>,
}

impl Note {
    pub fn hydrated(record: NoteRecord, image: Option<Url>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            image,
        }
    }
}

/// Binary content picked for upload alongside a new note.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A create-note form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

impl NoteForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Name and description are required; everything else is up to the backend.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("note name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "note description is required".to_string(),
            ));
        }
        if let Some(image) = &self.image {
            if image.filename.is_empty() {
                return Err(DomainError::InvalidInput(
                    "image file name is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Credentials handed out by the external sign-in flow.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub username: String,
    pub access_token: String,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

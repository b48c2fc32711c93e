// src/application/mod.rs
pub mod auth_gate;
pub mod backend;
pub mod ledger;
pub mod note_creator;
pub mod note_deleter;
pub mod note_fetcher;
pub mod session;

pub use auth_gate::AuthGate;
pub use backend::{AuthService, BlobStore, CreateNoteInput, NoteApi};
pub use ledger::{PendingDelete, PendingLedger};
pub use note_creator::NoteCreator;
pub use note_deleter::NoteDeleter;
pub use note_fetcher::{HydratedNotes, HydrationMode, NoteFetcher};
pub use session::NoteSession;

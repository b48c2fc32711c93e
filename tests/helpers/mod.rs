use cloudnotes::application::{HydrationMode, NoteSession};
use cloudnotes::util::testing::{
    CallLog, InMemoryBlobStore, InMemoryBlobStoreBuilder, InMemoryNoteApi,
    InMemoryNoteApiBuilder, MockAuthService,
};
use std::sync::Arc;

#[allow(dead_code)]
pub type TestSession = NoteSession<InMemoryNoteApi, InMemoryBlobStore, MockAuthService>;

/// In-memory backends wired together, with a shared call log
#[allow(dead_code)]
pub struct TestBackend {
    pub api: Arc<InMemoryNoteApi>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub auth: Arc<MockAuthService>,
    pub log: CallLog,
}

#[allow(dead_code)]
impl TestBackend {
    /// Backend seeded with the golden notes below
    pub fn seeded() -> Self {
        Self::custom(
            |api| {
                api.with_record(test_notes::TRIP, "Trip", "Beach day", Some("beach.png"))
                    .with_record(test_notes::GROCERIES, "Groceries", "milk, eggs", None)
                    .with_record(test_notes::RECIPE, "Recipe", "Pancakes", Some("pancakes.jpg"))
            },
            |blobs| {
                blobs
                    .with_blob("Trip", b"beach-png")
                    .with_blob("Recipe", b"pancakes-jpg")
            },
        )
    }

    pub fn empty() -> Self {
        Self::custom(|api| api, |blobs| blobs)
    }

    pub fn custom(
        api: impl FnOnce(InMemoryNoteApiBuilder) -> InMemoryNoteApiBuilder,
        blobs: impl FnOnce(InMemoryBlobStoreBuilder) -> InMemoryBlobStoreBuilder,
    ) -> Self {
        let log = CallLog::new();
        Self {
            api: Arc::new(api(InMemoryNoteApi::builder().with_call_log(log.clone())).build()),
            blobs: Arc::new(
                blobs(InMemoryBlobStore::builder().with_call_log(log.clone())).build(),
            ),
            auth: Arc::new(MockAuthService::signed_in("ada")),
            log,
        }
    }

    /// Mounted but not yet fetched
    pub fn session(&self) -> TestSession {
        NoteSession::mount(
            self.api.clone(),
            self.blobs.clone(),
            self.auth.clone(),
            HydrationMode::Strict,
        )
    }
}

/// Known note IDs of the seeded backend
#[allow(dead_code)]
pub mod test_notes {
    // Notes with images
    pub const TRIP: &str = "note-trip";
    pub const RECIPE: &str = "note-recipe";

    // Text only
    pub const GROCERIES: &str = "note-groceries";

    // For testing error cases
    pub const NONEXISTENT: &str = "note-does-not-exist";
}

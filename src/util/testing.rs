// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use url::Url;
use uuid::Uuid;

use crate::application::{AuthService, BlobStore, CreateNoteInput, NoteApi};
use crate::domain::{AuthSession, DomainError, NoteId, NoteRecord};

/// Base of the URLs handed out by [`InMemoryBlobStore`].
pub const TEST_BLOB_BASE_URL: &str = "https://blobs.test/";

/// Ordered record of backend calls, shared between doubles so tests can
/// assert on cross-service ordering.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        lock(&self.0).push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.0).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory stand-in for the GraphQL data API.
///
/// Ids are assigned on create, like the real backend does. Failures can be
/// injected per operation and `list_notes` can be held on a [`Notify`] gate
/// to observe state while a fetch is in flight.
///
/// # Examples
///
/// ```
/// use cloudnotes::util::testing::InMemoryNoteApi;
///
/// let api = InMemoryNoteApi::builder()
///     .with_record("n1", "Groceries", "milk, eggs", None)
///     .failing_create()
///     .build();
/// assert_eq!(api.records().len(), 1);
/// ```
pub struct InMemoryNoteApi {
    records: Mutex<Vec<NoteRecord>>,
    fail_list: bool,
    fail_create: bool,
    fail_delete: bool,
    list_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl InMemoryNoteApi {
    pub fn builder() -> InMemoryNoteApiBuilder {
        InMemoryNoteApiBuilder::new()
    }

    pub fn records(&self) -> Vec<NoteRecord> {
        lock(&self.records).clone()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        lock(&self.records).iter().any(|r| &r.id == id)
    }
}

#[async_trait]
impl NoteApi for InMemoryNoteApi {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, DomainError> {
        self.log.record("api.list");
        // Snapshot first so a gated call answers with what the backend held
        // when the request arrived.
        let records = self.records();
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        if self.fail_list {
            return Err(DomainError::RecordStore("injected list failure".to_string()));
        }
        Ok(records)
    }

    async fn create_note(&self, input: CreateNoteInput) -> Result<NoteRecord, DomainError> {
        self.log.record(format!("api.create:{}", input.name));
        if self.fail_create {
            return Err(DomainError::RecordStore(
                "injected create failure".to_string(),
            ));
        }
        let record = NoteRecord {
            id: NoteId::new(Uuid::new_v4().to_string()),
            name: input.name,
            description: input.description,
            image: input.image,
        };
        lock(&self.records).push(record.clone());
        Ok(record)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), DomainError> {
        self.log.record(format!("api.delete:{}", id));
        if self.fail_delete {
            return Err(DomainError::RecordStore(
                "injected delete failure".to_string(),
            ));
        }
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(DomainError::NoteNotFound(id.clone()));
        }
        Ok(())
    }
}

/// Builder for InMemoryNoteApi
pub struct InMemoryNoteApiBuilder {
    records: Vec<NoteRecord>,
    fail_list: bool,
    fail_create: bool,
    fail_delete: bool,
    list_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl InMemoryNoteApiBuilder {
    pub fn new() -> Self {
        Self {
            records: vec![],
            fail_list: false,
            fail_create: false,
            fail_delete: false,
            list_gate: None,
            log: CallLog::new(),
        }
    }

    /// Seed a record as if it had been created earlier
    pub fn with_record(
        mut self,
        id: &str,
        name: &str,
        description: &str,
        image: Option<&str>,
    ) -> Self {
        self.records.push(NoteRecord {
            id: NoteId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            image: image.map(str::to_string),
        });
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Hold every `list_notes` call until the gate is notified. The answer is
    /// the record set from when the call began.
    pub fn with_list_gate(mut self, gate: Arc<Notify>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> InMemoryNoteApi {
        InMemoryNoteApi {
            records: Mutex::new(self.records),
            fail_list: self.fail_list,
            fail_create: self.fail_create,
            fail_delete: self.fail_delete,
            list_gate: self.list_gate,
            log: self.log,
        }
    }
}

impl Default for InMemoryNoteApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory object store. URLs are `TEST_BLOB_BASE_URL` joined with the key.
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing_url_keys: HashSet<String>,
    fail_put: bool,
    fail_remove: bool,
    remove_gate: Option<Arc<Notify>>,
    url_lookups: AtomicUsize,
    log: CallLog,
}

impl InMemoryBlobStore {
    pub fn builder() -> InMemoryBlobStoreBuilder {
        InMemoryBlobStoreBuilder::new()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).get(key).cloned()
    }

    pub fn url_lookups(&self) -> usize {
        self.url_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), DomainError> {
        self.log.record(format!("blob.put:{}", key));
        if self.fail_put {
            return Err(DomainError::blob(key, "injected put failure"));
        }
        lock(&self.blobs).insert(key.to_string(), bytes);
        Ok(())
    }

    async fn url(&self, key: &str) -> Result<Url, DomainError> {
        self.url_lookups.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("blob.url:{}", key));
        if self.failing_url_keys.contains(key) {
            return Err(DomainError::blob(key, "injected lookup failure"));
        }
        Url::parse(TEST_BLOB_BASE_URL)
            .and_then(|base| base.join(key))
            .map_err(|e| DomainError::blob(key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.log.record(format!("blob.remove:{}", key));
        if let Some(gate) = &self.remove_gate {
            gate.notified().await;
        }
        if self.fail_remove {
            return Err(DomainError::blob(key, "injected remove failure"));
        }
        lock(&self.blobs).remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(lock(&self.blobs).contains_key(key))
    }
}

/// Builder for InMemoryBlobStore
pub struct InMemoryBlobStoreBuilder {
    blobs: HashMap<String, Vec<u8>>,
    failing_url_keys: HashSet<String>,
    fail_put: bool,
    fail_remove: bool,
    remove_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl InMemoryBlobStoreBuilder {
    pub fn new() -> Self {
        Self {
            blobs: HashMap::new(),
            failing_url_keys: HashSet::new(),
            fail_put: false,
            fail_remove: false,
            remove_gate: None,
            log: CallLog::new(),
        }
    }

    pub fn with_blob(mut self, key: &str, bytes: &[u8]) -> Self {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        self
    }

    /// Make URL resolution fail for a specific key
    pub fn failing_url(mut self, key: &str) -> Self {
        self.failing_url_keys.insert(key.to_string());
        self
    }

    pub fn failing_put(mut self) -> Self {
        self.fail_put = true;
        self
    }

    pub fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    /// Hold every `remove` call until the gate is notified
    pub fn with_remove_gate(mut self, gate: Arc<Notify>) -> Self {
        self.remove_gate = Some(gate);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> InMemoryBlobStore {
        InMemoryBlobStore {
            blobs: Mutex::new(self.blobs),
            failing_url_keys: self.failing_url_keys,
            fail_put: self.fail_put,
            fail_remove: self.fail_remove,
            remove_gate: self.remove_gate,
            url_lookups: AtomicUsize::new(0),
            log: self.log,
        }
    }
}

impl Default for InMemoryBlobStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Auth double holding an optional signed-in session.
pub struct MockAuthService {
    session: Mutex<Option<AuthSession>>,
    fail_sign_out: bool,
    sign_out_calls: AtomicUsize,
}

impl MockAuthService {
    pub fn signed_in(username: &str) -> Self {
        Self {
            session: Mutex::new(Some(AuthSession {
                username: username.to_string(),
                access_token: format!("token-for-{}", username),
            })),
            fail_sign_out: false,
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            session: Mutex::new(None),
            fail_sign_out: false,
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn current_session(&self) -> Result<Option<AuthSession>, DomainError> {
        Ok(lock(&self.session).clone())
    }

    async fn sign_in(&self, username: &str, access_token: &str) -> Result<AuthSession, DomainError> {
        let session = AuthSession {
            username: username.to_string(),
            access_token: access_token.to_string(),
        };
        *lock(&self.session) = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(DomainError::Auth("injected sign-out failure".to_string()));
        }
        *lock(&self.session) = None;
        Ok(())
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "opendal", "mio", "h2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn given_seeded_record_when_listing_then_returns_record() {
        let api = InMemoryNoteApi::builder()
            .with_record("n1", "Groceries", "milk", None)
            .build();

        let records = api.list_notes().await.expect("List should succeed");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Groceries");
    }

    #[tokio::test]
    async fn given_create_when_listing_then_record_has_assigned_id() {
        let api = InMemoryNoteApi::builder().build();

        let created = api
            .create_note(CreateNoteInput {
                name: "a".to_string(),
                description: "b".to_string(),
                image: None,
            })
            .await
            .expect("Create should succeed");

        assert!(!created.id.as_str().is_empty());
        assert!(api.contains(&created.id));
    }

    #[tokio::test]
    async fn given_unknown_id_when_deleting_then_returns_not_found() {
        let api = InMemoryNoteApi::builder().build();

        let result = api.delete_note(&NoteId::new("missing")).await;

        assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
    }

    #[tokio::test]
    async fn given_key_with_spaces_when_resolving_url_then_encodes_key() {
        let store = InMemoryBlobStore::builder().build();

        let url = store.url("My Trip").await.expect("Lookup should succeed");

        assert_eq!(url.as_str(), "https://blobs.test/My%20Trip");
    }

    #[tokio::test]
    async fn given_shared_call_log_when_calling_both_doubles_then_records_order() {
        let log = CallLog::new();
        let api = InMemoryNoteApi::builder().with_call_log(log.clone()).build();
        let store = InMemoryBlobStore::builder().with_call_log(log.clone()).build();

        store.put("k", vec![1]).await.unwrap();
        api.list_notes().await.unwrap();

        assert_eq!(log.calls(), vec!["blob.put:k", "api.list"]);
    }
}

// src/application/session.rs
use crate::application::ledger::{OpId, PendingDelete, PendingLedger, RefreshGen};
use crate::application::{
    AuthService, BlobStore, HydrationMode, NoteApi, NoteCreator, NoteDeleter, NoteFetcher,
};
use crate::domain::{DomainError, Note, NoteForm, NoteId, NoteRecord};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct SessionState {
    notes: Vec<Note>,
    ledger: PendingLedger,
    next_refresh: RefreshGen,
    /// Start generation of the refresh whose result is shown.
    applied_refresh: Option<RefreshGen>,
    closed: bool,
}

struct Inner<A: NoteApi, B: BlobStore, S: AuthService> {
    fetcher: NoteFetcher<A, B>,
    creator: NoteCreator<A, B>,
    deleter: NoteDeleter<A, B>,
    auth: Arc<S>,
    mode: HydrationMode,
    state: Mutex<SessionState>,
    /// Flips to `true` once, when the session is closed.
    lifetime: watch::Sender<bool>,
}

/// The note list of one signed-in session, from mount to sign-out.
///
/// Clones share the same state. All remote work runs under the session
/// lifetime: once the session is closed, in-flight operations resolve with
/// [`DomainError::Cancelled`] and their results are dropped.
pub struct NoteSession<A: NoteApi, B: BlobStore, S: AuthService> {
    inner: Arc<Inner<A, B, S>>,
}

impl<A: NoteApi, B: BlobStore, S: AuthService> Clone for NoteSession<A, B, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, B, S> NoteSession<A, B, S>
where
    A: NoteApi + 'static,
    B: BlobStore + 'static,
    S: AuthService + 'static,
{
    /// Start an empty session. Call [`refresh`](Self::refresh) to load notes.
    pub fn mount(api: Arc<A>, blobs: Arc<B>, auth: Arc<S>, mode: HydrationMode) -> Self {
        let (lifetime, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                fetcher: NoteFetcher::new(api.clone(), blobs.clone()),
                creator: NoteCreator::new(api.clone(), blobs.clone()),
                deleter: NoteDeleter::new(api, blobs),
                auth,
                mode,
                state: Mutex::new(SessionState::default()),
                lifetime,
            }),
        }
    }

    /// Snapshot of the notes currently shown.
    pub fn notes(&self) -> Vec<Note> {
        self.inner.state().notes.clone()
    }

    pub fn find(&self, id: &NoteId) -> Option<Note> {
        self.inner
            .state()
            .notes
            .iter()
            .find(|n| &n.id == id)
            .cloned()
    }

    /// Number of optimistic deletes still waiting on the backend.
    pub fn pending(&self) -> usize {
        self.inner.state().ledger.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state().closed
    }

    /// Re-fetch the full list from the backend and replace local state.
    ///
    /// Notes with a pending delete stay hidden even if the backend still
    /// returns them, and so do deletes confirmed after this refresh started.
    /// A result older than the one already shown is dropped.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&self) -> Result<usize, DomainError> {
        let inner = &self.inner;
        let started = {
            let mut state = inner.state();
            let generation = state.next_refresh;
            state.next_refresh += 1;
            generation
        };
        let notes = inner
            .guarded(async {
                match inner.mode {
                    HydrationMode::Strict => inner.fetcher.fetch_notes().await,
                    HydrationMode::Partial => {
                        inner.fetcher.fetch_notes_settled().await.map(|h| h.notes)
                    }
                }
            })
            .await?;

        let mut state = inner.state();
        if state.closed {
            return Err(DomainError::Cancelled);
        }
        if state.applied_refresh.is_some_and(|applied| applied > started) {
            debug!(started, "Dropping refresh overtaken by a newer one");
            return Ok(state.notes.len());
        }
        state.applied_refresh = Some(started);
        let SessionState { notes: shown, ledger, .. } = &mut *state;
        *shown = notes
            .into_iter()
            .filter(|n| !ledger.hides(&n.id, started))
            .collect();
        ledger.prune_confirmed(started);
        debug!(count = shown.len(), "Session notes refreshed");
        Ok(shown.len())
    }

    /// Create a note and re-fetch the full list.
    ///
    /// Once the record exists the create counts as done. A failed re-fetch
    /// is logged and the previous list stays in place.
    pub async fn create(&self, form: NoteForm) -> Result<NoteRecord, DomainError> {
        let record = self
            .inner
            .guarded(self.inner.creator.create_note(form))
            .await?;
        if let Err(e) = self.refresh().await {
            warn!(note_id = %record.id, error = %e, "Note created but re-fetch failed");
        }
        Ok(record)
    }

    /// Delete a note optimistically.
    ///
    /// The note leaves the local list before this returns. The returned
    /// future removes the blob and then the record; if either fails, the
    /// note is put back where it was and the error is returned.
    pub fn delete(
        &self,
        id: &NoteId,
    ) -> Result<BoxFuture<'static, Result<(), DomainError>>, DomainError> {
        let (op_id, name) = {
            let mut state = self.inner.state();
            if state.closed {
                return Err(DomainError::Cancelled);
            }
            let position = state
                .notes
                .iter()
                .position(|n| &n.id == id)
                .ok_or_else(|| DomainError::NoteNotFound(id.clone()))?;
            let note = state.notes.remove(position);
            let name = note.name.clone();
            (state.ledger.record(PendingDelete { note, position }), name)
        };
        debug!(note_id = %id, op_id, "Note removed locally, delete pending");

        let inner = Arc::clone(&self.inner);
        let id = id.clone();
        Ok(Box::pin(async move {
            let outcome = inner.guarded(inner.deleter.delete_note(&id, &name)).await;
            inner.settle_delete(op_id, &outcome);
            outcome
        }))
    }

    /// Close the session and sign out.
    ///
    /// The local list is emptied first, whatever is in flight and whatever
    /// the auth service answers.
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        self.close();
        self.inner.auth.sign_out().await
    }

    /// End the session lifetime without signing out.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl<A: NoteApi, B: BlobStore, S: AuthService> Inner<A, B, S> {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn guarded<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        let mut lifetime = self.lifetime.subscribe();
        if *lifetime.borrow() {
            return Err(DomainError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = lifetime.wait_for(|closed| *closed) => Err(DomainError::Cancelled),
            outcome = operation => outcome,
        }
    }

    fn settle_delete(&self, op_id: OpId, outcome: &Result<(), DomainError>) {
        let mut state = self.state();
        // Cleared on close; nothing to reconcile.
        let Some(pending) = state.ledger.settle(op_id) else {
            return;
        };
        match outcome {
            Ok(()) => {
                debug!(note_id = %pending.note.id, "Delete confirmed");
                let next_refresh = state.next_refresh;
                state.ledger.confirm(pending.note.id, next_refresh);
            }
            Err(e) => {
                warn!(note_id = %pending.note.id, error = %e, "Delete failed, restoring note");
                let already_shown = state.notes.iter().any(|n| n.id == pending.note.id);
                if !already_shown {
                    let position = pending.position.min(state.notes.len());
                    state.notes.insert(position, pending.note);
                }
            }
        }
    }

    fn close(&self) {
        {
            let mut state = self.state();
            state.closed = true;
            state.notes.clear();
            state.ledger.clear();
        }
        self.lifetime.send_replace(true);
        info!("Note session closed");
    }
}

// src/application/auth_gate.rs
use crate::application::{AuthService, BlobStore, HydrationMode, NoteApi, NoteSession};
use crate::domain::{AuthSession, DomainError};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point to everything behind sign-in.
pub struct AuthGate<S: AuthService> {
    auth: Arc<S>,
}

impl<S: AuthService + 'static> AuthGate<S> {
    pub fn new(auth: Arc<S>) -> Self {
        Self { auth }
    }

    /// Current credentials, or [`DomainError::NotAuthenticated`].
    pub async fn enter(&self) -> Result<AuthSession, DomainError> {
        let session = self
            .auth
            .current_session()
            .await?
            .ok_or(DomainError::NotAuthenticated)?;
        debug!(username = %session.username, "Auth gate passed");
        Ok(session)
    }

    /// Authenticate, connect the backends with the signed-in identity and
    /// mount a session with its initial fetch done.
    pub async fn mount<A, B, F>(
        &self,
        connect: F,
        mode: HydrationMode,
    ) -> Result<NoteSession<A, B, S>, DomainError>
    where
        A: NoteApi + 'static,
        B: BlobStore + 'static,
        F: FnOnce(&AuthSession) -> Result<(Arc<A>, Arc<B>), DomainError>,
    {
        let identity = self.enter().await?;
        let (api, blobs) = connect(&identity)?;

        let session = NoteSession::mount(api, blobs, Arc::clone(&self.auth), mode);
        let count = session.refresh().await?;
        info!(username = %identity.username, notes = count, "Session mounted");
        Ok(session)
    }

    pub async fn sign_in(
        &self,
        username: &str,
        access_token: &str,
    ) -> Result<AuthSession, DomainError> {
        if username.trim().is_empty() || access_token.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "username and access token are required".to_string(),
            ));
        }
        let session = self.auth.sign_in(username, access_token).await?;
        info!(username = %session.username, "Signed in");
        Ok(session)
    }

    /// Sign out without a mounted session.
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        self.auth.sign_out().await?;
        info!("Signed out");
        Ok(())
    }
}

// src/infrastructure/auth.rs
use crate::application::AuthService;
use crate::domain::{AuthSession, DomainError};
use async_trait::async_trait;
use reqwest::Client;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Keeps the credentials from the hosted sign-in in a local JSON file.
///
/// Signing out optionally notifies the identity provider before the file is
/// removed.
#[derive(Debug)]
pub struct FileAuthService {
    credentials_path: PathBuf,
    sign_out_url: Option<String>,
    client: Client,
}

impl FileAuthService {
    pub fn new(credentials_path: impl Into<PathBuf>, sign_out_url: Option<String>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            sign_out_url,
            client: Client::new(),
        }
    }

    /// Write the credentials file, readable by the owner only from creation.
    async fn write_private(&self, contents: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.credentials_path).await?;
        #[cfg(unix)]
        {
            // An existing file keeps its old mode on open.
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        file.write_all(contents).await?;
        file.flush().await
    }

    async fn revoke_remote(&self, url: &str, session: &AuthSession) -> Result<(), DomainError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| DomainError::Auth(format!("Sign-out request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Auth(format!(
                "Sign-out rejected with status {}",
                response.status()
            )));
        }
        debug!("Remote session revoked");
        Ok(())
    }
}

#[async_trait]
impl AuthService for FileAuthService {
    #[instrument(level = "debug", skip(self))]
    async fn current_session(&self) -> Result<Option<AuthSession>, DomainError> {
        let content = match tokio::fs::read_to_string(&self.credentials_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Auth(format!(
                    "Failed to read credentials {}: {}",
                    self.credentials_path.display(),
                    e
                )))
            }
        };

        let session: AuthSession = serde_json::from_str(&content)
            .map_err(|e| DomainError::Auth(format!("Corrupt credentials file: {}", e)))?;
        Ok(Some(session))
    }

    #[instrument(level = "debug", skip(self, access_token))]
    async fn sign_in(&self, username: &str, access_token: &str) -> Result<AuthSession, DomainError> {
        let session = AuthSession {
            username: username.to_string(),
            access_token: access_token.to_string(),
        };
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| DomainError::Auth(format!("Failed to encode credentials: {}", e)))?;

        if let Some(parent) = self.credentials_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Auth(format!("Failed to create credentials dir: {}", e)))?;
        }
        self.write_private(json.as_bytes())
            .await
            .map_err(|e| DomainError::Auth(format!("Failed to write credentials: {}", e)))?;

        info!(path = %self.credentials_path.display(), "Stored credentials");
        Ok(session)
    }

    /// Local credentials are removed even when the remote call fails.
    #[instrument(level = "debug", skip(self))]
    async fn sign_out(&self) -> Result<(), DomainError> {
        let session = match self.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Unreadable credentials, skipping remote sign-out");
                None
            }
        };
        let remote = match (&self.sign_out_url, session) {
            (Some(url), Some(session)) => self.revoke_remote(url, &session).await,
            _ => Ok(()),
        };
        if let Err(e) = &remote {
            warn!(error = %e, "Remote sign-out failed, dropping local credentials anyway");
        }

        match tokio::fs::remove_file(&self.credentials_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DomainError::Auth(format!(
                    "Failed to remove credentials: {}",
                    e
                )))
            }
        }
        remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn given_no_credentials_file_when_reading_session_then_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let auth = FileAuthService::new(temp_dir.path().join("credentials.json"), None);

        let session = auth.current_session().await.unwrap();

        assert!(session.is_none());
    }

    #[tokio::test]
    async fn given_sign_in_when_reading_session_then_returns_stored_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let auth = FileAuthService::new(temp_dir.path().join("nested/credentials.json"), None);

        auth.sign_in("ada", "tok-1").await.expect("Sign-in should succeed");
        let session = auth.current_session().await.unwrap().expect("Session should exist");

        assert_eq!(session.username, "ada");
        assert_eq!(session.access_token, "tok-1");
    }

    #[tokio::test]
    async fn given_signed_in_when_signing_out_then_credentials_are_removed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let auth = FileAuthService::new(&path, None);
        auth.sign_in("ada", "tok").await.unwrap();

        auth.sign_out().await.expect("Sign-out should succeed");

        assert!(!path.exists());
        assert!(auth.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn given_signed_out_when_signing_out_again_then_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let auth = FileAuthService::new(temp_dir.path().join("credentials.json"), None);

        assert!(auth.sign_out().await.is_ok());
    }

    #[tokio::test]
    async fn given_corrupt_credentials_when_reading_session_then_returns_auth_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let auth = FileAuthService::new(&path, None);

        let result = auth.current_session().await;

        assert!(matches!(result, Err(DomainError::Auth(_))));
    }

    #[tokio::test]
    async fn given_corrupt_credentials_when_signing_out_then_file_is_removed() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let auth = FileAuthService::new(&path, Some("http://127.0.0.1:9/logout".to_string()));

        // Act
        let result = auth.sign_out().await;

        // Assert
        assert!(result.is_ok(), "Nothing to revoke remotely: {:?}", result);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn given_existing_public_file_when_signing_in_then_file_becomes_private() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let auth = FileAuthService::new(&path, None);

        auth.sign_in("ada", "tok").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(auth.current_session().await.unwrap().unwrap().username, "ada");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn given_sign_in_when_storing_then_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let auth = FileAuthService::new(&path, None);

        auth.sign_in("ada", "tok").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

use cloudnotes::application::BlobStore;
use cloudnotes::domain::DomainError;
use cloudnotes::infrastructure::blob_store::create_operator_from_uri;
use cloudnotes::infrastructure::config::StorageConfig;
use cloudnotes::infrastructure::OpendalBlobStore;
use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

fn memory_store(public_base_url: Option<&str>) -> Result<OpendalBlobStore> {
    let op = create_operator_from_uri("memory://", None)?;
    let base = public_base_url.map(Url::parse).transpose()?;
    Ok(OpendalBlobStore::new(op, base, Duration::from_secs(60)))
}

#[tokio::test]
async fn given_put_blob_when_checking_then_exists_until_removed() -> Result<()> {
    // Arrange
    let store = memory_store(None)?;

    // Act
    store.put("Trip", b"png-bytes".to_vec()).await?;
    let before = store.exists("Trip").await?;
    store.remove("Trip").await?;
    let after = store.exists("Trip").await?;

    // Assert
    assert!(before);
    assert!(!after);
    Ok(())
}

#[tokio::test]
async fn given_missing_blob_when_removing_then_succeeds() -> Result<()> {
    let store = memory_store(None)?;

    store.remove("never-written").await?;

    Ok(())
}

#[tokio::test]
async fn given_public_base_url_when_resolving_then_returns_url_under_base() -> Result<()> {
    let store = memory_store(Some("http://localhost:9000/notes/"))?;

    let url = store.url("Trip").await?;

    assert_eq!(url.as_str(), "http://localhost:9000/notes/Trip");
    Ok(())
}

#[tokio::test]
async fn given_store_without_presign_or_base_url_when_resolving_then_returns_blob_error(
) -> Result<()> {
    let store = memory_store(None)?;

    let result = store.url("Trip").await;

    match result {
        Err(DomainError::BlobStore { key, .. }) => assert_eq!(key, "Trip"),
        other => panic!("Expected BlobStore error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn given_file_store_when_resolving_then_returns_file_url_of_written_blob() -> Result<()> {
    // Arrange
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_path_buf();
    let config = StorageConfig {
        uri: Url::from_directory_path(&root)
            .map_err(|_| anyhow::anyhow!("temp dir is not absolute"))?
            .to_string(),
        ..StorageConfig::default()
    };
    let store = OpendalBlobStore::from_config(&config)?;

    // Act
    store.put("Trip", b"png-bytes".to_vec()).await?;
    let url = store.url("Trip").await?;

    // Assert
    assert_eq!(url.scheme(), "file");
    let path = url
        .to_file_path()
        .map_err(|_| anyhow::anyhow!("not a file URL"))?;
    assert_eq!(std::fs::read(path)?, b"png-bytes");
    Ok(())
}

#[tokio::test]
async fn given_directory_with_space_when_storing_then_blob_lands_where_url_points() -> Result<()> {
    // Arrange
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("my dir");
    std::fs::create_dir_all(&root)?;
    let config = StorageConfig {
        uri: Url::from_directory_path(&root)
            .map_err(|_| anyhow::anyhow!("temp dir is not absolute"))?
            .to_string(),
        ..StorageConfig::default()
    };
    let store = OpendalBlobStore::from_config(&config)?;

    // Act
    store.put("Trip", b"png-bytes".to_vec()).await?;
    let url = store.url("Trip").await?;

    // Assert
    assert_eq!(std::fs::read(root.join("Trip"))?, b"png-bytes");
    assert!(!temp_dir.path().join("my%20dir").exists());
    let path = url
        .to_file_path()
        .map_err(|_| anyhow::anyhow!("not a file URL"))?;
    assert_eq!(path, root.join("Trip"));
    Ok(())
}

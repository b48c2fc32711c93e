// src/constants.rs
//
// Application-wide constants. Each constant is documented with its purpose
// and usage context.

/// Directory under the platform config dir holding config and credentials.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_DIR_NAME: &str = "cloudnotes";

/// Used in: `infrastructure/config.rs`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Used in: `infrastructure/config.rs`
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Lifetime of presigned image URLs, in seconds.
///
/// Same 15 minute default as the hosted storage SDKs.
///
/// Used in: `infrastructure/config.rs`, `infrastructure/blob_store.rs`
pub const DEFAULT_URL_TTL_SECS: u64 = 900;

/// Timeout for a single GraphQL request, in seconds.
///
/// Used in: `infrastructure/config.rs`, `infrastructure/graphql.rs`
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Delay in milliseconds after writing the HTML page before returning.
///
/// The browser is spawned asynchronously and reads the file after we
/// return; the temp dir must outlive that read.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;

/// Rendered width of note images in the HTML page, in pixels.
///
/// Used in: `ports/html.rs`
pub const IMAGE_WIDTH_PX: u32 = 400;

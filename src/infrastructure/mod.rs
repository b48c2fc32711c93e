// src/infrastructure/mod.rs
pub mod auth;
pub mod blob_store;
pub mod config;
pub mod graphql;
pub mod renderer;

pub use auth::FileAuthService;
pub use blob_store::OpendalBlobStore;
pub use config::Config;
pub use graphql::GraphQlNoteApi;
pub use renderer::PageRenderer;

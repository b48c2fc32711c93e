// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::Path;
use std::sync::Arc;
use anyhow::{Context, Result};
use application::{AuthGate, NoteSession};
use domain::{NoteForm, NoteId};
use infrastructure::{Config, FileAuthService, GraphQlNoteApi, OpendalBlobStore, PageRenderer};
use ports::{HtmlPresenter, TerminalPresenter};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{debug, info};
use crate::cli::args::{Args, Command};
use crate::cli::shell::Shell;

pub type CloudSession = NoteSession<GraphQlNoteApi, OpendalBlobStore, FileAuthService>;

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting cloudnotes with arguments");

    let config_path = match args.config {
        Some(path) => {
            debug!(?path, "Using provided config path");
            path
        }
        None => Config::default_path()?,
    };

    match args.command {
        Command::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::create_default(&config_path)?;
            println!("Wrote default config to {}", config_path.display());
        }
        Command::Login { username, token } => {
            let config = load_config(&config_path)?;
            let session = auth_gate(&config)?.sign_in(&username, &token).await?;
            println!("Signed in as {}", session.username);
        }
        Command::Logout => {
            let config = load_config(&config_path)?;
            auth_gate(&config)?.sign_out().await?;
            println!("Signed out.");
        }
        Command::List { json, open } => {
            let session = open_session(&config_path).await?;
            let notes = session.notes();
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if open {
                let html = HtmlPresenter::new().render(&notes);
                let mut renderer = PageRenderer::new();
                let path = renderer.create_temp_file(&html)?;
                renderer.open_in_browser(&path).await?;
            } else {
                print!("{}", TerminalPresenter::new().render(&notes));
            }
        }
        Command::Create {
            name,
            description,
            image,
        } => {
            let session = open_session(&config_path).await?;
            let mut form = NoteForm::new(name, description);
            if let Some(path) = image {
                form = form.with_image(cli::read_image(&path).await?);
            }
            let record = session.create(form).await?;
            info!(note_id = %record.id, "Note created");
            println!("Created note {}", record.id);
        }
        Command::Delete { note_id } => {
            let session = open_session(&config_path).await?;
            let id = NoteId::new(note_id);
            session.delete(&id)?.await?;
            println!("Deleted note {}", id);
        }
        Command::Shell => {
            let session = open_session(&config_path).await?;
            let exit = Shell::new(&session, stdout())
                .run(BufReader::new(stdin()))
                .await?;
            debug!(?exit, "Shell finished");
        }
    }

    Ok(())
}

/// Missing config file means defaults; auth commands work without one.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        debug!(?path, "No config file, using defaults");
        Ok(Config::default())
    }
}

fn auth_gate(config: &Config) -> Result<AuthGate<FileAuthService>> {
    let auth = FileAuthService::new(
        config.auth.credentials_path()?,
        config.auth.sign_out_url().map(str::to_string),
    );
    Ok(AuthGate::new(Arc::new(auth)))
}

/// Pass the auth gate and mount a session with notes loaded.
pub async fn open_session(config_path: &Path) -> Result<CloudSession> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let blobs = Arc::new(OpendalBlobStore::from_config(&config.storage)?);
    let session = auth_gate(&config)?
        .mount(
            |identity| Ok((Arc::new(GraphQlNoteApi::new(&config.api, identity)?), blobs)),
            config.fetch.hydration,
        )
        .await
        .context("Failed to open notes session")?;
    Ok(session)
}

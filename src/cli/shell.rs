// src/cli/shell.rs
use crate::application::{AuthService, BlobStore, NoteApi, NoteSession};
use crate::cli::read_image;
use crate::domain::{NoteForm, NoteId};
use crate::ports::TerminalPresenter;
use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::debug;

const HELP: &str = "\
Commands:
  list            show notes
  refresh         re-fetch notes from the backend
  create          create a note (prompts for name, description, image path)
  delete <ID>     delete a note and its image
  signout         sign out and leave
  help            show this help
  quit            leave without signing out
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    Quit,
    SignedOut,
    EndOfInput,
}

/// Interactive view over a mounted session.
///
/// Domain errors are printed and the loop goes on; only I/O errors end it.
pub struct Shell<'a, A: NoteApi, B: BlobStore, S: AuthService, W> {
    session: &'a NoteSession<A, B, S>,
    presenter: TerminalPresenter,
    output: W,
}

impl<'a, A, B, S, W> Shell<'a, A, B, S, W>
where
    A: NoteApi + 'static,
    B: BlobStore + 'static,
    S: AuthService + 'static,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: &'a NoteSession<A, B, S>, output: W) -> Self {
        Self {
            session,
            presenter: TerminalPresenter::new(),
            output,
        }
    }

    pub async fn run<R>(&mut self, input: R) -> Result<ShellExit>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.show_notes().await?;

        loop {
            self.write("> ").await?;
            let Some(line) = lines.next_line().await? else {
                return Ok(ShellExit::EndOfInput);
            };
            let mut words = line.split_whitespace();
            let command = words.next().unwrap_or_default();
            debug!(command, "Shell command");

            match command {
                "" => {}
                "list" => self.show_notes().await?,
                "refresh" => match self.session.refresh().await {
                    Ok(_) => self.show_notes().await?,
                    Err(e) => self.write(&format!("Error: {}\n", e)).await?,
                },
                "create" => self.create(&mut lines).await?,
                "delete" => match words.next() {
                    Some(id) => self.delete(NoteId::new(id)).await?,
                    None => self.write("Usage: delete <ID>\n").await?,
                },
                "signout" => {
                    if let Err(e) = self.session.sign_out().await {
                        self.write(&format!("Error: {}\n", e)).await?;
                    }
                    self.write("Signed out.\n").await?;
                    return Ok(ShellExit::SignedOut);
                }
                "quit" | "exit" => {
                    self.session.close();
                    return Ok(ShellExit::Quit);
                }
                "help" => self.write(HELP).await?,
                other => {
                    self.write(&format!("Unknown command '{}'. Type 'help'.\n", other))
                        .await?
                }
            }
        }
    }

    async fn create<R>(&mut self, lines: &mut Lines<R>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        // Each `create` starts from an empty form.
        let Some(name) = self.prompt(lines, "Note name: ").await? else {
            return Ok(());
        };
        let Some(description) = self.prompt(lines, "Note description: ").await? else {
            return Ok(());
        };
        let Some(image_path) = self.prompt(lines, "Image path (empty for none): ").await? else {
            return Ok(());
        };

        let mut form = NoteForm::new(name, description);
        if !image_path.is_empty() {
            match read_image(Path::new(&image_path)).await {
                Ok(image) => form = form.with_image(image),
                Err(e) => return self.write(&format!("Error: {:#}\n", e)).await,
            }
        }

        match self.session.create(form).await {
            Ok(record) => {
                self.write(&format!("Created note {}\n", record.id)).await?;
                self.show_notes().await
            }
            Err(e) => self.write(&format!("Error: {}\n", e)).await,
        }
    }

    async fn delete(&mut self, id: NoteId) -> Result<()> {
        let remote = match self.session.delete(&id) {
            Ok(remote) => remote,
            Err(e) => return self.write(&format!("Error: {}\n", e)).await,
        };
        // The list is already updated; show it before the backend answers.
        self.show_notes().await?;

        match remote.await {
            Ok(()) => self.write(&format!("Deleted note {}\n", id)).await,
            Err(e) => {
                self.write(&format!("Delete failed, note restored: {}\n", e))
                    .await?;
                self.show_notes().await
            }
        }
    }

    async fn prompt<R>(&mut self, lines: &mut Lines<R>, label: &str) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
    {
        self.write(label).await?;
        Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    async fn show_notes(&mut self) -> Result<()> {
        let rendered = self.presenter.render(&self.session.notes());
        self.write(&rendered).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

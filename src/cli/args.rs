// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (default: <config dir>/cloudnotes/config.toml)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store the credentials obtained from the hosted sign-in page
    Login {
        #[arg(short, long)]
        username: String,

        /// Access token issued by the identity provider
        #[arg(short, long)]
        token: String,
    },

    /// Sign out and drop stored credentials
    Logout,

    /// List notes
    List {
        /// Output notes as JSON
        #[arg(long)]
        json: bool,

        /// Open the notes as an HTML page in the browser
        #[arg(long, conflicts_with = "json")]
        open: bool,
    },

    /// Create a note, optionally with an image
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,

        /// Image file to upload with the note
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,
    },

    /// Delete a note and its image
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Interactive session: list, create and delete notes
    Shell,
}

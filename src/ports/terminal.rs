// src/ports/terminal.rs
use crate::domain::Note;

/// Plain-text rendering of the note list for the CLI and the shell.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes.\n".to_string();
        }

        let mut out = String::new();
        for note in notes {
            out.push_str(&format!("{}\t{}\t{}\n", note.id, note.name, note.description));
            if let Some(url) = &note.image {
                out.push_str(&format!("\timage: {}\n", url));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoteId;
    use url::Url;

    #[test]
    fn given_notes_when_rendering_then_prints_one_line_per_note_plus_image() {
        let notes = vec![
            Note {
                id: NoteId::new("1"),
                name: "Trip".to_string(),
                description: "Beach".to_string(),
                image: Some(Url::parse("https://blobs.test/Trip").unwrap()),
            },
            Note {
                id: NoteId::new("2"),
                name: "Groceries".to_string(),
                description: "milk".to_string(),
                image: None,
            },
        ];

        let out = TerminalPresenter::new().render(&notes);

        assert_eq!(
            out,
            "1\tTrip\tBeach\n\timage: https://blobs.test/Trip\n2\tGroceries\tmilk\n"
        );
    }

    #[test]
    fn given_no_notes_when_rendering_then_prints_placeholder() {
        assert_eq!(TerminalPresenter::new().render(&[]), "No notes.\n");
    }
}

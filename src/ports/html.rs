// src/ports/html.rs
use crate::constants::IMAGE_WIDTH_PX;
use crate::domain::Note;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

/// Renders the note list as a standalone HTML page.
#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    fn render_note(&self, note: &Note) -> String {
        let name = encode_text(&note.name);
        let image = match &note.image {
            Some(url) => format!(
                r#"
            <img src="{src}" alt="visual aid for {alt}" style="width: {width}px">"#,
                src = encode_double_quoted_attribute(url.as_str()),
                alt = encode_double_quoted_attribute(&note.name),
                width = IMAGE_WIDTH_PX,
            ),
            None => String::new(),
        };

        format!(
            r#"
        <div class="note" id="note-{id}">
            <strong>{name}</strong>
            <span>{description}</span>{image}
            <code class="note-id">{id}</code>
        </div>"#,
            id = encode_double_quoted_attribute(note.id.as_str()),
            name = name,
            description = encode_text(&note.description),
            image = image,
        )
    }

    #[instrument(level = "debug", skip_all, fields(count = notes.len()))]
    pub fn render(&self, notes: &[Note]) -> String {
        let body = if notes.is_empty() {
            r#"
        <p class="empty">No notes yet.</p>"#
                .to_string()
        } else {
            notes.iter().map(|n| self.render_note(n)).collect::<String>()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>My Notes App</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 900px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
            text-align: center;
        }}
        .notes {{
            margin: 3rem 0;
        }}
        .note {{
            display: flex;
            flex-direction: row;
            justify-content: center;
            align-items: center;
            gap: 1rem;
            background: white;
            border-radius: 8px;
            padding: 1rem;
            margin-bottom: 1rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        .note-id {{
            font-size: 0.8em;
            color: #666;
        }}
        .empty {{
            color: #666;
        }}
    </style>
</head>
<body>
    <h1>My Notes App</h1>
    <h2>Current Notes</h2>
    <div class="notes">{body}
    </div>
</body>
</html>"#,
            body = body
        )
    }
}

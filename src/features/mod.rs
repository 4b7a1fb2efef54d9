pub mod catalog;
pub mod pdf;
pub mod placement;
pub mod screens;
pub mod signing;
pub mod storage;
pub mod viewer;

use crate::document::{Document, DocumentStatus};
use crate::state::AppState;
use crate::ui::{node, Button as UiButton, Card as UiCard, Column as UiColumn, Text as UiText};
use serde_json::{json, Value};

/// Render the document list; also serves as the summary shown after save.
pub fn render_documents_screen(state: &AppState) -> Value {
    let mut children = vec![
        node(UiText::new("Documents").size(22.0)),
        node(
            UiText::new("Upload a PDF, place fields on its pages, then collect signatures.")
                .size(14.0),
        ),
        node(
            UiButton::new("Upload PDF", "document_upload")
                .id("document_upload_btn")
                .requires_file_picker(true),
        ),
    ];

    if let Some(msg) = &state.last_message {
        children.push(node(UiText::new(msg).size(12.0).content_description("status_message")));
    }
    if let Some(err) = &state.last_error {
        children.push(node(
            UiText::new(&format!("Error: {err}"))
                .size(12.0)
                .content_description("error_text"),
        ));
    }

    let docs = state.store.documents();
    if docs.is_empty() {
        children.push(node(UiText::new("No documents yet.").size(12.0)));
    }
    for doc in docs {
        children.push(document_card(doc));
    }

    node(UiColumn::new(children).padding(20))
}

fn document_card(doc: &Document) -> Value {
    let status = match doc.status {
        DocumentStatus::Draft => "Status: draft",
        DocumentStatus::Completed => "Status: completed",
    };
    let fields = format!("Fields: {}", doc.fields.len());
    let recipients = format!("Recipients: {}", doc.recipients.len());
    let uploaded = format!("Uploaded: {}", doc.upload_date.format("%Y-%m-%d %H:%M"));
    let size = doc
        .file
        .as_ref()
        .map(|f| format!("Size: {:.1} KB", f.bytes().len() as f64 / 1024.0));
    let payload = json!({ "document_id": doc.id });

    let mut items = vec![
        node(UiText::new(status).size(12.0)),
        node(UiText::new(&fields).size(12.0)),
        node(UiText::new(&recipients).size(12.0)),
        node(UiText::new(&uploaded).size(12.0)),
    ];
    if let Some(size) = &size {
        items.push(node(UiText::new(size).size(12.0)));
    }
    if doc.status == DocumentStatus::Draft {
        items.push(node(UiButton::new("Edit", "document_open").payload(payload.clone())));
    }
    items.push(node(
        UiButton::new("Sign", "signing_open")
            .payload(payload)
            .disabled(doc.status == DocumentStatus::Completed),
    ));
    node(UiCard::new(items).title(&doc.name).padding(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_documents_with_status_and_actions() {
        let mut state = AppState::new();
        let draft = Document::new("draft.pdf", None);
        let mut done = Document::new("done.pdf", None);
        done.status = DocumentStatus::Completed;
        state.store.add_document(draft).unwrap();
        state.store.add_document(done).unwrap();

        let ui = render_documents_screen(&state);
        let text = ui.to_string();
        assert!(text.contains("Status: draft"));
        assert!(text.contains("Status: completed"));
        let cards: Vec<&Value> = ui["children"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["type"] == "Card")
            .collect();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0]["title"], "draft.pdf");
        let done_actions: Vec<&Value> = cards[1]["children"].as_array().unwrap().iter().collect();
        assert!(done_actions.iter().all(|c| c["action"] != "document_open"));
    }

    #[test]
    fn card_reports_uploaded_file_size() {
        use crate::document::PdfFile;

        let mut state = AppState::new();
        let file = PdfFile::new(vec![0u8; 2048], 1);
        state.store.add_document(Document::new("sized.pdf", Some(file))).unwrap();
        state.store.add_document(Document::new("bare.pdf", None)).unwrap();

        let ui = render_documents_screen(&state);
        let text = ui.to_string();
        assert!(text.contains("Size: 2.0 KB"));
        assert_eq!(text.matches("Size:").count(), 1);
    }

    #[test]
    fn empty_store_shows_placeholder() {
        let state = AppState::new();
        let ui = render_documents_screen(&state);
        assert!(ui.to_string().contains("No documents yet."));
    }
}

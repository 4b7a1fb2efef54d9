//! Editor and signing screens rendered as JSON UI trees.

use serde_json::{json, Value};

use crate::document::{Document, PdfFile};
use crate::features::catalog::{FieldControl, FieldType};
use crate::features::signing::SigningSession;
use crate::features::viewer::{FieldOverlay, PageViewport};
use crate::features::render_documents_screen;
use crate::state::AppState;
use crate::ui::{
    maybe_push_back, node, Button as UiButton, Card as UiCard, Checkbox as UiCheckbox,
    Column as UiColumn, Text as UiText, TextInput as UiTextInput,
};

pub fn render_editor_screen(state: &AppState) -> Value {
    let Some(doc) = state.store.current_document() else {
        return render_documents_screen(state);
    };
    let editor = &state.editor;
    let viewport = editor.viewport();

    let mut children = vec![
        node(UiText::new("Document editor").size(20.0)),
        node(UiText::new(&doc.name).size(12.0).content_description("document_name")),
        render_palette(doc),
        render_recipients(doc),
    ];

    let overlays: Vec<Value> = editor
        .overlays(doc)
        .unwrap_or_default()
        .into_iter()
        .map(|overlay| {
            let delete = overlay.selected.then_some("field_delete");
            overlay_node(&overlay, "field_click", delete)
        })
        .collect();

    let mut page = page_surface(doc, viewport, state.config.render_scale, overlays);
    if let Some(obj) = page.as_object_mut() {
        obj.insert("drop_pending".into(), json!(editor.drag_state()));
        obj.insert("on_layout".into(), json!("surface_layout"));
        obj.insert("on_drop".into(), json!("field_drop"));
        obj.insert("on_drag_over".into(), json!("field_drag_over"));
        obj.insert("on_drag_leave".into(), json!("field_drag_leave"));
        obj.insert("on_click".into(), json!("surface_click"));
        obj.insert("on_key".into(), json!("editor_key"));
    }
    children.push(page);
    children.push(page_nav(viewport));
    children.push(node(UiButton::new("Save", "editor_save").id("editor_save_btn")));

    push_status(&mut children, state);
    maybe_push_back(&mut children, state);
    node(UiColumn::new(children).padding(16))
}

pub fn render_signing_screen(state: &AppState) -> Value {
    let Some(session) = state.signing.as_ref() else {
        return render_documents_screen(state);
    };
    let Some(doc) = session.document(&*state.store) else {
        return render_documents_screen(state);
    };
    let viewport = session.viewport();
    let title = format!("Sign document: {}", doc.name);

    let overlays: Vec<Value> = session
        .overlays(doc)
        .unwrap_or_default()
        .into_iter()
        .map(|overlay| signing_overlay_node(&overlay))
        .collect();

    let mut children = vec![
        node(UiText::new(&title).size(20.0)),
        page_surface(doc, viewport, state.config.render_scale, overlays),
        page_nav(viewport),
    ];

    children.push(completion_status(session, doc));
    children.push(node(
        UiButton::new("Complete signing", "signing_complete")
            .id("signing_complete_btn")
            .disabled(!session.can_complete(doc)),
    ));

    push_status(&mut children, state);
    maybe_push_back(&mut children, state);
    node(UiColumn::new(children).padding(16))
}

fn render_palette(doc: &Document) -> Value {
    let mut items = vec![
        node(
            UiText::new("Drag fields from below onto the PDF to add them to your document.")
                .size(12.0),
        ),
        node(
            UiText::new(&format!("Total fields: {}", doc.fields.len()))
                .size(12.0)
                .content_description("field_count"),
        ),
    ];
    for field_type in FieldType::ALL {
        let size = field_type.default_size();
        items.push(json!({
            "type": "DraggableField",
            "field_type": field_type,
            "text": field_type.label(),
            "width": size.width,
            "height": size.height,
        }));
    }
    node(UiCard::new(items).title("Form fields").padding(12))
}

fn render_recipients(doc: &Document) -> Value {
    let mut items: Vec<Value> = doc
        .recipients
        .iter()
        .map(|r| node(UiText::new(&format!("{} <{}>", r.name, r.email)).size(12.0)))
        .collect();
    if items.is_empty() {
        items.push(node(
            UiText::new("No recipients yet; new fields stay unassigned.").size(12.0),
        ));
    }
    items.push(node(UiTextInput::new("recipient_name").hint("Name").single_line(true)));
    items.push(node(UiTextInput::new("recipient_email").hint("Email").single_line(true)));
    items.push(node(UiButton::new("Add recipient", "recipient_add")));
    node(UiCard::new(items).title("Recipients").padding(12))
}

fn page_surface(
    doc: &Document,
    viewport: &PageViewport,
    scale: f64,
    overlays: Vec<Value>,
) -> Value {
    json!({
        "type": "PdfPage",
        "document_id": doc.id,
        "page": viewport.current_page(),
        "num_pages": viewport.num_pages(),
        "scale": scale,
        "page_points": doc.file.as_ref().and_then(PdfFile::page_points),
        "ready": viewport.is_ready(),
        "on_load": "viewer_loaded",
        "on_size": "viewer_size",
        "children": overlays,
        "content_description": "pdf_page_surface",
    })
}

fn page_nav(viewport: &PageViewport) -> Value {
    let label = format!("Page {} of {}", viewport.current_page(), viewport.num_pages());
    node(
        UiColumn::new(vec![
            node(UiButton::new("Previous", "page_prev").disabled(!viewport.has_prev())),
            node(UiText::new(&label).size(12.0).content_description("page_label")),
            node(UiButton::new("Next", "page_next").disabled(!viewport.has_next())),
        ])
        .content_description("page_nav"),
    )
}

fn overlay_node(overlay: &FieldOverlay, action: &str, delete_action: Option<&str>) -> Value {
    let mut value = node(overlay);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("type".into(), json!("FieldOverlay"));
        obj.insert("action".into(), json!(action));
        if let Some(delete) = delete_action {
            obj.insert("delete_action".into(), json!(delete));
        }
    }
    value
}

fn signing_overlay_node(overlay: &FieldOverlay) -> Value {
    let current = overlay.value.as_deref().unwrap_or("");
    let control = match overlay.control {
        FieldControl::TextInput => node(
            UiTextInput::new("field_value")
                .text(current)
                .hint("Text")
                .action_on_change("signing_input")
                .single_line(true),
        ),
        FieldControl::DatePicker => node(
            UiTextInput::new("field_value")
                .text(current)
                .input_type("date")
                .action_on_change("signing_input"),
        ),
        FieldControl::Checkbox => node(
            UiCheckbox::new(overlay.label, "field_value")
                .checked(current == "true")
                .action("signing_input"),
        ),
        FieldControl::InitialsInput { max_chars } => node(
            UiTextInput::new("field_value")
                .text(current)
                .hint("AB")
                .max_length(max_chars)
                .action_on_change("signing_input")
                .single_line(true),
        ),
        FieldControl::SignaturePlaceholder => json!({
            "type": "SignaturePad",
            "bind_key": "field_value",
            "action": "signing_input",
            "hint": "Sign here",
        }),
    };
    let mut value = overlay_node(overlay, "noop", None);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("children".into(), json!([control]));
    }
    value
}

fn completion_status(session: &SigningSession, doc: &Document) -> Value {
    let missing = session.missing_required(doc).len();
    let text = if missing == 0 {
        "All required fields are filled.".to_string()
    } else {
        format!("{missing} required field(s) remaining")
    };
    node(UiText::new(&text).size(12.0).content_description("signing_status"))
}

fn push_status(children: &mut Vec<Value>, state: &AppState) {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentField;
    use crate::features::placement::{DropEvent, PlacementController};
    use crate::geometry::{PageSize, Position, SurfaceRect};

    fn find_all<'a>(ui: &'a Value, kind: &str, acc: &mut Vec<&'a Value>) {
        if ui.get("type").and_then(|t| t.as_str()) == Some(kind) {
            acc.push(ui);
        }
        if let Some(children) = ui.get("children").and_then(|c| c.as_array()) {
            for child in children {
                find_all(child, kind, acc);
            }
        }
    }

    fn editor_state() -> AppState {
        let mut state = AppState::new();
        let doc = Document::new("plan.pdf", None);
        let id = doc.id;
        state.store.add_document(doc).unwrap();
        state.store.set_current_document(Some(id)).unwrap();
        state.editor = PlacementController::new();
        state.editor.on_surface_layout(SurfaceRect::default());
        state
    }

    #[test]
    fn editor_withholds_overlays_until_size_known() {
        let mut state = editor_state();
        let id = state.store.current_document().unwrap().id;
        state
            .store
            .add_field(
                &id,
                DocumentField::new(FieldType::Text, Position::clamped(50.0, 50.0), 1, None),
            )
            .unwrap();

        let ui = render_editor_screen(&state);
        let mut pages = Vec::new();
        find_all(&ui, "PdfPage", &mut pages);
        assert_eq!(pages[0]["ready"], json!(false));
        let mut overlays = Vec::new();
        find_all(&ui, "FieldOverlay", &mut overlays);
        assert!(overlays.is_empty());

        state.editor.on_size(PageSize::new(200.0, 100.0));
        let ui = render_editor_screen(&state);
        let mut overlays = Vec::new();
        find_all(&ui, "FieldOverlay", &mut overlays);
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0]["left"], json!(100.0));
        assert_eq!(overlays[0]["top"], json!(50.0));
    }

    #[test]
    fn surface_carries_media_box_when_known() {
        let mut state = editor_state();
        let ui = render_editor_screen(&state);
        let mut pages = Vec::new();
        find_all(&ui, "PdfPage", &mut pages);
        assert_eq!(pages[0]["page_points"], Value::Null);

        let file = PdfFile::new(vec![0u8; 8], 1).with_page_points(Some(PageSize::new(595.0, 842.0)));
        let doc = Document::new("a4.pdf", Some(file));
        let id = doc.id;
        state.store.add_document(doc).unwrap();
        state.store.set_current_document(Some(id)).unwrap();
        let ui = render_editor_screen(&state);
        let mut pages = Vec::new();
        find_all(&ui, "PdfPage", &mut pages);
        assert_eq!(pages[0]["page_points"]["width"], json!(595.0));
        assert_eq!(pages[0]["page_points"]["height"], json!(842.0));
    }

    #[test]
    fn palette_lists_every_field_type() {
        let state = editor_state();
        let ui = render_editor_screen(&state);
        let mut tokens = Vec::new();
        find_all(&ui, "DraggableField", &mut tokens);
        let kinds: Vec<&str> = tokens
            .iter()
            .filter_map(|t| t["field_type"].as_str())
            .collect();
        assert_eq!(kinds, vec!["signature", "text", "date", "checkbox", "initial"]);
    }

    #[test]
    fn selected_overlay_offers_delete() {
        let mut state = editor_state();
        state.editor.on_size(PageSize::new(200.0, 100.0));
        let AppState { editor, store, .. } = &mut state;
        let event = DropEvent {
            client_x: 10.0,
            client_y: 10.0,
            field_type: Some("initial".into()),
        };
        editor.on_drop(&mut **store, &event).unwrap();

        let ui = render_editor_screen(&state);
        let mut overlays = Vec::new();
        find_all(&ui, "FieldOverlay", &mut overlays);
        assert_eq!(overlays[0]["selected"], json!(true));
        assert_eq!(overlays[0]["delete_action"], json!("field_delete"));
        assert_eq!(overlays[0]["control"]["kind"], json!("initials_input"));
    }

    #[test]
    fn signing_screen_disables_completion_until_filled() {
        let mut state = editor_state();
        let doc_id = state.store.current_document().unwrap().id;
        state
            .store
            .add_field(
                &doc_id,
                DocumentField::new(FieldType::Date, Position::clamped(10.0, 10.0), 1, None),
            )
            .unwrap();
        let session = SigningSession::open(&*state.store, doc_id).unwrap();
        state.signing = Some(session);

        let ui = render_signing_screen(&state);
        let mut buttons = Vec::new();
        find_all(&ui, "Button", &mut buttons);
        let complete = buttons
            .iter()
            .find(|b| b["action"] == json!("signing_complete"))
            .unwrap();
        assert_eq!(complete["disabled"], json!(true));
    }
}

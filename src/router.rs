use crate::document::{DocumentId, FieldId, Recipient};
use crate::error::EditorError;
use crate::features::pdf::handle_document_upload;
use crate::features::placement::{DropEvent, Key, PlacementController};
use crate::features::render_documents_screen;
use crate::features::screens::{render_editor_screen, render_signing_screen};
use crate::features::signing::SigningSession;
use crate::geometry::{PageSize, SurfaceRect};
use crate::state::{AppState, Screen};
use crate::store::MemoryStore;

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    ptr,
    str::FromStr,
    sync::{Mutex, MutexGuard, OnceLock},
};

static STATE: OnceLock<Mutex<AppState>> = OnceLock::new();

fn state_lock() -> MutexGuard<'static, AppState> {
    let cell = STATE.get_or_init(|| Mutex::new(AppState::new()));
    match cell.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("state mutex poisoned; recovering");
            poisoned.into_inner()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Command {
    pub(crate) action: String,
    pub(crate) document_id: Option<String>,
    pub(crate) field_id: Option<String>,
    pub(crate) field_type: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) num_pages: Option<u32>,
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
    pub(crate) left: Option<f64>,
    pub(crate) top: Option<f64>,
    pub(crate) client_x: Option<f64>,
    pub(crate) client_y: Option<f64>,
    pub(crate) key: Option<String>,
    pub(crate) value: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) data: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) bindings: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Init,
    Reset,
    Back,
    DocumentUpload {
        name: Option<String>,
        data: Option<String>,
        path: Option<String>,
        error: Option<String>,
    },
    DocumentOpen {
        document_id: DocumentId,
    },
    RecipientAdd {
        name: String,
        email: String,
    },
    EditorSave,
    ViewerLoaded {
        num_pages: u32,
    },
    ViewerSize {
        size: PageSize,
    },
    SurfaceLayout {
        rect: Option<SurfaceRect>,
    },
    PageNext,
    PagePrev,
    PageGoto {
        page: u32,
    },
    FieldDragOver,
    FieldDragLeave,
    FieldDrop {
        event: DropEvent,
    },
    FieldClick {
        field_id: FieldId,
    },
    SurfaceClick,
    EditorKey {
        key: Key,
    },
    FieldDelete {
        field_id: Option<FieldId>,
    },
    SigningOpen {
        document_id: DocumentId,
    },
    SigningInput {
        field_id: FieldId,
        value: String,
    },
    SigningComplete,
    Noop {
        error: Option<String>,
    },
}

fn parse_action(command: Command) -> Result<Action, String> {
    let Command {
        action,
        document_id,
        field_id,
        field_type,
        page,
        num_pages,
        width,
        height,
        left,
        top,
        client_x,
        client_y,
        key,
        value,
        name,
        data,
        path,
        error,
        bindings,
    } = command;
    let bindings = bindings.unwrap_or_default();

    match action.as_str() {
        "init" => Ok(Action::Init),
        "reset" => Ok(Action::Reset),
        "back" => Ok(Action::Back),
        "noop" => Ok(Action::Noop { error }),
        "document_upload" => Ok(Action::DocumentUpload {
            name,
            data,
            path,
            error,
        }),
        "document_open" => Ok(Action::DocumentOpen {
            document_id: parse_id(document_id.as_deref(), "document_id")?,
        }),
        "recipient_add" => {
            let name = name
                .or_else(|| bindings.get("recipient_name").cloned())
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| "missing_recipient_name".to_string())?;
            let email = bindings
                .get("recipient_email")
                .map(|e| e.trim().to_string())
                .unwrap_or_default();
            Ok(Action::RecipientAdd { name, email })
        }
        "editor_save" => Ok(Action::EditorSave),
        "viewer_loaded" => Ok(Action::ViewerLoaded {
            num_pages: num_pages.ok_or_else(|| "missing_num_pages".to_string())?,
        }),
        "viewer_size" => match (width, height) {
            (Some(w), Some(h)) => Ok(Action::ViewerSize {
                size: PageSize::new(w, h),
            }),
            _ => Err("missing_page_size".into()),
        },
        "surface_layout" => Ok(Action::SurfaceLayout {
            rect: match (left, top) {
                (Some(l), Some(t)) => Some(SurfaceRect::new(l, t)),
                _ => None,
            },
        }),
        "page_next" => Ok(Action::PageNext),
        "page_prev" => Ok(Action::PagePrev),
        "page_goto" => {
            let page = page
                .or_else(|| parse_u32_binding(&bindings, "page"))
                .ok_or_else(|| "missing_page".to_string())?;
            Ok(Action::PageGoto { page })
        }
        "field_drag_over" => Ok(Action::FieldDragOver),
        "field_drag_leave" => Ok(Action::FieldDragLeave),
        "field_drop" => match (client_x, client_y) {
            (Some(client_x), Some(client_y)) => Ok(Action::FieldDrop {
                event: DropEvent {
                    client_x,
                    client_y,
                    field_type,
                },
            }),
            _ => Err("missing_drop_point".into()),
        },
        "field_click" => Ok(Action::FieldClick {
            field_id: parse_id(field_id.as_deref(), "field_id")?,
        }),
        "surface_click" => Ok(Action::SurfaceClick),
        "editor_key" => Ok(Action::EditorKey {
            key: Key::parse(key.as_deref().unwrap_or_default()),
        }),
        "field_delete" => Ok(Action::FieldDelete {
            field_id: match field_id.as_deref() {
                Some(raw) => Some(parse_id(Some(raw), "field_id")?),
                None => None,
            },
        }),
        "signing_open" => Ok(Action::SigningOpen {
            document_id: parse_id(document_id.as_deref(), "document_id")?,
        }),
        "signing_input" => {
            let field_id = parse_id(field_id.as_deref(), "field_id")?;
            let value = value
                .or_else(|| bindings.get("field_value").cloned())
                .unwrap_or_default();
            Ok(Action::SigningInput { field_id, value })
        }
        "signing_complete" => Ok(Action::SigningComplete),
        other => Err(format!("unknown_action:{other}")),
    }
}

fn parse_id<T: FromStr>(raw: Option<&str>, what: &str) -> Result<T, String> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing_{what}"))?;
    raw.parse().map_err(|_| format!("invalid_{what}"))
}

fn parse_u32_binding(bindings: &HashMap<String, String>, key: &str) -> Option<u32> {
    bindings.get(key).and_then(|v| v.trim().parse::<u32>().ok())
}

#[no_mangle]
pub extern "system" fn Java_dev_fieldsign_MainActivity_dispatch(
    mut env: JNIEnv,
    _class: JClass,
    input: JString,
) -> jstring {
    crate::logging::init();
    let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let input_str: String = env
            .get_string(&input)
            .map(|s| s.into())
            .unwrap_or_else(|_| "{}".to_string());

        let command: Command = serde_json::from_str(&input_str).unwrap_or_else(|e| {
            warn!("dropping malformed command: {e}");
            Command {
                action: "noop".into(),
                error: Some("invalid_json".into()),
                ..Command::default()
            }
        });

        handle_command(command)
    }));

    let json_value = match response {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => error_ui(&err),
        Err(_) => error_ui("panic"),
    };

    let output_string = json_value.to_string();
    match env.new_string(output_string) {
        Ok(java_str) => java_str.into_raw(),
        Err(_) => {
            let fallback = error_ui("jni_new_string_failed").to_string();
            env.new_string(fallback)
                .map(|s| s.into_raw())
                .unwrap_or(ptr::null_mut())
        }
    }
}

pub(crate) fn handle_command(command: Command) -> Result<Value, String> {
    let mut state = state_lock();
    state.ensure_navigation();

    let action = match parse_action(command) {
        Ok(action) => action,
        Err(err) => {
            debug!("rejected command: {err}");
            state.last_error = Some(err);
            return Ok(render_ui(&state));
        }
    };

    apply_action(&mut state, action);
    Ok(render_ui(&state))
}

fn apply_action(state: &mut AppState, action: Action) {
    match action {
        Action::Init => {
            state.ensure_navigation();
        }
        Action::Noop { error } => {
            if error.is_some() {
                state.last_error = error;
            }
        }
        Action::Reset => {
            let config = state.config;
            *state = AppState::with_store(Box::new(MemoryStore::new()), config);
            state.reset_navigation();
        }
        Action::Back => {
            state.pop_screen();
            if state.current_screen() != Screen::Signing {
                state.signing = None;
            }
            state.last_error = None;
        }
        Action::DocumentUpload {
            name,
            data,
            path,
            error,
        } => {
            state.last_message = None;
            if let Some(err) = error {
                state.last_error = Some(err);
                return;
            }
            match handle_document_upload(state, name.as_deref(), data.as_deref(), path.as_deref())
            {
                Ok(_) => state.last_error = None,
                Err(e) => {
                    warn!("upload failed: {e}");
                    state.last_error = Some(e);
                }
            }
        }
        Action::DocumentOpen { document_id } => {
            if let Err(e) = state.store.set_current_document(Some(document_id)) {
                note_editor_error(state, e);
                return;
            }
            let editor = state
                .store
                .current_document()
                .map(PlacementController::for_document)
                .unwrap_or_default();
            state.editor = editor;
            state.signing = None;
            state.last_error = None;
            state.last_message = None;
            state.push_screen(Screen::Editor);
        }
        a @ Action::RecipientAdd { .. }
        | a @ Action::EditorSave
        | a @ Action::SurfaceLayout { .. }
        | a @ Action::FieldDragOver
        | a @ Action::FieldDragLeave
        | a @ Action::FieldDrop { .. }
        | a @ Action::FieldClick { .. }
        | a @ Action::SurfaceClick
        | a @ Action::EditorKey { .. }
        | a @ Action::FieldDelete { .. } => handle_editor_actions(state, a),
        a @ Action::ViewerLoaded { .. }
        | a @ Action::ViewerSize { .. }
        | a @ Action::PageNext
        | a @ Action::PagePrev
        | a @ Action::PageGoto { .. } => handle_viewer_actions(state, a),
        a @ Action::SigningOpen { .. }
        | a @ Action::SigningInput { .. }
        | a @ Action::SigningComplete => handle_signing_actions(state, a),
    }
}

/// Viewer events go to whichever screen currently owns the page surface.
fn handle_viewer_actions(state: &mut AppState, action: Action) {
    let signing = match (state.current_screen(), state.signing.as_mut()) {
        (Screen::Signing, Some(session)) => Some(session),
        _ => None,
    };
    match (action, signing) {
        (Action::ViewerLoaded { num_pages }, Some(session)) => session.on_load_success(num_pages),
        (Action::ViewerLoaded { num_pages }, None) => state.editor.on_load_success(num_pages),
        (Action::ViewerSize { size }, Some(session)) => session.on_size(size),
        (Action::ViewerSize { size }, None) => state.editor.on_size(size),
        (Action::PageNext, Some(session)) => {
            session.next_page();
        }
        (Action::PageNext, None) => {
            state.editor.next_page();
        }
        (Action::PagePrev, Some(session)) => {
            session.prev_page();
        }
        (Action::PagePrev, None) => {
            state.editor.prev_page();
        }
        (Action::PageGoto { page }, Some(session)) => {
            session.go_to_page(page);
        }
        (Action::PageGoto { page }, None) => {
            state.editor.go_to_page(page);
        }
        _ => {}
    }
}

fn handle_editor_actions(state: &mut AppState, action: Action) {
    match action {
        Action::RecipientAdd { name, email } => {
            let Some(mut doc) = state.store.current_document().cloned() else {
                note_editor_error(state, EditorError::NotReady);
                return;
            };
            doc.recipients.push(Recipient::new(name, email));
            match state.store.update_document(doc) {
                Ok(()) => state.last_error = None,
                Err(e) => note_editor_error(state, e),
            }
        }
        Action::EditorSave => {
            let summary = state
                .store
                .current_document()
                .map(|doc| format!("Saved {} with {} field(s)", doc.name, doc.fields.len()));
            state.last_error = None;
            state.last_message = summary;
            state.editor = PlacementController::new();
            state.reset_navigation();
        }
        Action::SurfaceLayout { rect } => match rect {
            Some(rect) => state.editor.on_surface_layout(rect),
            None => state.editor.on_surface_detached(),
        },
        Action::FieldDragOver => state.editor.on_drag_over(),
        Action::FieldDragLeave => state.editor.on_drag_leave(),
        Action::FieldDrop { event } => {
            match state.editor.on_drop(&mut *state.store, &event) {
                Ok(_) => state.last_error = None,
                Err(e) => note_editor_error(state, e),
            }
        }
        Action::FieldClick { field_id } => {
            if let Some(doc) = state.store.current_document() {
                state.editor.on_field_click(doc, field_id);
            }
        }
        Action::SurfaceClick => state.editor.on_surface_click(),
        Action::EditorKey { key } => {
            if let Err(e) = state.editor.on_key(&mut *state.store, &key) {
                note_editor_error(state, e);
            }
        }
        Action::FieldDelete { field_id } => {
            let result = match field_id {
                Some(id) => state.editor.delete_field(&mut *state.store, id).map(|_| ()),
                None => state.editor.delete_selected(&mut *state.store).map(|_| ()),
            };
            if let Err(e) = result {
                note_editor_error(state, e);
            }
        }
        _ => {}
    }
}

fn handle_signing_actions(state: &mut AppState, action: Action) {
    match action {
        Action::SigningOpen { document_id } => {
            match SigningSession::open(&*state.store, document_id) {
                Ok(session) => {
                    state.signing = Some(session);
                    state.last_error = None;
                    state.last_message = None;
                    state.push_screen(Screen::Signing);
                }
                Err(e) => note_editor_error(state, e),
            }
        }
        Action::SigningInput { field_id, value } => {
            let Some(session) = state.signing.as_mut() else {
                note_editor_error(state, EditorError::NotReady);
                return;
            };
            let Some(doc) = state.store.document(&session.document_id()) else {
                let missing = session.document_id();
                note_editor_error(state, EditorError::UnresolvedDocument(missing));
                return;
            };
            let result = session.set_value(doc, field_id, &value);
            match result {
                Ok(()) => state.last_error = None,
                Err(e) => note_editor_error(state, e),
            }
        }
        Action::SigningComplete => {
            let Some(session) = state.signing.as_ref() else {
                note_editor_error(state, EditorError::NotReady);
                return;
            };
            match session.complete(&mut *state.store) {
                Ok(()) => {
                    let name = session
                        .document(&*state.store)
                        .map(|d| d.name.clone())
                        .unwrap_or_default();
                    info!("signing completed for {}", session.document_id());
                    state.signing = None;
                    state.last_error = None;
                    state.last_message = Some(format!("Signed {name}"));
                    state.reset_navigation();
                }
                Err(e) => note_editor_error(state, e),
            }
        }
        _ => {}
    }
}

/// Not-ready and unknown-type drops are silent no-ops; dangling references
/// are logged; everything else reaches the user.
fn note_editor_error(state: &mut AppState, err: EditorError) {
    match err {
        EditorError::NotReady | EditorError::InvalidFieldType(_) => {
            debug!("ignored editor event: {err}");
        }
        e if e.is_unresolved_reference() => {
            warn!("dangling reference: {e}");
        }
        e => {
            warn!("editor error: {e}");
            state.last_error = Some(e.to_string());
        }
    }
}

fn error_ui(message: &str) -> Value {
    json!({
        "type": "Column",
        "padding": 24,
        "children": [
            { "type": "Text", "text": "Error", "size": 18.0 },
            { "type": "Text", "text": message }
        ]
    })
}

fn render_ui(state: &AppState) -> Value {
    match state.current_screen() {
        Screen::Documents => render_documents_screen(state),
        Screen::Editor => render_editor_screen(state),
        Screen::Signing => render_signing_screen(state),
    }
}

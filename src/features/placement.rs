//! Editor-side controller: turns drag/drop, click and key events on the page
//! surface into field creation, selection and deletion.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentField, FieldId};
use crate::error::EditorError;
use crate::features::catalog::FieldType;
use crate::features::viewer::{project_overlays, FieldOverlay, PageViewport};
use crate::geometry::{to_percent, PageSize, SurfaceRect};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    /// A field token hovers the surface; presentational only.
    DraggingOver,
}

/// Raw drop event as delivered by the shell. `field_type` is the token
/// carried in the drag payload, if any.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DropEvent {
    pub client_x: f64,
    pub client_y: f64,
    #[serde(default)]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Other(String),
}

impl Key {
    pub fn parse(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            other => Key::Other(other.to_string()),
        }
    }

    fn deletes(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementController {
    viewport: PageViewport,
    drag: DragState,
    selected: Option<FieldId>,
    surface: Option<SurfaceRect>,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh controller for a newly opened document, seeded with the page
    /// count read at upload until the renderer reports its own.
    pub fn for_document(doc: &Document) -> Self {
        let mut controller = Self::new();
        if let Some(pages) = doc.page_count_hint() {
            controller.viewport.on_load_success(pages);
        }
        controller
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn on_load_success(&mut self, num_pages: u32) {
        self.viewport.on_load_success(num_pages);
    }

    pub fn on_size(&mut self, size: PageSize) {
        self.viewport.on_size(size);
    }

    /// The page surface wrapper was laid out at `rect`.
    pub fn on_surface_layout(&mut self, rect: SurfaceRect) {
        self.surface = Some(rect);
    }

    pub fn on_surface_detached(&mut self) {
        self.surface = None;
        self.drag = DragState::Idle;
    }

    /// Switching pages only changes which fields are displayed.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.viewport.request_page(page);
        if changed {
            self.selected = None;
        }
        changed
    }

    pub fn next_page(&mut self) -> bool {
        let page = self.viewport.current_page().saturating_add(1);
        self.go_to_page(page)
    }

    pub fn prev_page(&mut self) -> bool {
        let page = self.viewport.current_page().saturating_sub(1);
        self.go_to_page(page)
    }

    pub fn on_drag_over(&mut self) {
        self.drag = DragState::DraggingOver;
    }

    /// Drag left the surface or was cancelled: indistinguishable from never
    /// having started.
    pub fn on_drag_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Commits a dropped field token. On any rejection no field is created
    /// and the store is not touched.
    pub fn on_drop<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        event: &DropEvent,
    ) -> Result<FieldId, EditorError> {
        self.drag = DragState::Idle;

        let document = store.current_document().ok_or(EditorError::NotReady)?;
        let surface = self.surface.ok_or(EditorError::NotReady)?;
        let size = self.viewport.ready_size().ok_or(EditorError::NotReady)?;
        let field_type: FieldType = event
            .field_type
            .as_deref()
            .ok_or_else(|| EditorError::InvalidFieldType(String::new()))?
            .parse()?;

        let page = self.viewport.current_page();
        if page > self.viewport.num_pages() {
            return Err(EditorError::PageOutOfRange {
                page,
                num_pages: self.viewport.num_pages(),
            });
        }

        let local = surface.to_local(event.client_x, event.client_y);
        let position = to_percent(local, size);
        let field = DocumentField::new(field_type, position, page, document.first_recipient());
        let field_id = field.id;
        let document_id = document.id;

        store.add_field(&document_id, field)?;
        info!(
            "placed {} field {} on page {} at ({:.2}%, {:.2}%)",
            field_type,
            field_id,
            page,
            position.x(),
            position.y()
        );
        self.selected = Some(field_id);
        Ok(field_id)
    }

    /// Selects `field_id` if it is placed on the displayed page; any other
    /// id leaves the selection unchanged.
    pub fn on_field_click(&mut self, doc: &Document, field_id: FieldId) {
        let page = self.viewport.current_page();
        if doc.fields_on_page(page).any(|f| f.id == field_id) {
            debug!("field {} selected", field_id);
            self.selected = Some(field_id);
        } else {
            debug!("ignoring click on field {} not shown on page {}", field_id, page);
        }
    }

    /// Click on the surface outside any field.
    pub fn on_surface_click(&mut self) {
        self.selected = None;
    }

    /// Delete/Backspace removes the selected field. Returns the removed id.
    pub fn on_key<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        key: &Key,
    ) -> Result<Option<FieldId>, EditorError> {
        if !key.deletes() {
            return Ok(None);
        }
        self.delete_selected(store)
    }

    pub fn delete_selected<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<Option<FieldId>, EditorError> {
        let Some(field_id) = self.selected else {
            return Ok(None);
        };
        self.delete_field(store, field_id)?;
        Ok(Some(field_id))
    }

    /// Explicit delete affordance on a placed field.
    pub fn delete_field<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        field_id: FieldId,
    ) -> Result<bool, EditorError> {
        let document_id = store
            .current_document()
            .map(|d| d.id)
            .ok_or(EditorError::NotReady)?;
        let removed = store.remove_field(&document_id, &field_id)?;
        if self.selected == Some(field_id) {
            self.selected = None;
        }
        if removed {
            info!("removed field {} from {}", field_id, document_id);
        }
        Ok(removed)
    }

    /// Fields of the displayed page, in paint order.
    pub fn visible_fields<'a>(&self, doc: &'a Document) -> Vec<&'a DocumentField> {
        doc.fields_on_page(self.viewport.current_page()).collect()
    }

    /// Pixel overlays for the displayed page, or `None` until the page has
    /// a known rendered size.
    pub fn overlays(&self, doc: &Document) -> Option<Vec<FieldOverlay>> {
        let size = self.viewport.ready_size()?;
        Some(project_overlays(
            doc,
            self.viewport.current_page(),
            size,
            self.selected,
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldSize, Recipient};
    use crate::store::MemoryStore;

    fn ready_editor(pages: u32) -> (MemoryStore, PlacementController) {
        let mut store = MemoryStore::new();
        let doc = Document::new("nda.pdf", None);
        let id = doc.id;
        store.add_document(doc).unwrap();
        store.set_current_document(Some(id)).unwrap();

        let mut editor = PlacementController::new();
        editor.on_load_success(pages);
        editor.on_surface_layout(SurfaceRect::new(20.0, 100.0));
        editor.on_size(PageSize::new(400.0, 300.0));
        (store, editor)
    }

    fn drop_of(kind: &str, x: f64, y: f64) -> DropEvent {
        DropEvent {
            client_x: x,
            client_y: y,
            field_type: Some(kind.to_string()),
        }
    }

    fn fields(store: &MemoryStore) -> &[DocumentField] {
        &store.current_document().unwrap().fields
    }

    #[test]
    fn drop_creates_selected_field_at_percentage() {
        let (mut store, mut editor) = ready_editor(2);
        editor.on_drag_over();
        assert_eq!(editor.drag_state(), DragState::DraggingOver);

        let id = editor
            .on_drop(&mut store, &drop_of("signature", 120.0, 325.0))
            .unwrap();

        assert_eq!(editor.drag_state(), DragState::Idle);
        assert_eq!(editor.selected(), Some(id));
        let field = &fields(&store)[0];
        assert_eq!(field.id, id);
        assert_eq!(field.field_type, FieldType::Signature);
        assert_eq!(field.position.x(), 25.0);
        assert_eq!(field.position.y(), 75.0);
        assert_eq!(field.size, FieldSize::new(200.0, 50.0));
        assert!(field.required);
        assert_eq!(field.page, 1);
        assert_eq!(field.recipient_id, None);
    }

    #[test]
    fn drop_outside_page_bounds_is_clamped() {
        let (mut store, mut editor) = ready_editor(1);
        editor
            .on_drop(&mut store, &drop_of("checkbox", 0.0, 10_000.0))
            .unwrap();
        let field = &fields(&store)[0];
        assert_eq!(field.position.x(), 0.0);
        assert_eq!(field.position.y(), 100.0);
    }

    #[test]
    fn drop_before_size_is_known_does_nothing() {
        let (mut store, mut editor) = ready_editor(1);
        editor.on_size(PageSize::new(0.0, 0.0));
        assert_eq!(
            editor.on_drop(&mut store, &drop_of("text", 50.0, 150.0)),
            Err(EditorError::NotReady)
        );
        assert!(fields(&store).is_empty());
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn drop_without_surface_or_document_does_nothing() {
        let (mut store, mut editor) = ready_editor(1);
        editor.on_surface_detached();
        assert_eq!(
            editor.on_drop(&mut store, &drop_of("text", 50.0, 150.0)),
            Err(EditorError::NotReady)
        );

        editor.on_surface_layout(SurfaceRect::default());
        store.set_current_document(None).unwrap();
        assert_eq!(
            editor.on_drop(&mut store, &drop_of("text", 50.0, 150.0)),
            Err(EditorError::NotReady)
        );
        assert!(store.documents()[0].fields.is_empty());
    }

    #[test]
    fn drop_with_missing_or_unknown_type_does_nothing() {
        let (mut store, mut editor) = ready_editor(1);
        let mut event = drop_of("text", 50.0, 150.0);
        event.field_type = None;
        assert!(matches!(
            editor.on_drop(&mut store, &event),
            Err(EditorError::InvalidFieldType(_))
        ));
        assert!(matches!(
            editor.on_drop(&mut store, &drop_of("stamp", 50.0, 150.0)),
            Err(EditorError::InvalidFieldType(_))
        ));
        assert!(fields(&store).is_empty());
    }

    #[test]
    fn drop_assigns_first_recipient() {
        let (mut store, mut editor) = ready_editor(1);
        let mut doc = store.current_document().cloned().unwrap();
        let signer = Recipient::new("Dana", "dana@example.com");
        let signer_id = signer.id;
        doc.recipients.push(signer);
        doc.recipients.push(Recipient::new("Eli", "eli@example.com"));
        store.update_document(doc).unwrap();

        editor.on_drop(&mut store, &drop_of("initial", 60.0, 160.0)).unwrap();
        assert_eq!(fields(&store)[0].recipient_id, Some(signer_id));
    }

    #[test]
    fn drop_lands_on_displayed_page() {
        let (mut store, mut editor) = ready_editor(3);
        assert!(editor.next_page());
        editor.on_size(PageSize::new(400.0, 300.0));
        editor.on_drop(&mut store, &drop_of("date", 60.0, 160.0)).unwrap();
        assert_eq!(fields(&store)[0].page, 2);
    }

    #[test]
    fn selection_is_exclusive_and_cleared_by_surface_click() {
        let (mut store, mut editor) = ready_editor(1);
        let a = editor.on_drop(&mut store, &drop_of("text", 30.0, 110.0)).unwrap();
        let b = editor.on_drop(&mut store, &drop_of("text", 60.0, 160.0)).unwrap();
        assert_eq!(editor.selected(), Some(b));
        editor.on_field_click(store.current_document().unwrap(), a);
        assert_eq!(editor.selected(), Some(a));

        let overlays = editor.overlays(store.current_document().unwrap()).unwrap();
        assert_eq!(overlays.iter().filter(|o| o.selected).count(), 1);

        editor.on_surface_click();
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn click_on_field_of_hidden_page_is_ignored() {
        let (mut store, mut editor) = ready_editor(2);
        let hidden = editor.on_drop(&mut store, &drop_of("text", 30.0, 110.0)).unwrap();
        assert!(editor.next_page());
        assert_eq!(editor.selected(), None);

        editor.on_field_click(store.current_document().unwrap(), hidden);
        assert_eq!(editor.selected(), None);
        editor.on_field_click(store.current_document().unwrap(), FieldId::new());
        assert_eq!(editor.selected(), None);

        assert_eq!(editor.on_key(&mut store, &Key::Delete), Ok(None));
        assert_eq!(fields(&store).len(), 1);
    }

    #[test]
    fn delete_key_removes_selected_field_only() {
        let (mut store, mut editor) = ready_editor(1);
        let keep = editor.on_drop(&mut store, &drop_of("text", 30.0, 110.0)).unwrap();
        let gone = editor.on_drop(&mut store, &drop_of("date", 60.0, 160.0)).unwrap();

        assert_eq!(editor.on_key(&mut store, &Key::parse("Enter")), Ok(None));
        assert_eq!(fields(&store).len(), 2);

        assert_eq!(editor.on_key(&mut store, &Key::Backspace), Ok(Some(gone)));
        assert_eq!(editor.selected(), None);
        let ids: Vec<FieldId> = fields(&store).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![keep]);

        // Nothing selected: key is a no-op.
        assert_eq!(editor.on_key(&mut store, &Key::Delete), Ok(None));
        assert_eq!(fields(&store).len(), 1);
    }

    #[test]
    fn explicit_delete_clears_selection_and_tolerates_repeats() {
        let (mut store, mut editor) = ready_editor(1);
        let id = editor.on_drop(&mut store, &drop_of("checkbox", 30.0, 110.0)).unwrap();
        assert_eq!(editor.delete_field(&mut store, id), Ok(true));
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.delete_field(&mut store, id), Ok(false));
        assert!(fields(&store).is_empty());
    }

    #[test]
    fn page_switch_changes_displayed_subset_without_mutation() {
        let (mut store, mut editor) = ready_editor(2);
        let first = editor.on_drop(&mut store, &drop_of("text", 30.0, 110.0)).unwrap();
        editor.next_page();
        editor.on_size(PageSize::new(400.0, 300.0));
        let second = editor.on_drop(&mut store, &drop_of("text", 30.0, 110.0)).unwrap();
        let snapshot = fields(&store).to_vec();

        editor.prev_page();
        let doc = store.current_document().unwrap();
        let shown: Vec<FieldId> = editor.visible_fields(doc).iter().map(|f| f.id).collect();
        assert_eq!(shown, vec![first]);
        assert_eq!(editor.selected(), None);
        assert!(editor.overlays(doc).is_none(), "size must be re-reported per page");

        editor.next_page();
        let shown: Vec<FieldId> = editor.visible_fields(doc).iter().map(|f| f.id).collect();
        assert_eq!(shown, vec![second]);
        assert_eq!(fields(&store), snapshot.as_slice());
    }

    #[test]
    fn resize_reprojects_without_touching_fields() {
        let (mut store, mut editor) = ready_editor(1);
        editor.on_drop(&mut store, &drop_of("text", 120.0, 325.0)).unwrap();
        let before = fields(&store).to_vec();

        let doc = store.current_document().unwrap();
        let small = editor.overlays(doc).unwrap();
        editor.on_size(PageSize::new(800.0, 600.0));
        let large = editor.overlays(doc).unwrap();

        assert_eq!((small[0].left, small[0].top), (100.0, 225.0));
        assert_eq!((large[0].left, large[0].top), (200.0, 450.0));
        assert_eq!(fields(&store), before.as_slice());
    }
}

//! Signer-side renderer: re-projects stored fields onto the signer's own
//! surface and collects values locally until completion.

use std::collections::BTreeMap;

use log::info;

use crate::document::{Document, DocumentId, DocumentStatus, FieldId};
use crate::error::EditorError;
use crate::features::viewer::{project_overlays, FieldOverlay, PageViewport};
use crate::geometry::PageSize;
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct SigningSession {
    document_id: DocumentId,
    viewport: PageViewport,
    values: BTreeMap<FieldId, String>,
}

impl SigningSession {
    pub fn open<S: DocumentStore + ?Sized>(
        store: &S,
        document_id: DocumentId,
    ) -> Result<Self, EditorError> {
        let doc = store
            .document(&document_id)
            .ok_or(EditorError::UnresolvedDocument(document_id))?;
        if doc.status == DocumentStatus::Completed {
            return Err(EditorError::AlreadyCompleted(document_id));
        }
        let mut viewport = PageViewport::new();
        if let Some(pages) = doc.page_count_hint() {
            viewport.on_load_success(pages);
        }
        Ok(Self {
            document_id,
            viewport,
            values: BTreeMap::new(),
        })
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn document<'a, S: DocumentStore + ?Sized>(&self, store: &'a S) -> Option<&'a Document> {
        store.document(&self.document_id)
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    pub fn on_load_success(&mut self, num_pages: u32) {
        self.viewport.on_load_success(num_pages);
    }

    pub fn on_size(&mut self, size: PageSize) {
        self.viewport.on_size(size);
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        self.viewport.request_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.viewport.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.viewport.prev_page()
    }

    /// Records a value for `field_id` in the local map, normalized for the
    /// field's type. An empty normalized value clears the entry.
    pub fn set_value(
        &mut self,
        doc: &Document,
        field_id: FieldId,
        raw: &str,
    ) -> Result<(), EditorError> {
        let field = doc.field(&field_id).ok_or(EditorError::UnresolvedField {
            document: doc.id,
            field: field_id,
        })?;
        let value = field
            .field_type
            .normalize_value(raw)
            .map_err(|reason| EditorError::InvalidValue {
                field: field_id,
                reason,
            })?;
        if value.is_empty() {
            self.values.remove(&field_id);
        } else {
            self.values.insert(field_id, value);
        }
        Ok(())
    }

    pub fn value(&self, field_id: &FieldId) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }

    /// Required fields that still have no value, in document order.
    pub fn missing_required(&self, doc: &Document) -> Vec<FieldId> {
        doc.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| self.values.get(&f.id).map_or(true, |v| v.is_empty()))
            .map(|f| f.id)
            .collect()
    }

    pub fn can_complete(&self, doc: &Document) -> bool {
        self.missing_required(doc).is_empty()
    }

    pub fn overlays(&self, doc: &Document) -> Option<Vec<FieldOverlay>> {
        let size = self.viewport.ready_size()?;
        Some(project_overlays(
            doc,
            self.viewport.current_page(),
            size,
            None,
            Some(&self.values),
        ))
    }

    /// Stamps every field with its value (empty when unfilled), marks the
    /// document completed and writes it back in a single store call.
    pub fn complete<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<(), EditorError> {
        let doc = store
            .document(&self.document_id)
            .ok_or(EditorError::UnresolvedDocument(self.document_id))?;
        if doc.status == DocumentStatus::Completed {
            return Err(EditorError::AlreadyCompleted(self.document_id));
        }
        let missing = self.missing_required(doc).len();
        if missing > 0 {
            return Err(EditorError::SigningIncomplete { missing });
        }

        let mut updated = doc.clone();
        updated.status = DocumentStatus::Completed;
        for field in updated.fields.iter_mut() {
            field.value = Some(self.values.get(&field.id).cloned().unwrap_or_default());
        }
        store.update_document(updated)?;
        info!("document {} signed", self.document_id);
        Ok(())
    }
}

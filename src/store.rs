//! Document store: the only place allowed to mutate documents and the
//! current-document pointer. Every operation either applies completely or
//! leaves the store untouched.

use log::{debug, info};

use crate::document::{Document, DocumentField, DocumentId, FieldId, FieldPatch};
use crate::error::EditorError;

pub trait DocumentStore {
    fn documents(&self) -> &[Document];

    fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents().iter().find(|d| d.id == *id)
    }

    fn current_document(&self) -> Option<&Document>;

    fn add_document(&mut self, doc: Document) -> Result<(), EditorError>;

    /// `None` clears the pointer. A non-member id is refused so the pointer
    /// always names an element of `documents`.
    fn set_current_document(&mut self, id: Option<DocumentId>) -> Result<(), EditorError>;

    fn add_field(&mut self, document_id: &DocumentId, field: DocumentField)
        -> Result<(), EditorError>;

    fn update_field(
        &mut self,
        document_id: &DocumentId,
        field_id: &FieldId,
        patch: FieldPatch,
    ) -> Result<(), EditorError>;

    /// Returns whether a field was removed; removing an absent field is `Ok(false)`.
    fn remove_field(
        &mut self,
        document_id: &DocumentId,
        field_id: &FieldId,
    ) -> Result<bool, EditorError>;

    /// Replaces the stored document with the same id wholesale.
    fn update_document(&mut self, doc: Document) -> Result<(), EditorError>;
}

/// Process-lifetime store backed by a `Vec`, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
    current: Option<DocumentId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn document_mut(&mut self, id: &DocumentId) -> Result<&mut Document, EditorError> {
        self.documents
            .iter_mut()
            .find(|d| d.id == *id)
            .ok_or(EditorError::UnresolvedDocument(*id))
    }
}

impl DocumentStore for MemoryStore {
    fn documents(&self) -> &[Document] {
        &self.documents
    }

    fn current_document(&self) -> Option<&Document> {
        let id = self.current?;
        self.document(&id)
    }

    fn add_document(&mut self, doc: Document) -> Result<(), EditorError> {
        if self.document(&doc.id).is_some() {
            return Err(EditorError::DuplicateId(doc.id));
        }
        info!("document {} added ({})", doc.id, doc.name);
        self.documents.push(doc);
        Ok(())
    }

    fn set_current_document(&mut self, id: Option<DocumentId>) -> Result<(), EditorError> {
        if let Some(id) = id {
            if self.document(&id).is_none() {
                return Err(EditorError::UnresolvedDocument(id));
            }
        }
        self.current = id;
        Ok(())
    }

    fn add_field(
        &mut self,
        document_id: &DocumentId,
        field: DocumentField,
    ) -> Result<(), EditorError> {
        let doc = self.document_mut(document_id)?;
        if doc.field(&field.id).is_some() {
            return Err(EditorError::DuplicateField {
                document: *document_id,
                field: field.id,
            });
        }
        debug!("field {} ({}) added to {}", field.id, field.field_type, document_id);
        doc.fields.push(field);
        Ok(())
    }

    fn update_field(
        &mut self,
        document_id: &DocumentId,
        field_id: &FieldId,
        patch: FieldPatch,
    ) -> Result<(), EditorError> {
        let doc = self.document_mut(document_id)?;
        let field = doc
            .fields
            .iter_mut()
            .find(|f| f.id == *field_id)
            .ok_or(EditorError::UnresolvedField {
                document: *document_id,
                field: *field_id,
            })?;
        patch.apply(field);
        Ok(())
    }

    fn remove_field(
        &mut self,
        document_id: &DocumentId,
        field_id: &FieldId,
    ) -> Result<bool, EditorError> {
        let doc = self.document_mut(document_id)?;
        let before = doc.fields.len();
        doc.fields.retain(|f| f.id != *field_id);
        let removed = doc.fields.len() != before;
        if removed {
            debug!("field {} removed from {}", field_id, document_id);
        }
        Ok(removed)
    }

    fn update_document(&mut self, doc: Document) -> Result<(), EditorError> {
        let slot = self.document_mut(&doc.id)?;
        *slot = doc;
        Ok(())
    }
}

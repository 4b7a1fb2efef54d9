use thiserror::Error;

use crate::document::{DocumentId, FieldId};

/// Failures of the editor core. None of them is fatal: each one means a single
/// drop, click or store call was ignored and the rest of the state is intact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// The page surface, its rendered size, or the current document is not
    /// available yet.
    #[error("page surface not ready")]
    NotReady,
    #[error("unknown document {0}")]
    UnresolvedDocument(DocumentId),
    #[error("unknown field {field} in document {document}")]
    UnresolvedField { document: DocumentId, field: FieldId },
    #[error("invalid field type: {0:?}")]
    InvalidFieldType(String),
    #[error("document {0} already exists")]
    DuplicateId(DocumentId),
    #[error("field {field} already exists in document {document}")]
    DuplicateField { document: DocumentId, field: FieldId },
    #[error("page {page} outside 1..={num_pages}")]
    PageOutOfRange { page: u32, num_pages: u32 },
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: FieldId, reason: String },
    #[error("{missing} required field(s) still empty")]
    SigningIncomplete { missing: usize },
    #[error("document {0} is already signed")]
    AlreadyCompleted(DocumentId),
}

impl EditorError {
    /// Unknown document or field ids point at a UI/state desync, not at user error.
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(
            self,
            EditorError::UnresolvedDocument(_) | EditorError::UnresolvedField { .. }
        )
    }
}

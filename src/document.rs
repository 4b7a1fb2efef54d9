use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::catalog::FieldType;
use crate::geometry::{PageSize, Position};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

uuid_id!(DocumentId);
uuid_id!(FieldId);
uuid_id!(RecipientId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: RecipientId::new(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Pixel footprint of a field at authoring scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: f64,
    pub height: f64,
}

impl FieldSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Source PDF bytes. Clones share the same immutable buffer.
#[derive(Clone)]
pub struct PdfFile {
    bytes: Arc<[u8]>,
    page_count: u32,
    page_points: Option<PageSize>,
}

impl PdfFile {
    pub fn new(bytes: Vec<u8>, page_count: u32) -> Self {
        Self {
            bytes: bytes.into(),
            page_count,
            page_points: None,
        }
    }

    /// Records the first page's media box, in PDF points.
    pub fn with_page_points(mut self, points: Option<PageSize>) -> Self {
        self.page_points = points.filter(PageSize::is_ready);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_points(&self) -> Option<PageSize> {
        self.page_points
    }

    /// Page count read at upload. The renderer's load callback wins when
    /// the two disagree.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

impl fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfFile")
            .field("len", &self.bytes.len())
            .field("page_count", &self.page_count)
            .field("page_points", &self.page_points)
            .finish()
    }
}

impl PartialEq for PdfFile {
    fn eq(&self, other: &Self) -> bool {
        self.page_count == other.page_count
            && self.page_points == other.page_points
            && self.bytes == other.bytes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// `None` while the document has no recipients.
    pub recipient_id: Option<RecipientId>,
    pub position: Position,
    pub size: FieldSize,
    pub required: bool,
    /// 1-based.
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DocumentField {
    /// A required, unfilled field with the catalog's default footprint.
    pub fn new(
        field_type: FieldType,
        position: Position,
        page: u32,
        recipient_id: Option<RecipientId>,
    ) -> Self {
        Self {
            id: FieldId::new(),
            field_type,
            recipient_id,
            position,
            size: field_type.default_size(),
            required: true,
            page,
            value: None,
        }
    }
}

/// Partial update merged into an existing field. `None` leaves the
/// corresponding attribute untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub position: Option<Position>,
    pub size: Option<FieldSize>,
    pub required: Option<bool>,
    pub recipient_id: Option<Option<RecipientId>>,
    pub page: Option<u32>,
    pub value: Option<Option<String>>,
}

impl FieldPatch {
    pub fn apply(self, field: &mut DocumentField) {
        if let Some(position) = self.position {
            field.position = position;
        }
        if let Some(size) = self.size {
            field.size = size;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(recipient_id) = self.recipient_id {
            field.recipient_id = recipient_id;
        }
        if let Some(page) = self.page {
            field.page = page;
        }
        if let Some(value) = self.value {
            field.value = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub recipients: Vec<Recipient>,
    /// Insertion order is paint order.
    pub fields: Vec<DocumentField>,
    #[serde(skip)]
    pub file: Option<PdfFile>,
}

impl Document {
    pub fn new(name: impl Into<String>, file: Option<PdfFile>) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            upload_date: Utc::now(),
            status: DocumentStatus::Draft,
            recipients: Vec::new(),
            fields: Vec::new(),
            file,
        }
    }

    /// Default assignee for new fields: the first recipient, if any.
    pub fn first_recipient(&self) -> Option<RecipientId> {
        self.recipients.first().map(|r| r.id)
    }

    pub fn field(&self, id: &FieldId) -> Option<&DocumentField> {
        self.fields.iter().find(|f| f.id == *id)
    }

    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &DocumentField> + '_ {
        self.fields.iter().filter(move |f| f.page == page)
    }

    pub fn page_count_hint(&self) -> Option<u32> {
        self.file.as_ref().map(PdfFile::page_count).filter(|n| *n > 0)
    }
}

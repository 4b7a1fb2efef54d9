//! State fed by the external page renderer (page count, displayed page,
//! rendered surface size) and the projection of stored fields onto that
//! surface.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::{Document, FieldId};
use crate::features::catalog::{FieldControl, FieldType};
use crate::geometry::{to_pixel, PageSize};

#[derive(Debug, Clone, PartialEq)]
pub struct PageViewport {
    num_pages: u32,
    current_page: u32,
    size: Option<PageSize>,
}

impl Default for PageViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl PageViewport {
    pub const fn new() -> Self {
        Self {
            num_pages: 1,
            current_page: 1,
            size: None,
        }
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Rendered size of the current page, once the renderer has reported a
    /// positive one.
    pub fn ready_size(&self) -> Option<PageSize> {
        self.size
    }

    pub fn is_ready(&self) -> bool {
        self.size.is_some()
    }

    pub fn on_load_success(&mut self, num_pages: u32) {
        self.num_pages = num_pages.max(1);
        self.current_page = self.current_page.clamp(1, self.num_pages);
        self.size = None;
    }

    /// `{0, 0}` (or any non-positive size) means "not yet known".
    pub fn on_size(&mut self, size: PageSize) {
        self.size = size.is_ready().then_some(size);
    }

    /// Clamps to `[1, num_pages]`; returns whether the displayed page changed.
    /// A change invalidates the rendered size until the new page reports one.
    pub fn request_page(&mut self, page: u32) -> bool {
        let target = page.clamp(1, self.num_pages);
        if target == self.current_page {
            return false;
        }
        self.current_page = target;
        self.size = None;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.request_page(self.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.request_page(self.current_page.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.num_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// A field positioned in pixels on the currently rendered surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOverlay {
    pub field_id: FieldId,
    pub field_type: FieldType,
    pub label: &'static str,
    pub control: FieldControl,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub required: bool,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Projects the fields of `page` onto a surface of `size`, in paint order.
/// Stored positions are read, never written.
pub fn project_overlays(
    doc: &Document,
    page: u32,
    size: PageSize,
    selected: Option<FieldId>,
    values: Option<&BTreeMap<FieldId, String>>,
) -> Vec<FieldOverlay> {
    doc.fields_on_page(page)
        .map(|field| {
            let origin = to_pixel(field.position, size);
            let value = match values {
                Some(map) => map.get(&field.id).cloned(),
                None => field.value.clone(),
            };
            FieldOverlay {
                field_id: field.id,
                field_type: field.field_type,
                label: field.field_type.label(),
                control: field.field_type.control(),
                left: origin.x,
                top: origin.y,
                width: field.size.width,
                height: field.size.height,
                required: field.required,
                selected: selected == Some(field.id),
                value,
            }
        })
        .collect()
}

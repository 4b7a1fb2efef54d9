use std::fs;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use log::info;
use lopdf::{Document as PdfDocument, Object, ObjectId};

use crate::document::{Document, DocumentId, PdfFile};
use crate::features::placement::PlacementController;
use crate::features::storage::parse_file_uri_path;
use crate::geometry::PageSize;
use crate::state::{AppState, Screen};

const MAX_PAGE_TREE_DEPTH: usize = 32;

/// What the upload inspection learned about a PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfInfo {
    pub page_count: u32,
    /// First page media box in points, when present.
    pub first_page_points: Option<PageSize>,
}

pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo, String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| format!("pdf_parse_failed:{e}"))?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err("pdf_has_no_pages".into());
    }
    let first_page_points = pages
        .values()
        .next()
        .and_then(|id| media_box(&doc, *id));
    Ok(PdfInfo {
        page_count: pages.len() as u32,
        first_page_points,
    })
}

/// Reads the uploaded file either from an inline base64 payload or from a
/// local path / `file://` uri.
pub fn read_upload(
    data_base64: Option<&str>,
    path: Option<&str>,
    max_bytes: usize,
) -> Result<Vec<u8>, String> {
    let bytes = if let Some(data) = data_base64.filter(|d| !d.trim().is_empty()) {
        let data = data.trim();
        if data.len() / 4 * 3 > max_bytes.saturating_add(2) {
            return Err("upload_too_large".into());
        }
        B64.decode(data.as_bytes())
            .map_err(|e| format!("upload_decode_failed:{e}"))?
    } else if let Some(raw) = path.filter(|p| !p.trim().is_empty()) {
        let resolved = parse_file_uri_path(raw).ok_or_else(|| "upload_path_unsupported".to_string())?;
        let meta = fs::metadata(&resolved).map_err(|e| format!("upload_read_failed:{e}"))?;
        if meta.len() > max_bytes as u64 {
            return Err("upload_too_large".into());
        }
        fs::read(&resolved).map_err(|e| format!("upload_read_failed:{e}"))?
    } else {
        return Err("missing_upload".into());
    };
    if bytes.len() > max_bytes {
        return Err("upload_too_large".into());
    }
    Ok(bytes)
}

/// Creates a draft document from an uploaded PDF and opens it in the editor.
pub fn handle_document_upload(
    state: &mut AppState,
    name: Option<&str>,
    data_base64: Option<&str>,
    path: Option<&str>,
) -> Result<DocumentId, String> {
    let bytes = read_upload(data_base64, path, state.config.max_upload_bytes)?;
    let info = inspect_pdf(&bytes)?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| path.and_then(file_name_of))
        .unwrap_or_else(|| "document.pdf".to_string());

    let file = PdfFile::new(bytes, info.page_count).with_page_points(info.first_page_points);
    let doc = Document::new(name, Some(file));
    let id = doc.id;
    info!(
        "upload {} -> document {} ({} pages)",
        doc.name, id, info.page_count
    );
    let editor = PlacementController::for_document(&doc);
    state.store.add_document(doc).map_err(|e| e.to_string())?;
    state
        .store
        .set_current_document(Some(id))
        .map_err(|e| e.to_string())?;
    state.editor = editor;
    state.signing = None;
    state.push_screen(Screen::Editor);
    Ok(id)
}

fn file_name_of(path: &str) -> Option<String> {
    parse_file_uri_path(path)?
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// Media box of a page in points, inherited from the page tree when the
/// page itself has none.
fn media_box(doc: &PdfDocument, page_id: ObjectId) -> Option<PageSize> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(raw) = node.get(b"MediaBox") {
            return media_box_size(doc, raw);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn media_box_size(doc: &PdfDocument, raw: &Object) -> Option<PageSize> {
    let (_, resolved) = doc.dereference(raw).ok()?;
    let coords: Vec<f64> = resolved
        .as_array()
        .ok()?
        .iter()
        .map(|o| o.as_float().map(f64::from))
        .collect::<Result<_, _>>()
        .ok()?;
    match coords.as_slice() {
        [llx, lly, urx, ury] => Some(PageSize::new((urx - llx).abs(), (ury - lly).abs())),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn sample_pdf(pages: u32) -> Vec<u8> {
    use lopdf::dictionary;

    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..pages {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(pages as i64),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("sample pdf should serialize");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn inspect_reads_page_count_and_inherited_media_box() {
        let info = inspect_pdf(&sample_pdf(3)).unwrap();
        assert_eq!(info.page_count, 3);
        assert_eq!(info.first_page_points, Some(PageSize::new(612.0, 792.0)));
    }

    #[test]
    fn inspect_rejects_non_pdf_bytes() {
        let err = inspect_pdf(b"hello world").unwrap_err();
        assert!(err.starts_with("pdf_parse_failed"), "{err}");
    }

    #[test]
    fn read_upload_prefers_inline_payload() {
        let encoded = B64.encode(b"%PDF-1.5 tiny");
        let bytes = read_upload(Some(&encoded), Some("/nonexistent.pdf"), 1024).unwrap();
        assert_eq!(bytes, b"%PDF-1.5 tiny");
    }

    #[test]
    fn read_upload_enforces_limit_and_presence() {
        let encoded = B64.encode(vec![0u8; 64]);
        assert_eq!(read_upload(Some(&encoded), None, 16), Err("upload_too_large".into()));
        assert_eq!(read_upload(None, None, 16), Err("missing_upload".into()));
        assert_eq!(
            read_upload(None, Some("content://media/1"), 16),
            Err("upload_path_unsupported".into())
        );
    }

    #[test]
    fn oversized_inline_payload_is_refused_before_decoding() {
        // Not valid base64: a decode attempt would report upload_decode_failed.
        let payload = "!".repeat(4096);
        assert_eq!(read_upload(Some(&payload), None, 1024), Err("upload_too_large".into()));
        let fits = B64.encode(vec![7u8; 1024]);
        assert_eq!(read_upload(Some(&fits), None, 1024).map(|b| b.len()), Ok(1024));
    }

    #[test]
    fn upload_from_path_creates_current_draft_in_editor() {
        let pdf = sample_pdf(2);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&pdf).unwrap();
        file.flush().unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let mut state = AppState::new();
        let id = handle_document_upload(&mut state, Some("lease.pdf"), None, Some(&path)).unwrap();

        let doc = state.store.current_document().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.name, "lease.pdf");
        assert!(doc.fields.is_empty() && doc.recipients.is_empty());
        assert_eq!(doc.page_count_hint(), Some(2));
        let file = doc.file.as_ref().unwrap();
        assert_eq!(file.page_points(), Some(PageSize::new(612.0, 792.0)));
        assert_eq!(file.bytes(), pdf.as_slice());
        assert_eq!(state.editor.viewport().num_pages(), 2);
        assert_eq!(state.current_screen(), Screen::Editor);
    }

    #[test]
    fn failed_upload_leaves_store_untouched() {
        let mut state = AppState::new();
        let encoded = B64.encode(b"not a pdf");
        assert!(handle_document_upload(&mut state, None, Some(&encoded), None).is_err());
        assert!(state.store.documents().is_empty());
        assert!(state.store.current_document().is_none());
    }
}

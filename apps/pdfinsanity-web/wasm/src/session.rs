//! Stateful workspace session
//!
//! Holds the whole document collection in Rust. JavaScript forwards DOM events
//! (clicks with their modifier keys, drops, button presses) and renders the
//! snapshots returned by `documents()` and `pages()`.
//!
//! Ids cross the boundary as UUID strings. An edit whose target disappeared
//! before it could be applied is a silent no-op, not an error.

use crate::page_info::page_infos;
use pdfinsanity_core::{
    ClickKind, Config, DocumentCollection, EditOutcome, Export, IncomingFile, ItemId,
    PdfInsanityError,
};
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::prelude::*;

/// Files gathered from one picker selection or drop, imported together
#[wasm_bindgen]
#[derive(Default)]
pub struct ImportBatch {
    files: Vec<IncomingFile>,
}

#[wasm_bindgen]
impl ImportBatch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file. `mime` is the browser-reported type, possibly empty.
    pub fn add(&mut self, name: &str, mime: Option<String>, bytes: &[u8]) {
        self.files
            .push(IncomingFile::new(name, mime.as_deref(), bytes.to_vec()));
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.files.len()
    }
}

/// Document row for the list view
#[derive(Debug, Serialize)]
struct DocumentView {
    id: String,
    name: String,
    page_count: u32,
    size_bytes: usize,
    revision: u64,
    selected: bool,
    inspected: bool,
}

/// Page tile for the page editor
#[derive(Debug, Serialize)]
struct PageView {
    id: String,
    /// 1-based page number in the saved document, for the renderer
    page_num: u32,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct ImportFailureView {
    filename: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ImportReportView {
    imported: Vec<String>,
    failures: Vec<ImportFailureView>,
}

fn parse_id(id: &str) -> Result<ItemId, String> {
    id.parse()
        .map_err(|e| format!("Invalid id '{}': {}", id, e))
}

/// Stale targets are dropped quietly; everything else is reported
fn settle(result: Result<EditOutcome, PdfInsanityError>) -> Result<Option<EditOutcome>, String> {
    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(PdfInsanityError::TargetNotFound(detail)) => {
            debug!("Ignoring edit: {}", detail);
            Ok(None)
        }
        Err(e) => Err(e.to_string()),
    }
}

fn created_id(outcome: Option<EditOutcome>) -> Option<String> {
    match outcome {
        Some(EditOutcome::Created(id)) => Some(id.to_string()),
        _ => None,
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn to_uint8_array(bytes: &[u8]) -> js_sys::Uint8Array {
    let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
    array.copy_from(bytes);
    array
}

/// Stateful session that holds every document in Rust memory
#[wasm_bindgen]
pub struct WorkspaceSession {
    collection: DocumentCollection,
}

impl WorkspaceSession {
    fn with_config(config: Config) -> Self {
        Self {
            collection: DocumentCollection::new(config),
        }
    }

    fn import_internal(&mut self, batch: ImportBatch) -> ImportReportView {
        let report = self.collection.import_files(batch.files);
        ImportReportView {
            imported: report.imported.iter().map(ItemId::to_string).collect(),
            failures: report
                .failures
                .into_iter()
                .map(|failure| ImportFailureView {
                    filename: failure.filename,
                    message: failure.error.to_string(),
                })
                .collect(),
        }
    }

    fn document_views(&self) -> Vec<DocumentView> {
        let documents = self.collection.documents();
        documents
            .iter()
            .map(|item| DocumentView {
                id: item.id.to_string(),
                name: item.payload.name().to_string(),
                page_count: item.payload.page_count(),
                size_bytes: item.payload.size_bytes(),
                revision: item.payload.revision(),
                selected: documents.is_selected(item.id),
                inspected: documents.inspected() == Some(item.id),
            })
            .collect()
    }

    fn page_views(&self) -> Option<Vec<PageView>> {
        self.collection.page_editor().map(|editor| {
            editor
                .pages()
                .iter()
                .map(|page| PageView {
                    id: page.id.to_string(),
                    page_num: page.original_index() + 1,
                    selected: editor.is_selected(page.id),
                })
                .collect()
        })
    }

    fn click_internal(&mut self, id: &str, kind: ClickKind) -> Result<(), String> {
        self.collection.route_click(kind, parse_id(id)?);
        Ok(())
    }

    fn click_page_internal(&mut self, id: &str, kind: ClickKind) -> Result<(), String> {
        let id = parse_id(id)?;
        if let Some(editor) = self.collection.page_editor_mut() {
            editor.route_click(kind, id);
        }
        Ok(())
    }

    fn reorder_pages_internal(&mut self, moved: &str, target: &str) -> Result<bool, String> {
        let (moved, target) = (parse_id(moved)?, parse_id(target)?);
        Ok(self
            .collection
            .page_editor_mut()
            .is_some_and(|editor| editor.reorder(moved, target)))
    }

    fn rename_internal(&mut self, name: &str) -> Result<(), String> {
        match self.collection.rename_inspected(name) {
            Ok(()) | Err(PdfInsanityError::TargetNotFound(_)) => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn merge_internal(&mut self, name: &str) -> Result<Option<String>, String> {
        if !self.collection.can_merge() {
            return Ok(None);
        }
        settle(self.collection.merge_selected(name)).map(created_id)
    }

    fn save_pages_internal(&mut self) -> Result<(), String> {
        settle(self.collection.save_page_edits()).map(|_| ())
    }

    fn extract_pages_internal(&mut self, name: &str) -> Result<Option<String>, String> {
        let has_pages = self
            .collection
            .page_editor()
            .is_some_and(|editor| editor.has_selection());
        if !has_pages {
            return Ok(None);
        }
        settle(self.collection.extract_selected_pages(name)).map(created_id)
    }

    fn export_internal(&self) -> Vec<Export> {
        self.collection.export_selected()
    }

    fn with_page_editor(&mut self, edit: impl FnOnce(&mut pdfinsanity_core::PageEditor)) {
        if let Some(editor) = self.collection.page_editor_mut() {
            edit(editor);
        }
    }
}

#[wasm_bindgen]
impl WorkspaceSession {
    /// Create a session. `config_json` may override page size, merge name and compression.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WorkspaceSession, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => Config::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Config::default(),
        };
        Ok(Self::with_config(config))
    }

    /// Import a batch. Returns `{ imported: [id], failures: [{ filename, message }] }`.
    #[wasm_bindgen(js_name = importBatch)]
    pub fn import_batch(&mut self, batch: ImportBatch) -> Result<JsValue, JsValue> {
        let report = self.import_internal(batch);
        to_js(&report)
    }

    /// Document rows in display order
    pub fn documents(&self) -> Result<JsValue, JsValue> {
        to_js(&self.document_views())
    }

    /// Page tiles of the inspected document, or null when nothing is inspected
    pub fn pages(&self) -> Result<JsValue, JsValue> {
        to_js(&self.page_views())
    }

    /// Bytes of a document, for the thumbnail renderer
    #[wasm_bindgen(js_name = documentBytes)]
    pub fn document_bytes(&self, id: &str) -> Result<js_sys::Uint8Array, JsValue> {
        let id = parse_id(id).map_err(|e| JsValue::from_str(&e))?;
        let document = self
            .collection
            .document(id)
            .ok_or_else(|| JsValue::from_str("Document not found"))?;
        Ok(to_uint8_array(document.bytes()))
    }

    /// Size and orientation of every page of a document
    #[wasm_bindgen(js_name = pageInfos)]
    pub fn page_infos(&self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_id(id).map_err(|e| JsValue::from_str(&e))?;
        let document = self
            .collection
            .document(id)
            .ok_or_else(|| JsValue::from_str("Document not found"))?;
        let infos = page_infos(document.bytes()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&infos)
    }

    /// Click on a document row
    pub fn click(
        &mut self,
        id: &str,
        ctrl: bool,
        meta: bool,
        shift: bool,
        double: bool,
    ) -> Result<(), JsValue> {
        let kind = ClickKind::from_modifiers(ctrl, meta, shift, double);
        self.click_internal(id, kind)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Click on the document list background
    #[wasm_bindgen(js_name = clickOutside)]
    pub fn click_outside(&mut self) {
        self.collection.click_outside();
    }

    /// Drop `moved` onto `target`'s position
    #[wasm_bindgen(js_name = reorderDocuments)]
    pub fn reorder_documents(&mut self, moved: &str, target: &str) -> Result<bool, JsValue> {
        let moved = parse_id(moved).map_err(|e| JsValue::from_str(&e))?;
        let target = parse_id(target).map_err(|e| JsValue::from_str(&e))?;
        Ok(self.collection.reorder(moved, target))
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> usize {
        self.collection.delete_selected()
    }

    /// Rename the inspected document
    pub fn rename(&mut self, name: &str) -> Result<(), JsValue> {
        self.rename_internal(name)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Merge the selected documents. Returns the new document's id.
    #[wasm_bindgen(js_name = mergeSelected)]
    pub fn merge_selected(&mut self, name: &str) -> Result<Option<String>, JsValue> {
        self.merge_internal(name)
            .map_err(|e| JsValue::from_str(&format!("Merge failed: {}", e)))
    }

    /// Selected documents as `[{ filename, bytes }]`, in display order
    #[wasm_bindgen(js_name = exportSelected)]
    pub fn export_selected(&self) -> Result<js_sys::Array, JsValue> {
        let array = js_sys::Array::new();
        for export in self.export_internal() {
            let entry = js_sys::Object::new();
            js_sys::Reflect::set(
                &entry,
                &JsValue::from_str("filename"),
                &JsValue::from_str(&export.filename),
            )?;
            js_sys::Reflect::set(
                &entry,
                &JsValue::from_str("bytes"),
                &to_uint8_array(&export.bytes),
            )?;
            array.push(&entry);
        }
        Ok(array)
    }

    #[wasm_bindgen(js_name = clickPage)]
    pub fn click_page(
        &mut self,
        id: &str,
        ctrl: bool,
        meta: bool,
        shift: bool,
        double: bool,
    ) -> Result<(), JsValue> {
        let kind = ClickKind::from_modifiers(ctrl, meta, shift, double);
        self.click_page_internal(id, kind)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = clickOutsidePages)]
    pub fn click_outside_pages(&mut self) {
        self.with_page_editor(|editor| editor.click_outside());
    }

    #[wasm_bindgen(js_name = reorderPages)]
    pub fn reorder_pages(&mut self, moved: &str, target: &str) -> Result<bool, JsValue> {
        self.reorder_pages_internal(moved, target)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = clonePages)]
    pub fn clone_pages(&mut self) {
        self.with_page_editor(|editor| editor.clone_selected());
    }

    #[wasm_bindgen(js_name = deletePages)]
    pub fn delete_pages(&mut self) {
        self.with_page_editor(|editor| editor.delete_selected());
    }

    #[wasm_bindgen(js_name = discardPages)]
    pub fn discard_pages(&mut self) {
        self.with_page_editor(|editor| editor.discard());
    }

    /// Commit the page arrangement to the inspected document
    #[wasm_bindgen(js_name = savePages)]
    pub fn save_pages(&mut self) -> Result<(), JsValue> {
        self.save_pages_internal()
            .map_err(|e| JsValue::from_str(&format!("Save failed: {}", e)))
    }

    /// Copy the selected pages into a new document. Returns its id.
    #[wasm_bindgen(js_name = extractPages)]
    pub fn extract_pages(&mut self, name: &str) -> Result<Option<String>, JsValue> {
        self.extract_pages_internal(name)
            .map_err(|e| JsValue::from_str(&format!("Extract failed: {}", e)))
    }

    #[wasm_bindgen(getter, js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.collection
            .page_editor()
            .is_some_and(|editor| editor.is_dirty())
    }

    #[wasm_bindgen(getter, js_name = canMerge)]
    pub fn can_merge(&self) -> bool {
        self.collection.can_merge()
    }

    #[wasm_bindgen(getter, js_name = hasSelection)]
    pub fn has_selection(&self) -> bool {
        self.collection.has_selection()
    }

    #[wasm_bindgen(getter, js_name = canRename)]
    pub fn can_rename(&self) -> bool {
        self.collection.can_rename()
    }

    #[wasm_bindgen(getter, js_name = hasPageSelection)]
    pub fn has_page_selection(&self) -> bool {
        self.collection
            .page_editor()
            .is_some_and(|editor| editor.has_selection())
    }

    #[wasm_bindgen(getter, js_name = documentCount)]
    pub fn document_count(&self) -> usize {
        self.collection.documents().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::create_test_pdf;
    use pretty_assertions::assert_eq;

    fn session_with(pages: &[u32]) -> (WorkspaceSession, Vec<String>) {
        let mut session = WorkspaceSession::with_config(Config::default());
        let mut batch = ImportBatch::new();
        for (i, &count) in pages.iter().enumerate() {
            batch.add(
                &format!("doc{}.pdf", i + 1),
                Some("application/pdf".to_string()),
                &create_test_pdf(count),
            );
        }
        let report = session.import_internal(batch);
        assert!(report.failures.is_empty());
        (session, report.imported)
    }

    fn page_ids(session: &WorkspaceSession) -> Vec<String> {
        session
            .page_views()
            .unwrap()
            .into_iter()
            .map(|page| page.id)
            .collect()
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = WorkspaceSession::with_config(Config::default());
        assert_eq!(session.document_count(), 0);
        assert!(!session.can_merge());
        assert!(!session.has_selection());
        assert!(!session.can_rename());
        assert!(session.page_views().is_none());
    }

    #[test]
    fn test_import_reports_failures_per_file() {
        let mut session = WorkspaceSession::with_config(Config::default());
        let mut batch = ImportBatch::new();
        batch.add("good.pdf", None, &create_test_pdf(2));
        batch.add("bad.txt", Some("text/plain".to_string()), b"hello");
        assert_eq!(batch.length(), 2);

        let report = session.import_internal(batch);

        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].filename, "bad.txt");
        assert!(report.failures[0].message.contains("text/plain"));
    }

    #[test]
    fn test_click_modifiers_drive_selection() {
        let (mut session, ids) = session_with(&[1, 1, 1]);

        session
            .click_internal(&ids[0], ClickKind::from_modifiers(false, false, false, false))
            .unwrap();
        session
            .click_internal(&ids[2], ClickKind::from_modifiers(false, false, true, false))
            .unwrap();
        assert!(session.document_views().iter().all(|d| d.selected));
        assert!(session.can_merge());

        session
            .click_internal(&ids[1], ClickKind::from_modifiers(false, true, false, false))
            .unwrap();
        let selected: Vec<bool> = session.document_views().iter().map(|d| d.selected).collect();
        assert_eq!(selected, vec![true, false, true]);

        session.click_outside();
        assert!(!session.has_selection());
    }

    #[test]
    fn test_invalid_id_is_an_error() {
        let (mut session, _) = session_with(&[1]);
        assert!(session.click_internal("not-a-uuid", ClickKind::Plain).is_err());
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let (mut session, _) = session_with(&[1]);
        let unknown = ItemId::new().to_string();
        session.click_internal(&unknown, ClickKind::Plain).unwrap();
        assert!(!session.has_selection());
    }

    #[test]
    fn test_page_editing_through_session() {
        let (mut session, ids) = session_with(&[3]);
        session.click_internal(&ids[0], ClickKind::Double).unwrap();

        let pages = page_ids(&session);
        assert_eq!(pages.len(), 3);
        session.click_page_internal(&pages[0], ClickKind::Plain).unwrap();
        session.delete_pages();
        assert!(session.is_dirty());

        session.save_pages_internal().unwrap();

        assert!(!session.is_dirty());
        let docs = session.document_views();
        assert_eq!(docs[0].page_count, 2);
        assert_eq!(docs[0].revision, 1);
        let page_nums: Vec<u32> = session
            .page_views()
            .unwrap()
            .iter()
            .map(|page| page.page_num)
            .collect();
        assert_eq!(page_nums, vec![1, 2]);
    }

    #[test]
    fn test_merge_returns_new_id() {
        let (mut session, ids) = session_with(&[1, 2]);
        assert_eq!(session.merge_internal("X").unwrap(), None);

        session.click_internal(&ids[0], ClickKind::Plain).unwrap();
        session.click_internal(&ids[1], ClickKind::Toggle).unwrap();
        let merged = session.merge_internal("").unwrap().unwrap();

        let docs = session.document_views();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, merged);
        assert_eq!(docs[0].name, "MergedDocuments.pdf");
        assert_eq!(docs[0].page_count, 3);
        assert!(docs[0].inspected);
    }

    #[test]
    fn test_extract_requires_page_selection() {
        let (mut session, ids) = session_with(&[4]);
        assert_eq!(session.extract_pages_internal("X").unwrap(), None);

        session.click_internal(&ids[0], ClickKind::Double).unwrap();
        assert_eq!(session.extract_pages_internal("X").unwrap(), None);

        let pages = page_ids(&session);
        session.click_page_internal(&pages[1], ClickKind::Plain).unwrap();
        let extracted = session.extract_pages_internal("X").unwrap();
        assert!(extracted.is_some());
        assert_eq!(session.document_count(), 2);
    }

    #[test]
    fn test_rename_without_inspection_is_silent() {
        let (mut session, ids) = session_with(&[1]);
        session.rename_internal("anything").unwrap();

        session.click_internal(&ids[0], ClickKind::Double).unwrap();
        session.rename_internal("Quarterly").unwrap();
        assert_eq!(session.document_views()[0].name, "Quarterly.pdf");
    }

    #[test]
    fn test_save_without_page_editor_is_silent() {
        let (mut session, _) = session_with(&[1]);
        assert!(session.save_pages_internal().is_ok());
    }

    #[test]
    fn test_export_in_display_order() {
        let (mut session, ids) = session_with(&[1, 1]);
        session.click_internal(&ids[1], ClickKind::Plain).unwrap();
        session.click_internal(&ids[0], ClickKind::Toggle).unwrap();

        let names: Vec<String> = session
            .export_internal()
            .into_iter()
            .map(|export| export.filename)
            .collect();
        assert_eq!(names, vec!["doc1.pdf", "doc2.pdf"]);
    }

    #[test]
    fn test_bad_config_is_rejected() {
        assert!(Config::from_json("{ not json").is_err());
        let config = Config::from_json(r#"{"merged_name": "All.pdf"}"#).unwrap();
        let session = WorkspaceSession::with_config(config);
        assert_eq!(session.collection.config().merged_name, "All.pdf");
    }
}

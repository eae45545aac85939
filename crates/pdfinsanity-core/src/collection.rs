//! Document collection controller
//!
//! Owns the document list, the page editor of the inspected document and the
//! codec. Structural edits run in three steps so the codec work can happen
//! away from the collection state:
//!
//! 1. [`DocumentCollection::prepare`] checks the targets and snapshots them
//! 2. [`PendingEdit::render`] runs the codec and touches no collection state
//! 3. [`DocumentCollection::apply`] re-checks the targets against the latest
//!    state and applies the result atomically, or drops it if a target was
//!    removed or changed in the meantime
//!
//! A commit keeps the document's id, so selection and inspection stay valid.

use crate::codec::{LopdfCodec, PdfCodec};
use crate::config::Config;
use crate::error::PdfInsanityError;
use crate::import::{detect, ImportFailure, ImportReport, IncomingFile, InputKind};
use crate::list::{ClickKind, Item, ItemId, OrderedSelectableList};
use crate::naming::{file_stem, normalize_pdf_filename, user_pdf_name};
use crate::pages::PageEditor;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One imported or produced PDF
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    bytes: Arc<[u8]>,
    page_count: u32,
    revision: u64,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, page_count: u32) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes),
            page_count,
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Bumped every time the content is replaced by a commit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    fn renamed(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    fn with_content(&self, bytes: Vec<u8>, page_count: u32) -> Self {
        Self {
            name: self.name.clone(),
            bytes: Arc::from(bytes),
            page_count,
            revision: self.revision + 1,
        }
    }
}

/// A document ready to be saved by the browser
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub filename: String,
    pub bytes: Arc<[u8]>,
}

/// Structural edit of the collection
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEdit {
    /// Rebuild a document from its pages at `indices`; no indices deletes it
    Commit { document_id: ItemId, indices: Vec<u32> },
    /// Replace the documents with their concatenation, in the given order
    Merge { document_ids: Vec<ItemId>, name: String },
    /// Add a new document made of the source's pages at `indices`
    Extract {
        source_id: ItemId,
        indices: Vec<u32>,
        name: String,
    },
}

#[derive(Debug, Clone)]
struct SourceSnapshot {
    id: ItemId,
    revision: u64,
    page_count: u32,
    bytes: Arc<[u8]>,
}

/// An edit whose targets were found, waiting for the codec
#[derive(Debug, Clone)]
pub struct PendingEdit {
    edit: DocumentEdit,
    sources: Vec<SourceSnapshot>,
}

#[derive(Debug, Clone)]
struct RenderedDocument {
    bytes: Vec<u8>,
    page_count: u32,
}

/// An edit with its codec output, waiting to be applied
#[derive(Debug, Clone)]
pub struct RenderedEdit {
    edit: DocumentEdit,
    sources: Vec<(ItemId, u64)>,
    output: Option<RenderedDocument>,
}

impl PendingEdit {
    pub fn edit(&self) -> &DocumentEdit {
        &self.edit
    }

    /// Run the codec. Touches no collection state.
    pub fn render<C: PdfCodec + ?Sized>(self, codec: &C) -> Result<RenderedEdit, PdfInsanityError> {
        let output = match &self.edit {
            DocumentEdit::Commit { indices, .. } if indices.is_empty() => None,
            DocumentEdit::Commit { indices, .. } | DocumentEdit::Extract { indices, .. } => {
                let bytes = codec.compose(&self.sources[0].bytes, indices)?;
                Some(RenderedDocument {
                    bytes,
                    page_count: indices.len() as u32,
                })
            }
            DocumentEdit::Merge { .. } => {
                let blobs: Vec<&[u8]> = self.sources.iter().map(|s| &*s.bytes).collect();
                let bytes = codec.merge(&blobs)?;
                Some(RenderedDocument {
                    bytes,
                    page_count: self.sources.iter().map(|s| s.page_count).sum(),
                })
            }
        };

        Ok(RenderedEdit {
            edit: self.edit,
            sources: self.sources.iter().map(|s| (s.id, s.revision)).collect(),
            output,
        })
    }
}

/// What an applied edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A commit without pages removed the document
    Removed(ItemId),
    /// The document kept its id and got new content
    Replaced(ItemId),
    /// A merge or extract added a document
    Created(ItemId),
    /// Nothing to commit
    Unchanged(ItemId),
}

fn target_not_found(detail: String) -> PdfInsanityError {
    warn!("{}", detail);
    PdfInsanityError::TargetNotFound(detail)
}

/// The document list and everything that edits it
#[derive(Debug)]
pub struct DocumentCollection<C = LopdfCodec> {
    documents: OrderedSelectableList<Document>,
    page_editor: Option<PageEditor>,
    codec: C,
    config: Config,
}

impl DocumentCollection<LopdfCodec> {
    pub fn new(config: Config) -> Self {
        Self::with_codec(LopdfCodec::from_config(&config), config)
    }
}

impl Default for DocumentCollection<LopdfCodec> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<C: PdfCodec> DocumentCollection<C> {
    pub fn with_codec(codec: C, config: Config) -> Self {
        Self {
            documents: OrderedSelectableList::new(),
            page_editor: None,
            codec,
            config,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn documents(&self) -> &OrderedSelectableList<Document> {
        &self.documents
    }

    pub fn document(&self, id: ItemId) -> Option<&Document> {
        self.documents.get(id).map(|item| &item.payload)
    }

    /// Page list of the inspected document, if one is inspected
    pub fn page_editor(&self) -> Option<&PageEditor> {
        self.page_editor.as_ref()
    }

    pub fn page_editor_mut(&mut self) -> Option<&mut PageEditor> {
        self.page_editor.as_mut()
    }

    pub fn route_click(&mut self, kind: ClickKind, id: ItemId) {
        self.documents.route_click(kind, id);
        self.sync_page_editor();
    }

    pub fn click_outside(&mut self) {
        self.documents.click_outside();
        self.sync_page_editor();
    }

    pub fn reorder(&mut self, moved: ItemId, target: ItemId) -> bool {
        self.documents.reorder(moved, target)
    }

    pub fn has_selection(&self) -> bool {
        self.documents.has_selection()
    }

    pub fn can_merge(&self) -> bool {
        self.documents.selected_ids().len() >= 2
    }

    pub fn can_rename(&self) -> bool {
        self.documents.inspected().is_some()
    }

    /// Import a batch. Files that fail are reported and skipped.
    pub fn import_files(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> ImportReport {
        let mut report = ImportReport::default();

        for file in files {
            let filename = file.name.clone();
            match self.import_one(file) {
                Ok(document) => {
                    debug!(name = %document.name, pages = document.page_count, "Imported document");
                    let item = Item::new(document);
                    report.imported.push(item.id);
                    self.documents.push_item(item);
                }
                Err(error) => {
                    warn!(filename = %filename, error = %error, "Skipping file");
                    report.failures.push(ImportFailure { filename, error });
                }
            }
        }

        info!(
            imported = report.imported.len(),
            failed = report.failures.len(),
            "Import finished"
        );
        report
    }

    fn import_one(&self, file: IncomingFile) -> Result<Document, PdfInsanityError> {
        let bytes = match detect(&file)? {
            InputKind::Pdf => file.bytes,
            InputKind::Image(format) => self.codec.embed_image(&file.bytes, format)?,
        };
        let info = self.codec.load(&bytes)?;
        Ok(Document::new(file.name, bytes, info.page_count))
    }

    /// Remove every selected document, returning how many went away
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.documents.remove(self.documents.selected_ids().to_vec());
        self.sync_page_editor();
        removed.len()
    }

    /// Rename a document; blank names are ignored. Content and revision are kept.
    pub fn rename(&mut self, id: ItemId, name: &str) -> Result<(), PdfInsanityError> {
        let current = self
            .document(id)
            .ok_or_else(|| target_not_found(format!("Document {} not found for rename", id)))?;
        let Some(name) = user_pdf_name(name) else {
            return Ok(());
        };
        let renamed = current.renamed(name);
        self.documents.replace_payload(id, renamed);
        Ok(())
    }

    pub fn rename_inspected(&mut self, name: &str) -> Result<(), PdfInsanityError> {
        let id = self
            .documents
            .inspected()
            .ok_or_else(|| target_not_found("No inspected document to rename".to_string()))?;
        self.rename(id, name)
    }

    /// Bytes and download name of one document
    pub fn export(&self, id: ItemId) -> Result<Export, PdfInsanityError> {
        let document = self
            .document(id)
            .ok_or_else(|| target_not_found(format!("Document {} not found for export", id)))?;
        Ok(Export {
            filename: normalize_pdf_filename(&document.name),
            bytes: Arc::clone(&document.bytes),
        })
    }

    /// Exports of the selected documents, in display order
    pub fn export_selected(&self) -> Vec<Export> {
        self.documents
            .selected_in_display_order()
            .into_iter()
            .filter_map(|id| self.export(id).ok())
            .collect()
    }

    /// Check targets and snapshot them
    pub fn prepare(&self, edit: DocumentEdit) -> Result<PendingEdit, PdfInsanityError> {
        let edit = match edit {
            DocumentEdit::Merge { document_ids, name } => {
                let mut seen = HashSet::new();
                let document_ids: Vec<ItemId> =
                    document_ids.into_iter().filter(|id| seen.insert(*id)).collect();
                if document_ids.is_empty() {
                    return Err(target_not_found("No documents to merge".to_string()));
                }
                let name = user_pdf_name(&name).unwrap_or_else(|| self.config.merged_name.clone());
                DocumentEdit::Merge { document_ids, name }
            }
            DocumentEdit::Extract {
                source_id,
                indices,
                name,
            } => {
                if indices.is_empty() {
                    return Err(PdfInsanityError::InvalidPageIndex(
                        "No pages to extract".into(),
                    ));
                }
                let name = match user_pdf_name(&name) {
                    Some(name) => name,
                    None => {
                        let source = self
                            .document(source_id)
                            .map(|d| d.name.as_str())
                            .unwrap_or("");
                        format!("{}_extract.pdf", file_stem(source))
                    }
                };
                DocumentEdit::Extract {
                    source_id,
                    indices,
                    name,
                }
            }
            commit @ DocumentEdit::Commit { .. } => commit,
        };

        let source_ids = match &edit {
            DocumentEdit::Commit { document_id, .. } => vec![*document_id],
            DocumentEdit::Merge { document_ids, .. } => document_ids.clone(),
            DocumentEdit::Extract { source_id, .. } => vec![*source_id],
        };

        let sources = source_ids
            .into_iter()
            .map(|id| {
                let document = self
                    .document(id)
                    .ok_or_else(|| target_not_found(format!("Document {} not found", id)))?;
                Ok(SourceSnapshot {
                    id,
                    revision: document.revision,
                    page_count: document.page_count,
                    bytes: Arc::clone(&document.bytes),
                })
            })
            .collect::<Result<Vec<_>, PdfInsanityError>>()?;

        Ok(PendingEdit { edit, sources })
    }

    /// Apply a rendered edit if its targets are still as they were when prepared
    pub fn apply(&mut self, rendered: RenderedEdit) -> Result<EditOutcome, PdfInsanityError> {
        for (id, revision) in &rendered.sources {
            match self.document(*id) {
                None => {
                    return Err(target_not_found(format!(
                        "Document {} vanished before the edit could be applied",
                        id
                    )))
                }
                Some(document) if document.revision != *revision => {
                    return Err(target_not_found(format!(
                        "Document {} changed before the edit could be applied",
                        id
                    )))
                }
                Some(_) => {}
            }
        }

        let outcome = match (rendered.edit, rendered.output) {
            (DocumentEdit::Commit { document_id, .. }, None) => {
                self.documents.remove([document_id]);
                info!(%document_id, "Committed an empty arrangement, document removed");
                EditOutcome::Removed(document_id)
            }
            (DocumentEdit::Commit { document_id, .. }, Some(output)) => {
                let replacement = self
                    .document(document_id)
                    .map(|current| current.with_content(output.bytes, output.page_count))
                    .ok_or_else(|| {
                        target_not_found(format!("Document {} not found", document_id))
                    })?;
                self.documents.replace_payload(document_id, replacement);
                info!(%document_id, pages = output.page_count, "Committed page edits");
                EditOutcome::Replaced(document_id)
            }
            (DocumentEdit::Merge { document_ids, name }, Some(output)) => {
                self.documents.remove(document_ids.iter().copied());
                let item = Item::new(Document::new(name, output.bytes, output.page_count));
                let merged_id = item.id;
                self.documents.push_item(item);
                self.documents.select_only(merged_id);
                self.documents.inspect(merged_id);
                info!(%merged_id, sources = document_ids.len(), "Merged documents");
                EditOutcome::Created(merged_id)
            }
            (DocumentEdit::Extract { source_id, name, .. }, Some(output)) => {
                let item = Item::new(Document::new(name, output.bytes, output.page_count));
                let extracted_id = item.id;
                self.documents.push_item(item);
                info!(%source_id, %extracted_id, pages = output.page_count, "Extracted pages");
                EditOutcome::Created(extracted_id)
            }
            (DocumentEdit::Merge { .. } | DocumentEdit::Extract { .. }, None) => {
                return Err(PdfInsanityError::OperationError(
                    "Edit was rendered without output".into(),
                ))
            }
        };

        self.sync_page_editor();
        Ok(outcome)
    }

    /// Prepare, render and apply in one go
    pub fn run(&mut self, edit: DocumentEdit) -> Result<EditOutcome, PdfInsanityError> {
        let rendered = self.prepare(edit)?.render(&self.codec)?;
        self.apply(rendered)
    }

    pub fn commit_page_edits(
        &mut self,
        document_id: ItemId,
        indices: Vec<u32>,
    ) -> Result<EditOutcome, PdfInsanityError> {
        self.run(DocumentEdit::Commit {
            document_id,
            indices,
        })
    }

    pub fn merge(
        &mut self,
        document_ids: Vec<ItemId>,
        name: &str,
    ) -> Result<EditOutcome, PdfInsanityError> {
        self.run(DocumentEdit::Merge {
            document_ids,
            name: name.to_string(),
        })
    }

    /// Merge the selected documents in display order
    pub fn merge_selected(&mut self, name: &str) -> Result<EditOutcome, PdfInsanityError> {
        let ids = self.documents.selected_in_display_order();
        self.merge(ids, name)
    }

    pub fn extract_as_new_document(
        &mut self,
        source_id: ItemId,
        indices: Vec<u32>,
        name: &str,
    ) -> Result<EditOutcome, PdfInsanityError> {
        self.run(DocumentEdit::Extract {
            source_id,
            indices,
            name: name.to_string(),
        })
    }

    /// Commit the page editor's arrangement to the inspected document
    pub fn save_page_edits(&mut self) -> Result<EditOutcome, PdfInsanityError> {
        let editor = self
            .page_editor
            .as_ref()
            .ok_or_else(|| target_not_found("No inspected document to save".to_string()))?;
        let document_id = editor.document_id();
        if !editor.is_dirty() {
            return Ok(EditOutcome::Unchanged(document_id));
        }
        let indices = editor.commit_indices();
        self.commit_page_edits(document_id, indices)
    }

    /// Extract the pages selected in the page editor as a new document
    pub fn extract_selected_pages(&mut self, name: &str) -> Result<EditOutcome, PdfInsanityError> {
        let editor = self
            .page_editor
            .as_ref()
            .ok_or_else(|| target_not_found("No inspected document to extract from".to_string()))?;
        let source_id = editor.document_id();
        let indices = editor.extract_selection();
        self.extract_as_new_document(source_id, indices, name)
    }

    /// Keep the page editor bound to the inspected document's current revision
    fn sync_page_editor(&mut self) {
        let inspected = self.documents.inspected().and_then(|id| {
            self.document(id)
                .map(|document| (id, document.revision, document.page_count))
        });

        match inspected {
            None => self.page_editor = None,
            Some((id, revision, page_count)) => {
                let up_to_date = self.page_editor.as_ref().is_some_and(|editor| {
                    editor.document_id() == id && editor.revision() == revision
                });
                if !up_to_date {
                    debug!(%id, pages = page_count, "Opening page editor");
                    self.page_editor = Some(PageEditor::open(id, revision, page_count));
                }
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::fixtures::create_test_pdf;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    #[derive(Debug, Clone)]
    enum Action {
        Import(u32),
        Click(u8, usize),
        ClickOutside,
        Delete,
        Merge(usize, usize),
        Commit(usize, usize),
        StaleCommit(usize),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (1u32..4).prop_map(Action::Import),
            (0u8..4, 0usize..16).prop_map(|(kind, at)| Action::Click(kind, at)),
            Just(Action::ClickOutside),
            Just(Action::Delete),
            (0usize..16, 0usize..16).prop_map(|(a, b)| Action::Merge(a, b)),
            (0usize..16, 0usize..3).prop_map(|(at, keep)| Action::Commit(at, keep)),
            (0usize..16).prop_map(Action::StaleCommit),
        ]
    }

    fn kind_from(n: u8) -> ClickKind {
        match n {
            0 => ClickKind::Plain,
            1 => ClickKind::Toggle,
            2 => ClickKind::Range,
            _ => ClickKind::Double,
        }
    }

    fn id_at(collection: &DocumentCollection, at: usize) -> Option<ItemId> {
        let documents = collection.documents();
        if documents.is_empty() {
            None
        } else {
            Some(documents.items()[at % documents.len()].id)
        }
    }

    fn check_consistent(collection: &DocumentCollection) -> Result<(), TestCaseError> {
        let documents = collection.documents();
        let ids: HashSet<ItemId> = documents.iter().map(|item| item.id).collect();
        prop_assert!(documents.selection_set().is_subset(&ids));

        match documents.inspected() {
            Some(inspected) => {
                prop_assert!(ids.contains(&inspected));
                let editor = collection.page_editor();
                prop_assert!(editor.is_some());
                if let (Some(editor), Some(document)) = (editor, collection.document(inspected)) {
                    prop_assert_eq!(editor.document_id(), inspected);
                    prop_assert_eq!(editor.revision(), document.revision());
                }
            }
            None => {
                prop_assert!(collection.page_editor().is_none());
            }
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: edits never leave selection or inspection dangling
        #[test]
        fn edits_keep_selection_within_documents(
            actions in prop::collection::vec(action(), 0..16)
        ) {
            let mut collection = DocumentCollection::default();

            for action in actions {
                match action {
                    Action::Import(pages) => {
                        let name = format!("doc{}.pdf", collection.documents().len());
                        let bytes = create_test_pdf(pages, &name);
                        let report = collection.import_files(vec![IncomingFile::new(
                            name,
                            Some("application/pdf"),
                            bytes,
                        )]);
                        prop_assert!(report.is_complete());
                    }
                    Action::Click(kind, at) => {
                        if let Some(id) = id_at(&collection, at) {
                            collection.route_click(kind_from(kind), id);
                        }
                    }
                    Action::ClickOutside => collection.click_outside(),
                    Action::Delete => {
                        collection.delete_selected();
                    }
                    Action::Merge(a, b) => {
                        if let (Some(a), Some(b)) = (id_at(&collection, a), id_at(&collection, b)) {
                            prop_assert!(collection.merge(vec![a, b], "").is_ok());
                        }
                    }
                    Action::Commit(at, keep) => {
                        if let Some(id) = id_at(&collection, at) {
                            let pages = collection.document(id).map_or(0, Document::page_count);
                            let indices: Vec<u32> = (0..pages).rev().take(keep).collect();
                            prop_assert!(collection.commit_page_edits(id, indices).is_ok());
                        }
                    }
                    Action::StaleCommit(at) => {
                        if let Some(id) = id_at(&collection, at) {
                            let rendered = collection
                                .prepare(DocumentEdit::Commit {
                                    document_id: id,
                                    indices: vec![0],
                                })
                                .and_then(|pending| pending.render(collection.codec()));
                            prop_assert!(rendered.is_ok());
                            collection.route_click(ClickKind::Plain, id);
                            collection.delete_selected();
                            if let Ok(rendered) = rendered {
                                prop_assert!(collection.apply(rendered).is_err());
                            }
                        }
                    }
                }
                check_consistent(&collection)?;
            }
        }
    }
}

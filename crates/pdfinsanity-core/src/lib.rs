//! PDF workspace engine
//!
//! Client-side document organizing: import PDFs and images, arrange and
//! select documents, edit the page order of one document at a time, then
//! merge, extract and export. PDF structure is handled with lopdf behind
//! the [`PdfCodec`] trait; everything else is plain state.
//!
//! - [`list`]: ordered, selectable item list shared by documents and pages
//! - [`pages`]: page arrangement of the inspected document
//! - [`collection`]: the document list and its structural edits

pub mod codec;
pub mod collection;
pub mod compose;
pub mod config;
pub mod error;
pub mod import;
pub mod list;
pub mod merge;
pub mod naming;
mod page_tree;
pub mod pages;
pub mod raster;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use codec::{LopdfCodec, PdfCodec};
pub use collection::{
    Document, DocumentCollection, DocumentEdit, EditOutcome, Export, PendingEdit, RenderedEdit,
};
pub use compose::compose_document;
pub use config::{Config, PageSize};
pub use error::PdfInsanityError;
pub use import::{ImportFailure, ImportReport, IncomingFile, InputKind};
pub use list::{ClickKind, Item, ItemId, OrderedSelectableList};
pub use merge::merge_documents;
pub use pages::{PageEditor, PageReference};
pub use raster::{image_to_pdf, ImageFormat};
pub use validation::{quick_validate, validate_pdf, PdfInfo};

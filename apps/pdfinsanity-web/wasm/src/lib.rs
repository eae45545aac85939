//! WASM bindings for the PDF workspace
//!
//! All state is held in Rust; JavaScript only handles DOM events, file I/O
//! and thumbnail rendering.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WorkspaceSession, ImportBatch } from './pkg/pdfinsanity_wasm.js';
//!
//! await init();
//!
//! const session = new WorkspaceSession(null);
//! const batch = new ImportBatch();
//! for (const file of input.files) {
//!     batch.add(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//! const report = session.importBatch(batch);
//!
//! session.click(id, e.ctrlKey, e.metaKey, e.shiftKey, e.detail === 2);
//! if (session.canMerge) session.mergeSelected("Combined");
//! for (const { filename, bytes } of session.exportSelected()) download(filename, bytes);
//! ```

pub mod logging;
pub mod page_info;
pub mod session;

#[cfg(test)]
mod test_pdf;

use wasm_bindgen::prelude::*;

pub use page_info::{PageInfo, PageOrientation};
pub use session::{ImportBatch, WorkspaceSession};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

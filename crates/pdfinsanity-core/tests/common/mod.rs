//! Shared helpers for the workspace scenarios

use lopdf::{content::Content, content::Operation, dictionary, Document, Object, Stream};
use pdfinsanity_core::{ClickKind, DocumentCollection, IncomingFile, ItemId};

/// Create a synthetic PDF whose pages read "<prefix>-<n>"
pub fn create_synthetic_pdf(num_pages: u32, content_prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids: Vec<Object> = Vec::new();
    for i in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("{}-{}", content_prefix, i))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        page_ids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => page_ids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// The text drawn on each page, in page order
pub fn page_texts(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|text| text.as_str().ok())
                .map(|text| String::from_utf8_lossy(text).into_owned())
                .unwrap()
        })
        .collect()
}

pub fn pdf(name: &str, pages: u32) -> IncomingFile {
    let prefix = name.trim_end_matches(".pdf");
    IncomingFile::new(name, Some("application/pdf"), create_synthetic_pdf(pages, prefix))
}

/// A collection holding the given files, all imported successfully
pub fn workspace(files: Vec<IncomingFile>) -> (DocumentCollection, Vec<ItemId>) {
    let mut collection = DocumentCollection::default();
    let report = collection.import_files(files);
    assert!(report.is_complete(), "import failed: {:?}", report.failures);
    (collection, report.imported)
}

/// Select `id` and open its pages
pub fn open(collection: &mut DocumentCollection, id: ItemId) {
    collection.route_click(ClickKind::Plain, id);
    collection.route_click(ClickKind::Double, id);
    assert!(collection.page_editor().is_some());
}

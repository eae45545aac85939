//! Test documents built with lopdf

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

fn text_page(
    doc: &mut Document,
    parent: lopdf::ObjectId,
    label: &str,
    media_box: bool,
) -> lopdf::ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    label.as_bytes().to_vec(),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    };
    if media_box {
        page.set("MediaBox", vec![0.into(), 0.into(), 612.into(), 792.into()]);
    }
    doc.add_object(page)
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId) -> Vec<u8> {
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A flat PDF whose pages read "<prefix>-Page-<n>"
pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=num_pages)
        .map(|n| text_page(&mut doc, pages_id, &format!("{}-Page-{}", prefix, n), true).into())
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => kids,
        }),
    );
    finish(doc, pages_id)
}

/// Three pages "Nested-1..3"; pages 2 and 3 sit under an intermediate node,
/// and MediaBox/Resources are only set on the root.
pub fn nested_tree_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let root_id = doc.new_object_id();
    let inner_id = doc.new_object_id();

    let first = text_page(&mut doc, root_id, "Nested-1", false);
    let second = text_page(&mut doc, inner_id, "Nested-2", false);
    let third = text_page(&mut doc, inner_id, "Nested-3", false);

    doc.objects.insert(
        inner_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Count" => 2,
            "Kids" => vec![second.into(), third.into()],
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 3,
            "Kids" => vec![first.into(), inner_id.into()],
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => Dictionary::new(),
        }),
    );
    finish(doc, root_id)
}

/// One page "Rotated-1" whose Rotate 90, CropBox and MediaBox live on the root
pub fn rotated_root_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let root_id = doc.new_object_id();
    let page = text_page(&mut doc, root_id, "Rotated-1", false);

    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![page.into()],
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "CropBox" => vec![10.into(), 10.into(), 602.into(), 782.into()],
            "Rotate" => 90,
            "Resources" => Dictionary::new(),
        }),
    );
    finish(doc, root_id)
}

/// The text shown on each page, in page order
pub fn page_labels(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').unwrap() + 1;
            let end = text[start..].find(')').unwrap() + start;
            text[start..end].to_string()
        })
        .collect()
}

/// An RGB or RGBA PNG
pub fn tiny_png(width: u32, height: u32, translucent: bool) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        let channels = if translucent {
            encoder.set_color(png::ColorType::Rgba);
            4
        } else {
            encoder.set_color(png::ColorType::Rgb);
            3
        };
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let data: Vec<u8> = (0..width * height * channels)
            .map(|i| if translucent && i % 4 == 3 { 128 } else { (i % 251) as u8 })
            .collect();
        writer.write_image_data(&data).unwrap();
    }
    buffer
}

/// An RGB baseline JPEG
pub fn tiny_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    let data = vec![200u8; (width * height * 3) as usize];
    image::codecs::jpeg::JpegEncoder::new(&mut buffer)
        .encode(&data, width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

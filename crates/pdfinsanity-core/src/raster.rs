//! Image to PDF conversion
//!
//! Produces a single-page PDF with the image centered on a standard page,
//! scaled down to fit when it is larger than the page. Aspect ratio is kept
//! and small images are never enlarged. One image pixel maps to one point.

use crate::config::PageSize;
use crate::error::PdfInsanityError;
use crate::page_tree::save;
use image::codecs::jpeg::JpegDecoder;
use image::ImageDecoder;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Raster formats accepted for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Decoded image ready to be written as an image XObject
struct RasterImage {
    width: u32,
    height: u32,
    color_space: &'static str,
    bits_per_component: i64,
    data: Vec<u8>,
    /// `Some` for JPEG data passed through untouched
    filter: Option<&'static str>,
    alpha: Option<Vec<u8>>,
}

/// Where and how large the image lands on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Center an image on the page, shrinking it to fit if needed
pub fn fit_centered(image_width: u32, image_height: u32, page: PageSize) -> Placement {
    let (page_width, page_height) = page.dimensions();
    let (w, h) = (image_width.max(1) as f32, image_height.max(1) as f32);
    let scale = (page_width / w).min(page_height / h).min(1.0);
    let (width, height) = (w * scale, h * scale);
    Placement {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    }
}

/// Convert PNG or JPEG bytes into a single-page PDF
pub fn image_to_pdf(
    bytes: &[u8],
    format: ImageFormat,
    page: PageSize,
    compress: bool,
) -> Result<Vec<u8>, PdfInsanityError> {
    let raster = match format {
        ImageFormat::Png => decode_png(bytes)?,
        ImageFormat::Jpeg => read_jpeg(bytes)?,
    };
    let placement = fit_centered(raster.width, raster.height, page);
    let (page_width, page_height) = page.dimensions();

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => raster.width as i64,
        "Height" => raster.height as i64,
        "ColorSpace" => raster.color_space,
        "BitsPerComponent" => raster.bits_per_component,
    };
    if let Some(filter) = raster.filter {
        image_dict.set("Filter", filter);
    }
    if let Some(alpha) = raster.alpha {
        let mask = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => raster.width as i64,
            "Height" => raster.height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        };
        let mask_id = doc.add_object(Stream::new(mask, alpha));
        image_dict.set("SMask", Object::Reference(mask_id));
    }
    let mut image_stream = Stream::new(image_dict, raster.data);
    if raster.filter.is_some() {
        // Already encoded; must not be deflated on top
        image_stream.allows_compression = false;
    }
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| PdfInsanityError::OperationError(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let resources = dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    };
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    save(doc, compress)
}

fn image_error(e: impl std::fmt::Display) -> PdfInsanityError {
    PdfInsanityError::ImageError(e.to_string())
}

fn decode_png(bytes: &[u8]) -> Result<RasterImage, PdfInsanityError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    // Palette and low bit depths expand to 8-bit gray or RGB, 16-bit strips to 8
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(image_error)?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer).map_err(image_error)?;
    buffer.truncate(frame.buffer_size());

    let (color_space, channels, has_alpha) = match frame.color_type {
        png::ColorType::Grayscale => ("DeviceGray", 1, false),
        png::ColorType::GrayscaleAlpha => ("DeviceGray", 2, true),
        png::ColorType::Rgb => ("DeviceRGB", 3, false),
        png::ColorType::Rgba => ("DeviceRGB", 4, true),
        png::ColorType::Indexed => {
            return Err(PdfInsanityError::ImageError(
                "Indexed PNG was not expanded".into(),
            ))
        }
    };

    let (data, alpha) = if has_alpha {
        split_alpha(&buffer, channels)
    } else {
        (buffer, None)
    };

    Ok(RasterImage {
        width: frame.width,
        height: frame.height,
        color_space,
        bits_per_component: 8,
        data,
        filter: None,
        alpha,
    })
}

/// Separate interleaved color and alpha samples
fn split_alpha(pixels: &[u8], channels: usize) -> (Vec<u8>, Option<Vec<u8>>) {
    let color_channels = channels - 1;
    let pixel_count = pixels.len() / channels;
    let mut color = Vec::with_capacity(pixel_count * color_channels);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in pixels.chunks_exact(channels) {
        color.extend_from_slice(&pixel[..color_channels]);
        alpha.push(pixel[color_channels]);
    }
    // Fully opaque images need no soft mask
    let alpha = alpha.iter().any(|&a| a != u8::MAX).then_some(alpha);
    (color, alpha)
}

/// JPEG data is embedded as-is; only the header is decoded
fn read_jpeg(bytes: &[u8]) -> Result<RasterImage, PdfInsanityError> {
    let decoder = JpegDecoder::new(Cursor::new(bytes)).map_err(image_error)?;
    let (width, height) = decoder.dimensions();
    let color_space = match decoder.original_color_type().channel_count() {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        4 => "DeviceCMYK",
        n => {
            return Err(PdfInsanityError::ImageError(format!(
                "Unsupported JPEG channel count {}",
                n
            )))
        }
    };

    Ok(RasterImage {
        width,
        height,
        color_space,
        bits_per_component: 8,
        data: bytes.to_vec(),
        filter: Some("DCTDecode"),
        alpha: None,
    })
}

//! PDF output.

use std::path::Path;

use image::{ColorType, GenericImageView, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::comic::{write_atomically, ComicFile, ComicMetadata};
use crate::error::{Error, Result};

/// Resource name of the single image drawn on each page.
const PAGE_IMAGE: &[u8] = b"Im0";

/// Convert an image dimension in pixels to page points.
///
/// Images are laid out at 128 dpi (1 point = 1/72 inch), minus one point for
/// the margin, so a page is exactly as large as its image.
pub fn pixels_to_points(pixels: u32) -> i64 {
    (i64::from(pixels) * 72 / 128 - 1).max(1)
}

/// Number of colour components declared in a JPEG's frame header.
///
/// Walks the marker segments up to the first SOF marker. Returns `None` for
/// data that is not a well-formed JPEG or has no frame header before the
/// scan data.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOF0..SOF15, minus DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return data.get(pos + 9).copied();
        }
        if marker == 0xDA {
            return None;
        }
        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        pos += 2 + length;
    }
    None
}

/// Colour space to tag a JPEG with when embedding it untouched, or `None`
/// when it has to be re-encoded.
///
/// The decoded colour type and the frame header must agree: a CMYK or YCCK
/// JPEG tagged `DeviceRGB` renders with wrong colours.
fn passthrough_color_space(format: ImageFormat, color: ColorType, data: &[u8]) -> Option<&'static str> {
    if format != ImageFormat::Jpeg {
        return None;
    }
    match (color, jpeg_components(data)) {
        (ColorType::L8, Some(1)) => Some("DeviceGray"),
        (ColorType::Rgb8, Some(3)) => Some("DeviceRGB"),
        _ => None,
    }
}

/// PDF where every appended image becomes one page sized to fit it.
pub struct PdfComic {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    metadata: ComicMetadata,
}

impl PdfComic {
    pub fn new(metadata: ComicMetadata) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
            metadata,
        }
    }

    /// Build the image XObject. Grayscale and RGB JPEG data is embedded
    /// as-is; everything else is stored as raw RGB and flate-compressed on
    /// save.
    fn image_stream(image: &[u8]) -> Result<(Stream, u32, u32)> {
        let format = image::guess_format(image)?;
        let decoded = image::load_from_memory_with_format(image, format)?;
        let (width, height) = decoded.dimensions();

        let stream = if let Some(color_space) =
            passthrough_color_space(format, decoded.color(), image)
        {
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(width),
                    "Height" => i64::from(height),
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                image.to_vec(),
            )
            .with_compression(false)
        } else {
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(width),
                    "Height" => i64::from(height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                decoded.to_rgb8().into_raw(),
            )
        };

        Ok((stream, width, height))
    }
}

impl ComicFile for PdfComic {
    fn append_page(&mut self, image: &[u8]) -> Result<()> {
        let (stream, width, height) = Self::image_stream(image)?;
        let image_id = self.document.add_object(stream);

        let page_width = pixels_to_points(width);
        let page_height = pixels_to_points(height);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page_width.into(),
                        0.into(),
                        0.into(),
                        page_height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(PAGE_IMAGE.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| Error::Pdf(format!("Failed to encode page content: {}", e)))?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        self.kids.push(page_id.into());

        Ok(())
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn finalize(self: Box<Self>, path: &Path) -> Result<()> {
        let PdfComic {
            mut document,
            pages_id,
            kids,
            metadata,
        } = *self;

        if kids.is_empty() {
            return Err(Error::EmptyComic(path.display().to_string()));
        }

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let info_id = document.add_object(dictionary! {
            "Title" => Object::string_literal(metadata.title),
            "Subject" => Object::string_literal(metadata.series),
            "Producer" => Object::string_literal("webtoon-dl"),
        });
        document.trailer.set("Info", info_id);

        document.compress();

        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| Error::Pdf(format!("Failed to write PDF: {}", e)))?;

        write_atomically(path, &buffer)
    }
}

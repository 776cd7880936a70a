//! Minimal PDF 1.4 writer for [`Document`].
//!
//! Only what the storyboard needs is supported: filled and stroked
//! rectangles, lines and RGB(A) images. Images are embedded as Flate
//! streams with PNG predictors, reusing the IDAT data produced by the
//! `image` crate's PNG encoder. Partially transparent images get a
//! greyscale soft mask.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use storyboard_common::error::{StoryboardError, StoryboardResult};

use crate::surface::{Color, Command, Document, DrawingSurface, RectMm};

/// PDF user-space units per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;

/// Serialize a document to PDF bytes.
pub fn write_pdf(doc: &Document) -> StoryboardResult<Vec<u8>> {
    let mut writer = PdfWriter::new();
    let (width_mm, height_mm) = doc.page_size();

    writer.begin(CATALOG_ID);
    writer.raw(&format!(
        "<< /Type /Catalog /Pages {PAGES_ID} 0 R >>\nendobj\n"
    ));

    let mut page_ids = Vec::with_capacity(doc.pages().len());
    let mut embedded: HashMap<*const RgbaImage, usize> = HashMap::new();

    for page in doc.pages() {
        let mut content = String::new();
        let mut xobjects: Vec<(String, usize)> = Vec::new();

        for cmd in &page.commands {
            match cmd {
                Command::FillRect { rect, color } => {
                    let (x, y, w, h) = to_pdf_rect(rect, height_mm);
                    let _ = writeln!(content, "{} rg", color_ops(*color));
                    let _ = writeln!(content, "{} {} {} {} re f", num(x), num(y), num(w), num(h));
                }
                Command::StrokeRect {
                    rect,
                    color,
                    line_width,
                } => {
                    let (x, y, w, h) = to_pdf_rect(rect, height_mm);
                    let _ = writeln!(content, "{} RG", color_ops(*color));
                    let _ = writeln!(content, "{} w", num(line_width * PT_PER_MM));
                    let _ = writeln!(content, "{} {} {} {} re S", num(x), num(y), num(w), num(h));
                }
                Command::Line {
                    from,
                    to,
                    color,
                    line_width,
                } => {
                    let _ = writeln!(content, "{} RG", color_ops(*color));
                    let _ = writeln!(content, "{} w", num(line_width * PT_PER_MM));
                    let _ = writeln!(
                        content,
                        "{} {} m {} {} l S",
                        num(from.0 * PT_PER_MM),
                        num((height_mm - from.1) * PT_PER_MM),
                        num(to.0 * PT_PER_MM),
                        num((height_mm - to.1) * PT_PER_MM)
                    );
                }
                Command::Image { rect, image } => {
                    let key = Arc::as_ptr(image);
                    let id = match embedded.get(&key) {
                        Some(id) => *id,
                        None => {
                            let id = writer.image(image)?;
                            embedded.insert(key, id);
                            id
                        }
                    };
                    let name = format!("Im{id}");
                    if !xobjects.iter().any(|(n, _)| n == &name) {
                        xobjects.push((name.clone(), id));
                    }
                    let (x, y, w, h) = to_pdf_rect(rect, height_mm);
                    let _ = writeln!(
                        content,
                        "q {} 0 0 {} {} {} cm /{name} Do Q",
                        num(w),
                        num(h),
                        num(x),
                        num(y)
                    );
                }
            }
        }

        let content_id = writer.alloc();
        writer.begin(content_id);
        writer.stream("", content.as_bytes());

        let mut resources = String::from("<< /XObject << ");
        for (name, id) in &xobjects {
            let _ = write!(resources, "/{name} {id} 0 R ");
        }
        resources.push_str(">> >>");

        let page_id = writer.alloc();
        writer.begin(page_id);
        writer.raw(&format!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] /Resources {resources} /Contents {content_id} 0 R >>\nendobj\n",
            num(width_mm * PT_PER_MM),
            num(height_mm * PT_PER_MM),
        ));
        page_ids.push(page_id);
    }

    writer.begin(PAGES_ID);
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    writer.raw(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_ids.len()
    ));

    let info_id = writer.alloc();
    writer.begin(info_id);
    let mut info = format!("<< /Producer {}", pdf_text("Storyboard"));
    if let Some(title) = doc.title() {
        let _ = write!(info, " /Title {}", pdf_text(title));
    }
    info.push_str(" >>\nendobj\n");
    writer.raw(&info);

    writer.finish(info_id)
}

struct PdfWriter {
    buf: Vec<u8>,
    /// Byte offset of each object, indexed by object id (0 is unused).
    offsets: Vec<Option<usize>>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            // 0 = free list head, 1 = catalog, 2 = page tree
            offsets: vec![None; PAGES_ID + 1],
        }
    }

    fn alloc(&mut self) -> usize {
        self.offsets.push(None);
        self.offsets.len() - 1
    }

    fn begin(&mut self, id: usize) {
        self.offsets[id] = Some(self.buf.len());
        self.raw(&format!("{id} 0 obj\n"));
    }

    fn raw(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Write a stream body and close the object. `dict` holds extra entries.
    fn stream(&mut self, dict: &str, data: &[u8]) {
        let sep = if dict.is_empty() { "" } else { " " };
        self.raw(&format!("<< {dict}{sep}/Length {} >>\nstream\n", data.len()));
        self.buf.extend_from_slice(data);
        self.raw("\nendstream\nendobj\n");
    }

    /// Embed an image and return its object id.
    fn image(&mut self, image: &RgbaImage) -> StoryboardResult<usize> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(StoryboardError::render("Cannot embed an empty image"));
        }

        let rgb: Vec<u8> = image.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        let color_data = png_idat(&rgb, w, h, ExtendedColorType::Rgb8)?;

        let smask = if image.pixels().any(|p| p.0[3] != 255) {
            let alpha: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();
            let alpha_data = png_idat(&alpha, w, h, ExtendedColorType::L8)?;
            let id = self.alloc();
            self.begin(id);
            self.stream(&image_dict(w, h, "/DeviceGray", 1, ""), &alpha_data);
            Some(id)
        } else {
            None
        };

        let id = self.alloc();
        self.begin(id);
        let extra = smask.map(|s| format!(" /SMask {s} 0 R")).unwrap_or_default();
        self.stream(&image_dict(w, h, "/DeviceRGB", 3, &extra), &color_data);
        Ok(id)
    }

    fn finish(mut self, info_id: usize) -> StoryboardResult<Vec<u8>> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len();

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (id, offset) in self.offsets.iter().enumerate().skip(1) {
            let offset = offset.ok_or_else(|| {
                StoryboardError::render(format!("PDF object {id} was allocated but never written"))
            })?;
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.raw(&xref);
        Ok(self.buf)
    }
}

fn image_dict(w: u32, h: u32, color_space: &str, colors: u8, extra: &str) -> String {
    format!(
        "/Type /XObject /Subtype /Image /Width {w} /Height {h} /ColorSpace {color_space} \
         /BitsPerComponent 8 /Filter /FlateDecode \
         /DecodeParms << /Predictor 15 /Colors {colors} /BitsPerComponent 8 /Columns {w} >>{extra}"
    )
}

/// Encode raw samples as PNG and return the concatenated IDAT payload,
/// which is a zlib stream of predictor-tagged scanlines.
fn png_idat(
    samples: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
) -> StoryboardResult<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(samples, width, height, color)
        .map_err(|e| StoryboardError::render(format!("Image encoding failed: {e}")))?;
    extract_idat(&png).ok_or_else(|| StoryboardError::render("Encoded PNG has no image data"))
}

fn extract_idat(png: &[u8]) -> Option<Vec<u8>> {
    const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
    let mut rest = png.strip_prefix(SIGNATURE)?;
    let mut data = Vec::new();

    while rest.len() >= 12 {
        let len = u32::from_be_bytes(rest[0..4].try_into().ok()?) as usize;
        let kind = &rest[4..8];
        let body = rest.get(8..8 + len)?;
        if kind == b"IDAT" {
            data.extend_from_slice(body);
        } else if kind == b"IEND" {
            break;
        }
        rest = rest.get(12 + len..)?;
    }

    (!data.is_empty()).then_some(data)
}

/// Top-left millimetre rect to bottom-left point rect.
fn to_pdf_rect(rect: &RectMm, page_height_mm: f32) -> (f32, f32, f32, f32) {
    (
        rect.x * PT_PER_MM,
        (page_height_mm - rect.y - rect.h) * PT_PER_MM,
        rect.w * PT_PER_MM,
        rect.h * PT_PER_MM,
    )
}

fn color_ops(color: Color) -> String {
    format!(
        "{} {} {}",
        num(color.r as f32 / 255.0),
        num(color.g as f32 / 255.0),
        num(color.b as f32 / 255.0)
    )
}

/// Compact decimal formatting for content streams.
fn num(v: f32) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Text string literal; non-ASCII becomes UTF-16BE hex with a BOM.
fn pdf_text(text: &str) -> String {
    if text.is_ascii() {
        let escaped = text
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        format!("({escaped})")
    } else {
        let mut hex = String::from("<FEFF");
        for unit in text.encode_utf16() {
            let _ = write!(hex, "{unit:04X}");
        }
        hex.push('>');
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(2.83465), "2.835");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn test_pdf_text_encodes_unicode() {
        assert_eq!(pdf_text("A (b)"), "(A \\(b\\))");
        assert_eq!(pdf_text("Ả"), "<FEFF1EA2>");
    }

    #[test]
    fn test_structure_of_two_page_document() {
        let mut doc = Document::a4();
        doc.set_title("Test");
        doc.fill_rect(RectMm::new(0.0, 0.0, 210.0, 40.0), Color::rgb(249, 115, 22));
        doc.add_page();
        doc.line((40.0, 100.0), (170.0, 100.0), Color::BLACK, 1.0);

        let bytes = write_pdf(&doc).unwrap();
        let text = as_text(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Type /Pages /Kids [4 0 R 6 0 R] /Count 2"));
        assert!(text.contains("/MediaBox [0 0 595.276 841.89]"));
        // Band spans the top 40 mm: y = (297 - 40) * 72 / 25.4.
        assert!(text.contains("0 728.504 595.276 113.386 re f"));
        assert!(text.contains("/Title (Test)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut doc = Document::a4();
        doc.stroke_rect(RectMm::new(10.0, 10.0, 20.0, 20.0), Color::BLACK, 0.5);
        let bytes = write_pdf(&doc).unwrap();

        let tail = as_text(&bytes[bytes.len() - 32..]);
        let start = tail.rfind("startxref\n").unwrap() + "startxref\n".len();
        let xref_at: usize = tail[start..].lines().next().unwrap().parse().unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref\n"));

        let xref = as_text(&bytes[xref_at..]);
        let entries: Vec<&str> = xref
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .collect();
        assert!(!entries.is_empty());
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert!(bytes[offset..].starts_with(header.as_bytes()));
        }
    }

    #[test]
    fn test_transparent_image_gets_soft_mask_and_is_shared() {
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        let img = Arc::new(img);

        let mut doc = Document::a4();
        doc.draw_image(RectMm::new(0.0, 0.0, 10.0, 5.0), img.clone());
        doc.draw_image(RectMm::new(0.0, 10.0, 10.0, 5.0), img);

        let text = as_text(&write_pdf(&doc).unwrap());
        assert_eq!(text.matches("/Subtype /Image").count(), 2);
        assert_eq!(text.matches("/SMask").count(), 1);
        assert_eq!(text.matches(" Do Q").count(), 2);
        assert!(text.contains("/Predictor 15 /Colors 3"));
    }

    #[test]
    fn test_extract_idat_concatenates_chunks() {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&[0u8; 12], 2, 2, ExtendedColorType::Rgb8)
            .unwrap();
        let idat = extract_idat(&png).unwrap();
        // zlib header
        assert_eq!(idat[0] & 0x0F, 8);
        assert!(extract_idat(b"not a png").is_none());
    }
}

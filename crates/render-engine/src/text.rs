//! Unicode text rasterization.
//!
//! The document writer only knows how to place images, so every piece of
//! text (including Vietnamese diacritics) is drawn into a transparent RGBA
//! bitmap first. Text is greedily word-wrapped to a maximum width and
//! rendered at a supersampled resolution for crisp output.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use storyboard_common::config::RenderConfig;
use storyboard_common::error::{StoryboardError, StoryboardResult};

use crate::surface::Color;

/// Device pixels per millimetre at the base resolution (96 dpi).
pub const MM_TO_PX: f32 = 3.78;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Vertical padding added to every text block (half above, half below).
pub const BLOCK_PADDING: f32 = 2.0;

const DEFAULT_SUPERSAMPLE: u32 = 4;

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Width measurement, separated from drawing so wrapping can be tested
/// without real fonts.
pub trait TextMeasure {
    /// Advance width of `text` in pixels at `size_px`.
    fn text_width(&self, text: &str, size_px: f32, bold: bool) -> f32;
}

/// Greedy word wrap.
///
/// Words are separated by any whitespace. A line is committed when adding
/// the next word would exceed `max_width_px` and the line already holds at
/// least one word, so a single overlong word still gets a line of its own.
/// Always returns at least one line.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    max_width_px: f32,
    size_px: f32,
    bold: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.text_width(&candidate, size_px, bold) > max_width_px {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

/// Horizontal placement of each wrapped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// How a block of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in the caller's unit (millimetres or pixels).
    pub size: f32,
    pub color: Color,
    pub bold: bool,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            bold: false,
            align: TextAlign::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

/// A rendered text block.
#[derive(Debug, Clone)]
pub struct RasterizedText {
    pub image: RgbaImage,
    /// Placement width, equal to the requested maximum width.
    pub width: f32,
    /// `lines * size * LINE_HEIGHT_FACTOR + BLOCK_PADDING`.
    pub height: f32,
    pub line_count: usize,
}

/// Regular face plus an optional bold face.
pub struct FontSet {
    regular: Font<'static>,
    bold: Option<Font<'static>>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

impl FontSet {
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> StoryboardResult<Self> {
        let regular = Font::try_from_vec(regular)
            .ok_or_else(|| StoryboardError::render("Invalid regular font data"))?;
        let bold = match bold {
            Some(bytes) => Some(
                Font::try_from_vec(bytes)
                    .ok_or_else(|| StoryboardError::render("Invalid bold font data"))?,
            ),
            None => None,
        };
        Ok(Self { regular, bold })
    }

    /// Load configured fonts, falling back to well-known system locations.
    pub fn load(config: &RenderConfig) -> StoryboardResult<Self> {
        let regular_path = match &config.font_path {
            Some(path) => path.clone(),
            None => find_font(REGULAR_CANDIDATES).ok_or_else(|| {
                StoryboardError::render(
                    "No Unicode font found; set render.font_path in the config file",
                )
            })?,
        };
        let bold_path = config
            .bold_font_path
            .clone()
            .or_else(|| find_font(BOLD_CANDIDATES));

        tracing::debug!(
            regular = %regular_path.display(),
            bold = ?bold_path.as_ref().map(|p| p.display().to_string()),
            "Loading fonts"
        );

        let regular = read_font(&regular_path)?;
        let bold = bold_path.as_deref().map(read_font).transpose()?;
        Self::from_bytes(regular, bold)
    }

    pub fn has_bold_face(&self) -> bool {
        self.bold.is_some()
    }

    /// Face for the requested weight and whether bold must be synthesized.
    fn face(&self, bold: bool) -> (&Font<'static>, bool) {
        match (&self.bold, bold) {
            (Some(face), true) => (face, false),
            (None, true) => (&self.regular, true),
            _ => (&self.regular, false),
        }
    }
}

/// Horizontal offset of the second strike used for synthetic bold.
fn synthetic_bold_offset(size_px: f32) -> f32 {
    (size_px / 32.0).max(1.0)
}

fn find_font(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(PathBuf::from).find(|p| p.is_file())
}

fn read_font(path: &Path) -> StoryboardResult<Vec<u8>> {
    if !path.exists() {
        return Err(StoryboardError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read(path)?)
}

fn layout_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

impl TextMeasure for FontSet {
    fn text_width(&self, text: &str, size_px: f32, bold: bool) -> f32 {
        let (font, synthetic) = self.face(bold);
        let width = layout_width(font, Scale::uniform(size_px), text);
        if synthetic && width > 0.0 {
            width + synthetic_bold_offset(size_px)
        } else {
            width
        }
    }
}

/// Renders wrapped text blocks to transparent bitmaps.
#[derive(Debug)]
pub struct TextRasterizer {
    fonts: FontSet,
    supersample: u32,
}

impl TextRasterizer {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            supersample: DEFAULT_SUPERSAMPLE,
        }
    }

    pub fn with_supersample(mut self, factor: u32) -> Self {
        self.supersample = factor.max(1);
        self
    }

    pub fn from_config(config: &RenderConfig) -> StoryboardResult<Self> {
        Ok(Self::new(FontSet::load(config)?).with_supersample(config.supersample))
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn supersample(&self) -> u32 {
        self.supersample
    }

    /// Render with sizes in millimetres, for placement on a page.
    pub fn render_mm(&self, text: &str, max_width_mm: f32, style: &TextStyle) -> RasterizedText {
        self.render_scaled(
            text,
            max_width_mm,
            style,
            MM_TO_PX * self.supersample as f32,
        )
    }

    /// Render with sizes in pixels at 1:1, for screen-sized bitmaps.
    pub fn render_px(&self, text: &str, max_width_px: f32, style: &TextStyle) -> RasterizedText {
        self.render_scaled(text, max_width_px, style, 1.0)
    }

    fn render_scaled(
        &self,
        text: &str,
        max_width: f32,
        style: &TextStyle,
        px_per_unit: f32,
    ) -> RasterizedText {
        let size_px = style.size * px_per_unit;
        let canvas_w = (max_width * px_per_unit).ceil().max(1.0);
        let lines = wrap_words(&self.fonts, text, canvas_w, size_px, style.bold);

        let line_height = style.size * LINE_HEIGHT_FACTOR;
        let height = lines.len() as f32 * line_height + BLOCK_PADDING;
        let canvas_h = (height * px_per_unit).ceil().max(1.0);

        let mut image = RgbaImage::from_pixel(
            canvas_w as u32,
            canvas_h as u32,
            style.color.to_rgba(0),
        );

        let (font, synthetic) = self.fonts.face(style.bold);
        let scale = Scale::uniform(size_px);
        let v = font.v_metrics(scale);
        let glyph_height = v.ascent - v.descent;
        let line_height_px = line_height * px_per_unit;
        let top_pad_px = BLOCK_PADDING / 2.0 * px_per_unit;

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let width = self.fonts.text_width(line, size_px, style.bold);
            let x = match style.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => ((canvas_w - width) / 2.0).max(0.0),
            };
            let line_top = top_pad_px + i as f32 * line_height_px;
            let baseline = line_top + (line_height_px - glyph_height) / 2.0 + v.ascent;

            draw_line(&mut image, font, scale, line, x, baseline, style.color);
            if synthetic {
                let dx = synthetic_bold_offset(size_px);
                draw_line(&mut image, font, scale, line, x + dx, baseline, style.color);
            }
        }

        RasterizedText {
            image,
            width: max_width,
            height,
            line_count: lines.len(),
        }
    }
}

fn draw_line(
    image: &mut RgbaImage,
    font: &Font<'_>,
    scale: Scale,
    text: &str,
    x: f32,
    baseline: f32,
    color: Color,
) {
    let (w, h) = image.dimensions();
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = image.get_pixel_mut(px as u32, py as u32);
            let alpha = alpha.max(pixel.0[3]);
            *pixel = Rgba([color.r, color.g, color.b, alpha]);
        });
    }
}

/// Bundled Unicode font for tests that need real glyph metrics.
#[cfg(test)]
pub(crate) fn fixture_fonts() -> FontSet {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("fonts")
        .join("DejaVuSans.ttf");
    let bytes = std::fs::read(&path).expect("fixture font should exist");
    FontSet::from_bytes(bytes, None).expect("fixture font should parse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every character is `size_px` wide.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn text_width(&self, text: &str, size_px: f32, _bold: bool) -> f32 {
            text.chars().count() as f32 * size_px
        }
    }

    fn rasterizer() -> TextRasterizer {
        TextRasterizer::new(fixture_fonts())
    }

    #[test]
    fn test_wrap_breaks_before_overflow() {
        let lines = wrap_words(&Monospace, "one two three", 7.0, 1.0, false);
        assert_eq!(lines, vec!["one two", "three"]);
    }

    #[test]
    fn test_wrap_keeps_overlong_word() {
        let lines = wrap_words(&Monospace, "supercalifragilistic ok", 5.0, 1.0, false);
        assert_eq!(lines, vec!["supercalifragilistic", "ok"]);
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        assert_eq!(wrap_words(&Monospace, "", 10.0, 1.0, false), vec![""]);
        assert_eq!(wrap_words(&Monospace, " \n\t ", 10.0, 1.0, false), vec![""]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        let lines = wrap_words(&Monospace, "a \n  b\tc", 100.0, 1.0, false);
        assert_eq!(lines, vec!["a b c"]);
    }

    #[test]
    fn test_rendered_height_follows_line_count() {
        let raster = rasterizer();
        let style = TextStyle::new(5.0, Color::BLACK);
        let one = raster.render_mm("Hi", 100.0, &style);
        assert_eq!(one.line_count, 1);
        assert!((one.height - (5.0 * 1.4 + 2.0)).abs() < 1e-4);

        let many = raster.render_mm("word word word word word word", 20.0, &style);
        assert!(many.line_count > 1);
        assert!(
            (many.height - (many.line_count as f32 * 7.0 + 2.0)).abs() < 1e-4
        );
        assert_eq!(many.image.width(), (20.0 * MM_TO_PX * 4.0_f32).ceil() as u32);
    }

    #[test]
    fn test_render_draws_glyph_coverage() {
        let raster = rasterizer();
        let style = TextStyle::new(4.0, Color::rgb(249, 115, 22)).bold().centered();
        let text = raster.render_mm("PHÂN CẢNH #1", 80.0, &style);

        let inked: Vec<_> = text.image.pixels().filter(|p| p.0[3] > 0).collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|p| p.0[..3] == [249, 115, 22]));
    }

    #[test]
    fn test_empty_text_renders_blank_block() {
        let raster = rasterizer();
        let text = raster.render_px("", 50.0, &TextStyle::new(10.0, Color::BLACK));
        assert_eq!(text.line_count, 1);
        assert!(text.image.pixels().all(|p| p.0[3] == 0));
    }

    proptest! {
        #[test]
        fn prop_wrap_preserves_words_and_fits(
            words in prop::collection::vec("[a-zA-Z]{1,12}", 0..30),
            max_width in 1u32..40,
        ) {
            let text = words.join(" ");
            let lines = wrap_words(&Monospace, &text, max_width as f32, 1.0, false);

            prop_assert!(!lines.is_empty());
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            let expected: Vec<&str> = words.iter().map(String::as_str).collect();
            prop_assert_eq!(rejoined, expected);

            for line in &lines {
                let fits = line.chars().count() as u32 <= max_width;
                let single_word = !line.contains(' ');
                prop_assert!(fits || single_word);
            }
        }
    }
}

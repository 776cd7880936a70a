//! Page-oriented drawing surface.
//!
//! Coordinates are millimetres with the origin at the top-left corner of the
//! page. [`Document`] records draw calls per page so they can be serialized
//! later (see [`crate::pdf`]) or inspected in tests.

use std::sync::Arc;

use image::RgbaImage;

/// A4 portrait, in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_rgba(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

/// Axis-aligned rectangle in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectMm {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl RectMm {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }
}

/// Something that can receive storyboard drawing calls.
///
/// A fresh surface always has one open page; drawing targets the last page.
pub trait DrawingSurface {
    /// Page width and height in millimetres.
    fn page_size(&self) -> (f32, f32);

    /// Append a new page and make it current.
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    fn fill_rect(&mut self, rect: RectMm, color: Color);

    fn stroke_rect(&mut self, rect: RectMm, color: Color, line_width: f32);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32);

    /// Place an image stretched to `rect`.
    fn draw_image(&mut self, rect: RectMm, image: Arc<RgbaImage>);
}

/// A recorded drawing operation.
#[derive(Debug, Clone)]
pub enum Command {
    FillRect {
        rect: RectMm,
        color: Color,
    },
    StrokeRect {
        rect: RectMm,
        color: Color,
        line_width: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        line_width: f32,
    },
    Image {
        rect: RectMm,
        image: Arc<RgbaImage>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    /// Images placed on this page, in drawing order.
    pub fn images(&self) -> impl Iterator<Item = (&RectMm, &Arc<RgbaImage>)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::Image { rect, image } => Some((rect, image)),
            _ => None,
        })
    }
}

/// In-memory multi-page document.
#[derive(Debug, Clone)]
pub struct Document {
    width_mm: f32,
    height_mm: f32,
    pages: Vec<Page>,
    title: Option<String>,
}

impl Document {
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
            pages: vec![Page::default()],
            title: None,
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl DrawingSurface for Document {
    fn page_size(&self) -> (f32, f32) {
        (self.width_mm, self.height_mm)
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn fill_rect(&mut self, rect: RectMm, color: Color) {
        self.current().commands.push(Command::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: RectMm, color: Color, line_width: f32) {
        self.current().commands.push(Command::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32) {
        self.current().commands.push(Command::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn draw_image(&mut self, rect: RectMm, image: Arc<RgbaImage>) {
        self.current().commands.push(Command::Image { rect, image });
    }
}

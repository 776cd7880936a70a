//! Storyboard Render Engine
//!
//! Turns an analysed project into visual output: the paginated storyboard
//! document and the zoomable timeline strip.
//!
//! # Pipeline Architecture
//!
//! ```text
//! analysis ────┐
//!              ├── Compose (cover page, shot cards)
//! timeline ────┘         │
//!                        ├── Text Rasterizer (wrapped Unicode → RGBA)
//! sketches (data URLs) ──┘         │
//!                                  ▼
//!                           Document (pages of draw commands)
//!                                  │
//!                                  ▼
//!                           PDF writer → STORYBOARD_<title>.pdf
//!
//! timeline ── TimelineView (zoom, ruler, blocks, hit test) ── PNG strip
//! ```

pub mod compose;
pub mod export;
pub mod image_data;
pub mod labels;
pub mod pdf;
pub mod surface;
pub mod text;
pub mod timeline_raster;
pub mod timeline_view;

pub use export::*;

//! Sketch images carried as `data:` URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbaImage;

use storyboard_common::error::{StoryboardError, StoryboardResult};

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn parse(url: &str) -> StoryboardResult<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| StoryboardError::render("Image is not a data URL"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| StoryboardError::render("Data URL has no payload"))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| StoryboardError::render("Only base64 data URLs are supported"))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| StoryboardError::render(format!("Invalid base64 image data: {e}")))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn to_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Decode the payload as an image of any format `image` understands.
    pub fn decode_image(&self) -> StoryboardResult<RgbaImage> {
        let img = image::load_from_memory(&self.bytes)
            .map_err(|e| StoryboardError::render(format!("Undecodable image data: {e}")))?;
        Ok(img.to_rgba8())
    }
}

/// Parse and decode a sketch URL in one step.
pub fn decode_data_url_image(url: &str) -> StoryboardResult<RgbaImage> {
    DataUrl::parse(url)?.decode_image()
}

/// Encode an image as a PNG data URL.
pub fn png_data_url(image: &RgbaImage) -> StoryboardResult<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| StoryboardError::render(format!("PNG encoding failed: {e}")))?;
    Ok(DataUrl {
        mime_type: "image/png".to_string(),
        bytes,
    }
    .to_url())
}

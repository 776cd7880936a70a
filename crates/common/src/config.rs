//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative backend settings.
    pub api: ApiConfig,

    /// Sketch image defaults.
    pub images: ImageDefaults,

    /// PDF and text rendering settings.
    pub render: RenderConfig,

    /// Timeline view settings.
    pub timeline: TimelineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Generative backend endpoint and model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the `generateContent` API.
    pub base_url: String,

    /// Model used for script analysis.
    pub analysis_model: String,

    /// Model used for sketch generation.
    pub image_model: String,

    /// Lightweight model used for credential checks.
    pub ping_model: String,

    /// Optional per-request timeout. Unset means requests never time out.
    pub request_timeout_secs: Option<u64>,
}

/// Default parameters for sketch generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDefaults {
    /// Aspect ratio sent with each image request (e.g. "16:9").
    pub aspect_ratio: String,

    /// Output resolution class (e.g. "1K").
    pub resolution: String,

    /// Pause between consecutive batch requests, in milliseconds.
    pub batch_delay_ms: u64,
}

/// Text rasterization and document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Regular font face. Falls back to common system fonts when unset.
    pub font_path: Option<PathBuf>,

    /// Bold font face. Synthetic bold is used when unset and not found.
    pub bold_font_path: Option<PathBuf>,

    /// Linear supersampling factor for rasterized text.
    pub supersample: u32,

    /// Language of the fixed labels in exported documents.
    pub locale: Locale,
}

/// Language for user-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

/// Timeline zoom and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Initial zoom in pixels per second.
    pub default_zoom: f64,

    /// Lower zoom bound.
    pub min_zoom: f64,

    /// Upper zoom bound.
    pub max_zoom: f64,

    /// Multiplicative step per zoom action.
    pub zoom_step: f64,

    /// Minimum block width so near-zero shots stay clickable.
    pub min_block_px: f64,

    /// Color theme for raster output.
    pub theme: Theme,
}

impl TimelineConfig {
    /// Fall back to the default zoom settings when the configured bounds
    /// cannot be clamped against (non-finite, non-positive or inverted).
    pub fn sanitized(self) -> Self {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let usable = positive(self.default_zoom)
            && positive(self.min_zoom)
            && positive(self.max_zoom)
            && self.min_zoom <= self.max_zoom
            && self.zoom_step.is_finite()
            && self.zoom_step > 1.0;
        if usable {
            return self;
        }

        tracing::warn!(
            min_zoom = self.min_zoom,
            max_zoom = self.max_zoom,
            default_zoom = self.default_zoom,
            zoom_step = self.zoom_step,
            "Invalid timeline zoom settings, using defaults"
        );
        let defaults = Self::default();
        Self {
            default_zoom: defaults.default_zoom,
            min_zoom: defaults.min_zoom,
            max_zoom: defaults.max_zoom,
            zoom_step: defaults.zoom_step,
            ..self
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "storyboard=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Maximum number of entries retained by the activity log.
    pub activity_capacity: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            analysis_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            ping_model: "gemini-flash-lite-latest".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            resolution: "1K".to_string(),
            batch_delay_ms: 4000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            bold_font_path: None,
            supersample: 4,
            locale: Locale::En,
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_zoom: 20.0,
            min_zoom: 5.0,
            max_zoom: 150.0,
            zoom_step: 1.5,
            min_block_px: 2.0,
            theme: Theme::Dark,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            activity_capacity: 1000,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(mut config) => {
                        config.timeline = config.timeline.sanitized();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("storyboard").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_batch_rate_limit() {
        let config = AppConfig::default();
        assert_eq!(config.images.batch_delay_ms, 4000);
        assert_eq!(config.images.aspect_ratio, "16:9");
        assert!(config.api.request_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "render": { "locale": "vi" }, "timeline": { "theme": "light" } }"#)
                .unwrap();
        assert_eq!(parsed.render.locale, Locale::Vi);
        assert_eq!(parsed.render.supersample, 4);
        assert_eq!(parsed.timeline.theme, Theme::Light);
        assert!((parsed.timeline.max_zoom - 150.0).abs() < 1e-9);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_inverted_zoom_bounds_fall_back_to_defaults() {
        let parsed: TimelineConfig =
            serde_json::from_str(r#"{ "min_zoom": 50.0, "max_zoom": 10.0, "theme": "light" }"#)
                .unwrap();
        let timeline = parsed.sanitized();
        let defaults = TimelineConfig::default();
        assert_eq!(timeline.min_zoom, defaults.min_zoom);
        assert_eq!(timeline.max_zoom, defaults.max_zoom);
        assert_eq!(timeline.theme, Theme::Light);

        let valid = TimelineConfig {
            min_zoom: 10.0,
            max_zoom: 60.0,
            ..TimelineConfig::default()
        };
        assert_eq!(valid.sanitized().max_zoom, 60.0);

        let nan = TimelineConfig {
            max_zoom: f64::NAN,
            ..TimelineConfig::default()
        };
        assert!(nan.sanitized().max_zoom.is_finite());
    }
}

//! Localized strings printed on the storyboard document.

use storyboard_common::config::Locale;

/// Fixed document labels for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub badge: &'static str,
    pub app_title: &'static str,
    pub genre: &'static str,
    pub exported_on: &'static str,
    pub project: &'static str,
    pub page: &'static str,
    pub shot: &'static str,
    pub static_camera: &'static str,
    pub no_description: &'static str,
    pub no_sketch: &'static str,
    /// `chrono` format string for the export date.
    pub date_format: &'static str,
}

pub const ENGLISH: Labels = Labels {
    badge: "PROFESSIONAL STORYBOARD SKETCH",
    app_title: "SKETCH AI STORYBOARD",
    genre: "GENRE:",
    exported_on: "EXPORTED ON:",
    project: "PROJECT:",
    page: "PAGE",
    shot: "SHOT #",
    static_camera: "Static",
    no_description: "No description.",
    no_sketch: "NO SKETCH YET",
    date_format: "%Y-%m-%d",
};

pub const VIETNAMESE: Labels = Labels {
    badge: "PHÁC THẢO KỊCH BẢN CHUYÊN NGHIỆP",
    app_title: "SKETCH AI STORYBOARD",
    genre: "THỂ LOẠI:",
    exported_on: "NGÀY XUẤT BẢN:",
    project: "DỰ ÁN:",
    page: "TRANG",
    shot: "PHÂN CẢNH #",
    static_camera: "Tĩnh",
    no_description: "Không có mô tả.",
    no_sketch: "CHƯA CÓ PHÁC THẢO",
    date_format: "%d/%m/%Y",
};

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::En => &ENGLISH,
            Locale::Vi => &VIETNAMESE,
        }
    }

    /// `PROJECT: TITLE | PAGE n`.
    pub fn page_header(&self, title: &str, page_number: usize) -> String {
        format!(
            "{} {} | {} {}",
            self.project,
            title.to_uppercase(),
            self.page,
            page_number
        )
    }
}

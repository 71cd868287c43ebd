use serde::{Deserialize, Serialize};

use crate::layout::presets::{Dimensions, FontScale, Ratio};
use crate::layout::theme::Theme;

/// Externally supplied cover image, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub data: String,
    pub mime_type: String,
}

impl CoverImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Cross-cutting render configuration. Built once per job and shared by reference
/// with the measurer, the break search, and the compositor so all three lay out
/// pages identically.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: &'static Theme,
    pub ratio: Ratio,
    pub font_scale: FontScale,
    pub title: Option<String>,
    /// Gates all first-page chrome (title heading and cover banner).
    pub show_cover: bool,
    pub cover_image: Option<CoverImage>,
}

/// Non-body decoration placed above the content block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Chrome<'a> {
    None,
    Title(&'a str),
    Cover {
        title: Option<&'a str>,
        image: &'a CoverImage,
    },
}

impl Chrome<'_> {
    pub fn is_none(&self) -> bool {
        matches!(self, Chrome::None)
    }
}

impl RenderOptions {
    pub fn new(
        theme: &'static Theme,
        ratio: Ratio,
        font_scale: FontScale,
        title: Option<String>,
        show_cover: bool,
        cover_image: Option<CoverImage>,
    ) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            theme,
            ratio,
            font_scale,
            title,
            show_cover,
            cover_image,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.ratio.dimensions()
    }

    pub fn stylesheet(&self) -> String {
        self.theme.stylesheet(self.font_scale, self.dimensions())
    }

    /// Chrome for a page. Only the first page ever carries any.
    pub fn chrome(&self, is_first: bool) -> Chrome<'_> {
        if !is_first || !self.show_cover {
            return Chrome::None;
        }
        let title = self.title.as_deref();
        match (&self.cover_image, title) {
            (Some(image), _) => Chrome::Cover { title, image },
            (None, Some(title)) => Chrome::Title(title),
            (None, None) => Chrome::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::theme::ThemeId;

    fn options(title: Option<&str>, show_cover: bool, cover: bool) -> RenderOptions {
        RenderOptions::new(
            Theme::get(ThemeId::Minimal),
            Ratio::Portrait,
            FontScale::Medium,
            title.map(str::to_string),
            show_cover,
            cover.then(|| CoverImage {
                data: "AAAA".to_string(),
                mime_type: "image/png".to_string(),
            }),
        )
    }

    #[test]
    fn test_chrome_only_on_first_page() {
        let opts = options(Some("Title"), true, false);
        assert_eq!(opts.chrome(true), Chrome::Title("Title"));
        assert_eq!(opts.chrome(false), Chrome::None);
    }

    #[test]
    fn test_cover_image_wins_over_plain_title() {
        let opts = options(Some("Title"), true, true);
        assert!(matches!(
            opts.chrome(true),
            Chrome::Cover { title: Some("Title"), .. }
        ));
    }

    #[test]
    fn test_show_cover_false_disables_chrome() {
        let opts = options(Some("Title"), false, true);
        assert!(opts.chrome(true).is_none());
    }

    #[test]
    fn test_blank_title_is_dropped() {
        let opts = options(Some("   "), true, false);
        assert_eq!(opts.title, None);
        assert!(opts.chrome(true).is_none());
    }

    #[test]
    fn test_data_uri() {
        let image = CoverImage {
            data: "Zm9v".to_string(),
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,Zm9v");
    }
}

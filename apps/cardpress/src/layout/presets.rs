//! Static lookup tables for card dimensions and font scales.

use serde::{Deserialize, Serialize};

/// Every card is rendered at this width regardless of aspect ratio.
pub const CARD_WIDTH: u32 = 1080;

/// Pixel size of a rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Aspect-ratio presets accepted on the wire as `"3:4"`, `"1:1"`, `"4:3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ratio {
    #[default]
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape,
}

impl Ratio {
    pub fn dimensions(self) -> Dimensions {
        let height = match self {
            Ratio::Portrait => 1440,
            Ratio::Square => 1080,
            Ratio::Landscape => 810,
        };
        Dimensions {
            width: CARD_WIDTH,
            height,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ratio::Portrait => "3:4",
            Ratio::Square => "1:1",
            Ratio::Landscape => "4:3",
        }
    }
}

/// Named size tier for title and body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontScale {
    Small,
    #[default]
    Medium,
    Large,
}

/// Concrete CSS pixel sizes for a [`FontScale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizes {
    pub title_px: u32,
    pub body_px: u32,
}

impl FontScale {
    pub fn sizes(self) -> FontSizes {
        let (title_px, body_px) = match self {
            FontScale::Small => (44, 30),
            FontScale::Medium => (52, 34),
            FontScale::Large => (60, 40),
        };
        FontSizes { title_px, body_px }
    }
}

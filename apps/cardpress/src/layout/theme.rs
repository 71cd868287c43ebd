//! Card themes — colors plus the typographic stylesheet shared by measurement and rendering.
//!
//! The stylesheet is generated from the theme, the font scale, and the card dimensions.
//! Any change here changes measured budgets and rendered output together, which is what
//! keeps page breaks honest.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::presets::{Dimensions, FontScale};

// ────────────────────────────────────────────────────────────────────────────
// Page geometry (CSS px)
// ────────────────────────────────────────────────────────────────────────────

pub const PAGE_PADDING_TOP: u32 = 72;
pub const PAGE_PADDING_X: u32 = 80;
pub const FOOTER_HEIGHT: u32 = 96;
pub const TITLE_GAP: u32 = 40;
pub const COVER_GAP: u32 = 48;
/// Fraction of the card height taken by the cover banner.
pub const COVER_FRACTION: f64 = 0.36;
pub const TITLE_LINE_HEIGHT: f64 = 1.3;
pub const BODY_LINE_HEIGHT: f64 = 1.75;
/// Paragraph spacing as a fraction of the body font size.
pub const PARAGRAPH_GAP: f64 = 0.9;

// ────────────────────────────────────────────────────────────────────────────
// Theme table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Minimal,
    Elegant,
    Warm,
    Dark,
}

impl ThemeId {
    pub const DEFAULT: ThemeId = ThemeId::Minimal;

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Minimal => "minimal",
            ThemeId::Elegant => "elegant",
            ThemeId::Warm => "warm",
            ThemeId::Dark => "dark",
        }
    }
}

impl FromStr for ThemeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(ThemeId::Minimal),
            "elegant" => Ok(ThemeId::Elegant),
            "warm" => Ok(ThemeId::Warm),
            "dark" => Ok(ThemeId::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Immutable visual configuration for a card.
#[derive(Debug, PartialEq)]
pub struct Theme {
    pub id: ThemeId,
    pub background: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
    pub font_family: &'static str,
    pub title_weight: u16,
}

const SANS_STACK: &str =
    "\"Noto Sans SC\", \"PingFang SC\", \"Helvetica Neue\", Arial, sans-serif";
const SERIF_STACK: &str = "\"Noto Serif SC\", \"Songti SC\", Georgia, serif";

static THEMES: [Theme; 4] = [
    Theme {
        id: ThemeId::Minimal,
        background: "#ffffff",
        text: "#1f2328",
        accent: "#1f2328",
        muted: "#8c959f",
        font_family: SANS_STACK,
        title_weight: 700,
    },
    Theme {
        id: ThemeId::Elegant,
        background: "#f7f4ee",
        text: "#2b2a28",
        accent: "#9a7b4f",
        muted: "#a39e93",
        font_family: SERIF_STACK,
        title_weight: 600,
    },
    Theme {
        id: ThemeId::Warm,
        background: "#fff4e6",
        text: "#4a3426",
        accent: "#e07a3f",
        muted: "#b39580",
        font_family: SANS_STACK,
        title_weight: 700,
    },
    Theme {
        id: ThemeId::Dark,
        background: "#16181d",
        text: "#e6e6e6",
        accent: "#7aa2f7",
        muted: "#6b7280",
        font_family: SANS_STACK,
        title_weight: 700,
    },
];

impl Theme {
    pub fn get(id: ThemeId) -> &'static Theme {
        THEMES
            .iter()
            .find(|t| t.id == id)
            .unwrap_or(&THEMES[0])
    }

    /// Resolves a theme identifier, falling back to the default theme when it is
    /// absent or unknown.
    pub fn resolve(name: Option<&str>) -> &'static Theme {
        match name.map(str::parse::<ThemeId>) {
            Some(Ok(id)) => Theme::get(id),
            Some(Err(reason)) => {
                warn!("{reason}; falling back to '{}'", ThemeId::DEFAULT.as_str());
                Theme::get(ThemeId::DEFAULT)
            }
            None => Theme::get(ThemeId::DEFAULT),
        }
    }

    /// Builds the full page stylesheet for this theme at the given scale and size.
    pub fn stylesheet(&self, scale: FontScale, dims: Dimensions) -> String {
        let sizes = scale.sizes();
        let body_px = sizes.body_px as f64;
        let mut css = String::with_capacity(2048);

        let _ = write!(
            css,
            "*{{box-sizing:border-box;margin:0;padding:0;}}\
             html,body{{width:{w}px;height:{h}px;overflow:hidden;}}\
             body{{background:{bg};color:{fg};font-family:{font};\
             -webkit-font-smoothing:antialiased;text-rendering:geometricPrecision;}}\
             .page{{width:100%;height:100%;display:flex;flex-direction:column;\
             padding:{pt}px {px}px 0;}}",
            w = dims.width,
            h = dims.height,
            bg = self.background,
            fg = self.text,
            font = self.font_family,
            pt = PAGE_PADDING_TOP,
            px = PAGE_PADDING_X,
        );

        let _ = write!(
            css,
            ".title{{flex:0 0 auto;font-size:{tpx}px;line-height:{tlh};font-weight:{tw};\
             color:{fg};margin-bottom:{gap}px;}}\
             .title::after{{content:\"\";display:block;width:64px;height:6px;\
             margin-top:24px;background:{accent};border-radius:3px;}}",
            tpx = sizes.title_px,
            tlh = TITLE_LINE_HEIGHT,
            tw = self.title_weight,
            fg = self.text,
            gap = TITLE_GAP,
            accent = self.accent,
        );

        let _ = write!(
            css,
            ".cover{{flex:0 0 auto;position:relative;height:{ch}px;\
             margin:-{pt}px -{px}px {cg}px;padding:0 {px}px 40px;\
             display:flex;align-items:flex-end;\
             background-size:cover;background-position:center;}}\
             .cover::before{{content:\"\";position:absolute;inset:0;\
             background:linear-gradient(180deg,rgba(0,0,0,0) 30%,rgba(0,0,0,0.65) 100%);}}\
             .cover .title{{position:relative;color:#ffffff;margin-bottom:0;}}\
             .cover .title::after{{background:#ffffff;}}",
            ch = cover_height(dims),
            pt = PAGE_PADDING_TOP,
            px = PAGE_PADDING_X,
            cg = COVER_GAP,
        );

        let _ = write!(
            css,
            ".content{{flex:1 1 auto;min-height:0;overflow:hidden;}}\
             .content-body{{display:flow-root;}}\
             .content-body p{{font-size:{bpx}px;line-height:{blh};margin-bottom:{pgap}px;\
             text-align:justify;white-space:pre-line;overflow-wrap:anywhere;}}\
             .content-body p:last-child{{margin-bottom:0;}}\
             .content-body hr.divider{{border:none;border-top:2px solid {accent};\
             opacity:0.5;margin:{bpx}px 30%;}}\
             .footer{{flex:0 0 {fh}px;height:{fh}px;display:flex;align-items:center;\
             justify-content:center;font-size:24px;letter-spacing:2px;color:{muted};}}",
            bpx = sizes.body_px,
            blh = BODY_LINE_HEIGHT,
            pgap = (body_px * PARAGRAPH_GAP).round(),
            accent = self.accent,
            fh = FOOTER_HEIGHT,
            muted = self.muted,
        );

        css
    }
}

/// Height of the cover banner for a card of the given size.
pub fn cover_height(dims: Dimensions) -> u32 {
    (dims.height as f64 * COVER_FRACTION).round() as u32
}

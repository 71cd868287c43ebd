//! Axum route handlers for the Cards API.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::cards::pipeline::{paginate_text, render_cards, LayoutTuning};
use crate::errors::AppError;
use crate::layout::{CoverImage, FontScale, Page, Ratio, RenderOptions, Theme};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Configuration bundle sent by callers. Unknown themes fall back to the default;
/// unknown ratios or font sizes are rejected by the JSON extractor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCardsRequest {
    pub text: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub ratio: Ratio,
    #[serde(default)]
    pub font_size: FontScale,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_show_cover")]
    pub show_cover: bool,
    #[serde(default)]
    pub ai_cover_image: Option<CoverImage>,
}

fn default_show_cover() -> bool {
    true
}

impl RenderCardsRequest {
    fn options(&self) -> Result<RenderOptions, AppError> {
        if let Some(cover) = &self.ai_cover_image {
            validate_cover(cover)?;
        }
        Ok(RenderOptions::new(
            Theme::resolve(self.theme.as_deref()),
            self.ratio,
            self.font_size,
            self.title.clone(),
            self.show_cover,
            self.ai_cover_image.clone(),
        ))
    }
}

/// The cover ends up inside a CSS `url('...')`, so only strict base64 and a plain
/// `image/<subtype>` are let through.
fn validate_cover(cover: &CoverImage) -> Result<(), AppError> {
    let subtype_ok = cover
        .mime_type
        .strip_prefix("image/")
        .is_some_and(|subtype| {
            !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || ".+-".contains(c))
        });
    if !subtype_ok {
        return Err(AppError::Validation(format!(
            "aiCoverImage.mimeType '{}' is not an image type",
            cover.mime_type
        )));
    }

    match STANDARD.decode(&cover.data) {
        Ok(bytes) if !bytes.is_empty() => Ok(()),
        Ok(_) => Err(AppError::Validation("aiCoverImage.data is empty".to_string())),
        Err(e) => Err(AppError::Validation(format!(
            "aiCoverImage.data is not valid base64: {e}"
        ))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    pub page_number: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub content: String,
    pub width: u32,
    pub height: u32,
    /// Base64-encoded PNG.
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCardsResponse {
    pub job_id: Uuid,
    pub page_count: usize,
    pub theme: &'static str,
    pub ratio: Ratio,
    pub pages: Vec<CardImage>,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateResponse {
    pub job_id: Uuid,
    pub page_count: usize,
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cards/render
///
/// Paginates the text and returns one PNG per page. Empty text yields zero pages.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderCardsRequest>,
) -> Result<Json<RenderCardsResponse>, AppError> {
    let options = request.options()?;
    let job_id = Uuid::new_v4();
    let span = info_span!("render_job", %job_id, theme = options.theme.id.as_str());

    async move {
        info!(chars = request.text.chars().count(), "Render job started");
        let cards = render_cards(
            state.renderer.as_ref(),
            &request.text,
            &options,
            LayoutTuning::from(&state.config),
        )
        .await?;

        let mut pages = Vec::with_capacity(cards.len());
        for card in &cards {
            let png = card.encode_png()?;
            let dims = card.dimensions();
            pages.push(CardImage {
                page_number: card.page.page_number,
                is_first: card.page.is_first,
                is_last: card.page.is_last,
                content: card.page.content.clone(),
                width: dims.width,
                height: dims.height,
                image: STANDARD.encode(png),
            });
        }

        Ok::<_, AppError>(Json(RenderCardsResponse {
            job_id,
            page_count: pages.len(),
            theme: options.theme.id.as_str(),
            ratio: options.ratio,
            pages,
            rendered_at: Utc::now(),
        }))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/cards/paginate
///
/// Returns the page grouping only, without rasterizing.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<RenderCardsRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let options = request.options()?;
    let job_id = Uuid::new_v4();
    let span = info_span!("paginate_job", %job_id);

    let pages = paginate_text(
        state.renderer.as_ref(),
        &request.text,
        &options,
        LayoutTuning::from(&state.config),
    )
    .instrument(span)
    .await?;

    Ok(Json(PaginateResponse {
        job_id,
        page_count: pages.len(),
        pages,
    }))
}

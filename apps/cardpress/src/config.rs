use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which paginator drives page breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Measured breaks using the layout engine (authoritative).
    Browser,
    /// Character-count estimate; no engine needed until composition.
    Heuristic,
}

impl FromStr for PaginationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(PaginationMode::Browser),
            "heuristic" => Ok(PaginationMode::Heuristic),
            other => bail!("LAYOUT_ENGINE must be 'browser' or 'heuristic', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Browser binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Upper bound on any single tab operation.
    pub render_timeout_secs: u64,
    /// Pixels withheld from every measured budget to absorb hinting differences
    /// between measurement and rasterization.
    pub measure_safety_margin_px: f64,
    pub pagination_mode: PaginationMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", "8080").context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            chrome_executable: std::env::var_os("CHROME_EXECUTABLE").map(PathBuf::from),
            render_timeout_secs: parse_env("RENDER_TIMEOUT_SECS", "30")
                .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            measure_safety_margin_px: parse_env("MEASURE_SAFETY_MARGIN_PX", "20")
                .and_then(check_safety_margin)
                .context("MEASURE_SAFETY_MARGIN_PX must be a finite, non-negative number")?,
            pagination_mode: parse_env("LAYOUT_ENGINE", "browser")?,
        })
    }
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid value '{raw}' for {key}: {e}"))
}

fn check_safety_margin(margin: f64) -> Result<f64> {
    if !margin.is_finite() || margin < 0.0 {
        bail!("safety margin must be finite and >= 0, got {margin}");
    }
    Ok(margin)
}

//! Headless Chromium backend for [`LayoutRenderer`].
//!
//! One browser process is shared by the whole service. It is launched lazily on
//! the first measurement and torn down explicitly by `shutdown`. Every operation
//! gets its own tab, which is closed again on every exit path; tabs are never
//! reused, so probes cannot leak DOM or style state into one another.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::{Page as Tab, ScreenshotParams};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::layout::presets::{Dimensions, CARD_WIDTH};
use crate::renderer::{checked_height, LayoutRenderer, RenderError};

/// Waits for web fonts so the first measurement sees final glyph metrics.
const FONTS_READY_JS: &str = "document.fonts.ready.then(() => true)";

enum EngineState {
    Idle,
    Running(Running),
    ShutDown,
}

struct Running {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

/// Process-wide browser handle with an explicit lifecycle.
pub struct BrowserEngine {
    state: Mutex<EngineState>,
    executable: Option<PathBuf>,
    timeout: Duration,
}

impl BrowserEngine {
    pub fn new(executable: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            state: Mutex::new(EngineState::Idle),
            executable,
            timeout,
        }
    }

    /// Returns the shared browser, launching it on first use.
    async fn acquire(&self) -> Result<Arc<Browser>, RenderError> {
        let mut state = self.state.lock().await;
        match &*state {
            EngineState::Running(running) => return Ok(Arc::clone(&running.browser)),
            EngineState::ShutDown => return Err(RenderError::ShutDown),
            EngineState::Idle => {}
        }

        let running = self.bounded("browser launch", self.launch()).await?;
        let browser = Arc::clone(&running.browser);
        *state = EngineState::Running(running);
        Ok(browser)
    }

    async fn launch(&self) -> Result<Running, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("cardpress-chrome-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("cannot create profile dir: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .window_size(CARD_WIDTH, CARD_WIDTH)
            .no_sandbox()
            .arg("--hide-scrollbars")
            .arg("--font-render-hinting=none")
            .arg("--disable-gpu");
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        info!("Headless browser launched");
        Ok(Running {
            browser: Arc::new(browser),
            handler,
            _profile: profile,
        })
    }

    /// Closes the browser. Later calls fail with [`RenderError::ShutDown`].
    pub async fn shutdown(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, EngineState::ShutDown)
        };
        let EngineState::Running(running) = previous else {
            return;
        };

        match Arc::try_unwrap(running.browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    warn!("browser close failed: {e}");
                }
                if let Err(e) = browser.wait().await {
                    warn!("browser did not exit cleanly: {e}");
                }
            }
            Err(_) => warn!("tabs still open at shutdown; dropping browser handle"),
        }
        running.handler.abort();
        info!("Headless browser shut down");
    }

    /// Applies the per-operation time limit.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, RenderError>>,
    ) -> Result<T, RenderError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| RenderError::Timeout {
                operation,
                secs: self.timeout.as_secs(),
            })?
    }

    /// Opens a fresh tab sized to `viewport` with `html` loaded.
    async fn open_tab(&self, html: &str, viewport: Dimensions) -> Result<Tab, RenderError> {
        let browser = self.acquire().await?;
        let tab = self
            .bounded("open tab", async {
                Ok(browser.new_page("about:blank").await?)
            })
            .await?;

        let prepared = self
            .bounded("load content", async {
                tab.execute(SetDeviceMetricsOverrideParams::new(
                    viewport.width as i64,
                    viewport.height as i64,
                    1.0,
                    false,
                ))
                .await?;
                tab.set_content(html).await?;
                tab.evaluate_expression(evaluate(FONTS_READY_JS)?).await?;
                Ok(())
            })
            .await;

        match prepared {
            Ok(()) => Ok(tab),
            Err(e) => {
                close_tab(tab).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl LayoutRenderer for BrowserEngine {
    async fn measure(
        &self,
        html: &str,
        viewport: Dimensions,
        selector: &str,
    ) -> Result<f64, RenderError> {
        let tab = self.open_tab(html, viewport).await?;
        let outcome = self
            .bounded("measure", async {
                let script = measure_script(selector);
                let height: f64 = tab
                    .evaluate_expression(evaluate(&script)?)
                    .await?
                    .into_value()?;
                if height < 0.0 {
                    return Err(RenderError::ElementNotFound {
                        selector: selector.to_string(),
                    });
                }
                checked_height(height)
            })
            .await;
        close_tab(tab).await;
        outcome
    }

    async fn rasterize(&self, html: &str, viewport: Dimensions) -> Result<Vec<u8>, RenderError> {
        let tab = self.open_tab(html, viewport).await?;
        let outcome = self
            .bounded("screenshot", async {
                let params = ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build();
                Ok(tab.screenshot(params).await?)
            })
            .await;
        close_tab(tab).await;
        outcome
    }
}

async fn close_tab(tab: Tab) {
    if let Err(e) = tab.close().await {
        warn!("failed to close tab: {e}");
    }
}

fn evaluate(expression: &str) -> Result<EvaluateParams, RenderError> {
    EvaluateParams::builder()
        .expression(expression)
        .return_by_value(true)
        .await_promise(true)
        .build()
        .map_err(RenderError::Script)
}

/// Script returning the element's rendered height, or -1 when it is absent.
fn measure_script(selector: &str) -> String {
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "(() => {{ const el = document.querySelector({quoted}); \
         return el ? el.getBoundingClientRect().height : -1; }})()"
    )
}

//! Chromium process plus the [`BrowserActions`] primitives over its tabs.

use std::sync::Arc;
use std::time::Duration;

use action_primitives::{ActionError, BrowserActions};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use pilot_core_types::{PageHandle, PageId};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ChromiumConfig;
use crate::error::{action_error, AdapterError};
use crate::page::{invocation, ChromiumPage};
use crate::registry::Registry;

const WAIT_POLL: Duration = Duration::from_millis(100);

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// `"found"`, `"missing"` or `"invalid: <reason>"` for the selector argument
const SELECTOR_PROBE: &str = "(sel) => { try { return document.querySelector(sel) ? 'found' : 'missing'; } catch (e) { return 'invalid: ' + e.message; } }";

const CLEAR_VALUE: &str = "function() { if ('value' in this) { this.value = ''; } }";

pub struct ChromiumBrowser {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    registry: Registry,
    config: ChromiumConfig,
}

impl ChromiumBrowser {
    pub async fn launch(config: ChromiumConfig) -> Result<Self, AdapterError> {
        let (browser, mut handler) = Browser::launch(browser_config(&config)?)
            .await
            .map_err(|err| AdapterError::Launch(err.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "Chromium handler stopped");
                    break;
                }
            }
        });

        info!(headless = config.headless, "Chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            registry: Registry::new(),
            config,
        })
    }

    pub fn config(&self) -> &ChromiumConfig {
        &self.config
    }

    pub fn open_pages(&self) -> usize {
        self.registry.len()
    }

    /// Close one tab opened by navigation.
    pub async fn close_page(&self, id: &PageId) {
        if let Some(page) = self.registry.remove(id) {
            discard_tab(page).await;
        }
    }

    pub async fn shutdown(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(err) = browser.close().await {
            warn!(error = %err, "Chromium did not close cleanly");
        }
        if let Err(err) = browser.wait().await {
            debug!(error = %err, "Waiting for chromium exit failed");
        }
        self.handler.abort();
    }

    fn tab(&self, page: &PageHandle) -> Result<Page, ActionError> {
        self.registry
            .get(page.id())
            .ok_or_else(|| ActionError::BrowserIo(format!("page {} is not a chromium tab", page.id())))
    }

    async fn element(&self, page: &PageHandle, selector: &str) -> Result<Element, ActionError> {
        self.tab(page)?
            .find_element(selector)
            .await
            .map_err(|err| action_error(err, Some(selector)))
    }
}

#[async_trait]
impl BrowserActions for ChromiumBrowser {
    async fn go_to_url(&self, url: &str) -> Result<PageHandle, ActionError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|err| action_error(err, None))?;

        let failure = match tokio::time::timeout(self.config.navigation_timeout(), page.goto(url)).await {
            Ok(Ok(_)) => None,
            Ok(Err(err)) => Some(action_error(err, None)),
            Err(_) => Some(ActionError::NavTimeout(url.to_string())),
        };
        if let Some(err) = failure {
            debug!(url, error = %err, "Navigation failed; closing tab");
            discard_tab(page).await;
            return Err(err);
        }

        let id = PageId::new();
        debug!(page = %id, url, "Opened tab");
        self.registry.insert(id.clone(), page.clone());
        Ok(Arc::new(ChromiumPage::new(id, page)))
    }

    async fn click(&self, page: &PageHandle, selector: &str) -> Result<(), ActionError> {
        self.element(page, selector)
            .await?
            .click()
            .await
            .map_err(|err| ActionError::NotInteractable(format!("{selector}: {err}")))?;
        Ok(())
    }

    async fn fill(&self, page: &PageHandle, selector: &str, text: &str) -> Result<(), ActionError> {
        let element = self.element(page, selector).await?;
        element
            .call_js_fn(CLEAR_VALUE, false)
            .await
            .map_err(|err| action_error(err, Some(selector)))?;
        element
            .click()
            .await
            .map_err(|err| ActionError::NotInteractable(format!("{selector}: {err}")))?;
        element
            .type_str(text)
            .await
            .map_err(|err| action_error(err, Some(selector)))?;
        Ok(())
    }

    async fn extract_text(&self, page: &PageHandle, selector: &str) -> Result<String, ActionError> {
        let text = self
            .element(page, selector)
            .await?
            .inner_text()
            .await
            .map_err(|err| action_error(err, Some(selector)))?;
        Ok(text.unwrap_or_default())
    }

    async fn scroll(&self, page: &PageHandle, selector: Option<&str>) -> Result<(), ActionError> {
        match selector {
            Some(selector) => {
                self.element(page, selector)
                    .await?
                    .scroll_into_view()
                    .await
                    .map_err(|err| action_error(err, Some(selector)))?;
            }
            None => {
                self.tab(page)?
                    .evaluate_expression(SCROLL_TO_BOTTOM)
                    .await
                    .map_err(|err| action_error(err, None))?;
            }
        }
        Ok(())
    }

    async fn wait_for(
        &self,
        page: &PageHandle,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ActionError> {
        let tab = self.tab(page)?;
        let timeout = timeout.unwrap_or_else(|| self.config.wait_timeout());
        let probe = invocation(SELECTOR_PROBE, Some(&Value::String(selector.to_string())));
        let appeared = tokio::time::timeout(timeout, async {
            loop {
                let answer = tab
                    .evaluate_expression(probe.as_str())
                    .await
                    .map_err(|err| action_error(err, Some(selector)))?;
                if selector_present(answer.value(), selector)? {
                    return Ok::<(), ActionError>(());
                }
                tokio::time::sleep(WAIT_POLL).await;
            }
        })
        .await;
        appeared.unwrap_or_else(|_| Err(ActionError::WaitTimeout(selector.to_string())))
    }

    async fn release_page(&self, page: &PageHandle) {
        self.close_page(page.id()).await;
    }

    async fn screenshot(&self, page: &PageHandle, full_page: bool) -> Result<Vec<u8>, ActionError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        self.tab(page)?
            .screenshot(params)
            .await
            .map_err(|err| action_error(err, None))
    }
}

async fn discard_tab(page: Page) {
    if let Err(err) = page.close().await {
        debug!(error = %err, "Closing tab failed");
    }
}

/// Read the answer of [`SELECTOR_PROBE`]. Only a missing element keeps a
/// wait polling.
fn selector_present(answer: Option<&Value>, selector: &str) -> Result<bool, ActionError> {
    match answer.and_then(Value::as_str) {
        Some("found") => Ok(true),
        Some("missing") => Ok(false),
        Some(other) => match other.strip_prefix("invalid: ") {
            Some(reason) => Err(ActionError::InvalidSelector(format!("{selector}: {reason}"))),
            None => Err(ActionError::BrowserIo(format!("unexpected probe answer: {other}"))),
        },
        None => Err(ActionError::BrowserIo("selector probe returned nothing".to_string())),
    }
}

fn browser_config(config: &ChromiumConfig) -> Result<BrowserConfig, AdapterError> {
    let executable = config
        .resolve_executable()
        .ok_or(AdapterError::ExecutableMissing)?;
    if !executable.exists() {
        return Err(AdapterError::ExecutableNotFound(executable));
    }

    let mut builder = BrowserConfig::builder()
        .chrome_executable(executable)
        .request_timeout(Duration::from_millis(config.request_timeout_ms))
        .launch_timeout(Duration::from_millis(config.launch_timeout_ms))
        .window_size(config.window_width, config.window_height);

    if !config.headless {
        builder = builder.with_head();
    }
    if config.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(dir) = &config.user_data_dir {
        builder = builder.user_data_dir(dir.clone());
    }

    builder = builder.args(vec![
        "--disable-background-networking",
        "--disable-breakpad",
        "--disable-default-apps",
        "--disable-dev-shm-usage",
        "--disable-extensions",
        "--disable-popup-blocking",
        "--disable-sync",
        "--no-first-run",
        "--no-default-browser-check",
        "--password-store=basic",
        "--use-mock-keychain",
    ]);

    builder.build().map_err(AdapterError::Config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_reported_before_launch() {
        let config = ChromiumConfig::default().with_executable("/definitely/not/here/chrome");
        let err = browser_config(&config).unwrap_err();
        assert!(matches!(err, AdapterError::ExecutableNotFound(_)));
        assert!(err.to_string().contains("/definitely/not/here/chrome"));
    }

    #[test]
    fn only_missing_selectors_keep_waiting() {
        let found = Value::from("found");
        let missing = Value::from("missing");
        let invalid = Value::from("invalid: '#1' is not a valid selector");
        assert!(selector_present(Some(&found), "#a").unwrap());
        assert!(!selector_present(Some(&missing), "#a").unwrap());

        let err = selector_present(Some(&invalid), "#1").unwrap_err();
        assert_eq!(err.kind(), "InvalidSelector");
        assert!(err.to_string().contains("is not a valid selector"));
        assert!(!err.is_retryable());

        assert!(selector_present(None, "#a").is_err());
    }

    #[test]
    fn probe_is_called_with_json_selector() {
        let probe = invocation(SELECTOR_PROBE, Some(&Value::from("a[href=\"x\"]")));
        assert!(probe.ends_with(r#"("a[href=\"x\"]")"#));
    }
}

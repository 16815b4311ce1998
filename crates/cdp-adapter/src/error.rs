use std::path::PathBuf;

use action_primitives::ActionError;
use chromiumoxide::error::CdpError;
use pilot_core_types::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no chromium executable found; set WEBPILOT_CHROME or browser.executable")]
    ExecutableMissing,

    #[error("chrome executable not found at {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("browser config error: {0}")]
    Config(String),

    #[error("failed to launch chromium: {0}")]
    Launch(String),

    #[error(transparent)]
    Cdp(#[from] CdpError),
}

pub(crate) fn page_error(err: CdpError) -> PageError {
    match err {
        CdpError::Timeout => PageError::Io("request timed out".to_string()),
        CdpError::NoResponse => PageError::Closed(err.to_string()),
        other => PageError::Io(other.to_string()),
    }
}

/// Script failures keep transport faults distinguishable from exceptions
/// thrown by the page itself.
pub(crate) fn evaluation_error(err: CdpError) -> PageError {
    match err {
        CdpError::Timeout | CdpError::NoResponse => page_error(err),
        other => PageError::Evaluation(other.to_string()),
    }
}

pub(crate) fn action_error(err: CdpError, selector: Option<&str>) -> ActionError {
    match (err, selector) {
        (CdpError::NotFound, Some(selector)) => ActionError::ElementNotFound(selector.to_string()),
        (CdpError::Timeout, _) => ActionError::BrowserIo("request timed out".to_string()),
        (other, _) => ActionError::BrowserIo(other.to_string()),
    }
}

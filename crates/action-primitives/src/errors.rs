//! Error types for browser actions

use thiserror::Error;

/// Failures raised while validating or performing a browser action
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Action type string outside the closed enumeration
    #[error("unknown action type: {0}")]
    UnknownAction(String),

    /// A required argument is missing or has the wrong shape
    #[error("missing argument '{argument}' for {action}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },

    /// URL scheme rejected by the allow-list
    #[error("disallowed url scheme: {0}")]
    DisallowedScheme(String),

    /// No page is available for an action that operates on one
    #[error("no page available for {0}")]
    NoPage(&'static str),

    /// Navigation timed out waiting for page load
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Target element could not be found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Selector is not valid CSS
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Element exists but cannot be interacted with
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Browser communication or protocol error
    #[error("Browser I/O error: {0}")]
    BrowserIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Short variant name reported as the failure kind of a dispatch
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::UnknownAction(_) => "UnknownAction",
            ActionError::MissingArgument { .. } => "MissingArgument",
            ActionError::DisallowedScheme(_) => "DisallowedScheme",
            ActionError::NoPage(_) => "NoPage",
            ActionError::NavTimeout(_) => "NavTimeout",
            ActionError::WaitTimeout(_) => "WaitTimeout",
            ActionError::ElementNotFound(_) => "ElementNotFound",
            ActionError::InvalidSelector(_) => "InvalidSelector",
            ActionError::NotInteractable(_) => "NotInteractable",
            ActionError::BrowserIo(_) => "BrowserIo",
            ActionError::Internal(_) => "Internal",
        }
    }

    /// Check if retrying the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::NavTimeout(_)
                | ActionError::WaitTimeout(_)
                | ActionError::NotInteractable(_)
                | ActionError::BrowserIo(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_controller_contract() {
        assert_eq!(
            ActionError::UnknownAction("hover".into()).to_string(),
            "unknown action type: hover"
        );
        assert_eq!(
            ActionError::DisallowedScheme("javascript".into()).to_string(),
            "disallowed url scheme: javascript"
        );
        assert_eq!(
            ActionError::MissingArgument {
                action: "fill",
                argument: "text"
            }
            .to_string(),
            "missing argument 'text' for fill"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(ActionError::WaitTimeout("x".into()).is_retryable());
        assert!(!ActionError::ElementNotFound("x".into()).is_retryable());
        assert!(!ActionError::InvalidSelector("#1".into()).is_retryable());
        assert_eq!(ActionError::BrowserIo("x".into()).kind(), "BrowserIo");
    }
}

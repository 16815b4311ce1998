//! Single-action dispatch and bounded batch execution

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pilot_core_types::PageHandle;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::ActionError;
use crate::primitives::{BrowserAction, BrowserActions};
use crate::types::{ActionArgs, ActionKind, ActionOutcome, ActionRequest};
use crate::utils::{normalize_url, sanitize_text, url_scheme};

/// Anything that can perform one [`ActionRequest`].
///
/// `Err` means the dispatch itself blew up; ordinary action failures come
/// back as an `Ok` outcome with `ok == false`.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute_action(&self, request: ActionRequest) -> Result<ActionOutcome, ActionError>;

    /// Drop a page returned by an earlier navigation. No-op by default.
    async fn release_page(&self, _page: &PageHandle) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// URL schemes navigation may use
    pub allowed_schemes: Vec<String>,
    /// Identical actions tolerated in one batch before it is aborted
    pub loop_threshold: usize,
    /// Batch length limit when the caller does not give one
    pub default_max_steps: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            loop_threshold: 3,
            default_max_steps: 50,
        }
    }
}

/// Outcome of [`BrowserController::execute_sequence`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<ActionOutcome>,
}

/// Dispatches actions onto a [`BrowserActions`] backend
pub struct BrowserController<A> {
    actions: Arc<A>,
    config: ControllerConfig,
}

impl<A: BrowserActions> BrowserController<A> {
    pub fn new(actions: Arc<A>) -> Self {
        Self::with_config(actions, ControllerConfig::default())
    }

    pub fn with_config(actions: Arc<A>, config: ControllerConfig) -> Self {
        Self { actions, config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<A> {
        &self.actions
    }

    /// Dispatch an action named by a raw type string
    pub async fn execute_named(
        &self,
        action_type: &str,
        args: ActionArgs,
        page: Option<PageHandle>,
    ) -> ActionOutcome {
        match action_type.parse::<ActionKind>() {
            Ok(kind) => {
                let mut request = ActionRequest::new(kind, args);
                request.page = page;
                self.run(request).await
            }
            Err(err) => {
                warn!(action_type, "Rejected action");
                ActionOutcome::failure(err.to_string())
            }
        }
    }

    /// Run one action; every failure is folded into the outcome
    pub async fn run(&self, request: ActionRequest) -> ActionOutcome {
        let kind = request.kind;
        if let Some(url) = request.arg_str("url") {
            if let Err(err) = self.check_scheme(url) {
                warn!(action = %kind, url, "Rejected url");
                return ActionOutcome::failure(err.to_string());
            }
        }

        match self.dispatch(request).await {
            Ok(outcome) => {
                debug!(action = %kind, "Action completed");
                outcome
            }
            Err(err) => {
                warn!(action = %kind, error = %err, "Action failed");
                ActionOutcome::failure(err.to_string())
            }
        }
    }

    /// Run a batch in order.
    ///
    /// The batch aborts once `max_steps` actions have run while more remain,
    /// or when the same action with the same arguments shows up more than
    /// `loop_threshold` times. A disallowed URL is recorded as a failed
    /// result and the batch moves on.
    pub async fn execute_sequence(
        &self,
        steps: Vec<ActionRequest>,
        max_steps: Option<usize>,
    ) -> SequenceReport {
        let max_steps = max_steps.unwrap_or(self.config.default_max_steps);
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut results = Vec::with_capacity(steps.len());
        let mut current_page: Option<PageHandle> = None;

        info!(steps = steps.len(), max_steps, "Executing action sequence");

        for (executed, mut request) in steps.into_iter().enumerate() {
            if executed >= max_steps {
                return SequenceReport::aborted("max_steps exceeded", results);
            }

            let key = format!(
                "{}:{}",
                request.kind,
                Value::Object(request.args.clone())
            );
            let count = seen.entry(key).or_insert(0);
            *count += 1;
            if *count > self.config.loop_threshold {
                warn!(action = %request.kind, "Repeated action, aborting sequence");
                return SequenceReport::aborted("possible infinite loop detected", results);
            }

            if request.page.is_none() {
                request.page = current_page.clone();
            }
            let outcome = self.run(request).await;
            if let Some(page) = &outcome.page {
                current_page = Some(page.clone());
            }
            results.push(outcome);
        }

        SequenceReport {
            ok: true,
            error: None,
            results,
        }
    }

    fn check_scheme(&self, url: &str) -> Result<(), ActionError> {
        match url_scheme(url) {
            Some(scheme) if !self.config.allowed_schemes.iter().any(|s| *s == scheme) => {
                Err(ActionError::DisallowedScheme(scheme))
            }
            _ => Ok(()),
        }
    }

    async fn dispatch(&self, request: ActionRequest) -> Result<ActionOutcome, ActionError> {
        let action = BrowserAction::from_parts(request.kind, &request.args)?;
        let outcome = match action {
            BrowserAction::Navigate { url } => {
                let url = normalize_url(&url);
                info!(url = %url, "Navigating");
                let page = self.actions.go_to_url(&url).await?;
                ActionOutcome::success(Some(json!("navigated"))).with_page(page)
            }
            BrowserAction::Click { selector } => {
                self.actions.click(page_of(&request)?, &selector).await?;
                ActionOutcome::success(Some(json!("clicked")))
            }
            BrowserAction::Fill { selector, text } => {
                self.actions
                    .fill(page_of(&request)?, &selector, &sanitize_text(&text))
                    .await?;
                ActionOutcome::success(Some(json!("filled")))
            }
            BrowserAction::ExtractText { selector } => {
                let text = self
                    .actions
                    .extract_text(page_of(&request)?, &selector)
                    .await?;
                ActionOutcome::success(Some(Value::String(sanitize_text(&text))))
            }
            BrowserAction::Wait { selector, timeout } => {
                self.actions
                    .wait_for(page_of(&request)?, &selector, timeout)
                    .await?;
                ActionOutcome::success(Some(json!("waited")))
            }
            BrowserAction::Screenshot { full_page } => {
                let bytes = self
                    .actions
                    .screenshot(page_of(&request)?, full_page)
                    .await?;
                ActionOutcome::success(Some(json!({
                    "format": "png",
                    "bytes": bytes.len(),
                })))
                .with_artifact(STANDARD.encode(&bytes))
            }
            BrowserAction::Scroll { selector } => {
                self.actions
                    .scroll(page_of(&request)?, selector.as_deref())
                    .await?;
                ActionOutcome::success(Some(json!("scrolled")))
            }
        };
        Ok(outcome)
    }
}

fn page_of(request: &ActionRequest) -> Result<&PageHandle, ActionError> {
    request
        .page
        .as_ref()
        .ok_or(ActionError::NoPage(request.kind.as_str()))
}

impl SequenceReport {
    fn aborted(reason: &str, results: Vec<ActionOutcome>) -> Self {
        Self {
            ok: false,
            error: Some(reason.to_string()),
            results,
        }
    }
}

#[async_trait]
impl<A: BrowserActions + 'static> ActionExecutor for BrowserController<A> {
    async fn execute_action(&self, request: ActionRequest) -> Result<ActionOutcome, ActionError> {
        Ok(self.run(request).await)
    }

    async fn release_page(&self, page: &PageHandle) {
        debug!(page = %page.id(), "Releasing page");
        self.actions.release_page(page).await;
    }
}

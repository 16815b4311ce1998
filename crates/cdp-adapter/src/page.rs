use std::fmt;

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use pilot_core_types::{BrowserPage, PageError, PageId};
use serde_json::Value;

use crate::error::{evaluation_error, page_error};

/// One Chromium tab seen through the [`BrowserPage`] capability.
#[derive(Clone)]
pub struct ChromiumPage {
    id: PageId,
    page: Page,
}

impl ChromiumPage {
    pub(crate) fn new(id: PageId, page: Page) -> Self {
        Self { id, page }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }
}

impl fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumPage").field("id", &self.id).finish()
    }
}

/// Call expression applying `script` to the JSON-encoded `arg`.
pub(crate) fn invocation(script: &str, arg: Option<&Value>) -> String {
    let arg = arg.map(Value::to_string).unwrap_or_default();
    format!("({script})({arg})")
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    fn id(&self) -> &PageId {
        &self.id
    }

    async fn url(&self) -> Result<String, PageError> {
        let url = self.page.url().await.map_err(page_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> Result<String, PageError> {
        let title = self.page.get_title().await.map_err(page_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<Value, PageError> {
        let params = EvaluateParams::builder()
            .expression(invocation(script, arg.as_ref()))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(PageError::Evaluation)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(evaluation_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

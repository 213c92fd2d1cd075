//! Session attached to a single page target.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::client::Transport;
use super::error::CdpError;

/// A flattened CDP session on one page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    transport: Arc<Transport>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Arc<Transport>) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .send(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the domains whose events drive the recorder: page lifecycle,
    /// runtime bindings and document requests.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Expose `window.<name>(payload)` to the page. Calls surface as
    /// `Runtime.bindingCalled` events and survive navigations.
    pub async fn add_binding(&self, name: &str) -> Result<(), CdpError> {
        self.call("Runtime.addBinding", Some(json!({"name": name})))
            .await?;
        Ok(())
    }

    /// Run `source` in every document this page loads from now on.
    pub async fn add_script_on_new_document(&self, source: &str) -> Result<String, CdpError> {
        let result = self
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({"source": source})),
            )
            .await?;
        Ok(result["identifier"].as_str().unwrap_or_default().to_string())
    }

    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        evaluation_value(result)
    }

    /// Start a navigation. Completion is observed through page events.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            // Network failures are reported again as Network.loadingFailed.
            debug!("Navigation to {} reported {}", url, error);
        }

        debug!("Navigating to {}", url);
        Ok(result["frameId"].as_str().unwrap_or("main").to_string())
    }

    pub async fn current_url(&self) -> Result<String, CdpError> {
        let value = self.evaluate("window.location.href").await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("location.href is not a string".to_string()))
    }

    /// Main frame id of the page.
    pub async fn main_frame_id(&self) -> Result<String, CdpError> {
        let tree = self.call("Page.getFrameTree", None).await?;
        tree["frameTree"]["frame"]["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing frame id".to_string()))
    }
}

/// Extract the by-value result of `Runtime.evaluate`, turning a thrown
/// exception into [`CdpError::JavaScript`].
fn evaluation_value(result: Value) -> Result<Value, CdpError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let text = exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error");
        return Err(CdpError::JavaScript(text.to_string()));
    }

    Ok(result["result"]["value"].clone())
}

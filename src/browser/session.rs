use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::browser::driver::{CollectionQuery, PageDriver, RenderedItem};
use crate::error::DriverError;

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Navigate { url: String },
    Type { selector: String, value: String },
    Click { selector: String },
    ClickText { selector: String, text: String },
    SetChecked { selector: String, checked: bool },
    Select { selector: String, value: String },
    Wait { duration_ms: u64 },
    CurrentUrl,
    Title,
    PageText,
    QueryText { selector: String },
    QueryTextNear { within: String, anchor: String },
    QueryVisible { selector: String },
    QueryCount { selector: String },
    QueryValue { selector: String },
    QueryChecked { selector: String },
    QueryAttribute { selector: String, name: String },
    CollectItems { query: CollectionQuery },
    ActivateItem { query: CollectionQuery, index: usize },
    Quit,
}

impl BrowserRequest {
    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::Type { .. } => "type",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::ClickText { .. } => "click_text",
            BrowserRequest::SetChecked { .. } => "set_checked",
            BrowserRequest::Select { .. } => "select",
            BrowserRequest::Wait { .. } => "wait",
            BrowserRequest::CurrentUrl => "current_url",
            BrowserRequest::Title => "title",
            BrowserRequest::PageText => "page_text",
            BrowserRequest::QueryText { .. } => "query_text",
            BrowserRequest::QueryTextNear { .. } => "query_text_near",
            BrowserRequest::QueryVisible { .. } => "query_visible",
            BrowserRequest::QueryCount { .. } => "query_count",
            BrowserRequest::QueryValue { .. } => "query_value",
            BrowserRequest::QueryChecked { .. } => "query_checked",
            BrowserRequest::QueryAttribute { .. } => "query_attribute",
            BrowserRequest::CollectItems { .. } => "collect_items",
            BrowserRequest::ActivateItem { .. } => "activate_item",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub items: Option<Vec<RenderedItem>>,
}

impl BrowserResponse {
    /// Turn an `ok: false` response into a protocol error.
    pub fn into_result(self, command: &str) -> Result<Self, DriverError> {
        if self.ok {
            Ok(self)
        } else {
            Err(DriverError::SessionProtocol {
                command: command.into(),
                error: self.error.unwrap_or_else(|| "Unknown error".into()),
            })
        }
    }
}

/// Launch settings for the Node.js browser server.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserOptions {
    /// Path to browser_server.js
    pub server_script: String,

    /// Run Chromium without a window
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            server_script: "node/browser_server.js".to_string(),
            headless: true,
        }
    }
}

/// A persistent browser session backed by browser_server.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the server script.
    pub fn launch(options: &BrowserOptions) -> Result<Self, DriverError> {
        let mut command = Command::new("node");
        command
            .arg(&options.server_script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if !options.headless {
            command.env("BROWSER_HEADED", "1");
        }

        let mut child = command.spawn().map_err(|e| DriverError::SubprocessSpawn {
            script: options.server_script.clone(),
            source: e,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            DriverError::SessionIO("Failed to capture stdin of browser server".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DriverError::SessionIO("Failed to capture stdout of browser server".into())
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| DriverError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
                context: "browser server ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(DriverError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from browser server".into(),
            });
        }

        debug!(script = %options.server_script, "browser session ready");

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            closed: false,
        })
    }

    /// Send a request and read the raw response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let json = serde_json::to_string(request).map_err(|e| DriverError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        debug!(cmd = request.name(), "-> browser");

        writeln!(self.stdin, "{}", json).map_err(|e| {
            DriverError::SessionIO(format!("Failed to write to browser server stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            DriverError::SessionIO(format!("Failed to flush browser server stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            DriverError::SessionIO(format!("Failed to read from browser server stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(DriverError::SessionIO(
                "Empty response from browser server (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
            context: format!("response to {}", request.name()),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let name = request.name();
        self.send(&request)?.into_result(name)
    }
}

fn missing(command: &str, field: &str) -> DriverError {
    DriverError::SessionProtocol {
        command: command.into(),
        error: format!("No {} in response", field),
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::Navigate { url: url.to_string() })?;
        Ok(())
    }

    fn type_text(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::Type {
            selector: selector.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::Click {
            selector: selector.to_string(),
        })?;
        Ok(())
    }

    fn click_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::ClickText {
            selector: selector.to_string(),
            text: text.to_string(),
        })?;
        Ok(())
    }

    fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::SetChecked {
            selector: selector.to_string(),
            checked,
        })?;
        Ok(())
    }

    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::Select {
            selector: selector.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn wait_idle(&mut self, ms: u64) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::Wait { duration_ms: ms })?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        let response = self.send_ok(BrowserRequest::CurrentUrl)?;
        response.url.ok_or_else(|| missing("current_url", "url"))
    }

    fn title(&mut self) -> Result<String, DriverError> {
        let response = self.send_ok(BrowserRequest::Title)?;
        response.title.ok_or_else(|| missing("title", "title"))
    }

    fn page_text(&mut self) -> Result<String, DriverError> {
        let response = self.send_ok(BrowserRequest::PageText)?;
        Ok(response.text.unwrap_or_default())
    }

    fn query_text(&mut self, selector: &str) -> Result<Option<String>, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryText {
            selector: selector.to_string(),
        })?;
        Ok(response.text)
    }

    fn query_text_near(
        &mut self,
        within: &str,
        anchor: &str,
    ) -> Result<Option<String>, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryTextNear {
            within: within.to_string(),
            anchor: anchor.to_string(),
        })?;
        Ok(response.text)
    }

    fn query_visible(&mut self, selector: &str) -> Result<bool, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryVisible {
            selector: selector.to_string(),
        })?;
        Ok(response.visible.unwrap_or(false))
    }

    fn query_count(&mut self, selector: &str) -> Result<u32, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryCount {
            selector: selector.to_string(),
        })?;
        Ok(response.count.unwrap_or(0))
    }

    fn query_value(&mut self, selector: &str) -> Result<Option<String>, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryValue {
            selector: selector.to_string(),
        })?;
        Ok(response.value)
    }

    fn query_checked(&mut self, selector: &str) -> Result<Option<bool>, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryChecked {
            selector: selector.to_string(),
        })?;
        Ok(response.checked)
    }

    fn query_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let response = self.send_ok(BrowserRequest::QueryAttribute {
            selector: selector.to_string(),
            name: name.to_string(),
        })?;
        Ok(response.value)
    }

    fn collect_items(&mut self, query: &CollectionQuery) -> Result<Vec<RenderedItem>, DriverError> {
        let response = self.send_ok(BrowserRequest::CollectItems {
            query: query.clone(),
        })?;
        Ok(response.items.unwrap_or_default())
    }

    fn activate_item(
        &mut self,
        query: &CollectionQuery,
        item: &RenderedItem,
    ) -> Result<(), DriverError> {
        self.send_ok(BrowserRequest::ActivateItem {
            query: query.clone(),
            index: item.index,
        })?;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        if let Err(e) = self.send(&BrowserRequest::Quit) {
            warn!(error = %e, "browser server did not acknowledge quit");
        }
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

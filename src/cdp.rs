use anyhow::{Context, Result, anyhow};
use chromiumoxide::cdp::browser_protocol::target::GetBrowserContextsParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::{BrowserHandle, PageHandle};
use crate::errors::PairwatchError;

/// Quiescence parameters for the network-idle wait
#[derive(Debug, Clone)]
pub struct NetworkIdleConfig {
    /// How long the network must stay quiet to count as idle
    pub window: Duration,
    /// Upper bound on the whole wait
    pub timeout: Duration,
}

impl Default for NetworkIdleConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct JsonVersion {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// Resolve the browser-level WebSocket URL from the HTTP debugging endpoint
async fn discover_ws_url(host: &str, port: u16) -> Result<String> {
    let url = format!("http://{host}:{port}/json/version");
    debug!("Requesting browser version info from {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client.get(&url).send().await.map_err(|e| {
        PairwatchError::CdpConnection(format!(
            "cannot reach remote debugging endpoint {url}: {e}"
        ))
    })?;

    if !response.status().is_success() {
        return Err(PairwatchError::CdpConnection(format!(
            "{url} returned {}",
            response.status()
        ))
        .into());
    }

    let body: JsonVersion = response.json().await.map_err(|e| {
        PairwatchError::CdpConnection(format!("malformed /json/version response: {e}"))
    })?;
    Ok(body.web_socket_debugger_url)
}

/// A live connection to one externally-managed browser process.
///
/// Owns the CDP client and the task that drives its event stream.
/// Disconnecting releases both without touching the browser process
/// itself.
pub struct CdpConnection {
    browser: Browser,
    handler_task: JoinHandle<()>,
    idle: NetworkIdleConfig,
}

impl CdpConnection {
    /// Connect to a browser exposing its remote debugging endpoint at
    /// `http://<host>:<port>`
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with(host, port, NetworkIdleConfig::default()).await
    }

    pub async fn connect_with(host: &str, port: u16, idle: NetworkIdleConfig) -> Result<Self> {
        let ws_url = discover_ws_url(host, port).await?;
        info!("Connecting to browser at {}", ws_url);

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| PairwatchError::CdpConnection(format!("WebSocket handshake: {e}")))?;

        // The handler stream must be polled for the connection to make
        // progress; it ends when the connection drops
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("CDP handler finished: {}", err);
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            idle,
        })
    }

    /// Release the connection: drop the CDP client and stop its event
    /// task. The underlying browser process is left untouched.
    pub async fn disconnect(self) {
        drop(self.browser);
        self.handler_task.abort();
        let _ = self.handler_task.await;
        info!("Disconnected from browser");
    }
}

impl BrowserHandle for CdpConnection {
    type Page = CdpPage;

    async fn context_count(&self) -> Result<usize> {
        // Target.getBrowserContexts only enumerates contexts created over
        // the protocol; the default context exists whenever the browser
        // answered the handshake, so count it unconditionally
        let response = self
            .browser
            .execute(GetBrowserContextsParams::default())
            .await
            .context("Failed to query browsing contexts")?;
        Ok(1 + response.result.browser_context_ids.len())
    }

    async fn pages(&self) -> Result<Vec<CdpPage>> {
        let pages = self
            .browser
            .pages()
            .await
            .context("Failed to enumerate open pages")?;
        Ok(pages
            .into_iter()
            .map(|page| CdpPage {
                page,
                idle: self.idle.clone(),
            })
            .collect())
    }
}

/// One tab of the connected browser
pub struct CdpPage {
    page: Page,
    idle: NetworkIdleConfig,
}

impl CdpPage {
    async fn evaluate_value(&self, expression: String) -> Result<Value> {
        let result = self.page.evaluate(expression).await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

/// Counts in-flight fetch/XHR requests so idleness can be observed
/// without a CDP network domain subscription
const INSTALL_REQUEST_COUNTER_JS: &str = r#"
    (() => {
        if (window.__pairwatch_pending === undefined) {
            window.__pairwatch_pending = 0;

            const originalFetch = window.fetch;
            window.fetch = function(...args) {
                window.__pairwatch_pending++;
                return originalFetch.apply(this, args).finally(() => {
                    window.__pairwatch_pending--;
                });
            };

            const originalOpen = XMLHttpRequest.prototype.open;
            const originalSend = XMLHttpRequest.prototype.send;
            XMLHttpRequest.prototype.open = function(...args) {
                this.__pairwatch_tracked = true;
                return originalOpen.apply(this, args);
            };
            XMLHttpRequest.prototype.send = function(...args) {
                if (this.__pairwatch_tracked) {
                    window.__pairwatch_pending++;
                    this.addEventListener('loadend', () => {
                        window.__pairwatch_pending--;
                    });
                }
                return originalSend.apply(this, args);
            };
        }
        return window.__pairwatch_pending;
    })()
"#;

impl PageHandle for CdpPage {
    async fn url(&self) -> Result<String> {
        self.page
            .url()
            .await?
            .ok_or_else(|| anyhow!("page did not report a URL"))
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {url}"))?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.page.reload().await.context("Failed to reload page")?;
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        let start = std::time::Instant::now();

        let _ = self
            .evaluate_value(INSTALL_REQUEST_COUNTER_JS.to_string())
            .await;

        let mut idle_since: Option<std::time::Instant> = None;
        loop {
            let pending = self
                .evaluate_value("window.__pairwatch_pending || 0".to_string())
                .await
                .ok()
                .and_then(|v| v.as_i64())
                .unwrap_or(0);

            if pending == 0 {
                match idle_since {
                    Some(since) if since.elapsed() >= self.idle.window => return Ok(()),
                    None => idle_since = Some(std::time::Instant::now()),
                    _ => {}
                }
            } else {
                idle_since = None;
            }

            if start.elapsed() > self.idle.timeout {
                anyhow::bail!(
                    "network did not become idle within {:?} ({} request(s) pending)",
                    self.idle.timeout,
                    pending
                );
            }

            sleep(Duration::from_millis(50)).await;
        }
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        let quoted = serde_json::to_string(selector)?;
        let expression = format!(
            "(() => {{ const el = document.querySelector({quoted}); \
             return el ? el.innerText : null; }})()"
        );
        let value = self.evaluate_value(expression).await?;
        let text: Option<String> = serde_json::from_value(value)?;
        text.ok_or_else(|| anyhow!("no element matches selector '{selector}'"))
    }
}

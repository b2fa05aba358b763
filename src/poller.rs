use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::PageHandle;
use crate::sink::Sink;
use crate::types::Snapshot;

/// Settings for the content poll loop
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between ticks; no backoff, no jitter
    pub interval: Duration,
    /// CSS selector the visible text is extracted from
    pub selector: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            selector: "body".to_string(),
        }
    }
}

/// Poll the page's visible text forever, emitting each snapshot to the sink.
///
/// Extraction and sink failures are reported and swallowed; the loop
/// prioritizes availability of the latest snapshot over error propagation,
/// so a persistently broken page shows up as a stream of warnings, never as
/// termination. The page is never re-located here.
///
/// Snapshots are strictly serialized: tick N+1 does not start extracting
/// until tick N's sink call has finished, so a slow sink throttles the
/// effective rate.
///
/// The only exit is the shutdown signal, honored at the next suspension
/// point; the function then returns `Ok(())` so the caller can release the
/// browser connection.
pub async fn poll<P: PageHandle, S: Sink>(
    page: &P,
    sink: &mut S,
    config: &PollerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    info!(
        "Polling '{}' text every {:?}",
        config.selector, config.interval
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        match page.inner_text(&config.selector).await {
            Ok(text) => {
                let snapshot = Snapshot::new(text);
                debug!("Captured {} bytes", snapshot.text.len());
                if let Err(err) = sink.emit(&snapshot).await {
                    warn!("Sink error (snapshot dropped): {:#}", err);
                }
            }
            Err(err) => {
                warn!("Scraping error: {:#}", err);
            }
        }

        tokio::select! {
            _ = sleep(config.interval) => {}
            _ = shutdown.wait_for(|stop| *stop) => break,
        }
    }

    info!("Shutdown requested; stopping poll loop");
    Ok(())
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;

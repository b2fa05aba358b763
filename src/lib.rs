//! # pairwatch
#![allow(clippy::uninlined_format_args)]
//!
//! Attach to a running Chrome over its remote debugging endpoint and
//! continuously capture a page's visible text.
//!
//! The browser is treated as an externally-managed collaborator: it may
//! already be running, may have zero or many open tabs, and may be showing
//! the wrong URL. pairwatch deterministically locates (or forces) the
//! right page, then polls its body text on a fixed cadence forever,
//! appending every snapshot to a log. A second, offline pass scans the
//! accumulated log for the four-line listing pattern and writes CSV.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Attach to a Chrome started with --remote-debugging-port=9223 and
//! # capture the target page every 5 seconds
//! pairwatch watch --url "https://gmgn.ai/new-pair?chain=sol" --port 9223
//!
//! # Launch a dedicated instance first (temporary profile), then watch
//! pairwatch watch --launch --interval 2.5 --log ./data/data.txt
//!
//! # Recover the fixed-shape records from the accumulated log
//! pairwatch extract --input ./data/data.txt --output ./data/extracted_data.csv
//! ```
//!
//! Fatal errors (no browsing context, no page within the discovery
//! timeout, failed forced navigation) abort before polling starts with a
//! distinct exit code. Once polling is running, extraction and sink
//! failures are reported as warnings and never stop the loop; the only way
//! out is Ctrl-C, which releases the connection at the next tick.
//!
//! ## Library Usage
//!
//! ```no_run
//! use pairwatch::{CdpConnection, ConsoleSink, LocatorConfig, PollerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection = CdpConnection::connect("127.0.0.1", 9223).await?;
//!
//! let located = pairwatch::locate(
//!     &connection,
//!     &LocatorConfig::new("https://gmgn.ai/new-pair?chain=sol"),
//! )
//! .await?;
//!
//! let (_shutdown, rx) = tokio::sync::watch::channel(false);
//! let mut sink = ConsoleSink::new();
//! pairwatch::poll(&located.page, &mut sink, &PollerConfig::default(), rx).await?;
//!
//! connection.disconnect().await;
//! # Ok(())
//! # }
//! ```

/// Traits the locator and poller are written against
pub mod browser;

/// Chrome DevTools Protocol connection and page adapter
pub mod cdp;

/// Error types with process exit codes
pub mod errors;

/// Offline log-to-CSV extraction pass
pub mod extract;

/// Launching a dedicated Chrome instance with remote debugging
pub mod launcher;

/// Session locator: page discovery, selection, and forced navigation
pub mod locator;

/// Content poller: the infinite, self-healing snapshot loop
pub mod poller;

/// Snapshot sinks: console, append-only log file, tee
pub mod sink;

/// Core data types
pub mod types;

pub use browser::{BrowserHandle, PageHandle};
pub use cdp::{CdpConnection, CdpPage, NetworkIdleConfig};
pub use errors::PairwatchError;
pub use extract::{extract_to_csv, parse_records};
pub use launcher::ChromeLauncher;
pub use locator::{Located, LocatorConfig, locate};
pub use poller::{PollerConfig, poll};
pub use sink::{ConsoleSink, FileSink, Sink, Tee};
pub use types::{PairRecord, Snapshot};

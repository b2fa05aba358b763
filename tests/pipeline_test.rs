// End-to-end locate -> poll -> extract over fake browser handles

use anyhow::{Result, anyhow};
use pairwatch::{
    BrowserHandle, LocatorConfig, PageHandle, PollerConfig, Sink, Snapshot, locate,
    parse_records, poll,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const TARGET: &str = "https://gmgn.ai/new-pair?chain=sol";

#[derive(Clone)]
struct ScriptedPage {
    url: Arc<Mutex<String>>,
    texts: Arc<Mutex<Vec<Result<String, String>>>>,
    extractions: Arc<AtomicUsize>,
}

impl ScriptedPage {
    fn new(url: &str, texts: Vec<Result<String, String>>) -> Self {
        Self {
            url: Arc::new(Mutex::new(url.to_string())),
            texts: Arc::new(Mutex::new(texts)),
            extractions: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PageHandle for ScriptedPage {
    async fn url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        Ok(())
    }

    async fn inner_text(&self, _selector: &str) -> Result<String> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        let mut texts = self.texts.lock().unwrap();
        let next = if texts.len() > 1 {
            texts.remove(0)
        } else {
            texts[0].clone()
        };
        next.map_err(|msg| anyhow!(msg))
    }
}

struct ScriptedBrowser {
    ticks: Mutex<Vec<Vec<ScriptedPage>>>,
}

impl BrowserHandle for ScriptedBrowser {
    type Page = ScriptedPage;

    async fn context_count(&self) -> Result<usize> {
        Ok(1)
    }

    async fn pages(&self) -> Result<Vec<ScriptedPage>> {
        let mut ticks = self.ticks.lock().unwrap();
        if ticks.len() > 1 {
            Ok(ticks.remove(0))
        } else {
            Ok(ticks[0].clone())
        }
    }
}

/// Accumulates snapshot text the way the log file would
struct LogSink {
    log: Arc<Mutex<String>>,
    emitted: mpsc::UnboundedSender<()>,
}

impl Sink for LogSink {
    async fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.push_str(&snapshot.text);
        log.push('\n');
        let _ = self.emitted.send(());
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_locate_poll_extract_pipeline() {
    // The target page shows up on the third discovery tick; extraction
    // fails twice before the page settles
    let listing = "Buy\n12:00\nSo1anaAddr...9f2k\n45%";
    let page = ScriptedPage::new(
        TARGET,
        vec![
            Err("Execution context was destroyed".to_string()),
            Err("Execution context was destroyed".to_string()),
            Ok(listing.to_string()),
        ],
    );
    let browser = ScriptedBrowser {
        ticks: Mutex::new(vec![vec![], vec![], vec![page.clone()]]),
    };

    let located = locate(&browser, &LocatorConfig::new(TARGET)).await.unwrap();
    assert!(located.matched_target);

    let log = Arc::new(Mutex::new(String::new()));
    let (tx, mut emitted) = mpsc::unbounded_channel();
    let sink = LogSink {
        log: Arc::clone(&log),
        emitted: tx,
    };
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poll_page = located.page;
    let task = tokio::spawn(async move {
        let mut sink = sink;
        let config = PollerConfig {
            interval: Duration::from_secs(1),
            ..PollerConfig::default()
        };
        poll(&poll_page, &mut sink, &config, shutdown_rx).await
    });

    emitted.recv().await.unwrap();
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    assert!(page.extractions.load(Ordering::SeqCst) >= 3);

    let records = parse_records(&log.lock().unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].time, "12:00");
    assert_eq!(records[0].address, "So1anaAddr");
    assert_eq!(records[0].top10, "45%");
}

#[tokio::test(start_paused = true)]
async fn test_adopted_page_is_navigated_before_polling() {
    let page = ScriptedPage::new("about:blank", vec![Ok("quiet".to_string())]);
    let browser = ScriptedBrowser {
        ticks: Mutex::new(vec![vec![page.clone()]]),
    };

    let located = locate(&browser, &LocatorConfig::new(TARGET)).await.unwrap();

    assert!(!located.matched_target);
    assert_eq!(located.page.url().await.unwrap(), TARGET);
}

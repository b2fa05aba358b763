use anyhow::Result;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::browser::{BrowserHandle, PageHandle};
use crate::errors::PairwatchError;

/// Settings for page discovery and selection
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Full target URL; also the substring open-tab URLs are matched against
    pub target_url: String,
    /// How long to keep polling for an open page before giving up
    pub discovery_timeout: Duration,
    /// Delay between discovery polls
    pub discovery_interval: Duration,
}

impl LocatorConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            discovery_timeout: Duration::from_secs(30),
            discovery_interval: Duration::from_secs(1),
        }
    }
}

/// The page the locator settled on
#[derive(Debug)]
pub struct Located<P> {
    pub page: P,
    /// Whether the selected page was already on the target URL.
    /// When false, the locator fell back to the first enumerated page
    /// and forced navigation before returning.
    pub matched_target: bool,
}

/// Locate the page to scrape within an already-connected browser.
///
/// Discovery tolerates zero-to-many open tabs: pages are polled for at a
/// fixed interval until at least one exists (any page ends discovery, not
/// just a matching one). Selection picks the first page whose URL contains
/// the target URL, falling back to the first page in enumeration order.
/// A fallback page is navigated to the target, with exactly one
/// reload retry, before it is returned.
///
/// Selection is stable once made; callers must not expect the locator to
/// re-evaluate it mid-run.
pub async fn locate<B: BrowserHandle>(
    browser: &B,
    config: &LocatorConfig,
) -> Result<Located<B::Page>> {
    if browser.context_count().await? == 0 {
        return Err(PairwatchError::NoBrowsingContext.into());
    }

    let pages = discover_pages(browser, config).await?;

    let mut urls = Vec::with_capacity(pages.len());
    for page in &pages {
        let url = page.url().await?;
        info!("Found page: {}", url);
        urls.push(url);
    }

    // First match in enumeration order wins; otherwise fall back to the
    // first available page, whatever it is showing
    let matched_index = urls.iter().position(|u| u.contains(&config.target_url));
    let matched_target = matched_index.is_some();
    let page = pages
        .into_iter()
        .nth(matched_index.unwrap_or(0))
        .expect("discovery returned at least one page");

    if !matched_target {
        warn!("No open page matches the target URL; adopting the first available page");
        force_navigation(&page, &config.target_url).await?;
        info!("Navigation complete");
    }

    Ok(Located {
        page,
        matched_target,
    })
}

/// Poll until at least one page is open, or the discovery timeout elapses
async fn discover_pages<B: BrowserHandle>(
    browser: &B,
    config: &LocatorConfig,
) -> Result<Vec<B::Page>> {
    let deadline = Instant::now() + config.discovery_timeout;
    loop {
        let pages = browser.pages().await?;
        if !pages.is_empty() {
            return Ok(pages);
        }
        if Instant::now() + config.discovery_interval > deadline {
            return Err(PairwatchError::NoPageFound {
                timeout: config.discovery_timeout,
            }
            .into());
        }
        debug!("No pages found yet; waiting for a page to open...");
        sleep(config.discovery_interval).await;
    }
}

/// Drive an adopted page to the target URL.
///
/// One navigation attempt; on failure exactly one reload, each followed by
/// a network-idle wait. A second failure is fatal for the run: polling a
/// page known to be on the wrong content is worse than aborting.
async fn force_navigation<P: PageHandle>(page: &P, target_url: &str) -> Result<()> {
    info!("Navigating to {}", target_url);

    let nav_err = match navigate_and_settle(page, target_url).await {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    warn!("Navigation error: {:#}; retrying with a reload", nav_err);

    if let Err(reload_err) = reload_and_settle(page).await {
        return Err(PairwatchError::Navigation(format!(
            "goto failed ({nav_err:#}); reload failed ({reload_err:#})"
        ))
        .into());
    }
    Ok(())
}

async fn navigate_and_settle<P: PageHandle>(page: &P, url: &str) -> Result<()> {
    page.goto(url).await?;
    page.wait_for_network_idle().await
}

async fn reload_and_settle<P: PageHandle>(page: &P) -> Result<()> {
    page.reload().await?;
    page.wait_for_network_idle().await
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;

use anyhow::Result;

/// A connection to one externally-managed browser process.
///
/// The locator only needs to count browsing contexts and enumerate open
/// pages; everything else happens through the selected [`PageHandle`].
/// Production code plugs in the CDP adapter, tests plug in fakes.
#[allow(async_fn_in_trait)]
pub trait BrowserHandle {
    type Page: PageHandle;

    /// Number of browsing contexts the connection exposes
    async fn context_count(&self) -> Result<usize>;

    /// All currently open pages, in the browser's enumeration order
    async fn pages(&self) -> Result<Vec<Self::Page>>;
}

/// One tab/document within the connected browser
#[allow(async_fn_in_trait)]
pub trait PageHandle {
    /// Current URL of the page
    async fn url(&self) -> Result<String>;

    /// Navigate to the given URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reload the current document
    async fn reload(&self) -> Result<()>;

    /// Suspend until no new network activity has started for the
    /// quiescence window, or fail once the wait times out
    async fn wait_for_network_idle(&self) -> Result<()>;

    /// Visible text of the first element matching `selector`
    async fn inner_text(&self, selector: &str) -> Result<String>;
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Launches a dedicated Chrome instance with remote debugging enabled.
///
/// The launched process is deliberately not managed beyond startup: the
/// watcher owns a connection to the browser, never the browser itself, so
/// exiting leaves the instance running.
#[derive(Debug, Default)]
pub struct ChromeLauncher {
    /// Explicit path to the Chrome executable; auto-detected when `None`
    pub chrome_path: Option<PathBuf>,
    /// Profile directory; a fresh temporary directory when `None`
    pub user_data_dir: Option<PathBuf>,
}

/// A Chrome instance spawned by [`ChromeLauncher`]
pub struct LaunchedBrowser {
    child: Child,
    /// Profile directory the instance runs against
    pub user_data_dir: PathBuf,
}

impl LaunchedBrowser {
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl ChromeLauncher {
    /// Spawn Chrome with remote debugging on `port`, opening `startup_url`
    pub fn launch(&self, port: u16, startup_url: &str) -> Result<LaunchedBrowser> {
        anyhow::ensure!(
            !is_port_in_use(port),
            "port {} is already in use; attach without --launch or pick another port",
            port
        );

        let chrome = match &self.chrome_path {
            Some(path) => path.clone(),
            None => detect_chrome().context(
                "Chrome not found. Install Google Chrome or Chromium, \
                 or pass --chrome-path",
            )?,
        };

        let user_data_dir = match &self.user_data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create user data directory {}", dir.display())
                })?;
                dir.clone()
            }
            None => {
                let temp_dir = tempfile::Builder::new()
                    .prefix("pairwatch-profile-")
                    .tempdir()?;
                #[allow(deprecated)]
                temp_dir.into_path() // The profile must outlive this process
            }
        };

        info!(
            "Launching {} with remote debugging on port {}",
            chrome.display(),
            port
        );

        let child = Command::new(&chrome)
            .arg(format!("--remote-debugging-port={port}"))
            .arg(format!("--user-data-dir={}", user_data_dir.display()))
            .arg(startup_url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {}", chrome.display()))?;

        Ok(LaunchedBrowser {
            child,
            user_data_dir,
        })
    }
}

/// Find a Chrome/Chromium binary on this system
pub fn detect_chrome() -> Option<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(windows) {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ]
    };

    for candidate in candidates {
        let path = Path::new(candidate);
        if path.is_absolute() {
            if path.exists() {
                return Some(path.to_path_buf());
            }
        } else if command_exists(candidate) {
            return Some(path.to_path_buf());
        }
    }
    None
}

/// Check if a command exists in PATH
pub fn command_exists(command: &str) -> bool {
    #[cfg(unix)]
    {
        Command::new("which")
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[cfg(windows)]
    {
        Command::new("where")
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Check if a port is in use
pub fn is_port_in_use(port: u16) -> bool {
    std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
}

/// Check whether the remote debugging endpoint answers
pub async fn endpoint_ready(host: &str, port: u16) -> bool {
    let url = format!("http://{host}:{port}/json/version");

    match reqwest::Client::new()
        .get(&url)
        .timeout(Duration::from_secs(1))
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Poll the debugging endpoint until it answers or `timeout` elapses.
///
/// A freshly launched Chrome takes a few seconds to bring the endpoint up.
pub async fn wait_for_endpoint(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let attempts = (timeout.as_millis() / 200).max(1);
    for attempt in 1..=attempts {
        if endpoint_ready(host, port).await {
            info!("Remote debugging endpoint ready on port {}", port);
            return Ok(());
        }
        debug!("Endpoint not ready yet (attempt {}/{})", attempt, attempts);
        if attempt < attempts {
            sleep(Duration::from_millis(200)).await;
        }
    }
    anyhow::bail!(
        "remote debugging endpoint http://{host}:{port} did not come up within {timeout:?}"
    )
}

#[cfg(test)]
#[path = "launcher_test.rs"]
mod launcher_test;

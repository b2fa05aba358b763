use std::fmt;
use std::time::Duration;

/// Custom error type that includes exit codes
#[derive(Debug)]
pub enum PairwatchError {
    /// Connection exposes no browsing context at all (exit code 2)
    NoBrowsingContext,
    /// Discovery timeout elapsed with zero open pages (exit code 3)
    NoPageFound { timeout: Duration },
    /// Forced navigation and its single reload fallback both failed (exit code 4)
    Navigation(String),
    /// Remote debugging endpoint unreachable or handshake failed (exit code 5)
    CdpConnection(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl PairwatchError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PairwatchError::NoBrowsingContext => 2,
            PairwatchError::NoPageFound { .. } => 3,
            PairwatchError::Navigation(_) => 4,
            PairwatchError::CdpConnection(_) => 5,
            PairwatchError::Other(_) => 1,
        }
    }
}

impl fmt::Display for PairwatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairwatchError::NoBrowsingContext => {
                write!(f, "No browsing context available in the connected browser")
            }
            PairwatchError::NoPageFound { timeout } => {
                write!(f, "No page appeared in the browser within {:?}", timeout)
            }
            PairwatchError::Navigation(msg) => {
                write!(f, "Navigation to the target URL failed: {}", msg)
            }
            PairwatchError::CdpConnection(msg) => {
                write!(f, "CDP connection failed: {}", msg)
            }
            PairwatchError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PairwatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PairwatchError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PairwatchError {
    fn from(err: anyhow::Error) -> Self {
        // The locator and CDP layer construct typed errors; unwrap them first
        match err.downcast::<PairwatchError>() {
            Ok(typed) => typed,
            Err(err) => {
                // Fall back to detecting the error kind from the message
                let msg = err.to_string();

                if msg.contains("No browsing context") {
                    PairwatchError::NoBrowsingContext
                } else if msg.contains("CDP") || msg.contains("remote debugging") {
                    PairwatchError::CdpConnection(msg)
                } else if msg.contains("Navigation") || msg.contains("navigation") {
                    PairwatchError::Navigation(msg)
                } else {
                    PairwatchError::Other(err)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;

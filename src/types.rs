use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One extracted copy of a page's visible text at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The page body's visible text
    pub text: String,
    /// Wall-clock time the text was extracted
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(text: String) -> Self {
        Self {
            text,
            captured_at: Utc::now(),
        }
    }
}

/// One fixed-shape record recovered from the accumulated log
///
/// Serialized field names match the CSV headers the downstream
/// consumers expect: `Time,Address,Top10`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PairRecord {
    /// Listing time as shown on the page
    pub time: String,
    /// Token address, truncated at the ellipsis the page renders
    pub address: String,
    /// Top-10 holder share
    pub top10: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

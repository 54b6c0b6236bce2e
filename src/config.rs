//! Channel label configuration.
//!
//! The wire format identifies channels only by position; human-readable
//! names come from a fixed 40-entry table supplied by configuration (the
//! firmware's probe layout, e.g. optode/wavelength codes). The table feeds
//! the CSV export header and is never interpreted by the core.
//!
//! ```yaml
//! # labels.yaml: one entry per channel, in channel order 0..39
//! - 735S1A0L
//! - 735S1A1L
//! # ...
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AcquisitionError, Result};
use crate::wire::CHANNEL_COUNT;

/// Fixed 40-entry channel name table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ChannelLabels {
    labels: Vec<String>,
}

impl ChannelLabels {
    /// Build from exactly [`CHANNEL_COUNT`] names in channel order.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::try_from(labels)
    }

    /// Load a label table from a YAML sequence.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| AcquisitionError::labels_error(format!("invalid label YAML: {e}")))
    }

    /// Label for channel `ch` (0..39).
    pub fn get(&self, ch: usize) -> &str {
        &self.labels[ch]
    }

    /// Labels in channel order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for ChannelLabels {
    /// Positional names `CH00`..`CH39`, for when no device table is configured.
    fn default() -> Self {
        Self { labels: (0..CHANNEL_COUNT).map(|ch| format!("CH{ch:02}")).collect() }
    }
}

impl TryFrom<Vec<String>> for ChannelLabels {
    type Error = AcquisitionError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        if labels.len() != CHANNEL_COUNT {
            return Err(AcquisitionError::labels_error(format!(
                "expected {CHANNEL_COUNT} channel labels, got {}",
                labels.len()
            )));
        }
        Ok(Self { labels })
    }
}

impl From<ChannelLabels> for Vec<String> {
    fn from(labels: ChannelLabels) -> Self {
        labels.labels
    }
}

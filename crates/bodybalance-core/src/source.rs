//! Data-source tagging for read results.

use std::fmt;

/// Where a successful read was satisfied from.
///
/// The tag is computed by the orchestration layer, never guessed by callers.
/// It feeds the `X-Data-Source` response header and the per-source request
/// counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Served from the ephemeral cache.
    Cache,
    /// Served from the durable primary store.
    Primary,
}

impl DataSource {
    /// Stable lowercase label used in headers and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Primary => "primary",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

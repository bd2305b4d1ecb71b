//! Toolkit configuration.

use rollkit_hooks::ResolutionOrder;
use serde::{Deserialize, Serialize};

/// In-process configuration of a [`Toolkit`](crate::Toolkit).
///
/// ```
/// use rollkit_hooks::ResolutionOrder;
/// use rollkit_system::ToolkitConfig;
///
/// let config = ToolkitConfig::default().with_resolution_order(ResolutionOrder::LatestFirst);
/// assert_eq!(config.resolution_order, ResolutionOrder::LatestFirst);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Order of candidates of equal priority.
    pub resolution_order: ResolutionOrder,
}

impl ToolkitConfig {
    /// Sets the resolution order.
    #[must_use]
    pub fn with_resolution_order(mut self, order: ResolutionOrder) -> Self {
        self.resolution_order = order;
        self
    }
}

//! Parser configuration.

use serde::{Deserialize, Serialize};
use shared_types::entity_id::DEFAULT_CACHE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Turns recoverable errors into parse failures.
    pub halt_on_error: bool,
    /// Capacity of the numeric id and alias caches.
    pub entity_id_cache_size: usize,
    /// Whether topic messages also produce lookup rows.
    pub topic_message_lookups: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            halt_on_error: false,
            entity_id_cache_size: DEFAULT_CACHE_SIZE,
            topic_message_lookups: true,
        }
    }
}

//! Shared type definitions for the chainstage crate
//!
//! Types that cross module boundaries: the flags an earlier pipeline stage
//! attaches to a module, and the result this stage hands back to the host.

use serde::{Deserialize, Serialize};

use crate::source_map::RawSourceMap;

/// Flags set on a module by an earlier pipeline stage
///
/// This stage only reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleMetadata {
    /// Upstream analysis determined the module needs no work
    pub skip_transform: bool,

    /// Advisory, forwarded to the transformer untouched
    pub side_effect_free: bool,
}

/// What the stage produced for one source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub content: String,
    pub map: Option<RawSourceMap>,
    /// Content and map are exactly what the host passed in
    pub skipped: bool,
}

impl StageResult {
    /// Hand the input back without touching it
    pub fn passed_through(content: String, previous_map: Option<RawSourceMap>) -> Self {
        Self {
            content,
            map: previous_map,
            skipped: true,
        }
    }

    pub fn transformed(content: String, map: Option<RawSourceMap>) -> Self {
        Self {
            content,
            map,
            skipped: false,
        }
    }
}

impl std::fmt::Display for StageResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let outcome = if self.skipped { "skipped" } else { "transformed" };
        let map = if self.map.is_some() { "with map" } else { "without map" };
        write!(f, "{outcome}, {} bytes {map}", self.content.len())
    }
}

//! Skip/process decision for a single source unit
//!
//! Upstream analysis may mark a module as not needing the transform. Source
//! typed files and generated factories are processed regardless, since
//! downstream consumers depend on the shape the transform gives them.

use log::trace;

use crate::types::ModuleMetadata;

/// Suffixes that force processing whatever the metadata says
pub const ALWAYS_PROCESS_SUFFIXES: &[&str] = &[
    // Source typed files
    ".ts",
    ".tsx",
    // Generated factories
    ".ngfactory.js",
    ".ngstyle.js",
];

/// Outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateDecision {
    /// Run the transformer
    Process,
    /// Hand content and map back untouched
    Skip,
}

impl GateDecision {
    pub fn is_skip(self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl std::fmt::Display for GateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Check whether a path is always processed
pub fn is_always_processed(resource_path: &str) -> bool {
    ALWAYS_PROCESS_SUFFIXES
        .iter()
        .any(|suffix| resource_path.ends_with(suffix))
}

/// Decide whether a unit goes through the transformer
pub fn decide(resource_path: &str, metadata: Option<&ModuleMetadata>) -> GateDecision {
    let decision = if is_always_processed(resource_path) {
        GateDecision::Process
    } else if metadata.is_some_and(|metadata| metadata.skip_transform) {
        GateDecision::Skip
    } else {
        GateDecision::Process
    };
    trace!("Gate decision for {resource_path}: {decision}");
    decision
}

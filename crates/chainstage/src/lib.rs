//! A bundler loader stage that gates a code transform and chains source maps
//!
//! Given a module's text and the source map left by earlier stages, the stage
//! decides whether the transformer should run, runs it, and merges the map
//! it emits with the upstream one so positions in the final text resolve to
//! the authored source.

pub mod composer;
pub mod config;
pub mod loader;
pub mod source_map;
pub mod stage_gate;
pub mod synthetic_paths;
pub mod transformer;
pub mod types;

pub use loader::{HostContext, PipelineHost, StageError, StageFuture, run_stage};
pub use source_map::{RawSourceMap, SourceMap};
pub use transformer::{TransformRequest, TransformResponse, Transformer};
pub use types::{ModuleMetadata, StageResult};

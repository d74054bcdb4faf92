//! Loader entry point
//!
//! Runs one source unit through the stage: consult the gate, call the
//! transformer, chain the resulting source map onto the one handed in by the
//! previous stage, and hand the result back as a single deferred value.

use futures::future::BoxFuture;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    composer::{compose, rename_source},
    config::LoaderOptions,
    source_map::{RawSourceMap, SourceMapError, parse, to_raw},
    stage_gate::{GateDecision, decide},
    synthetic_paths::SyntheticPaths,
    transformer::{TransformOutcome, TransformRequest, Transformer, invoke},
    types::{ModuleMetadata, StageResult},
};

static SOURCE_MAPPING_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mR)^//# sourceMappingURL=[^\r\n]*").expect("sourceMappingURL pattern is valid")
});

/// Failures surfaced to the host
#[derive(Debug, Error)]
pub enum StageError {
    /// Raised before any work starts
    #[error("Async loader support is required.")]
    AsyncUnsupported,

    #[error("transforming {path} failed")]
    Transform {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("chaining source maps for {path} failed")]
    Composition {
        path: String,
        #[source]
        source: SourceMapError,
    },
}

/// Deferred outcome of one stage run; resolves exactly once
pub type StageFuture<'a> = BoxFuture<'a, Result<StageResult, StageError>>;

/// What the stage needs from the pipeline running it
pub trait PipelineHost: Send + Sync {
    fn resource_path(&self) -> &str;

    /// Flags attached by an earlier stage, if any
    fn module_metadata(&self) -> Option<ModuleMetadata>;

    fn options(&self) -> &LoaderOptions;

    /// Whether the host accepts deferred completion for this stage
    fn supports_async(&self) -> bool {
        true
    }

    /// Tell the host the output depends only on the input
    fn mark_cacheable(&self) {}
}

/// A host described by plain values
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    pub resource_path: String,
    pub metadata: Option<ModuleMetadata>,
    pub options: LoaderOptions,
}

impl HostContext {
    pub fn new(resource_path: impl Into<String>, options: LoaderOptions) -> Self {
        Self {
            resource_path: resource_path.into(),
            metadata: None,
            options,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ModuleMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl PipelineHost for HostContext {
    fn resource_path(&self) -> &str {
        &self.resource_path
    }

    fn module_metadata(&self) -> Option<ModuleMetadata> {
        self.metadata
    }

    fn options(&self) -> &LoaderOptions {
        &self.options
    }
}

/// Start processing one unit
///
/// Fails immediately if the host cannot take a deferred result. Otherwise
/// returns a future that yields either the stage result or the first error.
pub fn run_stage<'a>(
    host: &'a dyn PipelineHost,
    transformer: &'a dyn Transformer,
    content: String,
    previous_map: Option<RawSourceMap>,
) -> Result<StageFuture<'a>, StageError> {
    host.mark_cacheable();
    if !host.supports_async() {
        return Err(StageError::AsyncUnsupported);
    }
    Ok(Box::pin(process(host, transformer, content, previous_map)))
}

async fn process(
    host: &dyn PipelineHost,
    transformer: &dyn Transformer,
    content: String,
    previous_map: Option<RawSourceMap>,
) -> Result<StageResult, StageError> {
    let resource_path = host.resource_path();
    let metadata = host.module_metadata();

    if decide(resource_path, metadata.as_ref()) == GateDecision::Skip {
        // Upstream analysis already determined this module needs no work
        debug!("Skipping {resource_path}");
        return Ok(StageResult::passed_through(content, previous_map));
    }

    let want_map = host.options().source_map;
    let paths = SyntheticPaths::for_resource(resource_path);
    let request = TransformRequest {
        content: content.clone(),
        original_file_path: paths.original.clone(),
        input_file_path: paths.pre_stage.clone(),
        output_file_path: paths.post_stage.clone(),
        emit_source_map: want_map,
        is_side_effect_free: metadata.is_some_and(|metadata| metadata.side_effect_free),
    };

    let outcome = invoke(transformer, request)
        .await
        .map_err(|source| StageError::Transform {
            path: resource_path.to_owned(),
            source,
        })?;

    let TransformOutcome::Applied {
        content: new_content,
        map: new_map,
    } = outcome
    else {
        return Ok(StageResult::passed_through(content, previous_map));
    };

    assemble(&paths, new_content, new_map, previous_map, want_map).map_err(|source| {
        StageError::Composition {
            path: resource_path.to_owned(),
            source,
        }
    })
}

/// Package transformed content with the map that belongs to it
///
/// No map is returned unless maps were requested and the transformer
/// produced one. When a map is returned, inline `sourceMappingURL` comments
/// are removed since the map travels alongside the content instead.
fn assemble(
    paths: &SyntheticPaths,
    content: String,
    new_map: Option<RawSourceMap>,
    previous_map: Option<RawSourceMap>,
    want_map: bool,
) -> Result<StageResult, SourceMapError> {
    let Some(new_map) = new_map.filter(|_| want_map) else {
        return Ok(StageResult::transformed(content, None));
    };
    let content = strip_source_mapping_urls(&content);

    let new_map = parse(&new_map)?;
    let map = match previous_map {
        Some(previous_map) => {
            // The previous map describes the pre-stage text; anchoring it there
            // makes its `file` match the only source of the new map.
            let mut previous_map = parse(&previous_map)?;
            previous_map.set_file(Some(paths.pre_stage.as_str()));
            compose(&new_map, &previous_map)?
        }
        None => rename_source(&new_map, &paths.pre_stage, &paths.original),
    };
    Ok(StageResult::transformed(content, Some(to_raw(&map)?)))
}

/// Remove `//# sourceMappingURL=` comments that start a line
pub fn strip_source_mapping_urls(content: &str) -> String {
    SOURCE_MAPPING_URL.replace_all(content, "").into_owned()
}

//! Source map plumbing
//!
//! Maps cross the stage boundary as plain JSON objects ([`RawSourceMap`]),
//! the way hosts and transformers exchange them. A map that is only passed
//! through is never parsed. Maps that take part in composition are parsed
//! into [`sourcemap::SourceMap`].
//!
//! Sources read through `sourcemap` are already resolved against the map's
//! `sourceRoot`, so maps built here carry resolved sources and no root.

use serde_json::Value;
pub use sourcemap::{SourceMap, SourceMapBuilder};
use thiserror::Error;

/// A source map as exchanged with collaborators
pub type RawSourceMap = Value;

/// Errors raised while reading or writing a source map
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("invalid source map: {0}")]
    Parse(#[from] sourcemap::Error),

    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("source map to be applied has no `file` to anchor it")]
    MissingFile,
}

/// Parse a raw map
pub fn parse(raw: &RawSourceMap) -> Result<SourceMap, SourceMapError> {
    let bytes = serde_json::to_vec(raw)?;
    Ok(SourceMap::from_slice(&bytes)?)
}

/// Serialize a map back into its raw form
pub fn to_raw(map: &SourceMap) -> Result<RawSourceMap, SourceMapError> {
    let mut bytes = Vec::new();
    map.to_writer(&mut bytes)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Where a generated position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalLocation<'a> {
    pub source: &'a str,
    pub line: u32,
    pub column: u32,
    pub name: Option<&'a str>,
}

/// Find the original location of a generated position
///
/// Picks the last token on the same generated line whose column is at or
/// before `column`. Returns `None` when there is no such token or when it
/// carries no original location.
pub fn original_location_for(
    map: &SourceMap,
    line: u32,
    column: u32,
) -> Option<OriginalLocation<'_>> {
    let token = map.lookup_token(line, column)?;
    if token.get_dst_line() != line {
        return None;
    }
    Some(OriginalLocation {
        source: token.get_source()?,
        line: token.get_src_line(),
        column: token.get_src_col(),
        name: token.get_name(),
    })
}

/// Append a generated-only token
pub fn push_unmapped(builder: &mut SourceMapBuilder, line: u32, column: u32) {
    builder.add_raw(line, column, 0, 0, None, None, false);
}

/// Append a token pointing at `source`, interning source and name
pub fn push_mapped(
    builder: &mut SourceMapBuilder,
    generated: (u32, u32),
    source: &str,
    original: (u32, u32),
    name: Option<&str>,
) {
    let source_id = builder.add_source(source);
    let name_id = name.map(|name| builder.add_name(name));
    builder.add_raw(
        generated.0,
        generated.1,
        original.0,
        original.1,
        Some(source_id),
        name_id,
        false,
    );
}

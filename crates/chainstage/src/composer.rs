//! Source map chaining
//!
//! The map emitted by the transformer describes final text in terms of the
//! stage's input (the pre-stage text). The map handed in by the host
//! describes that same input in terms of the authored sources. Composing the
//! two yields a single map from final text straight to authored sources.
//!
//! The generated side of the result is exactly the new map's: same lines,
//! same column breakpoints. Only original-side targets change.
//!
//! Sources are compared and written after resolving them against their own
//! map's `sourceRoot`. Maps built here carry no `sourceRoot` of their own.

use log::{debug, trace};

use crate::source_map::{
    SourceMap, SourceMapBuilder, SourceMapError, original_location_for, push_mapped,
    push_unmapped,
};

/// Chain `new_map` through `upstream`
///
/// `upstream`'s `file` must name the source that `new_map` uses for the text
/// `upstream` describes; the loader sets it to the pre-stage id before
/// calling this.
///
/// For every token of `new_map` pointing at that source, its target is
/// looked up in `upstream` (same line, nearest column at or before). A hit
/// replaces the target, and its name too when upstream has one. A miss drops
/// the target and leaves a generated-only token. Tokens pointing at any
/// other source are kept verbatim.
pub fn compose(new_map: &SourceMap, upstream: &SourceMap) -> Result<SourceMap, SourceMapError> {
    let anchor = upstream.get_file().ok_or(SourceMapError::MissingFile)?;
    debug!(
        "Composing {} mappings through upstream map with {} mappings anchored at {anchor}",
        new_map.get_token_count(),
        upstream.get_token_count()
    );

    let mut builder = SourceMapBuilder::new(new_map.get_file());
    copy_sources(&mut builder, upstream, |source| source);

    let mut dropped = 0_usize;
    for token in new_map.tokens() {
        let generated = (token.get_dst_line(), token.get_dst_col());
        let Some(source) = token.get_source() else {
            push_unmapped(&mut builder, generated.0, generated.1);
            continue;
        };
        let original = (token.get_src_line(), token.get_src_col());

        if source != anchor {
            let source_id = builder.add_source(source);
            if let Some(contents) = new_map.get_source_contents(token.get_src_id()) {
                builder.set_source_contents(source_id, Some(contents));
            }
            push_mapped(&mut builder, generated, source, original, token.get_name());
            continue;
        }

        match original_location_for(upstream, original.0, original.1) {
            Some(resolved) => push_mapped(
                &mut builder,
                generated,
                resolved.source,
                (resolved.line, resolved.column),
                resolved.name.or_else(|| token.get_name()),
            ),
            None => {
                trace!(
                    "No upstream mapping covers {}:{}, dropping target",
                    original.0, original.1
                );
                dropped += 1;
                push_unmapped(&mut builder, generated.0, generated.1);
            }
        }
    }

    if dropped > 0 {
        debug!("{dropped} mappings had no upstream counterpart");
    }
    Ok(builder.into_sourcemap())
}

/// Point references to `from` at `to` instead
///
/// Used when there is no upstream map: the pre-stage text is then the
/// authored source itself, so the synthetic name is replaced by the real one.
/// Entries that end up with the same name are merged.
pub fn rename_source(map: &SourceMap, from: &str, to: &str) -> SourceMap {
    let mut builder = SourceMapBuilder::new(map.get_file());
    copy_sources(&mut builder, map, |source| renamed(source, from, to));
    for token in map.tokens() {
        match token.get_source() {
            Some(source) => push_mapped(
                &mut builder,
                (token.get_dst_line(), token.get_dst_col()),
                renamed(source, from, to),
                (token.get_src_line(), token.get_src_col()),
                token.get_name(),
            ),
            None => push_unmapped(&mut builder, token.get_dst_line(), token.get_dst_col()),
        }
    }
    builder.into_sourcemap()
}

fn renamed<'a>(source: &'a str, from: &str, to: &'a str) -> &'a str {
    if source == from { to } else { source }
}

/// Register every source of `map` (with its contents) in order
fn copy_sources<'a>(
    builder: &mut SourceMapBuilder,
    map: &'a SourceMap,
    rename: impl Fn(&'a str) -> &'a str,
) {
    for index in 0..map.get_source_count() {
        let Some(source) = map.get_source(index) else {
            continue;
        };
        let source_id = builder.add_source(rename(source));
        if let Some(contents) = map.get_source_contents(index) {
            builder.set_source_contents(source_id, Some(contents));
        }
    }
}

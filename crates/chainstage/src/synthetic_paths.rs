//! Synthetic intermediate file names
//!
//! The transformer's input and output never exist on disk. Giving each a
//! stable, distinct name lets the map produced by this stage reference the
//! map produced by the previous one: the upstream map's `file` is set to the
//! pre-stage name, which is also the only entry in the new map's `sources`.

const PRE_STAGE_SUFFIX: &str = ".pre-build-optimizer.js";
const POST_STAGE_SUFFIX: &str = ".post-build-optimizer.js";

/// Name of the text as it enters the transformer
pub fn pre_stage_id(resource_path: &str) -> String {
    format!("{resource_path}{PRE_STAGE_SUFFIX}")
}

/// Name of the text as it leaves the transformer
pub fn post_stage_id(resource_path: &str) -> String {
    format!("{resource_path}{POST_STAGE_SUFFIX}")
}

/// Both synthetic names for one resource, alongside the real path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticPaths {
    pub original: String,
    pub pre_stage: String,
    pub post_stage: String,
}

impl SyntheticPaths {
    pub fn for_resource(resource_path: &str) -> Self {
        Self {
            original: resource_path.to_owned(),
            pre_stage: pre_stage_id(resource_path),
            post_stage: post_stage_id(resource_path),
        }
    }
}

//! Boundary with the external content transformer
//!
//! The transformer rewrites code and optionally emits a map from its output
//! back to its input. It may also refuse to change anything. This module
//! defines the request/response contract and folds the response into a
//! [`TransformOutcome`].

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::source_map::RawSourceMap;

/// Everything the transformer is told about one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub content: String,
    pub original_file_path: String,
    /// Synthetic name the emitted map should use as its source
    pub input_file_path: String,
    /// Synthetic name the emitted map should use as its `file`
    pub output_file_path: String,
    pub emit_source_map: bool,
    pub is_side_effect_free: bool,
}

/// Raw transformer reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformResponse {
    pub emit_skipped: bool,
    pub content: Option<String>,
    pub source_map: Option<RawSourceMap>,
}

/// The transformer's reply, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// No change was needed or it was not safe; the input stands
    Declined,
    Applied {
        content: String,
        map: Option<RawSourceMap>,
    },
}

impl From<TransformResponse> for TransformOutcome {
    fn from(response: TransformResponse) -> Self {
        match response {
            TransformResponse { emit_skipped: true, .. }
            | TransformResponse { content: None, .. } => Self::Declined,
            TransformResponse {
                content: Some(content),
                source_map,
                ..
            } => Self::Applied {
                content,
                map: source_map,
            },
        }
    }
}

/// An external code transformer
#[async_trait]
pub trait Transformer: Send + Sync {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResponse>;
}

/// Call the transformer and interpret its reply
pub async fn invoke(
    transformer: &dyn Transformer,
    request: TransformRequest,
) -> Result<TransformOutcome> {
    let path = request.original_file_path.clone();
    let outcome = TransformOutcome::from(transformer.transform(request).await?);
    match &outcome {
        TransformOutcome::Declined => debug!("Transformer declined {path}"),
        TransformOutcome::Applied { content, map } => debug!(
            "Transformer rewrote {path} ({} bytes, map: {})",
            content.len(),
            map.is_some()
        ),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[derive(Debug)]
    struct Replying(TransformResponse);

    #[async_trait]
    impl Transformer for Replying {
        async fn transform(&self, _request: TransformRequest) -> Result<TransformResponse> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Transformer for Failing {
        async fn transform(&self, request: TransformRequest) -> Result<TransformResponse> {
            anyhow::bail!("cannot parse {}", request.original_file_path)
        }
    }

    fn request() -> TransformRequest {
        TransformRequest {
            content: "let a = 1;".to_owned(),
            original_file_path: "a.js".to_owned(),
            input_file_path: "a.js.pre-build-optimizer.js".to_owned(),
            output_file_path: "a.js.post-build-optimizer.js".to_owned(),
            emit_source_map: false,
            is_side_effect_free: false,
        }
    }

    #[test]
    fn test_emit_skipped_is_declined() {
        let transformer = Replying(TransformResponse {
            emit_skipped: true,
            content: Some("ignored".to_owned()),
            source_map: None,
        });
        let outcome = block_on(invoke(&transformer, request())).unwrap();
        assert_eq!(outcome, TransformOutcome::Declined);
    }

    #[test]
    fn test_missing_content_is_declined() {
        let transformer = Replying(TransformResponse::default());
        let outcome = block_on(invoke(&transformer, request())).unwrap();
        assert_eq!(outcome, TransformOutcome::Declined);
    }

    #[test]
    fn test_content_is_applied() {
        let transformer = Replying(TransformResponse {
            emit_skipped: false,
            content: Some("let a=1;".to_owned()),
            source_map: None,
        });
        let outcome = block_on(invoke(&transformer, request())).unwrap();
        assert_eq!(
            outcome,
            TransformOutcome::Applied {
                content: "let a=1;".to_owned(),
                map: None,
            }
        );
    }

    #[test]
    fn test_transformer_errors_propagate() {
        let error = block_on(invoke(&Failing, request())).unwrap_err();
        assert_eq!(error.to_string(), "cannot parse a.js");
    }

    #[test]
    fn test_request_wire_shape() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(value["originalFilePath"], "a.js");
        assert_eq!(value["inputFilePath"], "a.js.pre-build-optimizer.js");
        assert_eq!(value["emitSourceMap"], false);
        assert_eq!(value["isSideEffectFree"], false);
    }
}

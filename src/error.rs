//! Errors raised by the post pipeline.
//!
//! Per-post errors ([`MalformedPost`](PipelineError::MalformedPost),
//! [`MissingField`](PipelineError::MissingField)) abort only the affected
//! post. A [`SlugCollision`](PipelineError::SlugCollision) or an unreadable
//! content store aborts the whole enumeration.

use crate::content::ContentError;
use crate::og::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed post {id}: {reason}")]
    MalformedPost { id: String, reason: String },
    #[error("Post {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },
    #[error("Slug `{slug}` is derived by both {first} and {second}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },
    #[error("Content store error: {0}")]
    Content(#[from] ContentError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

//! Shared types used across the pipeline.
//!
//! A [`Post`] flows from the content store through the annotator
//! ([`AnnotatedPost`]) into the enumerator ([`RouteDescriptor`]) and finally
//! to the renderer ([`RenderedImage`]). None of them is mutated after
//! construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type of every rendered preview image.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// A post as loaded from the content store.
///
/// `title` and `body` are optional so that records with absent or unreadable
/// fields can still be listed; the stages that need them report the problem
/// for that post instead of inventing defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Store-relative identifier, e.g. `2024/deep-dive.md`.
    pub id: String,
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<PostDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    /// Raw markdown body. `None` when the body could not be read.
    pub body: Option<String>,
}

/// Calendar date a post was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl PostDate {
    /// `Jan 15, 2024`
    pub fn human(&self) -> String {
        let month = MONTHS
            .get(usize::from(self.month.saturating_sub(1)))
            .copied()
            .unwrap_or("???");
        format!("{} {}, {}", month, self.day, self.year)
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Estimated reading time for a post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
    /// Display form, e.g. `3 min read`.
    pub text: String,
}

/// A post plus its derived reading time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPost {
    #[serde(flatten)]
    pub post: Post,
    pub reading_time: ReadingTime,
}

/// Route parameters of a post image route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub slug: String,
}

/// One build-time route: the slug it materializes under and the post it renders.
///
/// Serializes as `{ "params": { "slug": ... }, "props": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub params: RouteParams,
    pub props: AnnotatedPost,
}

impl RouteDescriptor {
    pub fn slug(&self) -> &str {
        &self.params.slug
    }
}

/// Encoded image bytes plus their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl RenderedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: PNG_CONTENT_TYPE,
        }
    }
}

//! Content store: where posts come from.
//!
//! The pipeline only ever talks to the [`ContentStore`] trait. Two
//! implementations ship with the crate:
//!
//! - [`FsContentStore`] walks the posts directory of a content root and
//!   parses each markdown file.
//! - [`MemoryContentStore`] serves a fixed list of posts, used by tests and by
//!   callers that load content some other way.
//!
//! ## Post files
//!
//! ```text
//! content/blog/hello-world.md
//! +++
//! title = "Hello World!"
//! description = "First post"
//! author = "Jane Doe"
//! pub_datetime = 2024-01-15T09:00:00Z
//! tags = ["intro"]
//! draft = false
//! +++
//!
//! Markdown body...
//! ```
//!
//! Front matter is TOML between `+++` lines. Every key is optional; keys the
//! pipeline doesn't know are ignored since other consumers of the same content
//! (page templates, feeds) carry their own. `pubDatetime` is accepted as an
//! alias of `pub_datetime`.
//!
//! A file without front matter is a post with no title. A body that is not
//! valid UTF-8 is loaded with `body: None`; it is the annotator's job to reject
//! it. A file that can't be read or whose front matter doesn't parse is listed
//! in [`PostListing::rejected`] and never published, since its draft status is
//! unknown. Only a missing posts directory or a failed directory walk fails the
//! listing itself.

use crate::types::{Post, PostDate};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Posts directory not found: {0}")]
    MissingPostsDir(PathBuf),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatterSyntax {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Front matter is not closed with `+++` in {0}")]
    UnterminatedFrontMatter(PathBuf),
    #[error("Front matter is not valid UTF-8 in {0}")]
    FrontMatterEncoding(PathBuf),
}

/// A post file the store found but could not load.
#[derive(Debug)]
pub struct RejectedPost {
    pub id: String,
    pub error: ContentError,
}

/// What a store returned for one snapshot.
#[derive(Debug, Default)]
pub struct PostListing {
    pub posts: Vec<Post>,
    /// Files that failed to load, in store order.
    pub rejected: Vec<RejectedPost>,
}

/// Source of post records.
///
/// Implementations must return posts in a stable order so that builds over the
/// same snapshot are deterministic.
pub trait ContentStore: Sync {
    /// List posts, optionally including drafts.
    fn list_posts(&self, include_drafts: bool) -> Result<PostListing, ContentError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// A fixed, in-memory list of posts.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    posts: Vec<Post>,
}

impl MemoryContentStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

impl ContentStore for MemoryContentStore {
    fn list_posts(&self, include_drafts: bool) -> Result<PostListing, ContentError> {
        Ok(PostListing {
            posts: self
                .posts
                .iter()
                .filter(|p| include_drafts || !p.draft)
                .cloned()
                .collect(),
            rejected: Vec::new(),
        })
    }
}

// ============================================================================
// Filesystem store
// ============================================================================

/// Markdown posts under a directory, searched recursively.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    posts_dir: PathBuf,
}

impl FsContentStore {
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    /// Store for `<content_root>/<posts_dir>`.
    pub fn from_root(content_root: &Path, posts_dir: &str) -> Self {
        Self::new(content_root.join(posts_dir))
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }
}

impl ContentStore for FsContentStore {
    fn list_posts(&self, include_drafts: bool) -> Result<PostListing, ContentError> {
        if !self.posts_dir.is_dir() {
            return Err(ContentError::MissingPostsDir(self.posts_dir.clone()));
        }

        let mut listing = PostListing::default();
        for entry in WalkDir::new(&self.posts_dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) || is_hidden(path) {
                continue;
            }
            let id = post_id(&self.posts_dir, path);
            match load_post(id.clone(), path) {
                Ok(post) if include_drafts || !post.draft => listing.posts.push(post),
                Ok(_) => {}
                Err(error) => listing.rejected.push(RejectedPost { id, error }),
            }
        }
        Ok(listing)
    }
}

fn load_post(id: String, path: &Path) -> Result<Post, ContentError> {
    let bytes = fs::read(path)?;
    parse_post(id, &bytes, path)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Forward-slash path relative to the posts directory.
fn post_id(posts_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(posts_dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Front matter
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    #[serde(alias = "pubDatetime")]
    pub_datetime: Option<toml::value::Datetime>,
    tags: Vec<String>,
    draft: bool,
}

const DELIMITER: &[u8] = b"+++";

/// Parse a post file into a [`Post`]. `path` is only used in error messages.
pub fn parse_post(id: String, bytes: &[u8], path: &Path) -> Result<Post, ContentError> {
    let (front, body) = split_front_matter(bytes, path)?;

    let front: FrontMatter = match front {
        Some(raw) => {
            let text = std::str::from_utf8(raw)
                .map_err(|_| ContentError::FrontMatterEncoding(path.to_path_buf()))?;
            toml::from_str(text).map_err(|source| ContentError::FrontMatterSyntax {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => FrontMatter::default(),
    };

    let body = std::str::from_utf8(body).ok().map(str::to_string);

    Ok(Post {
        id,
        title: front.title,
        description: front.description,
        author: front.author,
        pub_date: front.pub_datetime.and_then(|dt| {
            dt.date.map(|d| PostDate {
                year: d.year,
                month: d.month,
                day: d.day,
            })
        }),
        tags: front.tags,
        draft: front.draft,
        body,
    })
}

/// Split raw file bytes into `(front matter, body)`.
///
/// Works on bytes so a body with invalid UTF-8 doesn't prevent reading the
/// front matter.
fn split_front_matter<'a>(
    bytes: &'a [u8],
    path: &Path,
) -> Result<(Option<&'a [u8]>, &'a [u8]), ContentError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let Some(after_open) = strip_delimiter_line(bytes) else {
        return Ok((None, bytes));
    };

    let mut line_start = 0;
    while line_start <= after_open.len() {
        let line_end = after_open[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| line_start + p)
            .unwrap_or(after_open.len());
        let line = trim_cr(&after_open[line_start..line_end]);
        if line == DELIMITER {
            let front = &after_open[..line_start];
            let body_start = (line_end + 1).min(after_open.len());
            return Ok((Some(front), &after_open[body_start..]));
        }
        line_start = line_end + 1;
    }

    Err(ContentError::UnterminatedFrontMatter(path.to_path_buf()))
}

/// If `bytes` starts with a `+++` line, return what follows it.
fn strip_delimiter_line(bytes: &[u8]) -> Option<&[u8]> {
    let rest = bytes.strip_prefix(DELIMITER)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(b"\r\n")
        .or_else(|| rest.strip_prefix(b"\n"))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

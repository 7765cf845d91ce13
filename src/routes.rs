//! Route table for generated images.
//!
//! Routes are registered explicitly: each entry pairs a [`RoutePattern`] with
//! a handler function. A pattern has at most one `[slug]` segment; dynamic
//! routes are materialized once per [`RouteDescriptor`](crate::types::RouteDescriptor),
//! static routes once.
//!
//! ```text
//! /posts/[slug]/index.png  → post_image   (one per post)
//! /og.png                  → site_image
//! ```
//!
//! Handlers only dispatch: they hand their input to the renderer and wrap
//! the bytes in a [`Response`].

use crate::error::PipelineError;
use crate::og::OgRenderer;
use crate::paths::StaticPaths;
use crate::types::{AnnotatedPost, RenderedImage};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const POST_IMAGE_ROUTE: &str = "/posts/[slug]/index.png";
pub const SITE_IMAGE_ROUTE: &str = "/og.png";

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("No route for {0}")]
    NotFound(String),
    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
    #[error("Route pattern `{0}` is registered twice")]
    Duplicate(String),
    #[error(transparent)]
    Handler(#[from] PipelineError),
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slug,
}

/// A URL path pattern such as `/posts/[slug]/index.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    fn literal(part: &str) -> Segment {
        Segment::Literal(part.to_string())
    }

    /// `/posts/[slug]/index.png`
    pub fn post_image() -> Self {
        Self {
            segments: vec![Self::literal("posts"), Segment::Slug, Self::literal("index.png")],
        }
    }

    /// `/og.png`
    pub fn site_image() -> Self {
        Self {
            segments: vec![Self::literal("og.png")],
        }
    }

    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with `/`"))?;

        let mut segments = Vec::new();
        for part in rest.split('/') {
            let segment = match part {
                "" => return Err(invalid("empty path segment")),
                "[slug]" => Segment::Slug,
                _ if part.contains('[') || part.contains(']') => {
                    return Err(invalid("only `[slug]` is supported as a parameter"));
                }
                _ => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }
        if segments.iter().filter(|s| **s == Segment::Slug).count() > 1 {
            return Err(invalid("at most one `[slug]` segment"));
        }
        Ok(Self { segments })
    }

    /// Whether the pattern takes a slug.
    pub fn is_dynamic(&self) -> bool {
        self.segments.contains(&Segment::Slug)
    }

    /// Match a concrete path.
    ///
    /// Returns `None` when the path doesn't match, `Some(None)` for a static
    /// match and `Some(Some(slug))` for a dynamic one.
    pub fn matches(&self, path: &str) -> Option<Option<String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut slug = None;
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Slug if part.is_empty() => return None,
                Segment::Slug => slug = Some(part.to_string()),
            }
        }
        Some(slug)
    }

    /// Concrete path for a slug. The slug is ignored by static patterns.
    pub fn materialize(&self, slug: Option<&str>) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Slug => path.push_str(slug.unwrap_or_default()),
            }
        }
        path
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "/{literal}")?,
                Segment::Slug => f.write_str("/[slug]")?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// An HTTP-shaped response: body bytes plus headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn image(image: RenderedImage) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), image.content_type.to_string());
        Self {
            body: image.bytes,
            headers,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type").map(String::as_str)
    }
}

/// What handlers get to work with.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub renderer: &'a OgRenderer,
}

pub type Handler =
    fn(&RouteContext<'_>, Option<&AnnotatedPost>) -> Result<Response, PipelineError>;

/// `/posts/[slug]/index.png`: the post's preview image.
pub fn post_image(
    ctx: &RouteContext<'_>,
    post: Option<&AnnotatedPost>,
) -> Result<Response, PipelineError> {
    let post = post.ok_or_else(|| PipelineError::MissingField {
        id: POST_IMAGE_ROUTE.to_string(),
        field: "props",
    })?;
    Ok(Response::image(ctx.renderer.render_post(post)?))
}

/// `/og.png`: the site preview image.
pub fn site_image(
    ctx: &RouteContext<'_>,
    _post: Option<&AnnotatedPost>,
) -> Result<Response, PipelineError> {
    Ok(Response::image(ctx.renderer.render_site()?))
}

// ============================================================================
// Table
// ============================================================================

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub handler: Handler,
}

/// One concrete path a build writes, with the props its handler receives.
#[derive(Debug, Clone, Copy)]
pub struct Job<'a> {
    pub route: &'a Route,
    pub slug: Option<&'a str>,
    pub props: Option<&'a AnnotatedPost>,
}

impl Job<'_> {
    pub fn path(&self) -> String {
        self.route.pattern.materialize(self.slug)
    }

    pub fn run(&self, ctx: &RouteContext<'_>) -> Result<Response, PipelineError> {
        (self.route.handler)(ctx, self.props)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The image routes every site gets.
    pub fn standard() -> Self {
        Self {
            routes: vec![
                Route {
                    pattern: RoutePattern::post_image(),
                    handler: post_image,
                },
                Route {
                    pattern: RoutePattern::site_image(),
                    handler: site_image,
                },
            ],
        }
    }

    /// Register a handler under a pattern.
    pub fn register(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        let pattern = RoutePattern::parse(pattern)?;
        if self.routes.iter().any(|r| r.pattern == pattern) {
            return Err(RouteError::Duplicate(pattern.to_string()));
        }
        self.routes.push(Route { pattern, handler });
        Ok(self)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Every concrete path the table produces for a set of descriptors, in
    /// registration order then descriptor order.
    pub fn jobs<'a>(&'a self, paths: &'a StaticPaths) -> Vec<Job<'a>> {
        let mut jobs = Vec::new();
        for route in &self.routes {
            if route.pattern.is_dynamic() {
                jobs.extend(paths.routes.iter().map(|descriptor| Job {
                    route,
                    slug: Some(descriptor.slug()),
                    props: Some(&descriptor.props),
                }));
            } else {
                jobs.push(Job {
                    route,
                    slug: None,
                    props: None,
                });
            }
        }
        jobs
    }

    /// Find the job serving a concrete path.
    pub fn lookup<'a>(&'a self, path: &str, paths: &'a StaticPaths) -> Result<Job<'a>, RouteError> {
        let not_found = || RouteError::NotFound(path.to_string());
        for route in &self.routes {
            match route.pattern.matches(path) {
                None => continue,
                Some(None) => {
                    return Ok(Job {
                        route,
                        slug: None,
                        props: None,
                    });
                }
                Some(Some(slug)) => {
                    let descriptor = paths.get(&slug).ok_or_else(not_found)?;
                    return Ok(Job {
                        route,
                        slug: Some(descriptor.slug()),
                        props: Some(&descriptor.props),
                    });
                }
            }
        }
        Err(not_found())
    }

    /// Serve one concrete path.
    pub fn resolve(
        &self,
        path: &str,
        paths: &StaticPaths,
        ctx: &RouteContext<'_>,
    ) -> Result<Response, RouteError> {
        Ok(self.lookup(path, paths)?.run(ctx)?)
    }
}

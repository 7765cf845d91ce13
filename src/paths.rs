//! Static path enumeration.
//!
//! Decides which post image routes a build materializes. For a content store
//! snapshot it:
//!
//! 1. lists posts without drafts,
//! 2. annotates each with its reading time,
//! 3. derives a slug from each title,
//! 4. emits one [`RouteDescriptor`] per post, in store order.
//!
//! Posts that can't be routed (a file the store couldn't load, an unreadable
//! body, no usable title) are set aside in [`StaticPaths::skipped`] and the
//! rest of the build carries on. Two posts
//! deriving the same slug is a content error: the enumeration fails with
//! [`PipelineError::SlugCollision`] naming both posts instead of letting one
//! route shadow the other.

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::error::PipelineError;
use crate::reading_time::annotate_post;
use crate::slug::derive_slug;
use crate::types::{Post, RouteDescriptor, RouteParams};
use rayon::prelude::*;
use std::collections::HashMap;

/// A post that was left out of the route set, and why.
#[derive(Debug)]
pub struct SkippedPost {
    pub id: String,
    pub error: PipelineError,
}

/// Result of enumerating a content store.
#[derive(Debug, Default)]
pub struct StaticPaths {
    /// One descriptor per routable post, in content-store order.
    pub routes: Vec<RouteDescriptor>,
    /// Posts excluded because of a per-post error.
    pub skipped: Vec<SkippedPost>,
}

impl StaticPaths {
    /// Find the descriptor for a slug.
    pub fn get(&self, slug: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.params.slug == slug)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

/// Enumerate the post image routes for a content store.
pub fn static_paths(
    store: &dyn ContentStore,
    config: &SiteConfig,
) -> Result<StaticPaths, PipelineError> {
    let listing = store.list_posts(false)?;
    let wpm = config.reading.words_per_minute;

    let mut paths = StaticPaths::default();
    for rejected in listing.rejected {
        paths.skipped.push(SkippedPost {
            error: PipelineError::MalformedPost {
                id: rejected.id.clone(),
                reason: rejected.error.to_string(),
            },
            id: rejected.id,
        });
    }

    // Posts are independent; collect keeps store order.
    let outcomes: Vec<Result<RouteDescriptor, SkippedPost>> = listing
        .posts
        .into_par_iter()
        .filter(|post| !post.draft)
        .map(|post| {
            let id = post.id.clone();
            describe(post, wpm).map_err(|error| SkippedPost { id, error })
        })
        .collect();

    let mut owners: HashMap<String, String> = HashMap::new();
    for outcome in outcomes {
        match outcome {
            Ok(route) => {
                if let Some(first) = owners.get(&route.params.slug) {
                    return Err(PipelineError::SlugCollision {
                        slug: route.params.slug.clone(),
                        first: first.clone(),
                        second: route.props.post.id.clone(),
                    });
                }
                owners.insert(route.params.slug.clone(), route.props.post.id.clone());
                paths.routes.push(route);
            }
            Err(skipped) => paths.skipped.push(skipped),
        }
    }
    Ok(paths)
}

/// Build the descriptor for one non-draft post.
fn describe(post: Post, wpm: u32) -> Result<RouteDescriptor, PipelineError> {
    let slug = post.title.as_deref().map(derive_slug).unwrap_or_default();
    if slug.is_empty() {
        return Err(PipelineError::MissingField {
            id: post.id,
            field: "title",
        });
    }
    let props = annotate_post(post, wpm)?;
    Ok(RouteDescriptor {
        params: RouteParams { slug },
        props,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentError, MemoryContentStore, PostListing, RejectedPost};
    use crate::test_helpers::{draft, post};

    fn enumerate(posts: Vec<Post>) -> Result<StaticPaths, PipelineError> {
        static_paths(&MemoryContentStore::new(posts), &SiteConfig::default())
    }

    fn slugs(paths: &StaticPaths) -> Vec<&str> {
        paths.routes.iter().map(|r| r.slug()).collect()
    }

    #[test]
    fn empty_store_yields_no_routes() {
        let paths = enumerate(vec![]).unwrap();
        assert!(paths.is_empty());
        assert!(paths.skipped.is_empty());
    }

    #[test]
    fn single_post_routes_to_its_slug() {
        let paths = enumerate(vec![post("Hello World!", "Some words here.")]).unwrap();
        assert_eq!(slugs(&paths), vec!["hello-world"]);
        let route = paths.get("hello-world").unwrap();
        assert_eq!(route.props.post.title.as_deref(), Some("Hello World!"));
        assert_eq!(route.props.reading_time.words, 3);
    }

    #[test]
    fn single_draft_yields_no_routes() {
        let paths = enumerate(vec![draft("Secret", "wip")]).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn drafts_never_routed_even_if_store_returns_them() {
        struct LeakyStore(Vec<Post>);
        impl ContentStore for LeakyStore {
            fn list_posts(&self, _include_drafts: bool) -> Result<PostListing, ContentError> {
                Ok(PostListing {
                    posts: self.0.clone(),
                    rejected: Vec::new(),
                })
            }
        }
        let store = LeakyStore(vec![draft("Hidden", "x"), post("Shown", "y")]);
        let paths = static_paths(&store, &SiteConfig::default()).unwrap();
        assert_eq!(slugs(&paths), vec!["shown"]);
    }

    #[test]
    fn one_route_per_non_draft_post_in_store_order() {
        let posts = vec![
            post("Zeta", "z"),
            draft("Beta", "b"),
            post("Alpha", "a"),
            post("Café Crème", "c"),
        ];
        let expected: Vec<String> = posts
            .iter()
            .filter(|p| !p.draft)
            .map(|p| derive_slug(p.title.as_deref().unwrap()))
            .collect();

        let paths = enumerate(posts).unwrap();
        assert_eq!(slugs(&paths), expected);
        assert_eq!(slugs(&paths), vec!["zeta", "alpha", "cafe-creme"]);
    }

    #[test]
    fn duplicate_titles_are_a_collision() {
        let mut first = post("Test", "one");
        first.id = "a/test.md".to_string();
        let mut second = post("Test", "two");
        second.id = "b/test.md".to_string();

        let err = enumerate(vec![first, second]).unwrap_err();
        match err {
            PipelineError::SlugCollision {
                slug,
                first,
                second,
            } => {
                assert_eq!(slug, "test");
                assert_eq!(first, "a/test.md");
                assert_eq!(second, "b/test.md");
            }
            other => panic!("expected SlugCollision, got {other:?}"),
        }
    }

    #[test]
    fn titles_folding_to_same_slug_collide() {
        let result = enumerate(vec![post("Hello, World", "a"), post("hello world!", "b")]);
        assert!(matches!(result, Err(PipelineError::SlugCollision { .. })));
    }

    #[test]
    fn draft_does_not_collide_with_published_post() {
        let paths = enumerate(vec![draft("Test", "old"), post("Test", "new")]).unwrap();
        assert_eq!(slugs(&paths), vec!["test"]);
    }

    #[test]
    fn malformed_post_skipped_without_aborting() {
        let mut broken = post("Broken", "");
        broken.body = None;
        let paths = enumerate(vec![broken, post("Fine", "ok")]).unwrap();

        assert_eq!(slugs(&paths), vec!["fine"]);
        assert_eq!(paths.skipped.len(), 1);
        assert_eq!(paths.skipped[0].id, "broken.md");
        assert!(matches!(
            paths.skipped[0].error,
            PipelineError::MalformedPost { .. }
        ));
    }

    #[test]
    fn rejected_files_skipped_as_malformed() {
        struct PartlyBrokenStore;
        impl ContentStore for PartlyBrokenStore {
            fn list_posts(&self, _include_drafts: bool) -> Result<PostListing, ContentError> {
                Ok(PostListing {
                    posts: vec![post("Fine", "ok")],
                    rejected: vec![RejectedPost {
                        id: "quoted-date.md".to_string(),
                        error: ContentError::UnterminatedFrontMatter("quoted-date.md".into()),
                    }],
                })
            }
        }

        let paths = static_paths(&PartlyBrokenStore, &SiteConfig::default()).unwrap();
        assert_eq!(slugs(&paths), vec!["fine"]);
        assert_eq!(paths.skipped.len(), 1);
        assert_eq!(paths.skipped[0].id, "quoted-date.md");
        match &paths.skipped[0].error {
            PipelineError::MalformedPost { id, reason } => {
                assert_eq!(id, "quoted-date.md");
                assert!(reason.contains("not closed"), "{reason}");
            }
            other => panic!("expected MalformedPost, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_unsluggable_title_skipped() {
        let mut untitled = post("x", "body");
        untitled.title = None;
        untitled.id = "untitled.md".to_string();
        let mut symbols = post("!!!", "body");
        symbols.id = "symbols.md".to_string();

        let paths = enumerate(vec![untitled, symbols, post("Kept", "k")]).unwrap();
        assert_eq!(slugs(&paths), vec!["kept"]);
        let skipped: Vec<&str> = paths.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["untitled.md", "symbols.md"]);
        assert!(
            paths
                .skipped
                .iter()
                .all(|s| matches!(s.error, PipelineError::MissingField { field: "title", .. }))
        );
    }

    #[test]
    fn unreadable_store_is_fatal() {
        struct BrokenStore;
        impl ContentStore for BrokenStore {
            fn list_posts(&self, _include_drafts: bool) -> Result<PostListing, ContentError> {
                Err(ContentError::MissingPostsDir("blog".into()))
            }
        }
        let result = static_paths(&BrokenStore, &SiteConfig::default());
        assert!(matches!(result, Err(PipelineError::Content(_))));
    }

    #[test]
    fn enumeration_is_deterministic() {
        let posts: Vec<Post> = (0..40)
            .map(|i| post(&format!("Post number {i}"), &"word ".repeat(i * 10)))
            .collect();
        let store = MemoryContentStore::new(posts);
        let config = SiteConfig::default();
        let a = static_paths(&store, &config).unwrap();
        let b = static_paths(&store, &config).unwrap();
        assert_eq!(a.routes, b.routes);
    }

    #[test]
    fn uses_configured_reading_speed() {
        let mut config = SiteConfig::default();
        config.reading.words_per_minute = 10;
        let store = MemoryContentStore::new(vec![post("Slow", &"w ".repeat(25))]);
        let paths = static_paths(&store, &config).unwrap();
        assert_eq!(paths.routes[0].props.reading_time.minutes, 3);
    }
}

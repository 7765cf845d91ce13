//! Build driver: materializes every route into the output directory.
//!
//! ```text
//! content/                          dist/
//! ├── config.toml                   ├── og.png
//! └── blog/                         └── posts/
//!     ├── hello-world.md                ├── hello-world/index.png
//!     └── 2024/deep-dive.md             └── deep-dive/index.png
//! ```
//!
//! Routes render in parallel on the rayon pool. A route whose handler fails
//! is reported and the build carries on; failing to write the output
//! directory aborts it.
//!
//! A [`Site`] owns its own pool, sized by `[processing] max_processes`. Post
//! enumeration and rendering both run inside it, so the setting holds no
//! matter what else in the process has already touched rayon's global pool.
//!
//! Progress is streamed as [`BuildEvent`]s over an optional channel, the same
//! way every long-running stage reports to the CLI.

use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{ContentStore, FsContentStore};
use crate::error::PipelineError;
use crate::og::{OgRenderer, RenderError};
use crate::paths::{StaticPaths, static_paths};
use crate::routes::{RouteContext, RouteTable};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Renderer setup failed: {0}")]
    Render(#[from] RenderError),
    #[error("Failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Progress event emitted while building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// A route was rendered and written.
    Rendered { path: String, bytes: usize },
    /// A route's handler failed; nothing was written for it.
    Failed { path: String, error: String },
    /// A post was left out of the route set.
    Skipped { id: String, reason: String },
}

/// A route that produced no file.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRoute {
    pub path: String,
    pub error: String,
}

/// What a build produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildSummary {
    /// Paths written, in route-table order.
    pub written: Vec<String>,
    pub failed: Vec<FailedRoute>,
    /// Ids of posts excluded from the route set.
    pub skipped: Vec<String>,
    pub bytes: usize,
}

impl BuildSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything a build needs, loaded up front.
#[derive(Debug)]
pub struct BuildInput<'a> {
    pub paths: &'a StaticPaths,
    pub routes: &'a RouteTable,
    pub renderer: &'a OgRenderer,
    pub output_dir: &'a Path,
}

enum Outcome {
    Written { path: String, bytes: usize },
    Failed(FailedRoute),
}

/// Render every route of `input.routes` into `input.output_dir`.
pub fn build(
    input: &BuildInput<'_>,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    let emit = |event: BuildEvent| {
        if let Some(tx) = &events {
            // The receiver may have gone away; the summary still has everything.
            let _ = tx.send(event);
        }
    };

    let mut summary = BuildSummary::default();
    for skipped in &input.paths.skipped {
        emit(BuildEvent::Skipped {
            id: skipped.id.clone(),
            reason: skipped.error.to_string(),
        });
        summary.skipped.push(skipped.id.clone());
    }

    std::fs::create_dir_all(input.output_dir).map_err(|source| BuildError::Io {
        path: input.output_dir.to_path_buf(),
        source,
    })?;

    let ctx = RouteContext {
        renderer: input.renderer,
    };
    let jobs = input.routes.jobs(input.paths);

    let outcomes: Vec<Outcome> = jobs
        .par_iter()
        .map(|job| -> Result<Outcome, BuildError> {
            let path = job.path();
            match job.run(&ctx) {
                Ok(response) => {
                    let target = output_path(input.output_dir, &path);
                    write_file(&target, &response.body)?;
                    emit(BuildEvent::Rendered {
                        path: path.clone(),
                        bytes: response.body.len(),
                    });
                    Ok(Outcome::Written {
                        path,
                        bytes: response.body.len(),
                    })
                }
                Err(e) => {
                    let error = e.to_string();
                    emit(BuildEvent::Failed {
                        path: path.clone(),
                        error: error.clone(),
                    });
                    Ok(Outcome::Failed(FailedRoute { path, error }))
                }
            }
        })
        .collect::<Result<_, _>>()?;

    for outcome in outcomes {
        match outcome {
            Outcome::Written { path, bytes } => {
                summary.bytes += bytes;
                summary.written.push(path);
            }
            Outcome::Failed(failed) => summary.failed.push(failed),
        }
    }
    Ok(summary)
}

/// Load config and posts from `source`, then build into `output_dir`.
pub fn build_site(
    source: &Path,
    output_dir: &Path,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    Site::load(source)?.build(output_dir, events)
}

/// A content directory loaded and ready to render.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub paths: StaticPaths,
    pub routes: RouteTable,
    pub renderer: OgRenderer,
    pool: rayon::ThreadPool,
}

impl Site {
    /// Load config, enumerate posts and set up the renderer for `source`.
    pub fn load(source: &Path) -> Result<Self, BuildError> {
        let config = config::load_config(source)?;
        let store = FsContentStore::from_root(source, &config.content.posts_dir);
        Self::from_store(config, &store, source)
    }

    /// Enumerate `store` under `config`. Font files resolve against
    /// `font_root`.
    pub fn from_store(
        config: SiteConfig,
        store: &dyn ContentStore,
        font_root: &Path,
    ) -> Result<Self, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config::effective_threads(&config.processing))
            .build()?;
        let paths = pool.install(|| static_paths(store, &config))?;
        let renderer = OgRenderer::new(&config, font_root)?;
        Ok(Self {
            config,
            paths,
            routes: RouteTable::standard(),
            renderer,
            pool,
        })
    }

    /// Number of render workers.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every route into `output_dir` on the site's pool.
    pub fn build(
        &self,
        output_dir: &Path,
        events: Option<Sender<BuildEvent>>,
    ) -> Result<BuildSummary, BuildError> {
        self.pool.install(|| {
            build(
                &BuildInput {
                    paths: &self.paths,
                    routes: &self.routes,
                    renderer: &self.renderer,
                    output_dir,
                },
                events,
            )
        })
    }
}

/// Where a route path lands under the output directory.
pub fn output_path(output_dir: &Path, route_path: &str) -> PathBuf {
    route_path
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(output_dir.to_path_buf(), |dir, part| dir.join(part))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;
    use crate::content::{ContentError, PostListing};
    use crate::test_helpers::{post, setup_fixtures, test_config, test_renderer};
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn paths_for(posts: Vec<crate::types::Post>) -> StaticPaths {
        static_paths(&MemoryContentStore::new(posts), &SiteConfig::default()).unwrap()
    }

    fn run(paths: &StaticPaths, out: &Path) -> (BuildSummary, Vec<BuildEvent>) {
        let renderer = test_renderer();
        let routes = RouteTable::standard();
        let (tx, rx) = std::sync::mpsc::channel();
        let summary = build(
            &BuildInput {
                paths,
                routes: &routes,
                renderer: &renderer,
                output_dir: out,
            },
            Some(tx),
        )
        .unwrap();
        (summary, rx.iter().collect())
    }

    #[test]
    fn output_path_maps_route_segments() {
        assert_eq!(
            output_path(Path::new("dist"), "/posts/hello-world/index.png"),
            Path::new("dist/posts/hello-world/index.png")
        );
        assert_eq!(
            output_path(Path::new("dist"), "/og.png"),
            Path::new("dist/og.png")
        );
    }

    #[test]
    fn writes_one_image_per_post_plus_site_image() {
        let tmp = TempDir::new().unwrap();
        let paths = paths_for(vec![post("Hello World!", "hi"), post("Second", "two")]);
        let (summary, events) = run(&paths, tmp.path());

        assert_eq!(
            summary.written,
            vec![
                "/posts/hello-world/index.png",
                "/posts/second/index.png",
                "/og.png"
            ]
        );
        assert!(summary.is_success());
        for path in &summary.written {
            let bytes = std::fs::read(output_path(tmp.path(), path)).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"));
        }
        assert_eq!(events.len(), 3);
        assert!(
            events
                .iter()
                .all(|e| matches!(e, BuildEvent::Rendered { .. }))
        );
    }

    #[test]
    fn empty_store_builds_only_site_image() {
        let tmp = TempDir::new().unwrap();
        let (summary, _) = run(&StaticPaths::default(), tmp.path());
        assert_eq!(summary.written, vec!["/og.png"]);
        assert!(!tmp.path().join("posts").exists());
    }

    #[test]
    fn failed_route_does_not_abort_build() {
        let tmp = TempDir::new().unwrap();
        let mut paths = paths_for(vec![post("Broken", "x"), post("Fine", "y")]);
        paths.routes[0].props.post.title = None;
        let (summary, events) = run(&paths, tmp.path());

        assert_eq!(summary.written, vec!["/posts/fine/index.png", "/og.png"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].path, "/posts/broken/index.png");
        assert!(!summary.is_success());
        assert!(!tmp.path().join("posts/broken/index.png").exists());
        assert!(events.contains(&BuildEvent::Failed {
            path: "/posts/broken/index.png".to_string(),
            error: summary.failed[0].error.clone(),
        }));
    }

    #[test]
    fn skipped_posts_are_reported() {
        let tmp = TempDir::new().unwrap();
        let mut broken = post("Unreadable", "");
        broken.body = None;
        let paths = paths_for(vec![broken, post("Fine", "y")]);
        let (summary, events) = run(&paths, tmp.path());

        assert_eq!(summary.skipped, vec!["unreadable.md"]);
        assert!(matches!(
            &events[0],
            BuildEvent::Skipped { id, .. } if id == "unreadable.md"
        ));
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("dist");
        std::fs::write(&blocker, b"a file, not a directory").unwrap();

        let renderer = test_renderer();
        let routes = RouteTable::standard();
        let paths = StaticPaths::default();
        let result = build(
            &BuildInput {
                paths: &paths,
                routes: &routes,
                renderer: &renderer,
                output_dir: &blocker,
            },
            None,
        );
        assert!(matches!(result, Err(BuildError::Io { .. })));
    }

    #[test]
    fn build_without_listener() {
        let tmp = TempDir::new().unwrap();
        let renderer = test_renderer();
        let routes = RouteTable::standard();
        let paths = paths_for(vec![post("Quiet", "q")]);
        let summary = build(
            &BuildInput {
                paths: &paths,
                routes: &routes,
                renderer: &renderer,
                output_dir: tmp.path(),
            },
            None,
        )
        .unwrap();
        assert_eq!(summary.written.len(), 2);
        assert!(summary.bytes > 0);
    }

    #[test]
    fn site_load_reads_fixture_content() {
        let tmp = setup_fixtures();
        let site = Site::load(tmp.path()).unwrap();
        assert_eq!(site.config.site.title, "Jane's Notes");
        assert_eq!(site.config.og.colors.accent, "#c2410c");
        assert_eq!(site.paths.len(), 2);
        assert_eq!(site.paths.skipped.len(), 1);
        assert!(site.renderer.face_count() > 0);
    }

    /// Records how many workers the pool it was listed from had.
    struct WorkerCountingStore {
        posts: Vec<crate::types::Post>,
        listed_on: AtomicUsize,
    }

    impl ContentStore for WorkerCountingStore {
        fn list_posts(&self, _include_drafts: bool) -> Result<PostListing, ContentError> {
            self.listed_on
                .store(rayon::current_num_threads(), Ordering::SeqCst);
            Ok(PostListing {
                posts: self.posts.clone(),
                rejected: Vec::new(),
            })
        }
    }

    #[test]
    fn max_processes_bounds_enumeration_and_rendering() {
        // Touch the global pool first, the way any earlier rayon use would.
        let global: usize = (0..4).into_par_iter().map(|_| 1).sum();
        assert_eq!(global, 4);

        let mut config = test_config();
        config.processing.max_processes = Some(1);
        let store = WorkerCountingStore {
            posts: vec![post("One", "a"), post("Two", "b")],
            listed_on: AtomicUsize::new(0),
        };
        let site = Site::from_store(config, &store, Path::new(".")).unwrap();

        assert_eq!(site.threads(), 1);
        assert_eq!(store.listed_on.load(Ordering::SeqCst), 1);

        let tmp = TempDir::new().unwrap();
        let summary = site.build(tmp.path(), None).unwrap();
        assert_eq!(summary.written.len(), 3);
    }

    #[test]
    fn default_processing_uses_every_core() {
        let store = WorkerCountingStore {
            posts: Vec::new(),
            listed_on: AtomicUsize::new(0),
        };
        let site = Site::from_store(test_config(), &store, Path::new(".")).unwrap();
        assert_eq!(site.threads(), config::effective_threads(&Default::default()));
        assert_eq!(store.listed_on.load(Ordering::SeqCst), site.threads());
    }
}

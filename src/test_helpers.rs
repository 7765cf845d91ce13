//! Shared test utilities for the ogpress test suite.
//!
//! Provides post builders, renderers with and without the fixture font, and
//! scratch copies of the fixture site.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let published = post("Hello World!", "Some words here.");
//! assert_eq!(published.id, "hello-world.md");
//!
//! let tmp = setup_fixtures();
//! let store = FsContentStore::from_root(tmp.path(), "blog");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::og::OgRenderer;
use crate::slug::derive_slug;
use crate::types::Post;

// =========================================================================
// Fixture setup
// =========================================================================

/// The sample site under `fixtures/content`.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

/// The font the sample site renders with (Tuffy, public domain).
pub fn fixture_font() -> PathBuf {
    fixtures_dir().join("fonts/Tuffy.ttf")
}

/// A scratch copy of the sample site that a test may edit freely.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for entry in walkdir::WalkDir::new(fixtures_dir()) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(fixtures_dir()).unwrap();
        let target = tmp.path().join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

// =========================================================================
// Posts
// =========================================================================

/// A published post. The id is derived from the title: `Hello World!` →
/// `hello-world.md`.
pub fn post(title: &str, body: &str) -> Post {
    Post {
        id: format!("{}.md", derive_slug(title)),
        title: Some(title.to_string()),
        body: Some(body.to_string()),
        ..Post::default()
    }
}

/// A draft post.
pub fn draft(title: &str, body: &str) -> Post {
    Post {
        draft: true,
        ..post(title, body)
    }
}

// =========================================================================
// Rendering
// =========================================================================

/// Default config without system fonts, so output doesn't depend on the
/// machine running the tests.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.og.system_fonts = false;
    config
}

/// Renderer over [`test_config`]. It has no fonts, so text is not drawn.
pub fn test_renderer() -> OgRenderer {
    OgRenderer::new(&test_config(), Path::new(".")).unwrap()
}

/// Renderer over [`test_config`] plus the fixture font.
pub fn font_renderer() -> OgRenderer {
    let mut config = test_config();
    config.og.fonts = vec!["fonts/Tuffy.ttf".to_string()];
    OgRenderer::new(&config, &fixtures_dir()).unwrap()
}

//! Title → URL slug.
//!
//! Slugs are the routable key of every generated image
//! (`/posts/<slug>/index.png`), so they must be stable: the same title always
//! produces the same slug, on any machine.
//!
//! - `"Hello World!"` → `hello-world`
//! - `"Café Crème"` → `cafe-creme` (diacritics folded)
//! - `"  Rust   2024: what's new?  "` → `rust-2024-what-s-new`
//!
//! Uniqueness is not enforced here; see [`paths`](crate::paths) for collision
//! detection.

/// Derive a URL-safe slug from a post title.
///
/// Unicode is transliterated to ASCII, letters are lowercased, and every run
/// of characters that is not an ASCII letter or digit becomes a single `-`.
/// Leading and trailing separators are dropped. A title with no
/// representable characters yields an empty string.
pub fn derive_slug(title: &str) -> String {
    ::slug::slugify(title)
}

//! # ogpress
//!
//! Build-time Open Graph preview images for markdown blogs. Point it at a
//! content directory and it writes one PNG card per published post, plus one
//! for the site, ready to be referenced from `og:image` tags.
//!
//! # Architecture: Post Pipeline
//!
//! Every post goes through the same steps, each a plain function over
//! immutable values:
//!
//! ```text
//! 1. List       content/blog/*.md  →  Post            (drafts filtered)
//! 2. Annotate   Post               →  AnnotatedPost   (reading time)
//! 3. Route      AnnotatedPost      →  RouteDescriptor (slug from title)
//! 4. Render     RouteDescriptor    →  PNG bytes       (SVG card → raster)
//! 5. Write      PNG bytes          →  dist/posts/<slug>/index.png
//! ```
//!
//! A problem with one post (no title, unreadable body) sets that post aside
//! and the others still build. Problems with the site as a whole (unreadable
//! posts directory, two posts claiming the same slug) stop the build.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | `ContentStore` trait; markdown files with TOML front matter, in-memory store |
//! | [`reading_time`] | Word count and minutes-to-read for a post body |
//! | [`slug`] | URL slug from a post title |
//! | [`paths`] | Enumerates the routable posts: drafts out, slugs in, collisions rejected |
//! | [`og`] | Preview card layout (SVG via Maud), rasterization (resvg), PNG encoding |
//! | [`routes`] | Route table mapping URL patterns to image handlers |
//! | [`build`] | Renders every route into the output directory in parallel |
//! | [`config`] | `config.toml` loading, validation and stock defaults |
//! | [`types`] | Values passed between stages (`Post`, `RouteDescriptor`, ...) |
//! | [`error`] | Pipeline errors shared by the stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## SVG as the Layout Language
//!
//! Cards are written as SVG with [Maud](https://maud.lambda.xyz/) and
//! rasterized with resvg. Both are pure Rust, so there is no headless browser
//! and no system library to install. Maud escapes every interpolated value,
//! which matters because titles are user content.
//!
//! ## Explicit Route Table
//!
//! Routes are registered in code ([`routes::RouteTable::standard`]) rather
//! than discovered from the filesystem. The table is the single list of what
//! a build produces, and `check` prints it.
//!
//! ## Collisions Are Errors
//!
//! Two posts whose titles reduce to the same slug would write the same file.
//! Instead of letting the last one win, enumeration fails and names both.
//!
//! ## Reproducible Output
//!
//! Same posts, same config and same fonts give byte-identical PNGs. Ship font
//! files with the content (`[og] fonts`) and turn off `system_fonts` to get
//! the same images on every machine.

pub mod build;
pub mod config;
pub mod content;
pub mod error;
pub mod og;
pub mod output;
pub mod paths;
pub mod reading_time;
pub mod routes;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

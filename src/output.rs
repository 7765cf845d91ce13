//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every post leads
//! with its positional index and title; the source file, route and reading
//! time follow as indented context lines. The result reads as a content
//! inventory while still tracing back to specific files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Hello World!
//!     Source: hello-world.md
//!     Route: /posts/hello-world/index.png
//!     Published: 2024-01-15
//!     Reading time: 1 min read (212 words)
//!
//! Skipped
//!     untitled.md: Post untitled.md is missing required field `title`
//!
//! Routes
//!     /posts/[slug]/index.png (1 image)
//!     /og.png
//!
//! Config
//!     config.toml
//!     Canvas: 1200x630
//!     Fonts: 1 file + system fonts
//! ```
//!
//! ## Build
//!
//! ```text
//! ==> Rendering → dist (4 workers)
//!     /posts/hello-world/index.png (41.2 KB)
//!     /og.png (38.0 KB)
//!     skipped untitled.md: Post untitled.md is missing required field `title`
//!
//! Rendered 2 images (79.2 KB) → dist
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::build::{BuildEvent, BuildSummary};
use crate::config::SiteConfig;
use crate::paths::StaticPaths;
use crate::routes::RouteTable;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte size.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// `1 image`, `3 images`
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the content inventory shown by `check`.
pub fn format_check_output(
    paths: &StaticPaths,
    routes: &RouteTable,
    config: &SiteConfig,
    source_root: &Path,
) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];

    if paths.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (i, route) in paths.routes.iter().enumerate() {
        let post = &route.props.post;
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            post.title.as_deref().unwrap_or_default()
        ));
        lines.push(format!("    Source: {}", post.id));
        if let Some(dynamic) = routes.routes().iter().find(|r| r.pattern.is_dynamic()) {
            lines.push(format!(
                "    Route: {}",
                dynamic.pattern.materialize(Some(route.slug()))
            ));
        }
        if let Some(date) = &post.pub_date {
            lines.push(format!("    Published: {}", date));
        }
        let reading = &route.props.reading_time;
        lines.push(format!(
            "    Reading time: {} ({})",
            reading.text,
            plural(reading.words, "word")
        ));
    }

    if !paths.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &paths.skipped {
            lines.push(format!("    {}: {}", skipped.id, skipped.error));
        }
    }

    lines.push(String::new());
    lines.push("Routes".to_string());
    for route in routes.routes() {
        if route.pattern.is_dynamic() {
            lines.push(format!(
                "    {} ({})",
                route.pattern,
                plural(paths.len(), "image")
            ));
        } else {
            lines.push(format!("    {}", route.pattern));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (stock defaults)".to_string());
    }
    lines.push(format!("    Canvas: {}x{}", config.og.width, config.og.height));
    let fonts = match (config.og.fonts.len(), config.og.system_fonts) {
        (0, true) => "system fonts".to_string(),
        (0, false) => "none".to_string(),
        (n, true) => format!("{} + system fonts", plural(n, "file")),
        (n, false) => plural(n, "file"),
    };
    lines.push(format!("    Fonts: {}", fonts));

    lines
}

/// Print check output to stdout.
pub fn print_check_output(
    paths: &StaticPaths,
    routes: &RouteTable,
    config: &SiteConfig,
    source_root: &Path,
) {
    for line in format_check_output(paths, routes, config, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Header line for a build: where images go and how many workers render them.
pub fn format_build_start(output_dir: &Path, threads: usize) -> String {
    format!(
        "==> Rendering → {} ({})",
        output_dir.display(),
        plural(threads, "worker")
    )
}

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Rendered { path, bytes } => {
            vec![format!("    {} ({})", path, format_size(*bytes))]
        }
        BuildEvent::Failed { path, error } => {
            vec![format!("    {} FAILED", path), format!("        {}", error)]
        }
        BuildEvent::Skipped { id, reason } => {
            vec![format!("    skipped {}: {}", id, reason)]
        }
    }
}

/// Format the closing lines of a build.
pub fn format_build_summary(summary: &BuildSummary, output_dir: &Path) -> Vec<String> {
    let mut lines = vec![String::new()];
    lines.push(format!(
        "Rendered {} ({}) → {}",
        plural(summary.written.len(), "image"),
        format_size(summary.bytes),
        output_dir.display()
    ));
    if !summary.failed.is_empty() {
        lines.push(format!("{} failed:", plural(summary.failed.len(), "route")));
        for failed in &summary.failed {
            lines.push(format!("    {}: {}", failed.path, failed.error));
        }
    }
    if !summary.skipped.is_empty() {
        lines.push(format!(
            "{} skipped",
            plural(summary.skipped.len(), "post")
        ));
    }
    lines
}

/// Print the build summary to stdout.
pub fn print_build_summary(summary: &BuildSummary, output_dir: &Path) {
    for line in format_build_summary(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

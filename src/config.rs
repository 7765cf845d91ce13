//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the user's `config.toml` in the content root. The resolved
//! [`SiteConfig`] is an immutable value handed explicitly to every component
//! that needs it (the enumerator for reading speed, the renderer for layout
//! and fonts).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! website = "https://example.com"
//! author = "Anonymous"
//! title = "My Blog"
//! description = "Thoughts and projects."
//!
//! [content]
//! posts_dir = "blog"        # Relative to the content root
//!
//! [reading]
//! words_per_minute = 200
//!
//! [og]
//! width = 1200
//! height = 630
//! font_family = "sans-serif"
//! fonts = []                # Extra font files, relative to the content root
//! system_fonts = true       # Also load fonts installed on the machine
//!
//! [og.colors]
//! background = "#fefbfb"
//! foreground = "#282728"
//! accent = "#006cac"
//! border = "#282728"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to encode default config: {0}")]
    Defaults(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity of the site, printed on preview images.
    pub site: SiteInfo,
    /// Where posts live inside the content root.
    pub content: ContentConfig,
    /// Reading-time estimation settings.
    pub reading: ReadingConfig,
    /// Preview image canvas, fonts and colors.
    pub og: OgConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.og.width == 0 || self.og.height == 0 {
            return Err(ConfigError::Validation(
                "og.width and og.height must be non-zero".into(),
            ));
        }
        if self.og.width > MAX_CANVAS_EDGE || self.og.height > MAX_CANVAS_EDGE {
            return Err(ConfigError::Validation(format!(
                "og.width and og.height must be at most {MAX_CANVAS_EDGE}"
            )));
        }
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be non-zero".into(),
            ));
        }
        if self.content.posts_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content.posts_dir must not be empty".into(),
            ));
        }
        let colors = &self.og.colors;
        for (key, value) in [
            ("background", &colors.background),
            ("foreground", &colors.foreground),
            ("accent", &colors.accent),
            ("border", &colors.border),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "og.colors.{key} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Largest accepted canvas edge in pixels.
pub const MAX_CANVAS_EDGE: u32 = 4096;

/// Site identity shown on preview images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Deployed site URL. Its host is printed on the site-wide image.
    pub website: String,
    /// Fallback author for posts without an `author` front-matter key.
    pub author: String,
    pub title: String,
    pub description: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            website: "https://example.com".to_string(),
            author: "Anonymous".to_string(),
            title: "My Blog".to_string(),
            description: "Thoughts and projects.".to_string(),
        }
    }
}

impl SiteInfo {
    /// Host part of `website` without scheme or trailing slash.
    pub fn host(&self) -> &str {
        let without_scheme = self
            .website
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.website);
        without_scheme.trim_end_matches('/')
    }
}

/// Location of posts inside the content root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    pub posts_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: "blog".to_string(),
        }
    }
}

/// Reading-time settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// Preview image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// CSS-style font family list used for every text element.
    pub font_family: String,
    /// Font files to load, relative to the content root.
    pub fonts: Vec<String>,
    /// Whether to load the fonts installed on the build machine.
    pub system_fonts: bool,
    pub colors: OgColors,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            font_family: "sans-serif".to_string(),
            fonts: Vec::new(),
            system_fonts: true,
            colors: OgColors::default(),
        }
    }
}

/// Preview image palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgColors {
    pub background: String,
    /// Title and body text.
    pub foreground: String,
    /// Site title and metadata highlights.
    pub accent: String,
    /// Card outline and offset shadow.
    pub border: String,
}

impl Default for OgColors {
    fn default() -> Self {
        Self {
            background: "#fefbfb".to_string(),
            foreground: "#282728".to_string(),
            accent: "#006cac".to_string(),
            border: "#282728".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// `SiteConfig::default()` as a TOML table: the layer `config.toml` is
/// laid over.
pub fn default_table() -> Result<toml::Table, ConfigError> {
    Ok(toml::Table::try_from(SiteConfig::default())?)
}

/// Lay `overlay` over `base`. Sections merge key by key; any other value
/// in `overlay` wins outright.
pub fn overlay_table(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let value = match (base.remove(&key), value) {
            (Some(toml::Value::Table(mut section)), toml::Value::Table(patch)) => {
                overlay_table(&mut section, patch);
                toml::Value::Table(section)
            }
            (_, value) => value,
        };
        base.insert(key, value);
    }
}

/// Parse `<root>/config.toml`, or `None` when the site has no config file.
pub fn read_config_file(root: &Path) -> Result<Option<toml::Table>, ConfigError> {
    match fs::read_to_string(root.join("config.toml")) {
        Ok(text) => Ok(Some(toml::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Site config for a content root: `config.toml` over the defaults, with
/// unknown keys and invalid values rejected.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let mut table = default_table()?;
    if let Some(overlay) = read_config_file(root)? {
        overlay_table(&mut table, overlay);
    }
    let config: SiteConfig = toml::Value::Table(table).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ogpress configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site identity (printed on preview images)
# ---------------------------------------------------------------------------
[site]
# Deployed URL; its host appears on the site-wide preview image.
website = "https://example.com"
# Used for posts that don't set `author` in their front matter.
author = "Anonymous"
title = "My Blog"
description = "Thoughts and projects."

# ---------------------------------------------------------------------------
# Content
# ---------------------------------------------------------------------------
[content]
# Directory holding the posts, relative to the content root.
# Posts are markdown files with TOML front matter between `+++` lines.
posts_dir = "blog"

# ---------------------------------------------------------------------------
# Reading time
# ---------------------------------------------------------------------------
[reading]
words_per_minute = 200

# ---------------------------------------------------------------------------
# Preview images
# ---------------------------------------------------------------------------
[og]
# Canvas size in pixels. 1200x630 is what most social networks expect.
width = 1200
height = 630

# Font family list for all text on the image.
font_family = "sans-serif"

# Extra font files (TTF/OTF), relative to the content root.
# Ship your own fonts here for byte-identical output across machines.
fonts = []

# Also load fonts installed on the build machine.
system_fonts = true

[og.colors]
background = "#fefbfb"
foreground = "#282728"
accent = "#006cac"
border = "#282728"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

//! SVG rasterization and PNG encoding.
//!
//! | Step | Crate |
//! |------|-------|
//! | Fonts | `usvg::fontdb` (configured files, optionally system fonts) |
//! | Parse SVG | `usvg::Tree::from_str` |
//! | Rasterize | `resvg::render` into a `tiny_skia::Pixmap` |
//! | Encode PNG | `image::codecs::png::PngEncoder` |
//!
//! The font database is built once and shared; everything else is per call,
//! so a single [`Rasterizer`] can be used from many rayon workers.

use super::RenderError;
use crate::config::MAX_CANVAS_EDGE;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turns SVG documents into PNG bytes.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl Rasterizer {
    /// Build the font database from font files and, optionally, the fonts
    /// installed on the system.
    ///
    /// When font files are given, the first family they provide becomes the
    /// generic `sans-serif` family, so templates asking for `sans-serif` get
    /// the configured font.
    pub fn new(font_files: &[PathBuf], system_fonts: bool) -> Result<Self, RenderError> {
        let mut db = fontdb::Database::new();
        if system_fonts {
            db.load_system_fonts();
        }

        let mut primary_family = None;
        for path in font_files {
            let family = load_font_file(&mut db, path)?;
            primary_family.get_or_insert(family);
        }
        if let Some(family) = primary_family {
            db.set_sans_serif_family(family);
        }

        Ok(Self {
            fontdb: Arc::new(db),
        })
    }

    /// Number of font faces available to templates.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Rasterize an SVG document onto a `width` × `height` canvas.
    ///
    /// The document is scaled to fill the canvas.
    pub fn render(&self, svg: &str, width: u32, height: u32) -> Result<Pixmap, RenderError> {
        if width == 0 || height == 0 || width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
            return Err(RenderError::Canvas { width, height });
        }

        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)?;

        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        let size = tree.size();
        let transform =
            Transform::from_scale(width as f32 / size.width(), height as f32 / size.height());
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        Ok(pixmap)
    }

    /// Rasterize and encode as PNG.
    pub fn render_png(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let pixmap = self.render(svg, width, height)?;
        encode_png(&pixmap)
    }
}

/// Load one font file, returning the family name of its first face.
fn load_font_file(db: &mut fontdb::Database, path: &Path) -> Result<String, RenderError> {
    let data = std::fs::read(path).map_err(|source| RenderError::FontLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let before: Vec<fontdb::ID> = db.faces().map(|face| face.id).collect();
    db.load_font_data(data);

    db.faces()
        .filter(|face| !before.contains(&face.id))
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        .ok_or_else(|| RenderError::FontLoad {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "no usable font faces in file",
            ),
        })
}

/// Encode a pixmap as an 8-bit RGBA PNG.
///
/// tiny-skia stores premultiplied alpha; PNG wants straight alpha.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &rgba,
        pixmap.width(),
        pixmap.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

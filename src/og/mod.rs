//! Open Graph preview image rendering.
//!
//! A post's metadata is laid out into an SVG card ([`template`]) and
//! rasterized into a PNG ([`raster`]). [`OgRenderer`] owns the immutable
//! pieces (site config, font database) and is shared by reference across
//! render workers.
//!
//! Output is deterministic: identical input, config and fonts give identical
//! bytes.

pub mod layout;
pub mod raster;
pub mod template;

use crate::config::{OgConfig, SiteConfig, SiteInfo};
use crate::error::PipelineError;
use crate::types::{AnnotatedPost, RenderedImage};
use raster::Rasterizer;
use std::path::{Path, PathBuf};
use template::{PostCard, SiteCard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load font {path}: {source}")]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("SVG error: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("Invalid canvas size {width}x{height}")]
    Canvas { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Renders preview images for posts and for the site itself.
#[derive(Debug, Clone)]
pub struct OgRenderer {
    site: SiteInfo,
    og: OgConfig,
    rasterizer: Rasterizer,
}

impl OgRenderer {
    /// Build a renderer, loading `[og] fonts` relative to `font_root`.
    pub fn new(config: &SiteConfig, font_root: &Path) -> Result<Self, RenderError> {
        let font_files: Vec<PathBuf> = config
            .og
            .fonts
            .iter()
            .map(|font| font_root.join(font))
            .collect();
        let rasterizer = Rasterizer::new(&font_files, config.og.system_fonts)?;
        Ok(Self {
            site: config.site.clone(),
            og: config.og.clone(),
            rasterizer,
        })
    }

    /// Render the preview image of one post.
    ///
    /// A post without a usable title fails with
    /// [`PipelineError::MissingField`] and produces no bytes.
    pub fn render_post(&self, post: &AnnotatedPost) -> Result<RenderedImage, PipelineError> {
        let svg = self.post_svg(post)?;
        let bytes = self
            .rasterizer
            .render_png(&svg, self.og.width, self.og.height)?;
        Ok(RenderedImage::png(bytes))
    }

    /// Render the site-wide preview image.
    pub fn render_site(&self) -> Result<RenderedImage, RenderError> {
        let bytes = self
            .rasterizer
            .render_png(&self.site_svg(), self.og.width, self.og.height)?;
        Ok(RenderedImage::png(bytes))
    }

    /// The SVG document behind [`render_post`](Self::render_post).
    pub fn post_svg(&self, post: &AnnotatedPost) -> Result<String, PipelineError> {
        let card = post_card(post, &self.site)?;
        Ok(template::post_svg(&card, &self.og))
    }

    /// The SVG document behind [`render_site`](Self::render_site).
    pub fn site_svg(&self) -> String {
        let card = SiteCard {
            title: self.site.title.clone(),
            description: self.site.description.clone(),
            host: self.site.host().to_string(),
        };
        template::site_svg(&card, &self.og)
    }

    /// Number of font faces the renderer can draw text with.
    pub fn face_count(&self) -> usize {
        self.rasterizer.face_count()
    }
}

/// Card text for a post. Author falls back to the site author.
fn post_card(
    post: &AnnotatedPost,
    site: &SiteInfo,
) -> Result<PostCard, PipelineError> {
    let title = post
        .post
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PipelineError::MissingField {
            id: post.post.id.clone(),
            field: "title",
        })?;

    let meta = match &post.post.pub_date {
        Some(date) => format!("{} · {}", date.human(), post.reading_time.text),
        None => post.reading_time.text.clone(),
    };

    Ok(PostCard {
        title: title.to_string(),
        description: post.post.description.clone(),
        author: post
            .post
            .author
            .clone()
            .unwrap_or_else(|| site.author.clone()),
        meta,
        site_title: site.title.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_time::annotate_post;
    use crate::test_helpers::{font_renderer, post, test_renderer};
    use crate::types::{PNG_CONTENT_TYPE, PostDate};

    fn annotated(title: &str, body: &str) -> AnnotatedPost {
        annotate_post(post(title, body), 200).unwrap()
    }

    #[test]
    fn renders_png_at_configured_size() {
        let image = test_renderer()
            .render_post(&annotated("Hello World!", "Some words here."))
            .unwrap();
        assert_eq!(image.content_type, PNG_CONTENT_TYPE);
        assert!(image.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1200, 630));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = test_renderer();
        let p = annotated("Same Input", "Same body");
        assert_eq!(
            renderer.render_post(&p).unwrap(),
            renderer.render_post(&p).unwrap()
        );
    }

    #[test]
    fn missing_title_is_missing_field_without_bytes() {
        let mut p = annotated("Placeholder", "body");
        p.post.title = None;
        let result = test_renderer().render_post(&p);
        match result {
            Err(PipelineError::MissingField { id, field }) => {
                assert_eq!(id, "placeholder.md");
                assert_eq!(field, "title");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn blank_title_is_missing_field() {
        let mut p = annotated("Placeholder", "body");
        p.post.title = Some("   ".to_string());
        assert!(matches!(
            test_renderer().render_post(&p),
            Err(PipelineError::MissingField { field: "title", .. })
        ));
    }

    #[test]
    fn card_shows_date_reading_time_and_author() {
        let mut p = annotated("Dated", &"word ".repeat(450));
        p.post.pub_date = Some(PostDate {
            year: 2024,
            month: 1,
            day: 15,
        });
        p.post.author = Some("Jane Doe".to_string());
        let svg = test_renderer().post_svg(&p).unwrap();
        assert!(svg.contains("Jan 15, 2024 · 3 min read"));
        assert!(svg.contains(">Jane Doe</tspan>"));
    }

    #[test]
    fn author_falls_back_to_site_author() {
        let p = annotated("No Author", "text");
        let renderer = test_renderer();
        let svg = renderer.post_svg(&p).unwrap();
        assert!(svg.contains(&format!(">{}</tspan>", renderer.site.author)));
        assert!(svg.contains("1 min read"));
    }

    #[test]
    fn different_posts_render_different_svg() {
        let renderer = test_renderer();
        let a = renderer.post_svg(&annotated("First", "x")).unwrap();
        let b = renderer.post_svg(&annotated("Second", "x")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn site_image_renders() {
        let renderer = test_renderer();
        let image = renderer.render_site().unwrap();
        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1200, 630));
        assert!(renderer.site_svg().contains("example.com"));
    }

    #[test]
    fn custom_canvas_size() {
        let mut config = SiteConfig::default();
        config.og.width = 600;
        config.og.height = 315;
        config.og.system_fonts = false;
        let renderer = OgRenderer::new(&config, Path::new(".")).unwrap();
        let image = renderer.render_post(&annotated("Small", "x")).unwrap();
        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (600, 315));
    }

    /// Pixels in the title band that carry the default foreground color.
    fn title_ink(image: &RenderedImage) -> usize {
        let img = image::load_from_memory(&image.bytes).unwrap().to_rgba8();
        let mut count = 0;
        for y in 100..190 {
            for x in 110..1070 {
                let [r, g, b, _] = img.get_pixel(x, y).0;
                if r.abs_diff(0x28) < 24 && g.abs_diff(0x27) < 24 && b.abs_diff(0x28) < 24 {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn configured_font_draws_title() {
        let renderer = font_renderer();
        assert!(renderer.face_count() > 0);

        let titled = renderer
            .render_post(&annotated("Hello World!", "Some words here."))
            .unwrap();
        let fontless = test_renderer()
            .render_post(&annotated("Hello World!", "Some words here."))
            .unwrap();

        assert!(title_ink(&titled) > 500, "title not rasterized");
        assert_eq!(title_ink(&fontless), 0);
    }

    #[test]
    fn missing_configured_font_fails_construction() {
        let mut config = SiteConfig::default();
        config.og.system_fonts = false;
        config.og.fonts = vec!["fonts/missing.ttf".to_string()];
        let tmp = tempfile::TempDir::new().unwrap();
        match OgRenderer::new(&config, tmp.path()) {
            Err(RenderError::FontLoad { path, .. }) => {
                assert_eq!(path, tmp.path().join("fonts/missing.ttf"))
            }
            other => panic!("expected FontLoad, got {other:?}"),
        }
    }
}

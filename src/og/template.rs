//! SVG documents for preview cards.
//!
//! Templates are written with maud. Its auto-escaping of `&`, `<`, `>` and `"`
//! keeps arbitrary titles well-formed XML. Every element carries an explicit
//! body (`{}`) so maud never emits an unclosed void tag.
//!
//! Geometry is defined for a 1200×630 canvas and scaled to the configured
//! size.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ┌────────────────────────────────────────┐  │
//! │  │ Title, up to three lines               │▌ │
//! │  │ Description, one or two lines          │▌ │
//! │  │                                        │▌ │
//! │  │ Jan 15, 2024 · 3 min read              │▌ │
//! │  │ by Author                   Site Title │▌ │
//! │  └────────────────────────────────────────┘▌ │
//! │    ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀  │
//! └──────────────────────────────────────────────┘
//! ```

use super::layout::{TextBlock, chars_per_line, clean_text, fit_block, fit_lines};
use crate::config::OgConfig;
use maud::{Markup, html};

const BASE_WIDTH: f32 = 1200.0;
const BASE_HEIGHT: f32 = 630.0;

const TITLE_SIZES: [f32; 4] = [72.0, 64.0, 56.0, 48.0];
const SITE_TITLE_SIZES: [f32; 3] = [80.0, 68.0, 56.0];

/// Text shown on a post card.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    /// Date and reading time, e.g. `Jan 15, 2024 · 3 min read`.
    pub meta: String,
    pub site_title: String,
}

/// Text shown on the site-wide card.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteCard {
    pub title: String,
    pub description: String,
    pub host: String,
}

/// Card frame and content box, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    scale: f32,
    card_x: f32,
    card_y: f32,
    card_w: f32,
    card_h: f32,
    shadow: f32,
    stroke: f32,
    radius: f32,
    pad: f32,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        let sx = width as f32 / BASE_WIDTH;
        let sy = height as f32 / BASE_HEIGHT;
        let scale = sx.min(sy);
        let shadow = 16.0 * scale;
        let card_x = 48.0 * sx;
        let card_y = 40.0 * sy;
        Self {
            scale,
            card_x,
            card_y,
            card_w: width as f32 - 2.0 * card_x - shadow,
            card_h: height as f32 - 2.0 * card_y - shadow,
            shadow,
            stroke: 4.0 * scale,
            radius: 8.0 * scale,
            pad: 56.0 * scale,
        }
    }

    fn content_left(&self) -> f32 {
        self.card_x + self.pad
    }

    fn content_right(&self) -> f32 {
        self.card_x + self.card_w - self.pad
    }

    fn content_top(&self) -> f32 {
        self.card_y + self.pad
    }

    fn content_bottom(&self) -> f32 {
        self.card_y + self.card_h - self.pad
    }

    fn content_width(&self) -> f32 {
        (self.content_right() - self.content_left()).max(1.0)
    }

    fn scaled(&self, sizes: &[f32]) -> Vec<f32> {
        sizes.iter().map(|s| s * self.scale).collect()
    }
}

/// Background, offset shadow and card outline, wrapping `content`.
fn canvas(width: u32, height: u32, frame: &Frame, og: &OgConfig, content: Markup) -> String {
    let colors = &og.colors;
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width=(width) height=(height)
            viewBox=(format!("0 0 {width} {height}")) {
            rect x="0" y="0" width=(width) height=(height) fill=(colors.background) {}
            rect x=(frame.card_x + frame.shadow) y=(frame.card_y + frame.shadow)
                width=(frame.card_w) height=(frame.card_h) rx=(frame.radius)
                fill=(colors.border) {}
            rect x=(frame.card_x) y=(frame.card_y) width=(frame.card_w) height=(frame.card_h)
                rx=(frame.radius) fill=(colors.background)
                stroke=(colors.border) stroke-width=(frame.stroke) {}
            g font-family=(og.font_family) {
                (content)
            }
        }
    }
    .into_string()
}

/// Lines of a block as `<tspan>`s starting at baseline `first_baseline`.
fn block_text(
    block: &TextBlock,
    x: f32,
    first_baseline: f32,
    fill: &str,
    weight: &str,
    anchor: &str,
    opacity: f32,
) -> Markup {
    html! {
        text x=(x) y=(first_baseline) font-size=(block.font_size) font-weight=(weight)
            text-anchor=(anchor) fill=(fill) fill-opacity=(opacity) {
            @for (i, line) in block.lines.iter().enumerate() {
                tspan x=(x) y=(first_baseline + i as f32 * block.line_height) { (line) }
            }
        }
    }
}

/// SVG document for a post card.
pub fn post_svg(card: &PostCard, og: &OgConfig) -> String {
    let frame = Frame::new(og.width, og.height);
    let colors = &og.colors;
    let width = frame.content_width();
    let left = frame.content_left();

    let title = fit_block(
        &clean_text(&card.title),
        width,
        &frame.scaled(&TITLE_SIZES),
        3,
        1.2,
    );
    let title_top = frame.content_top() + title.font_size;

    let description_lines = if title.lines.len() >= 3 { 1 } else { 2 };
    let description_size = 30.0 * frame.scale;
    let description = card
        .description
        .as_deref()
        .map(clean_text)
        .filter(|d| !d.is_empty())
        .map(|d| TextBlock {
            lines: fit_lines(
                &d,
                chars_per_line(width, description_size),
                description_lines,
            ),
            font_size: description_size,
            line_height: description_size * 1.4,
        });
    let description_top =
        title_top + title.height() - title.line_height + 24.0 * frame.scale + description_size;

    let footer_size = 28.0 * frame.scale;
    let meta_size = 24.0 * frame.scale;
    let footer_baseline = frame.content_bottom();
    let meta_baseline = footer_baseline - footer_size - 16.0 * frame.scale;

    let content = html! {
        (block_text(&title, left, title_top, &colors.foreground, "700", "start", 1.0))
        @if let Some(description) = &description {
            (block_text(description, left, description_top, &colors.foreground, "400", "start", 0.8))
        }
        @if !card.meta.is_empty() {
            text x=(left) y=(meta_baseline) font-size=(meta_size)
                fill=(colors.foreground) fill-opacity="0.7" {
                (clean_text(&card.meta))
            }
        }
        text x=(left) y=(footer_baseline) font-size=(footer_size) fill=(colors.foreground) {
            "by "
            tspan font-weight="700" { (clean_text(&card.author)) }
        }
        text x=(frame.content_right()) y=(footer_baseline) font-size=(footer_size)
            font-weight="700" text-anchor="end" fill=(colors.accent) {
            (clean_text(&card.site_title))
        }
    };

    canvas(og.width, og.height, &frame, og, content)
}

/// SVG document for the site-wide card.
pub fn site_svg(card: &SiteCard, og: &OgConfig) -> String {
    let frame = Frame::new(og.width, og.height);
    let colors = &og.colors;
    let width = frame.content_width();
    let center = frame.card_x + frame.card_w / 2.0;

    let title = fit_block(
        &clean_text(&card.title),
        width,
        &frame.scaled(&SITE_TITLE_SIZES),
        2,
        1.2,
    );
    let description_size = 34.0 * frame.scale;
    let description = TextBlock {
        lines: fit_lines(
            &clean_text(&card.description),
            chars_per_line(width, description_size),
            3,
        ),
        font_size: description_size,
        line_height: description_size * 1.4,
    };

    let gap = 32.0 * frame.scale;
    let stack_height = title.height() + gap + description.height();
    let stack_top = frame.card_y + (frame.card_h - stack_height) / 2.0;
    let title_baseline = stack_top + title.font_size;
    let description_baseline = stack_top + title.height() + gap + description.font_size;

    let content = html! {
        (block_text(&title, center, title_baseline, &colors.foreground, "700", "middle", 1.0))
        (block_text(&description, center, description_baseline, &colors.foreground, "400", "middle", 0.8))
        text x=(frame.content_right()) y=(frame.content_bottom()) font-size=(28.0 * frame.scale)
            font-weight="700" text-anchor="end" fill=(colors.accent) {
            (clean_text(&card.host))
        }
    };

    canvas(og.width, og.height, &frame, og, content)
}

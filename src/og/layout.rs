//! Pure text layout for preview cards.
//!
//! There is no text shaping at this stage: widths are estimated from an
//! average glyph width, which is close enough to keep lines inside the card
//! for Latin text. Everything here is plain string math, testable without
//! fonts.

/// Average advance of a glyph as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.55;

/// Appended to text cut short by [`fit_lines`].
pub const ELLIPSIS: char = '…';

/// A wrapped block of text at a chosen size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub line_height: f32,
}

impl TextBlock {
    /// Vertical space taken by the block.
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// How many glyphs of `font_size` fit across `width`. Never below one.
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    let glyph = (font_size * AVG_GLYPH_WIDTH).max(1.0);
    ((width / glyph).floor() as usize).max(1)
}

/// Drop control characters and collapse whitespace runs to single spaces.
///
/// Control characters are not allowed in the SVG document.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Greedy word wrap at `max_chars` per line.
///
/// Words longer than a line are broken across lines.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(max_chars) {
            let chunk_len = chunk.len();
            let needed = if current_len == 0 {
                chunk_len
            } else {
                current_len + 1 + chunk_len
            };
            if needed > max_chars && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chunk);
            current_len += chunk_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Wrap and keep at most `max_lines`, ending the last kept line with an
/// ellipsis when text was dropped.
pub fn fit_lines(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines = wrap_words(text, max_chars);
    if max_lines == 0 {
        return Vec::new();
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = max_chars.max(1) - 1;
            let mut shortened: String = last.chars().take(keep).collect();
            shortened.truncate(shortened.trim_end().len());
            shortened.push(ELLIPSIS);
            *last = shortened;
        }
    }
    lines
}

/// Pick the largest font size from `sizes` (largest first) whose wrapped text
/// fits in `max_lines`. If none fits, the smallest size is used and the text is
/// cut with an ellipsis.
pub fn fit_block(
    text: &str,
    width: f32,
    sizes: &[f32],
    max_lines: usize,
    line_spacing: f32,
) -> TextBlock {
    let mut chosen = None;
    for &size in sizes {
        let lines = wrap_words(text, chars_per_line(width, size));
        if lines.len() <= max_lines {
            chosen = Some((size, lines));
            break;
        }
    }
    let (font_size, lines) = chosen.unwrap_or_else(|| {
        let size = sizes.last().copied().unwrap_or(32.0);
        (size, fit_lines(text, chars_per_line(width, size), max_lines))
    });
    TextBlock {
        lines,
        font_size,
        line_height: font_size * line_spacing,
    }
}

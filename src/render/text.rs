//! Multi-line text layout shared by backends.
//!
//! Shaping itself stays inside each backend; these helpers only split text
//! into lines and place the lines of a block.

use smallvec::SmallVec;

use crate::core::ScreenPoint;
use crate::render::{HorizontalAlign, TextSize, VerticalAlign};

/// Extra space between consecutive lines, in device units.
///
/// Line `i` of a block is drawn at `y + i * (font_size + MULTILINE_SPACING)`.
pub const MULTILINE_SPACING: f64 = 5.0;

pub type Lines<'a> = SmallVec<[&'a str; 4]>;

/// Splits on CRLF, LF and CR. An empty input yields one empty line, and a
/// trailing break yields a trailing empty line.
#[must_use]
pub fn split_lines(text: &str) -> Lines<'_> {
    let mut lines = Lines::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\r' => {
                lines.push(&text[start..index]);
                if bytes.get(index + 1) == Some(&b'\n') {
                    index += 1;
                }
                start = index + 1;
            }
            b'\n' => {
                lines.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
        index += 1;
    }
    lines.push(&text[start..]);
    lines
}

#[must_use]
pub fn line_height(font_size: f64) -> f64 {
    font_size + MULTILINE_SPACING
}

/// Size of a block given per-line widths.
#[must_use]
pub fn block_size(line_widths: impl IntoIterator<Item = f64>, font_size: f64) -> TextSize {
    let mut count = 0usize;
    let mut width = 0.0_f64;
    for line_width in line_widths {
        count += 1;
        width = width.max(line_width);
    }
    if count == 0 {
        return TextSize::default();
    }
    let height = count as f64 * font_size + (count - 1) as f64 * MULTILINE_SPACING;
    TextSize::new(width, height)
}

/// Offset of the block's top-left corner relative to its anchor, before
/// rotation.
#[must_use]
pub fn block_offset(size: TextSize, h_align: HorizontalAlign, v_align: VerticalAlign) -> ScreenPoint {
    let dx = match h_align {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => -size.width * 0.5,
        HorizontalAlign::Right => -size.width,
    };
    let dy = match v_align {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Middle => -size.height * 0.5,
        VerticalAlign::Bottom => -size.height,
    };
    ScreenPoint::new(dx, dy)
}

/// Horizontal offset of one line inside its block.
#[must_use]
pub fn line_offset_x(line_width: f64, block_width: f64, h_align: HorizontalAlign) -> f64 {
    match h_align {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => (block_width - line_width) * 0.5,
        HorizontalAlign::Right => block_width - line_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_breaks_split_into_four_lines() {
        let lines = split_lines("A\r\nB\nC\rD");
        assert_eq!(lines.as_slice(), &["A", "B", "C", "D"]);
    }

    #[test]
    fn empty_and_trailing_breaks_keep_empty_lines() {
        assert_eq!(split_lines("").as_slice(), &[""]);
        assert_eq!(split_lines("A\n").as_slice(), &["A", ""]);
        assert_eq!(split_lines("\r\n\r\n").len(), 3);
    }

    #[test]
    fn block_height_accounts_for_spacing() {
        let size = block_size([10.0, 30.0, 20.0], 12.0);
        assert_eq!(size.width, 30.0);
        assert_eq!(size.height, 3.0 * 12.0 + 2.0 * MULTILINE_SPACING);
    }

    #[test]
    fn centered_block_offset_is_half_size() {
        let offset = block_offset(
            TextSize::new(40.0, 20.0),
            HorizontalAlign::Center,
            VerticalAlign::Middle,
        );
        assert_eq!(offset, ScreenPoint::new(-20.0, -10.0));
    }
}

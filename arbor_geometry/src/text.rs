// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed text metric for deriving note heights.

/// Characters that fit into one block of width at the standard note font.
///
/// A fixed metric keeps layout a pure function of the document: the same text
/// always wraps to the same number of lines regardless of renderer.
pub const NOTE_CHARS_PER_BLOCK: usize = 7;

/// Number of wrapped lines `text` occupies in a strip `width_bl` blocks wide.
///
/// Always at least 1, including for empty text (an empty note still has one
/// line of height).
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "small character count")]
pub fn line_count(text: &str, width_bl: f64) -> usize {
    let per_line = ((width_bl * NOTE_CHARS_PER_BLOCK as f64) as usize).max(1);
    let chars = text.chars().count();
    if chars == 0 {
        return 1;
    }
    chars.div_ceil(per_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(line_count("", 4.0), 1);
    }

    #[test]
    fn text_wraps_at_block_capacity() {
        // 4 blocks = 28 chars per line.
        assert_eq!(line_count(&"x".repeat(28), 4.0), 1);
        assert_eq!(line_count(&"x".repeat(29), 4.0), 2);
        assert_eq!(line_count(&"x".repeat(57), 4.0), 3);
    }

    #[test]
    fn narrow_strip_still_fits_one_char_per_line() {
        assert_eq!(line_count("abc", 0.05), 3);
    }
}

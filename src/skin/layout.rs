/// Horizontal justification of each line inside the wrap width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
}

impl HorizontalAlign {
    /// Left edge offset for a line of `line_width` inside `wrap_width`.
    pub fn offset(self, wrap_width: f32, line_width: f32) -> f32 {
        match self {
            Self::Start => 0.0,
            Self::Center => (wrap_width - line_width) / 2.0,
            Self::End => wrap_width - line_width,
        }
    }
}

/// One entry of the line-break table: a wrapped substring and its measured
/// width in logical units.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredLine {
    pub text: String,
    pub width: f32,
}

/// Breaks `text` into lines no wider than `wrap_width`.
///
/// Explicit newlines always terminate a line. Within a paragraph words are
/// kept whole while they fit; a single word wider than the wrap width falls
/// back to a hard character break so no content is lost. Spaces that would
/// start a wrapped line are dropped.
///
/// `measure` is injected so layout can run against any [`TextEngine`]
/// (or a fixed-advance fake in tests).
///
/// [`TextEngine`]: crate::engine::TextEngine
pub fn break_lines(
    text: &str,
    wrap_width: f32,
    measure: &mut dyn FnMut(&str) -> f32,
) -> Vec<MeasuredLine> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for word in paragraph.split(' ') {
            if word.is_empty() {
                // Consecutive spaces collapse at wrap points; inside a line
                // they are preserved by the candidate join below.
                continue;
            }

            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };

            if measure(&candidate) <= wrap_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                push_measured(&mut lines, line, measure);
                line = String::new();
            }

            if measure(word) <= wrap_width {
                line = word.to_string();
            } else {
                line = hard_break(&mut lines, word, wrap_width, measure);
            }
        }

        push_measured(&mut lines, line, measure);
    }

    lines
}

/// Splits an overlong word into the largest chunks that still fit.
///
/// Every full chunk becomes its own line; the trailing remainder is returned
/// as the new current line so following words can continue it.
fn hard_break(
    lines: &mut Vec<MeasuredLine>,
    word: &str,
    wrap_width: f32,
    measure: &mut dyn FnMut(&str) -> f32,
) -> String {
    let mut chunk = String::new();

    for ch in word.chars() {
        let mut candidate = chunk.clone();
        candidate.push(ch);

        if measure(&candidate) <= wrap_width || chunk.is_empty() {
            // A single glyph wider than the wrap width is emitted as-is
            // rather than dropped.
            chunk = candidate;
        } else {
            push_measured(lines, chunk, measure);
            chunk = ch.to_string();
        }
    }

    chunk
}

fn push_measured(lines: &mut Vec<MeasuredLine>, text: String, measure: &mut dyn FnMut(&str) -> f32) {
    let width = if text.is_empty() { 0.0 } else { measure(&text) };
    lines.push(MeasuredLine { text, width });
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 units per char keeps the arithmetic readable.
    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    fn lines_of(text: &str, wrap: f32) -> Vec<String> {
        break_lines(text, wrap, &mut mono)
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(HorizontalAlign::Start.offset(300.0, 100.0), 0.0);
        assert_eq!(HorizontalAlign::Center.offset(300.0, 100.0), 100.0);
        assert_eq!(HorizontalAlign::End.offset(300.0, 100.0), 200.0);
    }

    #[test]
    fn short_text_is_one_line() {
        let lines = break_lines("hello", 300.0, &mut mono);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "hello");
        assert_eq!(lines[0].width, 50.0);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        // "aaa bbb" is 70 units; a 50 unit wrap forces a break.
        assert_eq!(lines_of("aaa bbb", 50.0), vec!["aaa", "bbb"]);
    }

    #[test]
    fn keeps_words_together_when_they_fit() {
        assert_eq!(lines_of("aa bb cc", 50.0), vec!["aa bb", "cc"]);
    }

    #[test]
    fn explicit_newlines_always_break() {
        assert_eq!(lines_of("aa\nbb", 500.0), vec!["aa", "bb"]);
        // Blank rows are preserved so vertical spacing stays stable.
        assert_eq!(lines_of("aa\n\nbb", 500.0), vec!["aa", "", "bb"]);
    }

    #[test]
    fn hard_breaks_overlong_words() {
        assert_eq!(lines_of("abcdefgh", 30.0), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn remainder_of_broken_word_continues_the_line() {
        assert_eq!(lines_of("abcde fg", 40.0), vec!["abcd", "e fg"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let lines = break_lines("", 300.0, &mut mono);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "");
        assert_eq!(lines[0].width, 0.0);
    }
}

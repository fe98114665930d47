//! Greedy word wrap at a fixed font size.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::MetricsProvider;

/// One wrapped line and its measured width at the wrap's font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedLine {
    pub text: String,
    pub width_px: f32,
}

impl WrappedLine {
    /// True if the line holds exactly one word (the only case allowed to overflow).
    #[cfg(test)]
    pub fn is_single_word(&self) -> bool {
        self.text.split_whitespace().nth(1).is_none()
    }
}

/// Wraps `text` into lines no wider than `max_width_px` at `font_px`.
///
/// Words are split on any whitespace and rejoined with single spaces. Each line
/// is filled with as many words as fit; a word that alone exceeds the limit is
/// emitted on its own line rather than split. An empty or all-whitespace string
/// returns no lines.
pub fn wrap_words(
    text: &str,
    font_px: u32,
    max_width_px: f32,
    metrics: &dyn MetricsProvider,
) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            current_width = metrics.measure_width(&current, font_px);
            continue;
        }

        let candidate = format!("{current} {word}");
        let candidate_width = metrics.measure_width(&candidate, font_px);
        if candidate_width <= max_width_px {
            current = candidate;
            current_width = candidate_width;
        } else {
            // Line is full; the word opens the next one even if it overflows alone.
            lines.push(WrappedLine {
                text: std::mem::take(&mut current),
                width_px: current_width,
            });
            current.push_str(word);
            current_width = metrics.measure_width(&current, font_px);
        }
    }

    if !current.is_empty() {
        lines.push(WrappedLine {
            text: current,
            width_px: current_width,
        });
    }
    lines
}

/// Widest measured line, or 0.0 for no lines.
pub fn widest(lines: &[WrappedLine]) -> f32 {
    lines.iter().map(|l| l.width_px).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{FontFamily, TableMetrics};

    /// Every character is 0.5em wide; makes widths easy to reason about.
    struct HalfEm;

    impl MetricsProvider for HalfEm {
        fn measure_width(&self, text: &str, font_px: u32) -> f32 {
            text.chars().count() as f32 * 0.5 * font_px as f32
        }

        fn line_height(&self, font_px: u32) -> f32 {
            font_px as f32
        }
    }

    #[test]
    fn test_wrap_empty_text_returns_no_lines() {
        assert!(wrap_words("", 20, 100.0, &HalfEm).is_empty());
        assert!(wrap_words("   \n\t ", 20, 100.0, &HalfEm).is_empty());
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        // "AB CD" = 5 chars × 10px = 50px
        let lines = wrap_words("AB CD", 20, 50.0, &HalfEm);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "AB CD");
        assert!((lines[0].width_px - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_breaks_before_overflowing_word() {
        // Limit 50px = 5 chars: "AB CD" fits, " EF" would make 8 chars.
        let lines = wrap_words("AB CD EF", 20, 50.0, &HalfEm);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["AB CD", "EF"]);
    }

    #[test]
    fn test_wrap_preserves_word_order() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_words(text, 10, 60.0, &HalfEm);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.text.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original, "wrapping must not reorder or drop words");
    }

    #[test]
    fn test_wrap_over_wide_word_gets_own_line() {
        let lines = wrap_words("HI SUPERCALIFRAGILISTIC OK", 20, 50.0, &HalfEm);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["HI", "SUPERCALIFRAGILISTIC", "OK"]);
        assert!(lines[1].width_px > 50.0, "long word overflows");
        assert!(lines[1].is_single_word());
    }

    #[test]
    fn test_wrap_collapses_whitespace_runs() {
        let lines = wrap_words("  WHEN\t\tTHE   BASS  ", 20, 1000.0, &HalfEm);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "WHEN THE BASS");
    }

    #[test]
    fn test_multi_word_lines_never_exceed_limit() {
        let metrics = TableMetrics::new(FontFamily::Impact);
        let text = "ME EXPLAINING TO MY MOM WHY I NEED A SEVENTH GUITAR WHEN I CANNOT PLAY THE FIRST SIX";
        for size in [18, 32, 48, 72] {
            for line in wrap_words(text, size, 300.0, &metrics) {
                assert!(
                    line.width_px <= 300.0 || line.is_single_word(),
                    "line '{}' is {}px at {}px font",
                    line.text,
                    line.width_px,
                    size
                );
            }
        }
    }

    #[test]
    fn test_widest_of_no_lines_is_zero() {
        assert_eq!(widest(&[]), 0.0);
    }
}

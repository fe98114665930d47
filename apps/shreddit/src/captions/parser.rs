use serde::{Deserialize, Serialize};

/// Top and bottom caption text for one meme. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captions {
    pub top: String,
    pub bottom: String,
}

impl Captions {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }

    /// True if neither band has any visible text.
    pub fn is_empty(&self) -> bool {
        self.top.trim().is_empty() && self.bottom.trim().is_empty()
    }
}

const TOP_MARKER: &str = "TOP TEXT:";
const BOTTOM_MARKER: &str = "BOTTOM TEXT:";

/// Extracts `TOP TEXT: …` / `BOTTOM TEXT: …` lines from a model reply.
///
/// Markers are matched case-insensitively after stripping list bullets and
/// bold markers; surrounding quotes on the value are dropped. When a marker
/// repeats, the last occurrence wins. Missing markers leave that side empty.
pub fn parse_captions(reply: &str) -> Captions {
    let mut captions = Captions::default();

    for raw in reply.lines() {
        let line = raw
            .trim()
            .trim_start_matches(['-', '*', '#', ' '])
            .replace("**", "");

        if let Some(value) = strip_marker(&line, TOP_MARKER) {
            captions.top = value;
        } else if let Some(value) = strip_marker(&line, BOTTOM_MARKER) {
            captions.bottom = value;
        }
    }

    captions
}

fn strip_marker(line: &str, marker: &str) -> Option<String> {
    let head = line.get(..marker.len())?;
    if !head.eq_ignore_ascii_case(marker) {
        return None;
    }
    let value = line[marker.len()..]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim();
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_format() {
        let c = parse_captions("TOP TEXT: When the drummer\nBOTTOM TEXT: Counts in wrong");
        assert_eq!(c.top, "When the drummer");
        assert_eq!(c.bottom, "Counts in wrong");
    }

    #[test]
    fn test_parses_decorated_lines() {
        let reply = "Here you go:\n**TOP TEXT:** \"One more song\"\n- bottom text: 'Forty minutes later'";
        let c = parse_captions(reply);
        assert_eq!(c.top, "One more song");
        assert_eq!(c.bottom, "Forty minutes later");
    }

    #[test]
    fn test_missing_marker_leaves_side_empty() {
        let c = parse_captions("TOP TEXT: Only the top");
        assert_eq!(c.top, "Only the top");
        assert!(c.bottom.is_empty(), "bottom should be empty when not provided");
        assert!(!c.is_empty());
    }

    #[test]
    fn test_unstructured_reply_is_empty() {
        let c = parse_captions("Sorry, I can't help with that.");
        assert!(c.is_empty(), "free text without markers must produce no captions");
    }

    #[test]
    fn test_non_ascii_line_does_not_panic() {
        let c = parse_captions("é\nTOP TEXT: ok");
        assert_eq!(c.top, "ok");
    }
}

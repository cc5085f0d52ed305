//! Splits display text into matched and unmatched runs for a query.

use regex::RegexBuilder;

/// One contiguous run of display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Returns the runs of `text`, marking every case-insensitive occurrence of
/// the trimmed `query`. The query is matched literally.
///
/// A blank query, or one that does not occur, yields a single plain run.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let plain = || {
        vec![Segment {
            text,
            matched: false,
        }]
    };
    let needle = query.trim();
    if needle.is_empty() || text.is_empty() {
        return plain();
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    else {
        return plain();
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment {
                text: &text[cursor..found.start()],
                matched: false,
            });
        }
        segments.push(Segment {
            text: found.as_str(),
            matched: true,
        });
        cursor = found.end();
    }
    if segments.is_empty() {
        return plain();
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: &text[cursor..],
            matched: false,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::{highlight, Segment};

    #[test]
    fn marks_every_occurrence_case_insensitively() {
        let segments = highlight("Two Sum and two pointers", "TWO");
        assert_eq!(
            segments,
            vec![
                Segment {
                    text: "Two",
                    matched: true
                },
                Segment {
                    text: " Sum and ",
                    matched: false
                },
                Segment {
                    text: "two",
                    matched: true
                },
                Segment {
                    text: " pointers",
                    matched: false
                },
            ]
        );
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let segments = highlight("a+b (c)", "+b (");
        let matched: Vec<_> = segments.iter().filter(|s| s.matched).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].text, "+b (");
    }

    #[test]
    fn blank_or_missing_query_returns_text_unchanged() {
        assert_eq!(highlight("Arrays", "  ").len(), 1);
        let segments = highlight("Arrays", "graph");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].matched);
    }

    #[test]
    fn segments_concatenate_back_to_input() {
        let text = "Sliding Window Maximum window";
        let joined: String = highlight(text, "window")
            .iter()
            .map(|segment| segment.text)
            .collect();
        assert_eq!(joined, text);
    }
}

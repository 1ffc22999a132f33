//! Embed-link rewriting.
//!
//! `[Embed](url)` and `[Embed-WIDTHxHEIGHT](url)` markers become inline
//! `<iframe>` elements. Everything else, ordinary links included, is left
//! byte-for-byte unchanged.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Width used when a marker carries no dimensions.
pub const DEFAULT_WIDTH: &str = "600";

/// Height used when a marker carries no dimensions.
pub const DEFAULT_HEIGHT: &str = "400";

static EMBED_RE: LazyLock<Regex> = LazyLock::new(|| {
    // [Embed] or [Embed-<w>x<h>], then (http(s)://<anything but ')'>)
    Regex::new(r"\[Embed(?:-(\d+)x(\d+))?\]\((https?://[^)]+)\)").expect("valid regex")
});

/// A single embed marker found in a text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedMarker<'a> {
    /// The marker exactly as written, e.g. `[Embed-800x500](https://x.io)`.
    pub raw: &'a str,
    pub url: &'a str,
    pub width: &'a str,
    pub height: &'a str,
}

impl<'a> EmbedMarker<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        Self {
            raw: caps.get(0).map_or("", |m| m.as_str()),
            url: caps.get(3).map_or("", |m| m.as_str()),
            width: caps.get(1).map_or(DEFAULT_WIDTH, |m| m.as_str()),
            height: caps.get(2).map_or(DEFAULT_HEIGHT, |m| m.as_str()),
        }
    }

    /// The `<iframe>` markup that replaces this marker.
    pub fn to_iframe(&self) -> String {
        format!(
            r#"<iframe src="{}" width="{}" height="{}"></iframe>"#,
            self.url, self.width, self.height
        )
    }
}

/// Replace every embed marker in `text` with its `<iframe>` markup.
///
/// Returns the input borrowed when nothing matched.
pub fn rewrite_embeds(text: &str) -> Cow<'_, str> {
    EMBED_RE.replace_all(text, |caps: &Captures| EmbedMarker::from_captures(caps).to_iframe())
}

/// All embed markers in `text`, left to right.
pub fn find_embeds(text: &str) -> Vec<EmbedMarker<'_>> {
    EMBED_RE
        .captures_iter(text)
        .map(|caps| EmbedMarker::from_captures(&caps))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions() {
        let out = rewrite_embeds("[Embed](https://x.io/a)");
        assert_eq!(
            out,
            r#"<iframe src="https://x.io/a" width="600" height="400"></iframe>"#
        );
    }

    #[test]
    fn explicit_dimensions() {
        let out = rewrite_embeds("[Embed-800x500](https://x.io/a)");
        assert_eq!(
            out,
            r#"<iframe src="https://x.io/a" width="800" height="500"></iframe>"#
        );
    }

    #[test]
    fn marker_inside_text() {
        let input = "See this: [Embed](http://jackliddy.github.io/designTest1) and more.";
        let out = rewrite_embeds(input);
        assert_eq!(
            out,
            r#"See this: <iframe src="http://jackliddy.github.io/designTest1" width="600" height="400"></iframe> and more."#
        );
        assert!(!out.contains("[Embed"));
    }

    #[test]
    fn multiple_markers_replaced_independently() {
        let input = "[Embed](https://a.io/1) then [Embed-10x20](https://b.io/2)";
        let out = rewrite_embeds(input);
        assert_eq!(
            out,
            concat!(
                r#"<iframe src="https://a.io/1" width="600" height="400"></iframe>"#,
                " then ",
                r#"<iframe src="https://b.io/2" width="10" height="20"></iframe>"#,
            )
        );
    }

    #[test]
    fn regular_link_untouched() {
        let input = "[This should remain a regular link](https://jackliddy.github.io/designTest1)";
        let out = rewrite_embeds(input);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, input);
    }

    #[test]
    fn link_text_mentioning_embed_untouched() {
        for input in [
            "[Embedded systems](https://x.io/a)",
            "[How to Embed](https://x.io/a)",
            "[embed](https://x.io/a)",
            "[Embed ](https://x.io/a)",
            "[Embed-800](https://x.io/a)",
            "[Embed-axb](https://x.io/a)",
        ] {
            assert_eq!(rewrite_embeds(input), input, "input: {input}");
        }
    }

    #[test]
    fn malformed_markers_pass_through() {
        for input in [
            "[Embed](https://x.io/a",
            "[Embed](ftp://x.io/a)",
            "[Embed](x.io/a)",
            "[Embed](https://)",
            "[Embed] (https://x.io/a)",
        ] {
            assert_eq!(rewrite_embeds(input), input, "input: {input}");
        }
    }

    #[test]
    fn unclosed_marker_extends_to_next_paren() {
        let input = "[Embed](https://x.io/a [Embed](https://y.io/b)";
        // The first marker runs to the only ')' in the text, so the URL spans both.
        let out = rewrite_embeds(input);
        assert_eq!(
            out,
            r#"<iframe src="https://x.io/a [Embed](https://y.io/b" width="600" height="400"></iframe>"#
        );
    }

    #[test]
    fn rewriting_is_idempotent() {
        for input in [
            "intro [Embed-300x200](https://x.io/a) outro [Label](https://x.io/b)",
            "[Embed](https://a.io/1) then [Embed-10x20](https://b.io/2)",
            "[Embed](https://x.io/a [Embed](https://y.io/b)",
            "[Embed](https://x.io/a",
            "[Embed](ftp://x.io/a)",
            "[Embed](https://)",
            "[Embed] (https://x.io/a)",
            "[Embed-800](https://x.io/a)",
            "[Embed-８x５](https://x.io/a)",
            "plain text, no markers",
        ] {
            let once = rewrite_embeds(input).into_owned();
            let twice = rewrite_embeds(&once).into_owned();
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn find_embeds_reports_dimensions() {
        let found = find_embeds("[Embed](https://a.io) [Embed-1x2](http://b.io) [x](https://c.io)");
        assert_eq!(
            found,
            vec![
                EmbedMarker {
                    raw: "[Embed](https://a.io)",
                    url: "https://a.io",
                    width: "600",
                    height: "400",
                },
                EmbedMarker {
                    raw: "[Embed-1x2](http://b.io)",
                    url: "http://b.io",
                    width: "1",
                    height: "2",
                },
            ]
        );
    }

    #[test]
    fn unicode_decimal_digits_are_dimensions() {
        let out = rewrite_embeds("[Embed-８x５](https://x.io/a) [Embed-٣x٤](https://x.io/b)");
        assert_eq!(
            out,
            concat!(
                r#"<iframe src="https://x.io/a" width="８" height="５"></iframe>"#,
                " ",
                r#"<iframe src="https://x.io/b" width="٣" height="٤"></iframe>"#,
            )
        );
    }
}

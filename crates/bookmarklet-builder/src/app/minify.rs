//! Reduce bookmarklet sources to a single embeddable line.
//!
//! The rules are line and pattern based, not a JavaScript lexer. String literals containing
//! `//`, `/*`, or runs of spaces can be altered.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").expect("valid percent escape pattern"));
static ENCODED_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)%2F%2F|%2F/|/%2F|%2F%2A|%2F\*|/%2A").expect("valid encoded comment pattern")
});
static URL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://").expect("valid url pattern"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment pattern"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid space pattern"));

const SCRIPT_SCHEME: &str = "javascript:";

/// How a source text is treated, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Nothing to do.
    Empty,
    /// One line with no comment syntax.
    Compact,
    /// One line carrying percent-encoded comment markers.
    EncodedLine,
    /// Contains `%XX` escapes somewhere; only whole comment lines are dropped.
    Encoded,
    /// Plain JavaScript.
    Literal,
}

impl SourceKind {
    pub fn classify(source: &str) -> Self {
        if source.is_empty() {
            return SourceKind::Empty;
        }

        let single_line = !source.trim().contains('\n');
        if single_line && !source.contains("//") && !source.contains("/*") {
            return SourceKind::Compact;
        }
        if single_line && ENCODED_COMMENT.is_match(source) {
            return SourceKind::EncodedLine;
        }
        if PERCENT_ESCAPE.is_match(source) {
            return SourceKind::Encoded;
        }
        SourceKind::Literal
    }
}

/// Minify a bookmarklet source. Empty output means nothing usable was left.
pub fn minify(source: &str) -> String {
    let source = normalize_line_endings(source);
    let source = source.as_ref();
    let kind = SourceKind::classify(source);
    tracing::trace!(?kind, bytes = source.len(), "minifying source");

    match kind {
        SourceKind::Empty => String::new(),
        SourceKind::Compact | SourceKind::EncodedLine => source.trim().to_owned(),
        SourceKind::Encoded => drop_comment_lines(source),
        SourceKind::Literal => minify_literal(source),
    }
}

/// Turn `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

fn drop_comment_lines(source: &str) -> String {
    source
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//") || trimmed.starts_with(SCRIPT_SCHEME)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

fn minify_literal(source: &str) -> String {
    let without_line_comments = source
        .lines()
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join("\n");
    let without_blocks = BLOCK_COMMENT.replace_all(&without_line_comments, "");

    let joined = without_blocks
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    SPACE_RUN.replace_all(&joined, " ").trim().to_owned()
}

/// Cut a trailing `//` comment without truncating URLs that contain `//`.
fn strip_line_comment(line: &str) -> &str {
    let mut cursor = 0;
    loop {
        let rest = &line[cursor..];
        let anchor = URL_START
            .find(rest)
            .map(|found| found.start())
            .or_else(|| rest.find("://"));

        if let Some(index) = comment_start(&rest[..anchor.unwrap_or(rest.len())]) {
            return &line[..cursor + index];
        }
        let Some(anchor) = anchor else {
            return line;
        };

        let url_len = rest[anchor..]
            .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`'))
            .unwrap_or(rest.len() - anchor);
        cursor += anchor + url_len;
    }
}

/// First `//` that is not the `//` of a `scheme://` marker.
fn comment_start(text: &str) -> Option<usize> {
    text.match_indices("//")
        .map(|(index, _)| index)
        .find(|&index| !text[..index].ends_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_returned_unchanged() {
        assert_eq!(SourceKind::classify(""), SourceKind::Empty);
        assert_eq!(minify(""), "");
    }

    #[test]
    fn compact_single_line_is_only_trimmed() {
        let source = "  javascript:(function(){alert(document.title);})();  \n";
        assert_eq!(SourceKind::classify(source), SourceKind::Compact);
        assert_eq!(
            minify(source),
            "javascript:(function(){alert(document.title);})();"
        );
    }

    #[test]
    fn compact_line_keeps_interior_spacing() {
        assert_eq!(minify("var  a =  1;"), "var  a =  1;");
    }

    #[test]
    fn encoded_single_line_round_trips() {
        let source =
            "javascript:location.href='https://example.com/?u='+encodeURIComponent(location.href)+'%2F%2Fx'";
        assert_eq!(SourceKind::classify(source), SourceKind::EncodedLine);
        assert_eq!(minify(&format!("  {source}\n")), source);
    }

    #[test]
    fn encoded_block_marker_is_detected() {
        let source = "javascript:void(0)%2F*note*%2F // tail";
        assert_eq!(SourceKind::classify(source), SourceKind::EncodedLine);
        assert_eq!(minify(source), source);
    }

    #[test]
    fn encoded_multiline_only_drops_comment_lines() {
        let source = "// Copies the page title\njavascript:alert('50%25%20off')\n  // trailing note\n";
        assert_eq!(SourceKind::classify(source), SourceKind::Encoded);
        assert_eq!(minify(source), "javascript:alert('50%25%20off')");
    }

    #[test]
    fn encoded_multiline_keeps_remaining_lines_separate() {
        let source = "javascript:a('%20');\njavascript:b();";
        assert_eq!(minify(source), "javascript:a('%20');\njavascript:b();");
    }

    #[test]
    fn strips_trailing_line_comment() {
        let source = "const x = 1; // comment\nalert(x);\n";
        let minified = minify(source);
        assert_eq!(minified, "const x = 1; alert(x);");
        assert!(!minified.contains("  "));
        assert!(!minified.contains("comment"));
    }

    #[test]
    fn keeps_url_with_double_slash_path() {
        let source = "open('x');\nlocation.href = https://example.com/a//b // trailing\n";
        let minified = minify(source);
        assert!(minified.contains("https://example.com/a//b"));
        assert!(!minified.contains("trailing"));
        assert_eq!(minified, "open('x'); location.href = https://example.com/a//b");
    }

    #[test]
    fn keeps_quoted_url_and_strips_comment_after_it() {
        let source = "var u = 'https://example.com/x'; // go\nwindow.open(u);";
        assert_eq!(
            minify(source),
            "var u = 'https://example.com/x'; window.open(u);"
        );
    }

    #[test]
    fn full_line_comment_mentioning_url_is_dropped() {
        let source = "// see https://example.com\nalert(1);";
        assert_eq!(minify(source), "alert(1);");
    }

    #[test]
    fn removes_block_comments_across_lines() {
        let source = "/*\n * Highlights links\n */\n(function () {\n    var a = 1; /* inline */\n})();\n";
        assert_eq!(minify(source), "(function () { var a = 1; })();");
    }

    #[test]
    fn single_line_with_comment_goes_through_literal_path() {
        assert_eq!(SourceKind::classify("alert(1); // hi"), SourceKind::Literal);
        assert_eq!(minify("alert(1); // hi"), "alert(1);");
    }

    #[test]
    fn collapses_space_runs_including_inside_strings() {
        let source = "var s = 'a    b';\n\n\n   alert(s);";
        assert_eq!(minify(source), "var s = 'a b'; alert(s);");
    }

    #[test]
    fn comment_only_source_minifies_to_empty() {
        assert_eq!(minify("// nothing here\n/* or here */\n"), "");
    }

    #[test]
    fn carriage_return_only_line_endings_split_lines() {
        let source = "a(); // c\rb();\r";
        assert_eq!(minify(source), "a(); b();");
    }

    #[test]
    fn skips_every_url_before_looking_for_a_comment() {
        let source = "a('https://x.com', 'https://y.com//z'); // c\nb();";
        assert_eq!(
            minify(source),
            "a('https://x.com', 'https://y.com//z'); b();"
        );
    }

    #[test]
    fn literal_output_is_single_line() {
        let source = "a();\r\n\tb();\r\n// c\r\nd();";
        let minified = minify(source);
        assert!(!minified.contains('\n'));
        assert_eq!(minified, "a(); b(); d();");
    }
}

//! C comment stripping
//!
//! Removes `/* ... */` and `// ...` comments while copying string and
//! character literals verbatim. Newlines inside a block comment are kept,
//! so offsets into the stripped text map to the same line numbers as in
//! the original file.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?s)(?P<literal>"(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*')|(?P<comment>/\*.*?\*/|//[^\r\n]*)"#,
        )
        .expect("comment pattern is valid")
    })
}

/// Remove comments from C source text
///
/// Quoted text is matched before comment starts, so `"http://x"` and
/// `'/*'` survive untouched. Stripping is idempotent.
pub fn strip_comments(source: &str) -> Cow<'_, str> {
    comment_pattern().replace_all(source, |caps: &Captures| {
        if let Some(comment) = caps.name("comment") {
            comment.as_str().matches('\n').collect()
        } else {
            caps[0].to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_comments_is_noop() {
        let source = "typedef enum { A, B } t;\n#define X 0x01\n";
        assert_eq!(strip_comments(source), source);
    }

    #[test]
    fn test_block_and_line_comments() {
        let source = "int a; /* one\n two */ int b; // tail\nint c;\n";
        assert_eq!(strip_comments(source), "int a; \n int b; \nint c;\n");
    }

    #[test]
    fn test_line_count_is_preserved() {
        let source = "/*\n * license\n * text\n */\n#endif\n";
        let stripped = strip_comments(source);
        assert_eq!(stripped, "\n\n\n\n#endif\n");
        assert_eq!(stripped.lines().count(), source.lines().count());
    }

    #[test]
    fn test_literals_are_kept() {
        let source = "const char *u = \"http://host/*x*/\"; char c = '/'; // gone\n";
        assert_eq!(
            strip_comments(source),
            "const char *u = \"http://host/*x*/\"; char c = '/'; \n"
        );
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let source = "const char *s = \"a \\\" // b\"; // c\n";
        assert_eq!(strip_comments(source), "const char *s = \"a \\\" // b\"; \n");
    }

    #[test]
    fn test_idempotent() {
        let source = "/* head */\nenum e { A, /* a */ B }; // e\n";
        let once = strip_comments(source).into_owned();
        let twice = strip_comments(&once).into_owned();
        assert_eq!(once, twice);
    }
}

//! Conditional directive matcher
//!
//! Walks the `#if`/`#ifdef`/`#ifndef`/`#else`/`#endif` lines of a source
//! with an explicit frame stack. Whenever a scope is closed, every
//! extractor runs over that scope's text and the entities found are
//! wrapped in guard lines that reproduce the scope's condition. `#else`
//! branches get a synthesized guard (see [`DirectiveFrame::complement`])
//! instead of a copy of the original text.
//!
//! A scope's region covers its nested blocks as well, so an entity inside
//! a nested block is found once per enclosing scope. Those repeats share a
//! start offset and only the innermost (first found) one is kept.
//!
//! A block opened at top level while a `{` is still open there (an enum
//! body with conditional members) does not split the top-level text. The
//! text up to the next balanced point is scanned in one piece, so the
//! declaration around the block is seen whole.

use regex::{CaptureMatches, Regex};
use std::collections::VecDeque;
use std::ops::Range;
use strgen_core::{
    order_items, DirectiveFrame, DirectiveKind, Error, GuardLine, Item, Result, Span,
};
use tracing::debug;

use crate::extract::Extractor;

/// Options for directive matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Emit scopes of outermost blocks without guards
    ///
    /// Useful when the whole header sits inside its include guard.
    pub unguarded_outermost: bool,
}

/// Directive matcher
pub struct DirectiveMatcher {
    pattern: Regex,
    options: MatcherOptions,
}

impl DirectiveMatcher {
    /// Create a matcher with default options
    pub fn new() -> Self {
        Self::with_options(MatcherOptions::default())
    }

    /// Create a matcher with the given options
    pub fn with_options(options: MatcherOptions) -> Self {
        Self {
            pattern: Regex::new(
                r"(?m)^[ \t]*#[ \t]*(?P<directive>if[ \t]|ifndef[ \t]|ifdef[ \t]|else|endif)[ \t]*(?P<param>(?:.*\\\r?\n)*.*)$",
            )
            .expect("directive pattern is valid"),
            options,
        }
    }

    /// Scan `source`, running `extractors` over every scope
    ///
    /// The returned iterator yields `(offset, item)` pairs in ascending
    /// offset order. It stops after the first error.
    pub fn scan<'a>(&'a self, source: &'a str, extractors: &'a [Box<dyn Extractor>]) -> Scan<'a> {
        Scan {
            source,
            extractors,
            options: self.options,
            directives: self.pattern.captures_iter(source),
            stack: Vec::new(),
            top_level_start: 0,
            embedded: false,
            block: Vec::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }
}

impl Default for DirectiveMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-pass scan over one source
pub struct Scan<'a> {
    source: &'a str,
    extractors: &'a [Box<dyn Extractor>],
    options: MatcherOptions,
    directives: CaptureMatches<'a, 'a>,
    /// Open conditional blocks, innermost last
    stack: Vec<DirectiveFrame>,
    /// Start of the top-level text not yet scanned
    top_level_start: usize,
    /// An outermost block sits inside an unfinished top-level declaration
    embedded: bool,
    /// Items of the current outermost block, in discovery order
    block: Vec<(usize, Item)>,
    /// Ordered items waiting to be yielded
    ready: VecDeque<(usize, Item)>,
    finished: bool,
}

impl<'a> Scan<'a> {
    /// Number of currently open conditional blocks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume the next directive line, or finish at end of input
    fn advance(&mut self) -> Result<()> {
        let Some(caps) = self.directives.next() else {
            return self.finish();
        };
        let Some(line) = caps.get(0) else {
            return Ok(());
        };
        let line = Span::from(line.range());
        let directive = caps["directive"].trim();
        let param = caps["param"].trim_end();

        match directive {
            "else" | "endif" => self.close(directive, line),
            opening => {
                let kind: DirectiveKind = opening.parse()?;
                if self.stack.is_empty() {
                    let pending = self.top_level_start..line.start;
                    if leaves_brace_open(&self.source[pending.clone()]) {
                        debug!("#{} at {} is inside a top-level declaration", kind, line);
                        self.embedded = true;
                    } else {
                        self.scan_top_level(pending)?;
                    }
                }
                debug!("Open #{} {} at {}", kind, param, line);
                self.stack.push(DirectiveFrame::new(kind, param, line));
                Ok(())
            }
        }
    }

    fn close(&mut self, directive: &str, line: Span) -> Result<()> {
        let frame = self.stack.pop().ok_or_else(|| {
            Error::unbalanced(
                self.source,
                line.start,
                format!("#{} without a matching #if", directive),
            )
        })?;

        let guarded = !(self.options.unguarded_outermost && self.stack.is_empty());
        self.emit_scope(&frame, frame.open.end..line.start, line.start, guarded)?;

        if directive == "else" {
            self.stack.push(frame.complement(line));
        } else if self.stack.is_empty() && !self.embedded {
            self.top_level_start = line.end;
            self.flush();
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;

        if let Some(frame) = self.stack.last() {
            return Err(Error::unbalanced(
                self.source,
                frame.open.start,
                format!("#{} {} is never closed", frame.kind, frame.param),
            ));
        }

        self.scan_top_level(self.top_level_start..self.source.len())
    }

    /// Run the extractors over a closed scope and buffer the results
    fn emit_scope(
        &mut self,
        frame: &DirectiveFrame,
        region: Range<usize>,
        close_offset: usize,
        guarded: bool,
    ) -> Result<()> {
        let guard = frame.guard();
        let mut found = 0;

        for extractor in self.extractors {
            let entities = extractor.extract(self.source, region.clone())?;
            debug!(
                "{} extractor: {} entities in #{} {}",
                extractor.name(),
                entities.len(),
                frame.kind,
                frame.param
            );
            for entity in entities {
                if found == 0 && guarded {
                    self.block.push((
                        frame.open.start,
                        Item::Guard(GuardLine {
                            text: guard.opening(),
                            closing: false,
                        }),
                    ));
                }
                found += 1;
                self.block.push((entity.span().start, Item::Entity(entity)));
            }
        }

        if found > 0 && guarded {
            self.block.push((
                close_offset,
                Item::Guard(GuardLine {
                    text: guard.closing(),
                    closing: true,
                }),
            ));
        }

        debug!(
            "Scope #{} {} ({}..{}): {} entities",
            frame.kind, frame.param, region.start, region.end, found
        );
        Ok(())
    }

    /// Scan text outside any conditional block
    ///
    /// `region` also covers embedded blocks buffered since the last scan;
    /// their items are ordered together with the top-level entities.
    fn scan_top_level(&mut self, region: Range<usize>) -> Result<()> {
        self.embedded = false;

        if !region.is_empty() {
            for extractor in self.extractors {
                for entity in extractor.extract(self.source, region.clone())? {
                    self.block.push((entity.span().start, Item::Entity(entity)));
                }
            }
        }
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        let block = std::mem::take(&mut self.block);
        self.ready.extend(order_items(block));
    }
}

/// Whether `text` has more `{` than `}` outside string and char literals
fn leaves_brace_open(text: &str) -> bool {
    let mut depth = 0i64;
    let mut quote = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

impl<'a> Iterator for Scan<'a> {
    type Item = Result<(usize, Item)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.advance() {
                self.finished = true;
                self.block.clear();
                return Some(Err(e));
            }
        }
    }
}

impl<'a> std::iter::FusedIterator for Scan<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{EnumExtractor, MacroGroupExtractor};
    use pretty_assertions::assert_eq;
    use strgen_core::Entity;

    fn extractors() -> Vec<Box<dyn Extractor>> {
        vec![
            Box::new(EnumExtractor::new()),
            Box::new(MacroGroupExtractor::new("SIG_").unwrap()),
        ]
    }

    /// Render items as one line each: guard text or `entity:<name>`
    fn outline(source: &str) -> Result<Vec<String>> {
        let extractors = extractors();
        let matcher = DirectiveMatcher::new();
        matcher
            .scan(source, &extractors)
            .map(|item| {
                item.map(|(_, item)| match item {
                    Item::Guard(g) => g.text,
                    Item::Entity(Entity::Enum(e)) => format!("entity:{}", e.name),
                    Item::Entity(Entity::MacroGroup(g)) => {
                        format!("entity:group({})", g.definitions.len())
                    }
                })
            })
            .collect()
    }

    #[test]
    fn test_balanced_scan_leaves_stack_empty() {
        let source = "#ifdef A\n#if B\nenum x { X };\n#endif\n#else\n#endif\n";
        let extractors = extractors();
        let matcher = DirectiveMatcher::new();
        let mut scan = matcher.scan(source, &extractors);

        for item in scan.by_ref() {
            item.unwrap();
        }
        assert_eq!(scan.depth(), 0);
    }

    #[test]
    fn test_top_level_is_unguarded() {
        let source = "typedef enum { A } a_t;\n";
        assert_eq!(outline(source).unwrap(), vec!["entity:a_t"]);
    }

    #[test]
    fn test_ifdef_else_branches() {
        let source = "\
#ifdef X
typedef enum { A } a_t;
#else
typedef enum { B } b_t;
#endif
";
        assert_eq!(
            outline(source).unwrap(),
            vec![
                "#ifdef X",
                "entity:a_t",
                "#endif /* defined(X) */",
                "#ifndef X",
                "entity:b_t",
                "#endif /* !defined(X) */",
            ]
        );
    }

    #[test]
    fn test_if_else_is_negated() {
        let source = "#if FOO > 2\n#else\nenum e { E };\n#endif\n";
        assert_eq!(
            outline(source).unwrap(),
            vec!["#if !( FOO > 2 )", "entity:e", "#endif /* !( FOO > 2 ) */"]
        );
    }

    #[test]
    fn test_nested_blocks_keep_innermost_entity() {
        let source = "\
#ifndef H
enum outer { O };
#if defined(A) && \\
    defined(B)
enum inner { I };
#endif
#endif
";
        assert_eq!(
            outline(source).unwrap(),
            vec![
                "#ifndef H",
                "entity:outer",
                "#if defined(A) && \\\n    defined(B)",
                "entity:inner",
                "#endif /* defined(A) && \\\n    defined(B) */",
                "#endif /* !defined(H) */",
            ]
        );
    }

    #[test]
    fn test_empty_scopes_emit_nothing() {
        let source = "#ifdef X\nint a;\n#else\nint b;\n#endif\nenum e { E };\n";
        assert_eq!(outline(source).unwrap(), vec!["entity:e"]);
    }

    #[test]
    fn test_macro_group_split_by_else() {
        let source = "\
#if defined(T13)
#define SIG_A 0x01
#else
#define SIG_B 0x02
#define SIG_C 0x03
#endif
";
        assert_eq!(
            outline(source).unwrap(),
            vec![
                "#if defined(T13)",
                "entity:group(1)",
                "#endif /* defined(T13) */",
                "#if !( defined(T13) )",
                "entity:group(2)",
                "#endif /* !( defined(T13) ) */",
            ]
        );
    }

    #[test]
    fn test_unguarded_outermost() {
        let source = "#ifndef H\n#define H\n#ifdef X\nenum e { E };\n#endif\nenum f { F };\n#endif\n";
        let extractors = extractors();
        let matcher = DirectiveMatcher::with_options(MatcherOptions {
            unguarded_outermost: true,
        });
        let texts: Vec<String> = matcher
            .scan(source, &extractors)
            .map(|item| match item.unwrap().1 {
                Item::Guard(g) => g.text,
                Item::Entity(e) => e.describe(),
            })
            .collect();

        assert_eq!(
            texts,
            vec![
                "#ifdef X",
                "enum e (1 members)",
                "#endif /* defined(X) */",
                "enum f (1 members)",
            ]
        );
    }

    #[test]
    fn test_offsets_are_ascending() {
        let source = "\
enum a { A };
#ifdef X
#define SIG_ONE 0x1
enum b { B };
#else
enum c { C };
#endif
enum d { D };
";
        let extractors = extractors();
        let matcher = DirectiveMatcher::new();
        let offsets: Vec<usize> = matcher
            .scan(source, &extractors)
            .map(|item| item.unwrap().0)
            .collect();

        assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{:?}", offsets);
        assert_eq!(offsets.len(), 9);
    }

    #[test]
    fn test_conditional_members_in_top_level_enum() {
        let source = "\
typedef enum {
    A,
#if defined(X)
    B,
#endif
#ifdef Y
    C,
#endif
} t_t;
#ifdef Z
enum u { U };
#endif
enum v { V };
";
        assert_eq!(
            outline(source).unwrap(),
            vec![
                "entity:t_t",
                "#ifdef Z",
                "entity:u",
                "#endif /* defined(Z) */",
                "entity:v",
            ]
        );
    }

    #[test]
    fn test_braces_in_literals_do_not_count() {
        assert!(leaves_brace_open("enum e {\n A,\n"));
        assert!(!leaves_brace_open("const char *s = \"{\"; char c = '{';\n"));
        assert!(!leaves_brace_open("struct s { int a; };\n"));
    }

    #[test]
    fn test_crlf_directives_and_continuations() {
        let source = "#if defined(A) && \\\r\n    defined(B)\r\nenum e { E };\r\n#endif\r\n";
        assert_eq!(
            outline(source).unwrap(),
            vec![
                "#if defined(A) && \\\r\n    defined(B)",
                "entity:e",
                "#endif /* defined(A) && \\\r\n    defined(B) */",
            ]
        );
    }

    #[test]
    fn test_endif_without_opener() {
        let err = outline("enum e { E };\n#endif\n").unwrap_err();
        assert!(matches!(err, Error::UnbalancedDirectives { line: 2, .. }));
    }

    #[test]
    fn test_else_without_opener() {
        let err = outline("#else\n").unwrap_err();
        assert!(matches!(err, Error::UnbalancedDirectives { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_block() {
        let err = outline("#ifdef X\n#ifdef Y\n#endif\nenum e { E };\n").unwrap_err();
        assert!(matches!(err, Error::UnbalancedDirectives { line: 1, .. }));
    }

    #[test]
    fn test_scan_is_fused_after_error() {
        let extractors = extractors();
        let matcher = DirectiveMatcher::new();
        let mut scan = matcher.scan("#endif\nenum e { E };\n", &extractors);

        assert!(scan.next().unwrap().is_err());
        assert!(scan.next().is_none());
    }
}

//! Enum declaration extractor
//!
//! Recognizes `[typedef] enum [prefix] { body } [suffix];`.
//!
//! Known limitation: the closing `}` and the terminating `;` must sit in
//! the same conditional block. An enum such as
//!
//! ```c
//! enum test {
//!     A,
//! #if defined(X)
//!     B,
//! };
//! #else
//! };
//! #endif
//! ```
//!
//! is not recognized as a single entity.

use regex::Regex;
use std::ops::Range;
use strgen_core::{Entity, EnumEntity, Result, Span};
use tracing::debug;

use super::Extractor;

/// Enum extractor
pub struct EnumExtractor {
    pattern: Regex,
}

impl EnumExtractor {
    /// Create a new enum extractor
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"\benum\b\s*(?P<prefix>\w*)\s*\{\s*(?P<body>[^}]*)\}\s*(?P<suffix>\w*)\s*;",
            )
            .expect("enum pattern is valid"),
        }
    }
}

impl Default for EnumExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for EnumExtractor {
    fn extract(&self, source: &str, region: Range<usize>) -> Result<Vec<Entity>> {
        let base = region.start;
        let text = &source[region];
        let mut entities = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let span = Span::from(whole.range()).offset_by(base);

            let entity = EnumEntity::new(&caps["prefix"], &caps["body"], &caps["suffix"], span)?;
            debug!("Found enum {} at line {}", entity.name, span.line(source));
            entities.push(Entity::Enum(entity));
        }

        Ok(entities)
    }

    fn name(&self) -> &str {
        "enum"
    }
}

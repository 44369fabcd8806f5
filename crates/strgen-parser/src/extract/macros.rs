//! Macro group extractor
//!
//! Collects `#define <PREFIX><NAME> 0x..` definitions. All definitions
//! found in one region form a single group, so a group split by an
//! `#else` yields two independent entities.

use regex::Regex;
use std::ops::Range;
use strgen_core::{Entity, Error, MacroDefinition, MacroGroupEntity, Result, Span};
use tracing::debug;

use super::Extractor;

/// Extractor for hexadecimal macro definitions sharing a name prefix
pub struct MacroGroupExtractor {
    prefix: String,
    pattern: Regex,
}

impl MacroGroupExtractor {
    /// Create an extractor for macros named `<prefix>...`
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(Error::Config("macro prefix must not be empty".into()));
        }

        let pattern = Regex::new(&format!(
            r"(?m)#define\s+(?P<name>{}\w+)\s+(?P<value>0[xX][0-9a-fA-F]+)[ \t]*\r?$",
            regex::escape(prefix)
        ))
        .map_err(|e| Error::Config(format!("invalid macro prefix {:?}: {}", prefix, e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }
}

impl Extractor for MacroGroupExtractor {
    fn extract(&self, source: &str, region: Range<usize>) -> Result<Vec<Entity>> {
        let base = region.start;
        let text = &source[region];

        let definitions: Vec<MacroDefinition> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(MacroDefinition {
                    name: caps["name"].to_string(),
                    value: caps["value"].to_string(),
                    span: Span::from(whole.range()).offset_by(base),
                })
            })
            .collect();

        Ok(MacroGroupEntity::new(self.prefix.clone(), definitions)
            .map(|group| {
                debug!(
                    "Found {} {}* definitions at {}",
                    group.definitions.len(),
                    self.prefix,
                    group.span()
                );
                vec![Entity::MacroGroup(group)]
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "macro_group"
    }
}

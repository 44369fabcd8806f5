//! strgen Parser
//!
//! Text-level scanning of C headers, without macro expansion or condition
//! evaluation.
//!
//! ## Modules
//!
//! - `comments` - Comment stripping that leaves literals untouched
//! - `directive` - Conditional directive matcher driving the extractors
//! - `extract` - Enum and macro-group extractors

pub mod comments;
pub mod directive;
pub mod extract;

pub use comments::strip_comments;
pub use directive::{DirectiveMatcher, MatcherOptions, Scan};
pub use extract::{default_extractors, EnumExtractor, Extractor, MacroGroupExtractor};

use std::path::Path;
use strgen_core::{GeneratorConfig, Item, Result};
use tracing::info;

/// Scan result containing the ordered items of one header
#[derive(Debug, Default, Clone)]
pub struct ScanResult {
    /// Comment-stripped source; item offsets point into this text
    pub source: String,
    /// Guards and entities in ascending offset order
    pub items: Vec<(usize, Item)>,
}

impl ScanResult {
    /// Number of entities (guards excluded)
    pub fn entity_count(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, item)| matches!(item, Item::Entity(_)))
            .count()
    }
}

/// Strip comments and scan a header's text
pub fn scan_source(raw: &str, config: &GeneratorConfig) -> Result<ScanResult> {
    let source = strip_comments(raw).into_owned();
    let extractors = default_extractors(config)?;
    let matcher = DirectiveMatcher::with_options(MatcherOptions {
        unguarded_outermost: config.unguarded_outermost,
    });

    let items = matcher
        .scan(&source, &extractors)
        .collect::<Result<Vec<_>>>()?;

    let result = ScanResult { source, items };
    info!("Scanned {} entities", result.entity_count());
    Ok(result)
}

/// Read and scan a header file
pub fn scan_file(path: &Path, config: &GeneratorConfig) -> Result<ScanResult> {
    let raw = std::fs::read_to_string(path)?;
    info!("Scanning {}", path.display());
    scan_source(&raw, config)
}

//! Entity extractors
//!
//! Each extractor recognizes one declaration shape inside a region of the
//! comment-stripped source. The directive matcher calls every registered
//! extractor once per scope, in registration order.

pub mod enums;
pub mod macros;

pub use enums::EnumExtractor;
pub use macros::MacroGroupExtractor;

use std::ops::Range;
use strgen_core::{Entity, GeneratorConfig, Result};

/// Extractor trait for different declaration shapes
pub trait Extractor {
    /// Extract entities whose match lies entirely inside `region`
    ///
    /// Spans of returned entities are offsets into `source`.
    fn extract(&self, source: &str, region: Range<usize>) -> Result<Vec<Entity>>;

    /// Get extractor name
    fn name(&self) -> &str;
}

/// Extractors for a generator configuration, enums first
pub fn default_extractors(config: &GeneratorConfig) -> Result<Vec<Box<dyn Extractor>>> {
    Ok(vec![
        Box::new(EnumExtractor::new()),
        Box::new(MacroGroupExtractor::new(&config.macro_prefix)?),
    ])
}

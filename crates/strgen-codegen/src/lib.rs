//! strgen Code Generation
//!
//! Produces the C file of value-to-string helpers from a scanned header.
//!
//! ## Modules
//!
//! - `render` - Per-entity lookup functions
//! - `template` - Fixed wrapper around the generated functions
//! - `emitter` - Ordering, concatenation and atomic output

pub mod emitter;
pub mod render;
pub mod template;

pub use emitter::{write_output, CodeEmitter, Destination};
pub use render::RenderOptions;
pub use template::OutputTemplate;

use std::path::{Path, PathBuf};
use strgen_core::{Error, GeneratorConfig, Result};
use tracing::{info, warn};

/// Summary of one generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Header that was scanned
    pub header: PathBuf,
    /// Number of entities rendered
    pub entities: usize,
}

/// Generate the output text for header source text
pub fn generate(raw: &str, config: &GeneratorConfig) -> Result<String> {
    let scan = strgen_parser::scan_source(raw, config)?;
    if scan.entity_count() == 0 {
        warn!("No enum or {}* definitions found", config.macro_prefix);
    }
    Ok(CodeEmitter::new(config).emit(scan.items))
}

/// Read `header`, generate, and write the result to `destination`
///
/// Nothing is written when scanning fails.
pub fn generate_to(
    header: &Path,
    destination: &Destination,
    config: &GeneratorConfig,
) -> Result<GenerateSummary> {
    let scan = strgen_parser::scan_file(header, config)?;
    let entities = scan.entity_count();
    if entities == 0 {
        warn!("No enum or {}* definitions found in {}", config.macro_prefix, header.display());
    }

    let text = CodeEmitter::new(config).emit(scan.items);
    write_output(&text, destination)?;

    Ok(GenerateSummary {
        header: header.to_path_buf(),
        entities,
    })
}

/// Find the source root containing `relative_header`
///
/// Looks in `start` and then in each of its ancestors.
pub fn locate_root(start: &Path, relative_header: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        if dir.join(relative_header).is_file() {
            info!("Using source root {}", dir.display());
            return Ok(dir.to_path_buf());
        }
    }

    Err(Error::Config(format!(
        "cannot find {} in {} or any parent directory",
        relative_header.display(),
        start.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_root_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("include/mbedtls")).unwrap();
        fs::create_dir_all(root.join("library/sub")).unwrap();
        fs::write(root.join("include/mbedtls/ssl.h"), "").unwrap();

        let found = locate_root(&root.join("library/sub"), Path::new("include/mbedtls/ssl.h")).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn test_locate_root_missing() {
        let temp = TempDir::new().unwrap();
        let err = locate_root(temp.path(), Path::new("include/none.h")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_generate_to_leaves_no_file_on_unbalanced_input() {
        let temp = TempDir::new().unwrap();
        let header = temp.path().join("bad.h");
        let out = temp.path().join("out.c");
        fs::write(&header, "#endif\n").unwrap();

        let err = generate_to(&header, &Destination::File(out.clone()), &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnbalancedDirectives { .. }));
        assert!(!out.exists());
    }
}

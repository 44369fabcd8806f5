//! Code emitter
//!
//! Orders scanned items, renders them and writes the final file.

use std::io::Write;
use std::path::{Path, PathBuf};
use strgen_core::{order_items, GeneratorConfig, Item, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::render::{render_entity, RenderOptions};
use crate::template::OutputTemplate;

/// Where generated text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output
    Stdout,
    /// A file, replaced atomically
    File(PathBuf),
}

/// Code emitter
pub struct CodeEmitter {
    render: RenderOptions,
    template: OutputTemplate,
}

impl CodeEmitter {
    /// Create an emitter for a generator configuration
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            render: RenderOptions::from(config),
            template: OutputTemplate::from(config),
        }
    }

    /// Render the generated functions without the wrapper template
    ///
    /// Items are ordered by offset; an entity at an offset that already
    /// produced one is skipped.
    pub fn functions(&self, items: Vec<(usize, Item)>) -> String {
        order_items(items)
            .into_iter()
            .map(|(offset, item)| match item {
                Item::Guard(guard) => guard.text,
                Item::Entity(entity) => {
                    debug!("Rendering {} at {}", entity.describe(), offset);
                    render_entity(&entity, &self.render)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the complete output file
    pub fn emit(&self, items: Vec<(usize, Item)>) -> String {
        self.template.render(&self.functions(items))
    }
}

/// Write generated text to its destination
///
/// File output goes through a temporary file in the target directory and
/// only replaces the target once fully written.
pub fn write_output(text: &str, destination: &Destination) -> Result<()> {
    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Destination::File(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut file = NamedTempFile::new_in(dir)?;
            file.write_all(text.as_bytes())?;
            file.as_file().sync_all()?;
            file.persist(path).map_err(|e| e.error)?;
            info!("Wrote {} bytes to {}", text.len(), path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use strgen_core::{Entity, EnumEntity, GuardLine, Span};
    use tempfile::TempDir;

    fn enum_item(name: &str, start: usize) -> (usize, Item) {
        let e = EnumEntity::new("", "A", name, Span::new(start, start + 5)).unwrap();
        (start, Item::Entity(Entity::Enum(e)))
    }

    fn guard(text: &str, offset: usize, closing: bool) -> (usize, Item) {
        (
            offset,
            Item::Guard(GuardLine {
                text: text.into(),
                closing,
            }),
        )
    }

    #[test]
    fn test_functions_ordered_and_deduplicated() {
        let emitter = CodeEmitter::new(&GeneratorConfig::default());
        let items = vec![
            enum_item("b_t", 40),
            guard("#ifdef X", 10, false),
            enum_item("a_t", 20),
            enum_item("dup_t", 20),
            guard("#endif /* defined(X) */", 30, true),
        ];

        let text = emitter.functions(items);
        let a = text.find("a_t_str").unwrap();
        let b = text.find("b_t_str").unwrap();
        assert!(text.starts_with("#ifdef X\nconst char *a_t_str"));
        assert!(a < text.find("#endif /* defined(X) */").unwrap());
        assert!(text.find("#endif /* defined(X) */").unwrap() < b);
        assert!(!text.contains("dup_t"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let emitter = CodeEmitter::new(&GeneratorConfig::default());
        let items = || vec![enum_item("a_t", 3), enum_item("b_t", 9)];
        assert_eq!(emitter.emit(items()), emitter.emit(items()));
    }

    #[test]
    fn test_write_file_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.c");
        fs::write(&path, "old").unwrap();

        write_output("new contents\n", &Destination::File(path.clone())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new contents\n");

        let leftovers = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("out.c");

        let err = write_output("x", &Destination::File(path.clone())).unwrap_err();
        assert!(matches!(err, strgen_core::Error::Io(_)));
        assert!(!path.exists());
    }
}

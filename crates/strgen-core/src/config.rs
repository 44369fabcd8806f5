//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Generator configuration
///
/// Every field has a default matching the Mbed TLS debug helpers, so a
/// configuration file only needs to name what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Header to scan, relative to the source root
    pub source_header: PathBuf,

    /// Name of the generated file inside the output directory
    pub output_file: String,

    /// Companion declarations header included by the generated file
    pub companion_header: String,

    /// Macro that must be defined for the generated file to compile anything
    pub guard_macro: String,

    /// Name prefix shared by the grouped macro definitions
    pub macro_prefix: String,

    /// Name of the generated macro-group lookup function
    pub macro_function: String,

    /// Returned by enum lookups for values outside the table
    pub enum_sentinel: String,

    /// Returned by the macro-group lookup for unknown values
    pub macro_sentinel: String,

    /// Emit scopes of outermost conditional blocks without guards
    pub unguarded_outermost: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_header: PathBuf::from("include/mbedtls/ssl.h"),
            output_file: "ssl_debug_helpers_generated.c".into(),
            companion_header: "ssl_debug_helpers.h".into(),
            guard_macro: "MBEDTLS_DEBUG_C".into(),
            macro_prefix: "MBEDTLS_TLS1_3_SIG_".into(),
            macro_function: "mbedtls_ssl_sig_alg_to_str".into(),
            enum_sentinel: "UNKOWN_VAULE".into(),
            macro_sentinel: "UNKOWN".into(),
            unguarded_outermost: false,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce uncompilable output
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("macro_prefix", &self.macro_prefix),
            ("macro_function", &self.macro_function),
            ("output_file", &self.output_file),
            ("guard_macro", &self.guard_macro),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("`{}` must not be empty", field)));
            }
        }

        Ok(())
    }
}

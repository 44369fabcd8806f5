//! strgen Core
//!
//! Core types and interfaces shared by the strgen scanner and generator.

pub mod config;
pub mod error;
pub mod span;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use span::Span;
pub use types::*;

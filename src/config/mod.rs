//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! sections file (TOML)
//!     → loader.rs (parse & deserialize, shape checks)
//!     → SectionsFile (declaration order preserved)
//!     → registered into the SectionCompiler one entry at a time
//! ```
//!
//! # Design Decisions
//! - File order is registration order; it decides conflict primaries
//! - Shape validation (pattern vs. structured fields) reports all errors,
//!   not just the first; semantic validation lives in the compiler

pub mod loader;
pub mod schema;

pub use loader::{load_sections, ConfigError};
pub use schema::{SectionConfig, SectionDecl, SectionsFile};

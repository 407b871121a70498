//! Application Sectioning Compiler
//!
//! Resolves declarative application sections (a host plus a path prefix,
//! optionally parameterized with host attributes) into a conflict-free set
//! of matchable routing scopes. For every section the compiler produces an
//! anchored host pattern and a disambiguation path regex that a flat,
//! unordered request matcher can consume without relying on registration
//! order: a section with prefix `/` gets `^/(?!(backend|api)/)` when
//! siblings claim `backend/` and `api/` under an equivalent host.
//!
//! The whole compile runs once during application bootstrap over a fixed
//! batch of sections; conflicting host+prefix combinations fail with an
//! exhaustive report before anything is exported.

// Core subsystems
pub mod compiler;
pub mod section;

// Equivalence checks
pub mod equivalence;

// Configuration surface
pub mod config;

pub use compiler::{
    ConflictError, ResolvedSection, SectionCompiler, SectionConflict, SectioningError, UsageError,
};
pub use config::schema::{SectionConfig, SectionDecl, SectionsFile};
pub use section::{ParseError, SectionDescriptor};

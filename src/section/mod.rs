//! Section descriptors and their parsers.
//!
//! # Data Flow
//! ```text
//! "https://example.{tld;com;com|net}/backend"   [sections.backend] table
//!     → pattern.rs (grammar parse)                  → config (serde record)
//!     → descriptor.rs (normalize, synthesize host regex)
//!     → SectionDescriptor (validated, immutable)
//!     → registered into the SectionCompiler
//! ```
//!
//! # Design Decisions
//! - Both input forms (compact pattern, structured record) funnel into the
//!   same descriptor constructor and share all validation rules
//! - A descriptor is immutable once built; only the compiler fills in the
//!   disambiguation path during processing
//! - Parsing fails fast per section; one bad section never blocks the others

pub mod descriptor;
pub mod pattern;

pub use descriptor::SectionDescriptor;

use thiserror::Error;

/// Errors raised while parsing or validating a single section description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The prefix is missing or empty.
    #[error("section prefix cannot be empty, use at least \"/\"")]
    EmptyPrefix,

    /// A `{placeholder}` appeared in the path part.
    #[error("placeholders in the prefix are not supported: \"{prefix}\"")]
    PlaceholderInPrefix { prefix: String },

    /// The pattern has no path component.
    #[error("pattern \"{pattern}\" is missing a path, use at least \"/\"")]
    MissingPath { pattern: String },

    /// The scheme is neither `http` nor `https`.
    #[error("unsupported scheme \"{scheme}\" in pattern \"{pattern}\"")]
    UnsupportedScheme { scheme: String, pattern: String },

    /// The host part contains a character it may not (`:`).
    #[error("invalid host \"{host}\" in pattern \"{pattern}\"")]
    InvalidHost { host: String, pattern: String },

    /// A placeholder was not of the form `{name;default;value|value}`.
    #[error("malformed host attribute \"{{{placeholder}}}\"")]
    MalformedAttribute { placeholder: String },

    /// An attribute name was re-used within the same host.
    #[error("host attribute \"{name}\" is already used")]
    AttributeAlreadyUsed { name: String },

    /// A host placeholder has no accepted-values requirement.
    #[error("missing requirement for host attribute \"{name}\"")]
    MissingRequirement { name: String },

    /// A host placeholder has no default value.
    #[error("missing default value for host attribute \"{name}\"")]
    MissingDefault { name: String },

    /// A default or requirement was supplied for an attribute the host
    /// template does not contain.
    #[error("unknown host attribute \"{name}\"")]
    UnknownAttribute { name: String },

    /// An attribute default or accepted value contains characters outside
    /// letters, digits, hyphen and underscore.
    #[error("invalid value \"{value}\" for host attribute \"{name}\"")]
    InvalidAttributeValue { name: String, value: String },

    /// A raw host pattern override does not compile.
    #[error("host pattern \"{pattern}\" is not a valid regular expression: {reason}")]
    InvalidHostPattern { pattern: String, reason: String },

    /// A raw host pattern override was supplied without a host, or combined
    /// with host placeholders.
    #[error("host pattern override requires a literal host")]
    PatternWithoutLiteralHost,
}

//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::section::descriptor::DescriptorParts;
use crate::section::{ParseError, SectionDescriptor};

/// Top-level sections file.
///
/// Declared as `[[sections]]` entries so the file order is the
/// registration order, which decides conflict primaries and the sibling
/// order of path discriminators.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionsFile {
    pub sections: Vec<SectionDecl>,
}

/// One named section declaration: either a compact `pattern` or the
/// structured fields, never both.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionDecl {
    /// Section name, unique within the file.
    pub name: String,

    /// Compact URI pattern, e.g. `https://example.com/backend`.
    pub pattern: Option<String>,

    /// Structured configuration, used when no pattern is given.
    #[serde(flatten)]
    pub config: SectionConfig,
}

/// Structured configuration for a single section.
///
/// The decomposed counterpart of the compact pattern form, for
/// collaborators that already hold split-up configuration. All fields but
/// `prefix` are optional: `host` defaults to no constraint, `defaults` and
/// `requirements` to empty maps, `secure` to false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Path prefix; required, use at least `/`.
    pub prefix: String,

    /// Host template, may contain bare `{name}` placeholders.
    pub host: Option<String>,

    /// Raw host regex override; requires a literal `host` and switches
    /// host-equivalence checks to the probabilistic prober.
    pub host_pattern: Option<String>,

    /// Whether the section requires a secure scheme.
    pub secure: bool,

    /// Default value per host attribute.
    pub defaults: BTreeMap<String, String>,

    /// Accepted-value alternation per host attribute, e.g. `com|net`.
    pub requirements: BTreeMap<String, String>,
}

impl SectionConfig {
    /// Validate the record and build a descriptor from it. The same rules
    /// apply as for the compact pattern form.
    pub fn to_descriptor(&self) -> Result<SectionDescriptor, ParseError> {
        SectionDescriptor::build(DescriptorParts {
            is_secure: self.secure,
            host: self.host.clone(),
            raw_pattern: self.host_pattern.clone(),
            prefix: self.prefix.clone(),
            defaults: self.defaults.clone(),
            requirements: self.requirements.clone(),
        })
    }
}

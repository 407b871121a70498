//! Section compilation: grouping, conflict detection, path disambiguation.
//!
//! # Data Flow
//! ```text
//! register_pattern() / register_config()   (one call per section)
//!     → SectionDescriptor (validated)
//!     → process(): group by host equivalence (union-find)
//!                  → detect duplicate prefixes per group (exhaustive)
//!                  → compute disambiguation paths
//!     → export(): name → ResolvedSection (snapshot for the routing layer)
//! ```
//!
//! # Design Decisions
//! - Grouping is a transitive closure over pairwise host equivalence, so
//!   the partition does not depend on registration order; within a group,
//!   registration order still decides the conflict "primary" and the
//!   sibling order of discriminators
//! - Conflict detection reports every conflict across the whole batch in
//!   one error, not just the first encountered
//! - The batch is frozen once processed; `process()` is idempotent after
//!   success and the compiler holds no global state

pub mod disambiguator;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::SectionConfig;
use crate::equivalence;
use crate::section::{pattern, ParseError, SectionDescriptor};

/// API misuse independent of any single section's syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The name is already taken within this batch.
    #[error("section \"{name}\" is already registered")]
    DuplicateName { name: String },

    /// The batch was already processed; registration is frozen.
    #[error("sections are frozen once processed, cannot register \"{name}\"")]
    Frozen { name: String },

    /// `export()` was called before `process()`.
    #[error("sections have not been processed yet")]
    NotProcessed,
}

/// Umbrella error surfaced at the registration/compile boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectioningError {
    #[error("AppSection \"{name}\" configuration is invalid: {error}")]
    Parse { name: String, error: ParseError },

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

/// One primary section and the sections whose host+prefix collide with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionConflict {
    /// First-registered claimant of the shared prefix.
    pub primary: String,
    /// Host template of the primary; `None` when unconstrained.
    pub host: Option<String>,
    /// The shared normalized prefix.
    pub prefix: String,
    /// Later registrants of the same prefix, in registration order.
    pub conflicting: Vec<String>,
}

/// Raised by [`SectionCompiler::process`] when any host-equivalence group
/// contains two sections with the same prefix. Exhaustive: every conflict
/// across the whole batch is reported in one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictError {
    pub conflicts: Vec<SectionConflict>,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conflict) in self.conflicts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let names = conflict
                .conflicting
                .iter()
                .map(|name| format!("\"{name}\""))
                .collect::<Vec<_>>()
                .join(", ");
            write!(
                f,
                "AppSection(s) {names} conflict with \"{}\", all have the same host \"{}\" and prefix \"{}\" configured.",
                conflict.primary,
                conflict.host.as_deref().unwrap_or_default(),
                conflict.prefix,
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConflictError {}

/// Resolved view of one section, consumed by a routing/dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSection {
    pub is_secure: bool,
    pub domain: Option<String>,
    pub host: Option<String>,
    pub host_pattern: Option<String>,
    pub prefix: String,
    pub path: String,
    pub defaults: BTreeMap<String, String>,
    pub requirements: BTreeMap<String, String>,
}

impl ResolvedSection {
    /// Host requirement for a route definition. A route requirement cannot
    /// be empty, so an unconstrained host renders as `.*`.
    pub fn host_requirement(&self) -> &str {
        self.host_pattern.as_deref().unwrap_or(".*")
    }
}

/// Compiles a batch of named sections into a conflict-free export map.
///
/// Sections are registered one by one, then a single [`process`] step runs
/// grouping, conflict detection and path disambiguation over the whole
/// batch. The compile happens once during application bootstrap; the batch
/// is an isolated, owned unit of work.
///
/// [`process`]: SectionCompiler::process
#[derive(Debug, Default)]
pub struct SectionCompiler {
    sections: Vec<SectionDescriptor>,
    resolved: Option<BTreeMap<String, ResolvedSection>>,
}

impl SectionCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section from a compact URI pattern.
    pub fn register_pattern(&mut self, name: &str, pattern: &str) -> Result<&mut Self, SectioningError> {
        let descriptor = pattern::parse(pattern).map_err(|error| SectioningError::Parse {
            name: name.to_string(),
            error,
        })?;
        self.insert(name, descriptor)
    }

    /// Register a section from a structured configuration record.
    pub fn register_config(&mut self, name: &str, config: &SectionConfig) -> Result<&mut Self, SectioningError> {
        let descriptor = config.to_descriptor().map_err(|error| SectioningError::Parse {
            name: name.to_string(),
            error,
        })?;
        self.insert(name, descriptor)
    }

    fn insert(&mut self, name: &str, mut descriptor: SectionDescriptor) -> Result<&mut Self, SectioningError> {
        if self.resolved.is_some() {
            return Err(UsageError::Frozen { name: name.to_string() }.into());
        }
        if self.sections.iter().any(|section| section.name() == name) {
            return Err(UsageError::DuplicateName { name: name.to_string() }.into());
        }
        descriptor.set_name(name);
        tracing::debug!(
            section = name,
            prefix = descriptor.prefix(),
            host = descriptor.host_template().unwrap_or("*"),
            "section registered"
        );
        self.sections.push(descriptor);
        Ok(self)
    }

    /// Group sections by host equivalence, detect prefix conflicts and
    /// compute disambiguation paths. Idempotent after success: the batch
    /// freezes and re-invocation returns without re-running anything.
    pub fn process(&mut self) -> Result<(), ConflictError> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let groups = self.group_by_host();
        tracing::debug!(
            sections = self.sections.len(),
            groups = groups.len(),
            "sections grouped by host equivalence"
        );

        let conflicts = self.detect_conflicts(&groups);
        if !conflicts.is_empty() {
            tracing::warn!(conflicts = conflicts.len(), "conflicting sections detected");
            return Err(ConflictError { conflicts });
        }

        let mut resolved = BTreeMap::new();
        for group in &groups {
            for &index in group {
                let target = &self.sections[index];
                let siblings = group
                    .iter()
                    .filter(|&&sibling| sibling != index)
                    .map(|&sibling| &self.sections[sibling]);
                let path = disambiguator::compute_path(target, siblings);
                resolved.insert(target.name().to_string(), resolve(target, path));
            }
        }
        tracing::info!(sections = resolved.len(), "sections compiled");
        self.resolved = Some(resolved);
        Ok(())
    }

    /// Snapshot of the resolved export map.
    pub fn export(&self) -> Result<BTreeMap<String, ResolvedSection>, UsageError> {
        self.resolved.clone().ok_or(UsageError::NotProcessed)
    }

    /// Check the current batch without freezing it.
    pub fn is_conflict_free(&self) -> bool {
        self.resolved.is_some() || self.detect_conflicts(&self.group_by_host()).is_empty()
    }

    /// Partition section indices into host-equivalence classes via
    /// union-find over the pairwise relation. Groups and their members are
    /// ordered by registration index.
    fn group_by_host(&self) -> Vec<Vec<usize>> {
        let count = self.sections.len();
        let mut parent: Vec<usize> = (0..count).collect();

        fn find(parent: &mut [usize], mut index: usize) -> usize {
            while parent[index] != index {
                parent[index] = parent[parent[index]];
                index = parent[index];
            }
            index
        }

        for i in 0..count {
            for j in i + 1..count {
                if equivalence::host_equals(&self.sections[i], &self.sections[j]) {
                    let (root_i, root_j) = (find(&mut parent, i), find(&mut parent, j));
                    if root_i != root_j {
                        parent[root_i.max(root_j)] = root_i.min(root_j);
                    }
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in 0..count {
            let root = find(&mut parent, index);
            groups.entry(root).or_default().push(index);
        }
        groups.into_values().collect()
    }

    /// Collect every duplicate-prefix conflict across all groups. The first
    /// registrant of a prefix within a group is the primary; later
    /// registrants of the same prefix conflict with it.
    fn detect_conflicts(&self, groups: &[Vec<usize>]) -> Vec<SectionConflict> {
        let mut conflicts: Vec<SectionConflict> = Vec::new();
        for group in groups {
            let mut claimed: Vec<(usize, &str)> = Vec::new();
            for &index in group {
                let section = &self.sections[index];
                match claimed.iter().find(|(_, prefix)| *prefix == section.prefix()) {
                    Some(&(primary, _)) => {
                        let primary_section = &self.sections[primary];
                        match conflicts
                            .iter_mut()
                            .find(|conflict| conflict.primary == primary_section.name())
                        {
                            Some(conflict) => conflict.conflicting.push(section.name().to_string()),
                            None => conflicts.push(SectionConflict {
                                primary: primary_section.name().to_string(),
                                host: primary_section.host_template().map(str::to_string),
                                prefix: primary_section.prefix().to_string(),
                                conflicting: vec![section.name().to_string()],
                            }),
                        }
                    }
                    None => claimed.push((index, section.prefix())),
                }
            }
        }
        conflicts
    }
}

fn resolve(section: &SectionDescriptor, path: String) -> ResolvedSection {
    ResolvedSection {
        is_secure: section.is_secure(),
        domain: section.domain().map(str::to_string),
        host: section.host_template().map(str::to_string),
        host_pattern: section.host_pattern().map(str::to_string),
        prefix: section.prefix().to_string(),
        path,
        defaults: section.defaults().clone(),
        requirements: section.requirements().clone(),
    }
}

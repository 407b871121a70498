//! Host equivalence: can two section hosts describe the same physical host?
//!
//! # Design Decisions
//! - One `HostComparator` capability, two implementations: exact
//!   attribute-set intersection for descriptors built by this compiler,
//!   probabilistic regex probing for raw externally supplied patterns
//! - The comparator is selected once per pair from the descriptor shape,
//!   not by branching on type at every call site
//! - An unconstrained host is compatible with anything (conservative:
//!   assume possible conflict)
//! - Per-token value-set intersection ignores correlations between
//!   different placeholders; that approximation is deliberate

pub mod probe;

use crate::section::SectionDescriptor;

/// Capability for deciding whether two section hosts can coincide.
pub trait HostComparator {
    fn hosts_equal(&self, a: &SectionDescriptor, b: &SectionDescriptor) -> bool;
}

/// Exact comparison over structured host templates and their per-attribute
/// accepted-value sets.
pub struct AttributeSetComparator;

/// Randomized comparison for raw host regexes that carry no structured
/// attribute information. See [`probe::equals`].
pub struct ProbingComparator;

/// Decide whether two descriptors' hosts can describe the same host.
pub fn host_equals(a: &SectionDescriptor, b: &SectionDescriptor) -> bool {
    if a.host_template().is_none() || b.host_template().is_none() {
        return true;
    }
    comparator_for(a, b).hosts_equal(a, b)
}

fn comparator_for(a: &SectionDescriptor, b: &SectionDescriptor) -> &'static dyn HostComparator {
    if a.has_opaque_pattern() || b.has_opaque_pattern() {
        &ProbingComparator
    } else {
        &AttributeSetComparator
    }
}

impl HostComparator for AttributeSetComparator {
    fn hosts_equal(&self, a: &SectionDescriptor, b: &SectionDescriptor) -> bool {
        let (Some(template_a), Some(template_b)) = (a.host_template(), b.host_template()) else {
            return true;
        };

        if a.requirements().is_empty() && b.requirements().is_empty() {
            return template_a == template_b;
        }

        let tokens_a: Vec<&str> = template_a.split('.').collect();
        let tokens_b: Vec<&str> = template_b.split('.').collect();
        if tokens_a.len() != tokens_b.len() {
            return false;
        }

        tokens_a
            .iter()
            .zip(&tokens_b)
            .all(|(ta, tb)| intersects(&token_values(ta, a), &token_values(tb, b)))
    }
}

impl HostComparator for ProbingComparator {
    fn hosts_equal(&self, a: &SectionDescriptor, b: &SectionDescriptor) -> bool {
        let (Some(pattern_a), Some(pattern_b)) = (a.host_pattern(), b.host_pattern()) else {
            return true;
        };
        // Samples are generated from the first pattern, so when only one
        // side is opaque the synthesized pattern takes that role: raw
        // patterns may contain syntax the generator cannot process.
        if a.has_opaque_pattern() && !b.has_opaque_pattern() {
            probe::equals(pattern_b, pattern_a)
        } else {
            probe::equals(pattern_a, pattern_b)
        }
    }
}

/// Accepted values for one dot-separated host token: a literal token is a
/// singleton, a `{name}` token contributes its requirement alternation.
fn token_values<'d>(token: &'d str, section: &'d SectionDescriptor) -> Vec<&'d str> {
    token
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .and_then(|name| section.requirements().get(name))
        .map(|requirement| requirement.split('|').collect())
        .unwrap_or_else(|| vec![token])
}

fn intersects(a: &[&str], b: &[&str]) -> bool {
    a.iter().any(|value| b.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionDescriptor;

    fn section(pattern: &str) -> SectionDescriptor {
        SectionDescriptor::parse(pattern).unwrap()
    }

    #[test]
    fn test_unconstrained_host_is_equivalent_to_anything() {
        assert!(host_equals(&section("/"), &section("example.com/")));
        assert!(host_equals(&section("example.com/"), &section("*/backend")));
        assert!(host_equals(&section("/"), &section("/backend")));
    }

    #[test]
    fn test_literal_hosts_compare_literally() {
        assert!(host_equals(&section("example.com/"), &section("example.com/backend")));
        assert!(!host_equals(&section("example.com/"), &section("example2.com/")));
        assert!(host_equals(&section("Example.COM/"), &section("example.com/")));
    }

    #[test]
    fn test_different_token_counts_cannot_coincide() {
        assert!(!host_equals(
            &section("example.{tld;com;com|net}/"),
            &section("www.example.{tld;com;com|net}/"),
        ));
    }

    #[test]
    fn test_attribute_sets_intersect() {
        // value sets {com,net} and {net} share "net"
        assert!(host_equals(
            &section("example.{a;com;com|net}/"),
            &section("example.{b;net;net}/"),
        ));
        assert!(!host_equals(
            &section("example.{a;com;com|org}/"),
            &section("example.{b;net;net}/"),
        ));
    }

    #[test]
    fn test_attribute_against_literal_token() {
        assert!(host_equals(
            &section("example.{tld;com;com|net}/"),
            &section("example.com/backend"),
        ));
        assert!(!host_equals(
            &section("example.{tld;com;com|net}/"),
            &section("example.org/backend"),
        ));
    }
}

//! Negative-lookahead path synthesis.
//!
//! Within a host-equivalence group a flat request matcher cannot rely on
//! registration order: a section with prefix `/` would swallow requests
//! that belong to a sibling with prefix `backend/`. Each section therefore
//! gets a path regex that excludes the first diverging segment of every
//! sibling that extends its own prefix.

use crate::section::SectionDescriptor;

/// Compute the disambiguation path for `target` against its siblings in
/// the same host-equivalence group.
///
/// `/` with siblings `backend/` and `api/` yields `^/(?!(backend|api)/)`;
/// `api/` with sibling `api/backend/` yields `^/api/(?!(backend)/)`;
/// a section no sibling extends keeps its plain anchored prefix.
pub fn compute_path<'a>(
    target: &SectionDescriptor,
    siblings: impl Iterator<Item = &'a SectionDescriptor>,
) -> String {
    let mut discriminators: Vec<&str> = Vec::new();
    for sibling in siblings {
        if let Some(segment) = discriminator(target.prefix(), sibling.prefix()) {
            if !discriminators.contains(&segment) {
                discriminators.push(segment);
            }
        }
    }

    let mut path = format!("^/{}", regex::escape(target.prefix().trim_start_matches('/')));
    if !discriminators.is_empty() {
        let joined = discriminators
            .iter()
            .map(|segment| regex::escape(segment))
            .collect::<Vec<_>>()
            .join("|");
        path.push_str(&format!("(?!({joined})/)"));
    }
    path
}

/// The segment of `other` that `current` must not match, if any.
///
/// Walks `other`'s segments: when `current` runs out of segments at the
/// root or after a run of equal segments, the next segment of `other` is
/// unique to it and must be excluded. Diverging before any segment matched
/// means the prefixes cannot overlap at all.
fn discriminator<'o>(current: &str, other: &'o str) -> Option<&'o str> {
    let current: Vec<&str> = current.split('/').filter(|s| !s.is_empty()).collect();
    let other: Vec<&'o str> = other.split('/').filter(|s| !s.is_empty()).collect();

    let mut matched = false;
    for (i, segment) in other.iter().enumerate() {
        match current.get(i) {
            None => {
                if i == 0 || matched {
                    return Some(segment);
                }
                return None;
            }
            Some(own) if own == segment => matched = true,
            Some(_) => {
                if matched {
                    return Some(segment);
                }
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_excludes_every_sibling_head() {
        assert_eq!(discriminator("/", "backend/"), Some("backend"));
        assert_eq!(discriminator("/", "api/backend/"), Some("api"));
    }

    #[test]
    fn test_extension_of_own_prefix_is_excluded() {
        assert_eq!(discriminator("api/", "api/backend/"), Some("backend"));
        assert_eq!(discriminator("api/v1/", "api/v1/admin/"), Some("admin"));
    }

    #[test]
    fn test_unrelated_prefixes_need_no_discriminator() {
        assert_eq!(discriminator("backend/", "api/"), None);
        assert_eq!(discriminator("backend/", "api/backend/"), None);
    }

    #[test]
    fn test_own_prefix_or_shorter_needs_no_discriminator() {
        assert_eq!(discriminator("api/backend/", "api/"), None);
        assert_eq!(discriminator("backend/", "backend/"), None);
        assert_eq!(discriminator("backend/", "/"), None);
    }

    #[test]
    fn test_divergence_after_shared_run() {
        assert_eq!(discriminator("api/v1/", "api/v2/"), Some("v2"));
    }
}

//! Randomized regex equivalence probing.
//!
//! Decides whether two regular expressions could both match the same input
//! by generating random strings the first pattern accepts and testing them
//! against the second. This is a one-sided soundness check: it can report
//! false negatives for patterns with very narrow accepted languages, and it
//! must only be used for detecting configuration conflicts at startup,
//! never for security-relevant matching.

use std::sync::OnceLock;

use regex_syntax::hir::{Class, Hir, HirKind};
use tracing::warn;

/// Number of seeded generation trials before giving up.
const TRIALS: u64 = 9;

/// True when the patterns could both match the same string.
///
/// Byte-identical patterns short-circuit to true. Otherwise named capture
/// groups are reduced to plain groups in `first`, the pattern is parsed
/// into a regex AST, and for each seed 1..=9 a random accepted string is
/// generated and matched against `second`. Generation is deterministic per
/// seed, so verdicts are stable across runs.
pub fn equals(first: &str, second: &str) -> bool {
    if first == second {
        return true;
    }

    let stripped = strip_named_groups(first);
    let hir = match regex_syntax::parse(&stripped) {
        Ok(hir) => hir,
        Err(err) => {
            warn!(pattern = first, %err, "cannot generate samples for pattern, treating as non-equivalent");
            return false;
        }
    };
    let matcher = match fancy_regex::Regex::new(second) {
        Ok(matcher) => matcher,
        Err(err) => {
            warn!(pattern = second, %err, "pattern does not compile, treating as non-equivalent");
            return false;
        }
    };

    for seed in 1..=TRIALS {
        let sample = generate(&hir, &mut fastrand::Rng::with_seed(seed));
        if matcher.is_match(&sample).unwrap_or(false) {
            return true;
        }
    }
    false
}

/// Reduce `(?P<name>` to `(` so the generation side does not need named
/// capture support.
fn strip_named_groups(pattern: &str) -> String {
    static NAMED_GROUP: OnceLock<regex::Regex> = OnceLock::new();
    let re = NAMED_GROUP
        .get_or_init(|| regex::Regex::new(r"\(\?P<[A-Za-z0-9_]+>").expect("literal pattern compiles"));
    re.replace_all(pattern, "(").into_owned()
}

fn generate(hir: &Hir, rng: &mut fastrand::Rng) -> String {
    let mut out = String::new();
    write_sample(hir, rng, &mut out);
    out
}

fn write_sample(hir: &Hir, rng: &mut fastrand::Rng, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.push_str(&String::from_utf8_lossy(&literal.0)),
        HirKind::Class(Class::Unicode(class)) => {
            let ranges = class.ranges();
            if ranges.is_empty() {
                return;
            }
            let range = &ranges[rng.usize(0..ranges.len())];
            let candidate = rng.u32(range.start() as u32..=range.end() as u32);
            match char::from_u32(candidate) {
                Some(c) => out.push(c),
                None => out.push(range.start()),
            }
        }
        HirKind::Class(Class::Bytes(class)) => {
            let ranges = class.ranges();
            if ranges.is_empty() {
                return;
            }
            let range = &ranges[rng.usize(0..ranges.len())];
            out.push(rng.u8(range.start()..=range.end()) as char);
        }
        HirKind::Repetition(repetition) => {
            let min = repetition.min;
            let max = repetition.max.unwrap_or(min + 3).min(min + 3);
            let count = rng.u32(min..=max.max(min));
            for _ in 0..count {
                write_sample(&repetition.sub, rng, out);
            }
        }
        HirKind::Capture(capture) => write_sample(&capture.sub, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                write_sample(part, rng, out);
            }
        }
        HirKind::Alternation(parts) => {
            if !parts.is_empty() {
                write_sample(&parts[rng.usize(0..parts.len())], rng, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_patterns_are_equal() {
        assert!(equals("foobar", "foobar"));
        assert!(equals(r"^example\.com$", r"^example\.com$"));
    }

    #[test]
    fn test_grouping_does_not_affect_equality() {
        assert!(equals("^foo(bar)$", "^foobar$"));
        assert!(equals("^(foo)(bar)$", "^foobar$"));
    }

    #[test]
    fn test_named_groups_are_stripped_before_generation() {
        assert!(equals("^/(?P<tld>app)/$", "^/app/$"));
        assert!(equals(r"^example\.(?P<tld>com)$", r"^example\.com$"));
    }

    #[test]
    fn test_disjoint_patterns_are_not_equal() {
        assert!(!equals("^foo$", "^foobar$"));
        assert!(!equals("^foobar$", "^foo$"));
    }

    #[test]
    fn test_alternations_probe_across_branches() {
        assert!(equals(r"^example\.(com|net)$", r"^example\.net$"));
        assert!(!equals(r"^example\.(com|org)$", r"^example\.net$"));
    }

    #[test]
    fn test_lookahead_is_supported_on_the_matching_side() {
        assert!(equals("^foobar$", "foo(?=bar)"));
        assert!(!equals("^foobar$", "foo(?!bar)"));
    }

    #[test]
    fn test_unparsable_generation_side_is_not_equal() {
        // lookarounds cannot be sample-generated
        assert!(!equals("foo(?!bar)", "foobar"));
    }

    #[test]
    fn test_verdicts_are_deterministic() {
        for _ in 0..3 {
            assert!(equals("^foo(bar)$", "^foobar$"));
            assert!(!equals("^foo$", "^foobar$"));
        }
    }
}

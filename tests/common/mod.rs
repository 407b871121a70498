//! Shared utilities for integration testing.

use app_sectioning::SectionCompiler;

/// Register the given `(name, pattern)` pairs and run the compile.
pub fn compile(sections: &[(&str, &str)]) -> SectionCompiler {
    let mut compiler = SectionCompiler::new();
    for (name, pattern) in sections {
        compiler
            .register_pattern(name, pattern)
            .unwrap_or_else(|err| panic!("section {name}: {err}"));
    }
    compiler.process().expect("sections should be conflict-free");
    compiler
}

/// Assert whether a produced path regex accepts a request path. Uses a
/// lookaround-capable engine, like the request matcher consuming the
/// exported map would.
#[allow(dead_code)]
pub fn assert_path_match(path_regex: &str, request_path: &str, expected: bool) {
    let regex = fancy_regex::Regex::new(path_regex)
        .unwrap_or_else(|err| panic!("path regex {path_regex:?}: {err}"));
    let matched = regex.is_match(request_path).unwrap();
    assert_eq!(
        matched, expected,
        "path regex {path_regex:?} against {request_path:?}"
    );
}

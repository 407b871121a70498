//! Loading a sections file from disk and compiling it end to end.

use std::fs;
use std::path::PathBuf;

use app_sectioning::config::loader::{load_sections, ConfigError};
use app_sectioning::SectionCompiler;

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("app-sectioning-{name}-{}.toml", std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_and_compiles_a_sections_file() {
    let path = write_config(
        "valid",
        r#"
        [[sections]]
        name = "frontend"
        pattern = "example.com/"

        [[sections]]
        name = "backend"
        prefix = "backend"
        host = "example.com"
        secure = true
        "#,
    );

    let file = load_sections(&path).unwrap();
    let mut compiler = SectionCompiler::new();
    for decl in &file.sections {
        match &decl.pattern {
            Some(pattern) => compiler.register_pattern(&decl.name, pattern).unwrap(),
            None => compiler.register_config(&decl.name, &decl.config).unwrap(),
        };
    }
    compiler.process().unwrap();

    let resolved = compiler.export().unwrap();
    assert_eq!(resolved["frontend"].path, "^/(?!(backend)/)");
    assert_eq!(resolved["backend"].path, "^/backend/");
    assert!(resolved["backend"].is_secure);

    fs::remove_file(path).ok();
}

#[test]
fn file_order_decides_the_conflict_primary() {
    let path = write_config(
        "conflict",
        r#"
        [[sections]]
        name = "frontend"
        pattern = "example.com/"

        [[sections]]
        name = "backend"
        pattern = "example.com/"
        "#,
    );

    let file = load_sections(&path).unwrap();
    let mut compiler = SectionCompiler::new();
    for decl in &file.sections {
        compiler
            .register_pattern(&decl.name, decl.pattern.as_deref().unwrap())
            .unwrap();
    }

    let error = compiler.process().unwrap_err();
    assert_eq!(error.conflicts[0].primary, "frontend");
    assert_eq!(error.conflicts[0].conflicting, vec!["backend".to_string()]);

    fs::remove_file(path).ok();
}

#[test]
fn ambiguous_declarations_are_rejected_at_load_time() {
    let path = write_config(
        "ambiguous",
        r#"
        [[sections]]
        name = "frontend"
        pattern = "example.com/"
        prefix = "/"
        "#,
    );

    let error = load_sections(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Validation(_)));
    assert!(error.to_string().contains("frontend"));

    fs::remove_file(path).ok();
}

#[test]
fn missing_file_is_an_io_error() {
    let error = load_sections(&PathBuf::from("/nonexistent/sections.toml")).unwrap_err();
    assert!(matches!(error, ConfigError::Io(_)));
}

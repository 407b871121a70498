//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::SectionsFile;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Shape errors in a sections file. Semantic validation (host attributes,
/// prefix rules, conflicts) happens in the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("section entry {index} is missing a name")]
    MissingName { index: usize },

    #[error("section \"{name}\" sets both a pattern and structured fields")]
    AmbiguousShape { name: String },

    #[error("section \"{name}\" sets neither a pattern nor structured fields")]
    EmptyShape { name: String },
}

/// Load a sections file from TOML and check its shape.
pub fn load_sections(path: &Path) -> Result<SectionsFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let file: SectionsFile = toml::from_str(&content).map_err(ConfigError::Parse)?;

    let errors = validate_shape(&file);
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(file)
}

/// Collect every shape error, not just the first.
fn validate_shape(file: &SectionsFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (index, decl) in file.sections.iter().enumerate() {
        if decl.name.is_empty() {
            errors.push(ValidationError::MissingName { index });
        }
        let structured = decl.config != Default::default();
        match (&decl.pattern, structured) {
            (Some(_), true) => errors.push(ValidationError::AmbiguousShape { name: decl.name.clone() }),
            (None, false) => errors.push(ValidationError::EmptyShape { name: decl.name.clone() }),
            _ => {}
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SectionDecl;

    fn decl(name: &str, pattern: Option<&str>, prefix: &str) -> SectionDecl {
        let mut decl = SectionDecl {
            name: name.to_string(),
            pattern: pattern.map(str::to_string),
            ..SectionDecl::default()
        };
        decl.config.prefix = prefix.to_string();
        decl
    }

    #[test]
    fn test_valid_shapes_pass() {
        let file = SectionsFile {
            sections: vec![decl("frontend", Some("example.com/"), ""), decl("backend", None, "/backend")],
        };
        assert!(validate_shape(&file).is_empty());
    }

    #[test]
    fn test_all_shape_errors_are_collected() {
        let file = SectionsFile {
            sections: vec![
                decl("", Some("example.com/"), ""),
                decl("both", Some("example.com/"), "/backend"),
                decl("neither", None, ""),
            ],
        };
        assert_eq!(
            validate_shape(&file),
            vec![
                ValidationError::MissingName { index: 0 },
                ValidationError::AmbiguousShape { name: "both".to_string() },
                ValidationError::EmptyShape { name: "neither".to_string() },
            ]
        );
    }
}

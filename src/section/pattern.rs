//! Compact URI-pattern parsing.
//!
//! Grammar: `[scheme "://"] [host] path`. The scheme is `http` or `https`
//! (case-insensitive, `https` marks the section secure), the host is any
//! run of characters excluding `/` and `:` (`*` or empty means no host
//! constraint) and the path must start with `/`. Host placeholders use the
//! form `{name;default;value1|value2|...}` and are rewritten to bare
//! `{name}` in the stored template, with their default and accepted values
//! recorded on the descriptor.

use super::descriptor::{DescriptorParts, SectionDescriptor};
use super::ParseError;

/// Parse a compact section pattern into a validated descriptor.
pub fn parse(pattern: &str) -> Result<SectionDescriptor, ParseError> {
    let (is_secure, rest) = split_scheme(pattern)?;
    let Some(slash) = rest.find('/') else {
        return Err(ParseError::MissingPath { pattern: pattern.to_string() });
    };
    let (host_part, path) = rest.split_at(slash);
    if host_part.contains(':') {
        return Err(ParseError::InvalidHost {
            host: host_part.to_string(),
            pattern: pattern.to_string(),
        });
    }

    let mut parts = expand_host(&host_part.to_lowercase())?;
    parts.is_secure = is_secure;
    parts.prefix = path.to_string();
    SectionDescriptor::build(parts)
}

fn split_scheme(pattern: &str) -> Result<(bool, &str), ParseError> {
    match pattern.split_once("://") {
        Some((scheme, rest)) if !scheme.contains('/') => {
            if scheme.eq_ignore_ascii_case("https") {
                Ok((true, rest))
            } else if scheme.eq_ignore_ascii_case("http") {
                Ok((false, rest))
            } else {
                Err(ParseError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    pattern: pattern.to_string(),
                })
            }
        }
        _ => Ok((false, pattern)),
    }
}

/// Rewrite `{name;default;values}` placeholders to bare `{name}` form,
/// recording defaults and requirements along the way.
fn expand_host(host: &str) -> Result<DescriptorParts, ParseError> {
    let mut parts = DescriptorParts::default();
    if host.is_empty() || host == "*" {
        return Ok(parts);
    }

    let mut template = String::with_capacity(host.len());
    let mut rest = host;
    while let Some(open) = rest.find('{') {
        template.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(ParseError::MalformedAttribute { placeholder: after.to_string() });
        };
        let name = expand_placeholder(&after[..close], &mut parts)?;
        template.push('{');
        template.push_str(&name);
        template.push('}');
        rest = &after[close + 1..];
    }
    template.push_str(rest);

    parts.host = Some(template);
    Ok(parts)
}

fn expand_placeholder(placeholder: &str, parts: &mut DescriptorParts) -> Result<String, ParseError> {
    let mut pieces = placeholder.split(';');
    let name = pieces.next().unwrap_or_default().to_string();
    let default = pieces.next();
    let values = pieces.next();
    if pieces.next().is_some() {
        return Err(ParseError::MalformedAttribute { placeholder: placeholder.to_string() });
    }
    if parts.defaults.contains_key(&name) || parts.requirements.contains_key(&name) {
        return Err(ParseError::AttributeAlreadyUsed { name });
    }
    if let Some(default) = default {
        parts.defaults.insert(name.clone(), default.to_string());
    }
    if let Some(values) = values {
        parts.requirements.insert(name.clone(), values.to_string());
    }
    Ok(name)
}

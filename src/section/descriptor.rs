//! Parsed, validated in-memory representation of a section.

use std::collections::BTreeMap;

use super::ParseError;

/// A parsed application section: an optional host constraint plus a
/// required, normalized path prefix.
///
/// Hosts and prefixes are lower-cased at construction so every later
/// comparison is case-insensitive. A descriptor is immutable once built;
/// the compiler assigns its name at registration and computes its
/// disambiguation path during processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    name: String,
    is_secure: bool,
    host_template: Option<String>,
    domain: Option<String>,
    requirements: BTreeMap<String, String>,
    defaults: BTreeMap<String, String>,
    host_pattern: Option<String>,
    opaque_pattern: bool,
    prefix: String,
}

/// Raw building blocks shared by the pattern parser and the structured
/// configuration record. Both input forms funnel into [`SectionDescriptor::build`].
#[derive(Debug, Default)]
pub(crate) struct DescriptorParts {
    pub is_secure: bool,
    pub host: Option<String>,
    pub raw_pattern: Option<String>,
    pub prefix: String,
    pub defaults: BTreeMap<String, String>,
    pub requirements: BTreeMap<String, String>,
}

impl SectionDescriptor {
    /// Parse a compact URI pattern, e.g. `https://example.{tld;com;com|net}/backend`.
    pub fn parse(pattern: &str) -> Result<Self, ParseError> {
        super::pattern::parse(pattern)
    }

    pub(crate) fn build(parts: DescriptorParts) -> Result<Self, ParseError> {
        let prefix = normalize_prefix(&parts.prefix)?;

        let host_template = match parts.host.as_deref() {
            None | Some("") | Some("*") => None,
            Some(host) => Some(host.to_lowercase()),
        };
        let Some(template) = host_template else {
            if parts.raw_pattern.is_some() {
                return Err(ParseError::PatternWithoutLiteralHost);
            }
            if let Some(name) = parts.requirements.keys().chain(parts.defaults.keys()).next() {
                return Err(ParseError::UnknownAttribute { name: name.clone() });
            }
            return Ok(Self {
                name: String::new(),
                is_secure: parts.is_secure,
                host_template: None,
                domain: None,
                requirements: BTreeMap::new(),
                defaults: BTreeMap::new(),
                host_pattern: None,
                opaque_pattern: false,
                prefix,
            });
        };

        // Attribute names are case-folded along with the host literals.
        let requirements = lowercase_keys(parts.requirements);
        let defaults = lowercase_keys(parts.defaults);

        let attributes = host_attributes(&template)?;
        for name in &attributes {
            let requirement = requirements
                .get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ParseError::MissingRequirement { name: name.clone() })?;
            for value in requirement.split('|') {
                validate_attribute_value(name, value)?;
            }
            let default = defaults
                .get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ParseError::MissingDefault { name: name.clone() })?;
            validate_attribute_value(name, default)?;
        }
        for name in requirements.keys().chain(defaults.keys()) {
            if !attributes.contains(name) {
                return Err(ParseError::UnknownAttribute { name: name.clone() });
            }
        }

        let (host_pattern, opaque_pattern) = match parts.raw_pattern {
            Some(raw) => {
                if !attributes.is_empty() {
                    return Err(ParseError::PatternWithoutLiteralHost);
                }
                fancy_regex::Regex::new(&raw).map_err(|err| ParseError::InvalidHostPattern {
                    pattern: raw.clone(),
                    reason: err.to_string(),
                })?;
                (raw, true)
            }
            None => (synthesize_host_pattern(&template, &requirements)?, false),
        };

        let domain = attributes.is_empty().then(|| template.clone());

        Ok(Self {
            name: String::new(),
            is_secure: parts.is_secure,
            host_template: Some(template),
            domain,
            requirements,
            defaults,
            host_pattern: Some(host_pattern),
            opaque_pattern,
            prefix,
        })
    }

    /// Unique name within a registration batch; assigned by the compiler.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// True when the pattern specified a secure scheme.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// Host template with placeholders in bare `{name}` form; `None` means
    /// the section matches any host.
    pub fn host_template(&self) -> Option<&str> {
        self.host_template.as_deref()
    }

    /// Concrete host value; set only when the template has no placeholders.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Accepted-value alternation per attribute name.
    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }

    /// Default value per attribute name.
    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Anchored `^...$` host regex with one named capture group per
    /// placeholder; `None` iff the template is `None`.
    pub fn host_pattern(&self) -> Option<&str> {
        self.host_pattern.as_deref()
    }

    /// True when the host pattern was supplied as a raw regex instead of
    /// being synthesized from the template. Such descriptors are compared
    /// with the probabilistic prober rather than attribute-set intersection.
    pub fn has_opaque_pattern(&self) -> bool {
        self.opaque_pattern
    }

    /// Normalized prefix: lower-cased, no leading slash, trailing slash
    /// unless it is exactly `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Lower-case, strip surrounding slashes, re-suffix a trailing slash unless
/// the result is the bare root.
pub(crate) fn normalize_prefix(raw: &str) -> Result<String, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::EmptyPrefix);
    }
    if raw.contains('{') || raw.contains('}') {
        return Err(ParseError::PlaceholderInPrefix { prefix: raw.to_string() });
    }
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

/// Collect placeholder names from a bare `{name}` template, rejecting
/// malformed braces, invalid names and re-used names.
fn host_attributes(template: &str) -> Result<Vec<String>, ParseError> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if rest[..open].contains('}') {
            return Err(ParseError::MalformedAttribute { placeholder: template.to_string() });
        }
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(ParseError::MalformedAttribute { placeholder: after.to_string() });
        };
        let name = &after[..close];
        if !is_attribute_name(name) {
            return Err(ParseError::MalformedAttribute { placeholder: name.to_string() });
        }
        if names.iter().any(|n| n == name) {
            return Err(ParseError::AttributeAlreadyUsed { name: name.to_string() });
        }
        names.push(name.to_string());
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err(ParseError::MalformedAttribute { placeholder: template.to_string() });
    }
    Ok(names)
}

fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_attribute_value(name: &str, value: &str) -> Result<(), ParseError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ParseError::InvalidAttributeValue {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Build the anchored host regex: literal runs are escaped, each `{name}`
/// becomes a named capture group over its accepted-value alternation.
fn synthesize_host_pattern(
    template: &str,
    requirements: &BTreeMap<String, String>,
) -> Result<String, ParseError> {
    let mut pattern = String::from("^");
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        pattern.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after.find('}').unwrap_or(after.len());
        let name = &after[..close];
        pattern.push_str("(?P<");
        pattern.push_str(name);
        pattern.push('>');
        pattern.push_str(requirements.get(name).map(String::as_str).unwrap_or_default());
        pattern.push(')');
        rest = &after[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    regex::Regex::new(&pattern).map_err(|err| ParseError::InvalidHostPattern {
        pattern: pattern.clone(),
        reason: err.to_string(),
    })?;
    Ok(pattern)
}

fn lowercase_keys(map: BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

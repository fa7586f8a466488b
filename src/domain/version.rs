use crate::error::{GitflowError, Result};
use std::fmt;
use std::str::FromStr;

/// Qualifier marking an unreleased development version
pub const SNAPSHOT_QUALIFIER: &str = "SNAPSHOT";

/// Separator placed between the numeric part and a qualifier by default
pub const DEFAULT_SEPARATOR: char = '-';

/// Number of leading components considered "primary" (major.minor)
const PRIMARY_COMPONENTS: usize = 2;

/// Structured version: numeric components plus an optional qualifier.
///
/// `1.2.3-SNAPSHOT` parses to components `[1, 2, 3]`, separator `-` and
/// qualifier `SNAPSHOT`. Formatting a parsed version gives back the exact
/// input string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    components: Vec<u64>,
    separator: char,
    qualifier: Option<String>,
}

impl SemanticVersion {
    /// Create a qualifier-free version from numeric components
    pub fn new(components: Vec<u64>) -> Result<Self> {
        if components.is_empty() {
            return Err(GitflowError::invalid_version(
                "version needs at least one numeric component",
            ));
        }
        Ok(SemanticVersion {
            components,
            separator: DEFAULT_SEPARATOR,
            qualifier: None,
        })
    }

    /// Parse a version string such as `1.2.3`, `1.2.3-SNAPSHOT` or `4.0_beta`
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let bytes = text.as_bytes();
        let mut components = Vec::new();
        let mut pos = 0;

        loop {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if start == pos {
                return Err(GitflowError::invalid_version(format!(
                    "'{}' - expected a numeric component at position {}",
                    input, start
                )));
            }
            let component = text[start..pos].parse::<u64>().map_err(|_| {
                GitflowError::invalid_version(format!(
                    "'{}' - component '{}' is out of range",
                    input,
                    &text[start..pos]
                ))
            })?;
            components.push(component);

            if pos == bytes.len() {
                return Ok(SemanticVersion {
                    components,
                    separator: DEFAULT_SEPARATOR,
                    qualifier: None,
                });
            }

            let next_is_digit = bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit());
            if bytes[pos] == b'.' && next_is_digit {
                pos += 1;
                continue;
            }
            break;
        }

        let separator = text[pos..].chars().next().unwrap_or(DEFAULT_SEPARATOR);
        let qualifier = &text[pos + separator.len_utf8()..];
        if qualifier.is_empty() {
            return Err(GitflowError::invalid_version(format!(
                "'{}' - separator '{}' is not followed by a qualifier",
                input, separator
            )));
        }
        if qualifier.chars().any(char::is_whitespace) {
            return Err(GitflowError::invalid_version(format!(
                "'{}' - qualifier must not contain whitespace",
                input
            )));
        }

        Ok(SemanticVersion {
            components,
            separator,
            qualifier: Some(qualifier.to_string()),
        })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// True when the qualifier is exactly `SNAPSHOT` (case-sensitive)
    pub fn is_snapshot(&self) -> bool {
        self.qualifier.as_deref() == Some(SNAPSHOT_QUALIFIER)
    }

    /// Copy of this version without its qualifier
    pub fn without_qualifier(&self) -> Self {
        SemanticVersion {
            components: self.components.clone(),
            separator: self.separator,
            qualifier: None,
        }
    }

    /// Copy of this version carrying `qualifier`, introduced by `separator`
    pub fn with_qualifier(&self, separator: char, qualifier: &str) -> Self {
        SemanticVersion {
            components: self.components.clone(),
            separator,
            qualifier: Some(qualifier.to_string()),
        }
    }

    /// Increment the last numeric component
    pub fn upgrade_least_significant(&self) -> Result<Self> {
        let mut next = self.clone();
        if let Some(last) = next.components.last_mut() {
            *last = increment(*last, self)?;
        }
        Ok(next)
    }

    /// Increment the last primary component and zero everything after it.
    ///
    /// Primary components are major and minor, so `1.2.3` becomes `1.3.0`
    /// and a single-component `7` becomes `8`.
    pub fn upgrade_least_significant_primary(&self) -> Result<Self> {
        let mut next = self.clone();
        let index = next.components.len().min(PRIMARY_COMPONENTS) - 1;
        next.components[index] = increment(next.components[index], self)?;
        for component in next.components.iter_mut().skip(index + 1) {
            *component = 0;
        }
        Ok(next)
    }
}

fn increment(component: u64, version: &SemanticVersion) -> Result<u64> {
    component.checked_add(1).ok_or_else(|| {
        GitflowError::invalid_version(format!(
            "'{}' - component {} cannot be incremented",
            version, component
        ))
    })
}

impl FromStr for SemanticVersion {
    type Err = GitflowError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{}{}", self.separator, qualifier)?;
        }
        Ok(())
    }
}

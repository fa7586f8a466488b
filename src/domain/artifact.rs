use crate::error::{GitflowError, Result};
use std::fmt;

/// Wildcard matching any value of a coordinate field
pub const WILDCARD: &str = "*";

/// Coordinates identifying a dependency: `group:artifact:type:classifier:version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinates {
    pub group: String,
    pub artifact: String,
    pub kind: String,
    pub classifier: String,
    pub version: String,
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group, self.artifact, self.kind, self.classifier, self.version
        )
    }
}

/// Include pattern over artifact coordinates.
///
/// Each of the five fields is either `*` or an exact, case-sensitive value.
/// Fields left off the end of the pattern match anything, so `acme:core`
/// is the same as `acme:core:*:*:*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    fields: [String; 5],
}

impl ArtifactPattern {
    /// Parse a single `group:artifact:type:classifier:version` pattern
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(GitflowError::config("artifact pattern cannot be empty"));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() > 5 {
            return Err(GitflowError::config(format!(
                "artifact pattern '{}' has more than 5 fields",
                trimmed
            )));
        }

        let mut fields: [String; 5] = Default::default();
        for (i, field) in fields.iter_mut().enumerate() {
            *field = match parts.get(i).map(|p| p.trim()) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => WILDCARD.to_string(),
            };
        }

        Ok(ArtifactPattern { fields })
    }

    /// Parse a comma separated list of patterns, skipping blank entries
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .filter(|p| !p.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Whether every field of the pattern accepts the matching coordinate
    pub fn matches(&self, coordinates: &ArtifactCoordinates) -> bool {
        let values = [
            coordinates.group.as_str(),
            coordinates.artifact.as_str(),
            coordinates.kind.as_str(),
            coordinates.classifier.as_str(),
            coordinates.version.as_str(),
        ];
        self.fields
            .iter()
            .zip(values)
            .all(|(field, value)| field == WILDCARD || field == value)
    }
}

impl fmt::Display for ArtifactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(":"))
    }
}

/// An empty include list selects every artifact
pub fn any_match(patterns: &[ArtifactPattern], coordinates: &ArtifactCoordinates) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| p.matches(coordinates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(group: &str, artifact: &str, version: &str) -> ArtifactCoordinates {
        ArtifactCoordinates {
            group: group.to_string(),
            artifact: artifact.to_string(),
            kind: "crate".to_string(),
            classifier: String::new(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_parse_full_pattern() {
        let p = ArtifactPattern::parse("acme:core:crate:*:1.0-SNAPSHOT").unwrap();
        assert_eq!(p.to_string(), "acme:core:crate:*:1.0-SNAPSHOT");
    }

    #[test]
    fn test_parse_short_pattern_fills_wildcards() {
        let p = ArtifactPattern::parse("acme").unwrap();
        assert_eq!(p.to_string(), "acme:*:*:*:*");
    }

    #[test]
    fn test_parse_too_many_fields() {
        assert!(ArtifactPattern::parse("a:b:c:d:e:f").is_err());
        assert!(ArtifactPattern::parse("  ").is_err());
    }

    #[test]
    fn test_matches_exact_and_wildcard() {
        let p = ArtifactPattern::parse("acme:*").unwrap();
        assert!(p.matches(&coords("acme", "core", "1.0-SNAPSHOT")));
        assert!(!p.matches(&coords("other", "core", "1.0-SNAPSHOT")));

        let versioned = ArtifactPattern::parse("*:core:*:*:1.0-SNAPSHOT").unwrap();
        assert!(versioned.matches(&coords("acme", "core", "1.0-SNAPSHOT")));
        assert!(!versioned.matches(&coords("acme", "core", "1.1-SNAPSHOT")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let p = ArtifactPattern::parse("ACME").unwrap();
        assert!(!p.matches(&coords("acme", "core", "1.0")));
    }

    #[test]
    fn test_parse_list() {
        let list = ArtifactPattern::parse_list("acme:*, ,*:util").unwrap();
        assert_eq!(list.len(), 2);
        assert!(ArtifactPattern::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_any_match_empty_list_selects_all() {
        assert!(any_match(&[], &coords("x", "y", "1")));
    }
}

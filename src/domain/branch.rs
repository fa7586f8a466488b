use crate::domain::version::SemanticVersion;
use crate::error::{GitflowError, Result};

/// Characters git refuses inside a ref name
const ILLEGAL_REF_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

/// Composes and validates flow branch names
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchNamer;

impl BranchNamer {
    /// `prefix + trim(user_name)` when a name is given, else `prefix + version`
    pub fn branch_name(prefix: &str, user_name: &str, version: &str) -> String {
        let name = user_name.trim();
        if name.is_empty() {
            format!("{}{}", prefix, version)
        } else {
            format!("{}{}", prefix, name)
        }
    }

    /// Trim surrounding whitespace and reject names git would not accept as a ref
    pub fn trim_ref_name(name: &str) -> Result<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(GitflowError::invalid_name("name cannot be empty"));
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| ILLEGAL_REF_CHARS.contains(c) || c.is_whitespace() || c.is_control())
        {
            return Err(GitflowError::invalid_name(format!(
                "'{}' contains illegal character {:?}",
                trimmed, c
            )));
        }

        if trimmed.contains("..") || trimmed.contains("@{") || trimmed.contains("//") {
            return Err(GitflowError::invalid_name(format!(
                "'{}' contains an illegal sequence",
                trimmed
            )));
        }

        if trimmed.starts_with('-') || trimmed.starts_with('/') {
            return Err(GitflowError::invalid_name(format!(
                "'{}' cannot start with '{}'",
                trimmed,
                &trimmed[..1]
            )));
        }

        if trimmed.ends_with('/') || trimmed.ends_with('.') || trimmed.ends_with(".lock") {
            return Err(GitflowError::invalid_name(format!(
                "'{}' has an illegal ending",
                trimmed
            )));
        }

        Ok(trimmed.to_string())
    }

    /// A release name must be a valid ref, parse as a version and not be a snapshot
    pub fn validate_release_name(name: &str) -> Result<SemanticVersion> {
        let trimmed = Self::trim_ref_name(name)?;
        let version = SemanticVersion::parse(&trimmed).map_err(|_| {
            GitflowError::InvalidReleaseName(format!(
                "'{}' is not a valid release version",
                trimmed
            ))
        })?;
        if version.is_snapshot() {
            return Err(GitflowError::InvalidReleaseName(format!(
                "'{}' is not a release version as it contains the SNAPSHOT qualifier",
                trimmed
            )));
        }
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_from_version() {
        assert_eq!(
            BranchNamer::branch_name("support/", "", "1.2.3"),
            "support/1.2.3"
        );
    }

    #[test]
    fn test_branch_name_from_user_name() {
        assert_eq!(
            BranchNamer::branch_name("support/", "SP1", "1.2.3"),
            "support/SP1"
        );
        assert_eq!(
            BranchNamer::branch_name("support/", "  SP2 ", "1.2.3"),
            "support/SP2"
        );
    }

    #[test]
    fn test_branch_name_blank_user_name() {
        assert_eq!(
            BranchNamer::branch_name("hotfix/", "   ", "1.2.4"),
            "hotfix/1.2.4"
        );
    }

    #[test]
    fn test_trim_ref_name() {
        assert_eq!(BranchNamer::trim_ref_name("  SP1 ").unwrap(), "SP1");
        assert_eq!(
            BranchNamer::trim_ref_name("feature/login").unwrap(),
            "feature/login"
        );
    }

    #[test]
    fn test_trim_ref_name_rejects_illegal() {
        for bad in [
            "", "   ", "a b", "a~1", "a^", "a:b", "a?", "a*", "a[0", "a\\b", "a..b", "a@{1}",
            "-x", "/x", "x/", "x.", "x.lock", "a//b",
        ] {
            let result = BranchNamer::trim_ref_name(bad);
            assert!(
                matches!(result, Err(GitflowError::InvalidName(_))),
                "'{}' should be rejected, got {:?}",
                bad,
                result
            );
        }
    }

    #[test]
    fn test_validate_release_name() {
        let v = BranchNamer::validate_release_name("1.3.0").unwrap();
        assert_eq!(v.to_string(), "1.3.0");
    }

    #[test]
    fn test_validate_release_name_rejects_snapshot() {
        let err = BranchNamer::validate_release_name("1.2.3-SNAPSHOT").unwrap_err();
        assert!(matches!(err, GitflowError::InvalidReleaseName(_)));
        assert!(err.to_string().contains("SNAPSHOT"));
    }

    #[test]
    fn test_validate_release_name_rejects_non_version() {
        let err = BranchNamer::validate_release_name("next-big-thing").unwrap_err();
        assert!(matches!(err, GitflowError::InvalidReleaseName(_)));
    }
}

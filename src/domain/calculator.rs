//! Version derivation rules for each flow kind.
//!
//! Every function takes the current version as text and returns the derived
//! version as text. Nothing here touches the repository.

use crate::domain::version::{SemanticVersion, DEFAULT_SEPARATOR, SNAPSHOT_QUALIFIER};
use crate::error::Result;

/// Derives hotfix, release, develop and support versions from a current version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCalculator {
    separator: char,
}

impl Default for VersionCalculator {
    fn default() -> Self {
        VersionCalculator {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl VersionCalculator {
    /// Calculator appending qualifiers with `separator`
    pub fn new(separator: char) -> Self {
        VersionCalculator { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// `1.2.3` -> `1.2.4`; any qualifier is dropped
    pub fn hotfix_version(&self, current: &str) -> Result<String> {
        let version = SemanticVersion::parse(current)?;
        Ok(version
            .without_qualifier()
            .upgrade_least_significant()?
            .to_string())
    }

    /// `1.2.3` -> `1.2.4-SNAPSHOT`
    pub fn hotfix_snapshot_version(&self, current: &str) -> Result<String> {
        let hotfix = self.hotfix_version(current)?;
        Ok(self.snapshot_of(&hotfix))
    }

    /// Default release name: the develop version with its qualifier stripped
    pub fn release_version(&self, develop: &str) -> Result<String> {
        let version = SemanticVersion::parse(develop)?;
        Ok(version.without_qualifier().to_string())
    }

    /// `1.2.3-SNAPSHOT` -> `1.3.0-SNAPSHOT`, `2.5.0` -> `2.6.0`
    pub fn next_develop_version(&self, develop: &str) -> Result<String> {
        let version = SemanticVersion::parse(develop)?;
        Ok(version.upgrade_least_significant_primary()?.to_string())
    }

    /// Support versions follow the hotfix rule, applied to the tagged version
    pub fn support_version(&self, tagged: &str) -> Result<String> {
        self.hotfix_version(tagged)
    }

    pub fn support_snapshot_version(&self, tagged: &str) -> Result<String> {
        self.hotfix_snapshot_version(tagged)
    }

    /// Append the snapshot qualifier to an already computed version string
    pub fn snapshot_of(&self, version: &str) -> String {
        format!("{}{}{}", version, self.separator, SNAPSHOT_QUALIFIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitflowError;

    #[test]
    fn test_hotfix_version() {
        let calc = VersionCalculator::default();
        assert_eq!(calc.hotfix_version("1.2.3").unwrap(), "1.2.4");
        assert_eq!(calc.hotfix_version("1.2.9").unwrap(), "1.2.10");
        assert_eq!(calc.hotfix_version("2.0").unwrap(), "2.1");
    }

    #[test]
    fn test_hotfix_version_drops_qualifier() {
        let calc = VersionCalculator::default();
        assert_eq!(calc.hotfix_version("1.2.3-SNAPSHOT").unwrap(), "1.2.4");
    }

    #[test]
    fn test_hotfix_snapshot_version() {
        let calc = VersionCalculator::default();
        assert_eq!(
            calc.hotfix_snapshot_version("1.2.3").unwrap(),
            "1.2.4-SNAPSHOT"
        );
    }

    #[test]
    fn test_hotfix_version_invalid() {
        let calc = VersionCalculator::default();
        let err = calc.hotfix_version("not-a-version").unwrap_err();
        assert!(matches!(err, GitflowError::InvalidVersion(_)));
    }

    #[test]
    fn test_versions_at_component_limit() {
        let calc = VersionCalculator::default();
        let err = calc.hotfix_version("1.2.18446744073709551615").unwrap_err();
        assert!(matches!(err, GitflowError::InvalidVersion(_)));

        let err = calc
            .next_develop_version("1.18446744073709551615.0-SNAPSHOT")
            .unwrap_err();
        assert!(matches!(err, GitflowError::InvalidVersion(_)));
    }

    #[test]
    fn test_release_version() {
        let calc = VersionCalculator::default();
        assert_eq!(calc.release_version("1.3.0-SNAPSHOT").unwrap(), "1.3.0");
        assert_eq!(calc.release_version("1.3.0").unwrap(), "1.3.0");
    }

    #[test]
    fn test_next_develop_version() {
        let calc = VersionCalculator::default();
        assert_eq!(
            calc.next_develop_version("1.2.3-SNAPSHOT").unwrap(),
            "1.3.0-SNAPSHOT"
        );
        assert_eq!(calc.next_develop_version("2.5.0").unwrap(), "2.6.0");
        assert_eq!(calc.next_develop_version("3").unwrap(), "4");
    }

    #[test]
    fn test_support_versions() {
        let calc = VersionCalculator::default();
        assert_eq!(calc.support_version("1.2.3").unwrap(), "1.2.4");
        assert_eq!(
            calc.support_snapshot_version("1.2.3").unwrap(),
            "1.2.4-SNAPSHOT"
        );
    }

    #[test]
    fn test_custom_separator() {
        let calc = VersionCalculator::new('.');
        assert_eq!(
            calc.hotfix_snapshot_version("1.2.3").unwrap(),
            "1.2.4.SNAPSHOT"
        );
    }

    #[test]
    fn test_snapshot_output_round_trips() {
        let calc = VersionCalculator::default();
        let snapshot = calc.hotfix_snapshot_version("4.1.7").unwrap();
        let parsed = SemanticVersion::parse(&snapshot).unwrap();
        assert!(parsed.is_snapshot());
        assert_eq!(parsed.to_string(), snapshot);
    }
}

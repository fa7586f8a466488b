use crate::domain::artifact::{any_match, ArtifactCoordinates, ArtifactPattern};
use crate::domain::SemanticVersion;
use crate::error::{GitflowError, Result};
use crate::git::repository::push_reference;
use crate::manifest::{DependencyUpdate, Resolution, VersionWriter};
use git2::Repository;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, Value};
use tracing::{debug, info};

/// Artifact type reported for manifest dependencies
const DEPENDENCY_KIND: &str = "crate";

/// Settings for [ManifestVersionWriter]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Manifest path relative to the repository root
    pub manifest: PathBuf,
    pub origin: String,
    /// Prepended verbatim to commit messages
    pub msg_prefix: String,
    /// Appended verbatim to commit messages
    pub msg_suffix: String,
    /// Commit version changes instead of leaving them in the working tree
    pub commit: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        ManifestOptions {
            manifest: PathBuf::from("Cargo.toml"),
            origin: "origin".to_string(),
            msg_prefix: String::new(),
            msg_suffix: String::new(),
            commit: true,
        }
    }
}

/// [VersionWriter] keeping the version in a TOML manifest.
///
/// The version lives in `package.version` (or `workspace.package.version`).
/// Rewrites go through `toml_edit`, so the rest of the file keeps its
/// formatting.
pub struct ManifestVersionWriter {
    repo: Repository,
    options: ManifestOptions,
}

/// A dependency declared with an explicit version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDependency {
    pub name: String,
    pub version: String,
    pub registry: Option<String>,
}

impl ManifestDependency {
    pub fn coordinates(&self) -> ArtifactCoordinates {
        ArtifactCoordinates {
            group: self.registry.clone().unwrap_or_default(),
            artifact: self.name.clone(),
            kind: DEPENDENCY_KIND.to_string(),
            classifier: String::new(),
            version: self.version.clone(),
        }
    }
}

impl ManifestVersionWriter {
    /// Open or discover the repository holding the manifest
    pub fn open<P: AsRef<Path>>(path: P, options: ManifestOptions) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(ManifestVersionWriter { repo, options })
    }

    pub fn from_git2(repo: Repository, options: ManifestOptions) -> Self {
        ManifestVersionWriter { repo, options }
    }

    fn manifest_path(&self) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| GitflowError::config("repository has no working tree"))?;
        Ok(workdir.join(&self.options.manifest))
    }

    fn message(&self, body: &str) -> String {
        format!("{}{}{}", self.options.msg_prefix, body, self.options.msg_suffix)
    }

    fn ensure_checked_out(&self, branch: &str) -> Result<()> {
        let head = self.repo.head()?;
        let current = if head.is_branch() {
            head.shorthand().unwrap_or("HEAD")
        } else {
            "HEAD"
        };
        if current != branch {
            return Err(GitflowError::precondition(format!(
                "expected branch '{}' to be checked out, found '{}'",
                branch, current
            )));
        }
        Ok(())
    }

    fn commit_manifest(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        // the gateway may have rewritten the index through its own handle
        index.read(false)?;
        index.add_path(&self.options.manifest)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        debug!(commit = %oid, message, "committed manifest");
        Ok(())
    }
}

impl VersionWriter for ManifestVersionWriter {
    fn current_version(&self, reference: &str) -> Result<SemanticVersion> {
        let path = self.options.manifest.to_string_lossy().replace('\\', "/");
        let spec = format!("{}:{}", reference, path);
        let blob = self
            .repo
            .revparse_single(&spec)?
            .into_blob()
            .map_err(|_| GitflowError::config(format!("'{}' is not a file", spec)))?;
        let content = std::str::from_utf8(blob.content())
            .map_err(|e| GitflowError::config(format!("'{}' is not UTF-8: {}", spec, e)))?;

        let version = read_package_version(content)?;
        debug!(reference, version = %version, "read version");
        SemanticVersion::parse(&version)
    }

    fn apply_version(&self, version: &str, branch: &str, push: bool) -> Result<()> {
        self.ensure_checked_out(branch)?;

        let path = self.manifest_path()?;
        let content = fs::read_to_string(&path)?;
        let updated = rewrite_package_version(&content, version)?;
        fs::write(&path, updated)?;
        info!(branch, version, "updated manifest version");

        if self.options.commit {
            self.commit_manifest(&self.message(&format!("Updating version to {}", version)))?;
        }

        if push {
            push_reference(&self.repo, &self.options.origin, branch)?;
            info!(branch, remote = %self.options.origin, "pushed branch");
        }

        Ok(())
    }

    fn update_dependency_versions(
        &self,
        includes: &[ArtifactPattern],
    ) -> Result<Vec<DependencyUpdate>> {
        let path = self.manifest_path()?;
        let mut content = fs::read_to_string(&path)?;

        let mut updates = Vec::new();
        for dependency in snapshot_dependencies(&content)? {
            let coordinates = dependency.coordinates();
            if !any_match(includes, &coordinates) {
                continue;
            }

            let resolution = resolve_release(&dependency.version);
            if let Resolution::Resolved(released) = &resolution {
                content = rewrite_dependency_version(
                    &content,
                    &dependency.name,
                    &dependency.version,
                    released,
                )?;
            }
            updates.push(DependencyUpdate {
                artifact: coordinates.to_string(),
                resolution,
            });
        }

        if updates.iter().any(DependencyUpdate::is_resolved) {
            fs::write(&path, &content)?;
            if self.options.commit {
                self.commit_manifest(&self.message("Updating dependencies to release versions"))?;
            }
        }

        Ok(updates)
    }
}

/// Extract `package.version`, falling back to `workspace.package.version`
pub fn read_package_version(content: &str) -> Result<String> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| GitflowError::config(format!("cannot parse manifest: {}", e)))?;

    let from_package = table
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());
    let from_workspace = table
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());

    from_package
        .or(from_workspace)
        .map(str::to_string)
        .ok_or_else(|| GitflowError::invalid_version("manifest does not declare a package version"))
}

/// Replace the version of the `[package]` (or `[workspace.package]`) table
pub fn rewrite_package_version(content: &str, version: &str) -> Result<String> {
    let mut doc = parse_document(content)?;

    let in_package = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .is_some_and(Item::is_str);
    let target = if in_package {
        doc.get_mut("package").and_then(|p| p.get_mut("version"))
    } else {
        doc.get_mut("workspace")
            .and_then(|w| w.get_mut("package"))
            .and_then(|p| p.get_mut("version"))
    };

    let replaced = match target {
        Some(item) => set_string(item, version),
        None => false,
    };
    if !replaced {
        return Err(GitflowError::invalid_version(
            "manifest has no version in [package] to rewrite",
        ));
    }
    Ok(render(content, &doc))
}

/// Dependencies whose version carries the SNAPSHOT marker
pub fn snapshot_dependencies(content: &str) -> Result<Vec<ManifestDependency>> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| GitflowError::config(format!("cannot parse manifest: {}", e)))?;

    let Some(dependencies) = table.get("dependencies").and_then(|d| d.as_table()) else {
        return Ok(Vec::new());
    };

    let mut found = Vec::new();
    for (name, spec) in dependencies {
        let (version, registry) = match spec {
            toml::Value::String(v) => (Some(v.as_str()), None),
            toml::Value::Table(t) => (
                t.get("version").and_then(|v| v.as_str()),
                t.get("registry").and_then(|r| r.as_str()),
            ),
            _ => (None, None),
        };

        if let Some(version) = version.filter(|v| v.contains(crate::domain::SNAPSHOT_QUALIFIER)) {
            found.push(ManifestDependency {
                name: name.clone(),
                version: version.to_string(),
                registry: registry.map(str::to_string),
            });
        }
    }
    Ok(found)
}

/// Released counterpart of a snapshot requirement.
///
/// Only exact version literals are resolved: the qualifier is stripped and the
/// remainder must be a valid `major.minor.patch` semantic version. Ranges and
/// operator-prefixed requirements are reported as unresolved.
pub fn resolve_release(requirement: &str) -> Resolution {
    let version = match SemanticVersion::parse(requirement) {
        Ok(version) if version.is_snapshot() => version,
        _ => {
            return Resolution::Unresolved(format!(
                "'{}' is not an exact snapshot version",
                requirement
            ))
        }
    };

    let released = version.without_qualifier().to_string();
    match semver::Version::parse(&released) {
        Ok(_) => Resolution::Resolved(released),
        Err(e) => Resolution::Unresolved(format!(
            "'{}' is not a valid release version: {}",
            released, e
        )),
    }
}

/// Swap `old` for `new` in the declaration of dependency `name`
pub fn rewrite_dependency_version(
    content: &str,
    name: &str,
    old: &str,
    new: &str,
) -> Result<String> {
    let mut doc = parse_document(content)?;
    let Some(spec) = doc.get_mut("dependencies").and_then(|d| d.get_mut(name)) else {
        return Ok(content.to_string());
    };

    let target = if spec.is_str() {
        Some(spec)
    } else {
        spec.get_mut("version")
    };
    if let Some(item) = target.filter(|item| item.as_str() == Some(old)) {
        set_string(item, new);
    }
    Ok(render(content, &doc))
}

fn parse_document(content: &str) -> Result<DocumentMut> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| GitflowError::config(format!("cannot parse manifest: {}", e)))
}

/// Replace a string value in place, keeping its surrounding whitespace and comments
fn set_string(item: &mut Item, text: &str) -> bool {
    match item.as_value_mut() {
        Some(value) if value.is_str() => {
            let decor = value.decor().clone();
            *value = Value::from(text);
            *value.decor_mut() = decor;
            true
        }
        _ => false,
    }
}

fn render(original: &str, doc: &DocumentMut) -> String {
    let rendered = doc.to_string();
    if original.contains("\r\n") {
        rendered.replace("\r\n", "\n").replace('\n', "\r\n")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[package]
name = "demo"
version = "1.2.0-SNAPSHOT" # bumped by git-flow
edition = "2021"

[dependencies]
core-lib = "2.0.0-SNAPSHOT"
util = { version = "0.3.0-SNAPSHOT", registry = "acme" }
serde = "1.0"
range = "^1.1.0-SNAPSHOT"

[dependencies.net]
version = "0.9.1-SNAPSHOT"
features = ["tls"]
"#;

    #[test]
    fn test_read_package_version() {
        assert_eq!(read_package_version(MANIFEST).unwrap(), "1.2.0-SNAPSHOT");
    }

    #[test]
    fn test_read_workspace_version() {
        let manifest = "[workspace]\nmembers = []\n\n[workspace.package]\nversion = \"3.1.0\"\n";
        assert_eq!(read_package_version(manifest).unwrap(), "3.1.0");
    }

    #[test]
    fn test_read_missing_version() {
        let err = read_package_version("[package]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, GitflowError::InvalidVersion(_)));
    }

    #[test]
    fn test_rewrite_package_version_keeps_formatting() {
        let updated = rewrite_package_version(MANIFEST, "1.3.0-SNAPSHOT").unwrap();
        assert!(updated.contains("version = \"1.3.0-SNAPSHOT\" # bumped by git-flow\n"));
        // dependency tables are left alone
        assert!(updated.contains("version = \"0.9.1-SNAPSHOT\""));
        assert_eq!(read_package_version(&updated).unwrap(), "1.3.0-SNAPSHOT");
        assert_eq!(updated.len(), MANIFEST.len());
    }

    #[test]
    fn test_rewrite_without_package_version_fails() {
        assert!(rewrite_package_version("[dependencies]\nversion = \"1\"\n", "2").is_err());
    }

    #[test]
    fn test_rewrite_preserves_crlf() {
        let manifest = "[package]\r\nversion = \"1.0.0\"\r\n";
        let updated = rewrite_package_version(manifest, "1.0.1").unwrap();
        assert_eq!(updated, "[package]\r\nversion = \"1.0.1\"\r\n");
    }

    #[test]
    fn test_snapshot_dependencies() {
        let deps = snapshot_dependencies(MANIFEST).unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"core-lib"));
        assert!(names.contains(&"util"));
        assert!(names.contains(&"range"));
        assert!(names.contains(&"net"));

        let util = deps.iter().find(|d| d.name == "util").unwrap();
        assert_eq!(util.coordinates().to_string(), "acme:util:crate::0.3.0-SNAPSHOT");
    }

    #[test]
    fn test_resolve_release() {
        assert_eq!(
            resolve_release("2.0.0-SNAPSHOT"),
            Resolution::Resolved("2.0.0".to_string())
        );
        assert!(matches!(
            resolve_release("^1.1.0-SNAPSHOT"),
            Resolution::Unresolved(_)
        ));
        assert!(matches!(
            resolve_release("1.1-SNAPSHOT"),
            Resolution::Unresolved(_)
        ));
    }

    #[test]
    fn test_rewrite_dependency_inline() {
        let updated =
            rewrite_dependency_version(MANIFEST, "util", "0.3.0-SNAPSHOT", "0.3.0").unwrap();
        assert!(updated.contains("util = { version = \"0.3.0\", registry = \"acme\" }"));
    }

    #[test]
    fn test_rewrite_dependency_own_table() {
        let updated =
            rewrite_dependency_version(MANIFEST, "net", "0.9.1-SNAPSHOT", "0.9.1").unwrap();
        assert!(updated.contains("[dependencies.net]\nversion = \"0.9.1\"\n"));
        // package version untouched
        assert!(updated.contains("version = \"1.2.0-SNAPSHOT\""));
    }

    #[test]
    fn test_rewrite_dotted_package_version() {
        let manifest = "package.name = \"demo\"\npackage.version = \"0.4.0\"\n";
        let updated = rewrite_package_version(manifest, "0.4.1").unwrap();
        assert!(updated.contains("package.version = \"0.4.1\""));
        assert_eq!(read_package_version(&updated).unwrap(), "0.4.1");
    }

    #[test]
    fn test_rewrite_inherited_version_uses_workspace() {
        let manifest = "[workspace.package]\nversion = \"2.0.0\"\n\n[package]\nname = \"x\"\nversion.workspace = true\n";
        let updated = rewrite_package_version(manifest, "2.1.0-SNAPSHOT").unwrap();
        assert!(updated.contains("version = \"2.1.0-SNAPSHOT\""));
        assert!(updated.contains("version.workspace = true"));
    }

    #[test]
    fn test_rewrite_dependency_other_version_untouched() {
        let updated = rewrite_dependency_version(MANIFEST, "serde", "9.9.9", "9.9.10").unwrap();
        assert_eq!(updated, MANIFEST);
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::FlowSettings;
use crate::error::{GitflowError, Result};
use crate::manifest::ManifestOptions;

/// Name of the project-local configuration file
pub const CONFIG_FILE: &str = "gitflow.toml";

/// Represents the complete configuration for git-flow.
///
/// Every section is optional; missing keys fall back to the git-flow defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub prefixes: PrefixesConfig,

    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,

    #[serde(default)]
    pub project: ProjectConfig,
}

fn default_master() -> String {
    "master".to_string()
}

fn default_develop() -> String {
    "develop".to_string()
}

fn default_origin() -> String {
    "origin".to_string()
}

/// Names of the long-lived branches and the remote
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_master")]
    pub master: String,

    #[serde(default = "default_develop")]
    pub develop: String,

    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            master: default_master(),
            develop: default_develop(),
            origin: default_origin(),
        }
    }
}

fn default_hotfix_prefix() -> String {
    "hotfix/".to_string()
}

fn default_release_prefix() -> String {
    "release/".to_string()
}

fn default_support_prefix() -> String {
    "support/".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrefixesConfig {
    #[serde(default = "default_hotfix_prefix")]
    pub hotfix: String,

    #[serde(default = "default_release_prefix")]
    pub release: String,

    #[serde(default = "default_support_prefix")]
    pub support: String,
}

impl Default for PrefixesConfig {
    fn default() -> Self {
        PrefixesConfig {
            hotfix: default_hotfix_prefix(),
            release: default_release_prefix(),
            support: default_support_prefix(),
        }
    }
}

/// Whether newly created branches are published right away.
/// Support branches are always pushed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PushConfig {
    #[serde(default)]
    pub hotfixes: bool,

    #[serde(default)]
    pub release_branch: bool,
}

/// Text wrapped around the version commit messages
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MessagesConfig {
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    #[serde(default = "default_true")]
    pub interactive: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig { interactive: true }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

fn default_separator() -> char {
    '-'
}

/// Where the version lives and how changes to it are recorded
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProjectConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_true")]
    pub commit_versions: bool,

    #[serde(default = "default_separator")]
    pub separator: char,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            manifest: default_manifest(),
            commit_versions: true,
            separator: default_separator(),
        }
    }
}

impl Config {
    /// Read-only settings the flows run with
    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            master_branch: self.branches.master.clone(),
            develop_branch: self.branches.develop.clone(),
            origin: self.branches.origin.clone(),
            hotfix_prefix: self.prefixes.hotfix.clone(),
            release_prefix: self.prefixes.release.clone(),
            support_prefix: self.prefixes.support.clone(),
            push_hotfixes: self.push.hotfixes,
            push_release_branch: self.push.release_branch,
            version_separator: self.project.separator,
        }
    }

    /// Options for the manifest-backed version writer
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            manifest: self.project.manifest.clone(),
            origin: self.branches.origin.clone(),
            msg_prefix: self.messages.prefix.clone(),
            msg_suffix: self.messages.suffix.clone(),
            commit: self.project.commit_versions,
        }
    }

    /// Reject settings no flow could run with
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("branches.master", &self.branches.master),
            ("branches.develop", &self.branches.develop),
            ("branches.origin", &self.branches.origin),
            ("prefixes.hotfix", &self.prefixes.hotfix),
            ("prefixes.release", &self.prefixes.release),
            ("prefixes.support", &self.prefixes.support),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(GitflowError::config(format!("'{}' cannot be empty", key)));
            }
        }

        let separator = self.project.separator;
        if separator.is_ascii_digit() || separator.is_whitespace() {
            return Err(GitflowError::config(format!(
                "'project.separator' cannot be '{}'",
                separator
            )));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitflow.toml` in current directory
/// 3. `.gitflow.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(&path).map_err(|e| {
                GitflowError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str::<Config>(&content).map_err(|e| {
                GitflowError::config(format!("cannot parse {}: {}", path.display(), e))
            })?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(format!(".{}", CONFIG_FILE)))
        .filter(|path| path.exists())
}

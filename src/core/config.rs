//! Deploy configuration from YAML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level deploy configuration loaded from YAML
///
/// Every optional section defaults to the pipeline's fixed constants, so a
/// config that names only the repository describes the stock pipeline:
/// stable toolchain, wasm target, trunk release build, `dist` output,
/// CNAME marker, publish on pushes to `main`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Pipeline name (used in logs and run history)
    #[serde(default = "default_name")]
    pub name: String,

    /// Repository to check out
    pub repository: String,

    /// Branch whose pushes are eligible to publish
    #[serde(default = "default_publish_branch")]
    pub publish_branch: String,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub helper: HelperConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub marker: MarkerConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    /// Per-invocation timeout for external tools (seconds)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Compiler toolchain to provision before the build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Toolchain channel
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Additional compilation target
    #[serde(default = "default_target")]
    pub target: String,
}

/// Build-orchestration helper to install alongside the toolchain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Helper tool name
    #[serde(default = "default_helper_tool")]
    pub tool: String,

    /// Pinned version tag
    #[serde(default = "default_helper_version")]
    pub version: String,
}

/// The build command and where it leaves its output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Program to invoke (normally the helper tool)
    #[serde(default = "default_helper_tool")]
    pub command: String,

    /// Arguments to the build command
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,

    /// Output directory, relative to the workspace root
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

/// The marker file injected into the build output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// File name, written at the output directory root
    #[serde(default = "default_marker_file")]
    pub file_name: String,

    /// Exact file content
    #[serde(default = "default_marker_content")]
    pub content: String,
}

/// Where eligible runs publish to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Remote to push to; defaults to the checkout repository
    #[serde(default)]
    pub remote: Option<String>,

    /// Hosting branch that receives the mirror
    #[serde(default = "default_hosting_branch")]
    pub branch: String,

    /// Environment variable holding the publish credential
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_name() -> String {
    "deploy".to_string()
}

fn default_publish_branch() -> String {
    "main".to_string()
}

fn default_channel() -> String {
    "stable".to_string()
}

fn default_target() -> String {
    "wasm32-unknown-unknown".to_string()
}

fn default_helper_tool() -> String {
    "trunk".to_string()
}

fn default_helper_version() -> String {
    "0.17.5".to_string()
}

fn default_build_args() -> Vec<String> {
    vec!["build".to_string(), "--release".to_string()]
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_marker_file() -> String {
    "CNAME".to_string()
}

fn default_marker_content() -> String {
    "nertz.pro".to_string()
}

fn default_hosting_branch() -> String {
    "gh-pages".to_string()
}

fn default_token_env() -> String {
    "DEPLOY_TOKEN".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            target: default_target(),
        }
    }
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            tool: default_helper_tool(),
            version: default_helper_version(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_helper_tool(),
            args: default_build_args(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            file_name: default_marker_file(),
            content: default_marker_content(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: None,
            branch: default_hosting_branch(),
            token_env: default_token_env(),
        }
    }
}

impl DeployConfig {
    /// Load deploy configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse deploy configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: DeployConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Minimal configuration for a repository, everything else stock
    pub fn for_repository(repository: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            repository: repository.into(),
            publish_branch: default_publish_branch(),
            toolchain: ToolchainConfig::default(),
            helper: HelperConfig::default(),
            build: BuildConfig::default(),
            marker: MarkerConfig::default(),
            publish: PublishConfig::default(),
            timeout_secs: None,
        }
    }

    /// The remote eligible runs push to
    pub fn publish_remote(&self) -> &str {
        self.publish.remote.as_deref().unwrap_or(&self.repository)
    }

    /// Validate the deploy configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("pipeline name must not be empty");
        }
        if self.repository.trim().is_empty() {
            anyhow::bail!("repository must not be empty");
        }
        if self.publish_branch.trim().is_empty() {
            anyhow::bail!("publish_branch must not be empty");
        }
        if self.publish.branch.trim().is_empty() {
            anyhow::bail!("publish.branch must not be empty");
        }
        if self.helper.version.trim().is_empty() {
            anyhow::bail!("helper.version must not be empty");
        }
        if self.build.command.trim().is_empty() {
            anyhow::bail!("build.command must not be empty");
        }

        let output = Path::new(&self.build.output_dir);
        if output.is_absolute() {
            anyhow::bail!(
                "build.output_dir must be relative to the workspace: {}",
                self.build.output_dir
            );
        }
        if output
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            anyhow::bail!(
                "build.output_dir must not escape the workspace: {}",
                self.build.output_dir
            );
        }

        if self.marker.file_name.is_empty()
            || self.marker.file_name.contains('/')
            || self.marker.file_name.contains('\\')
        {
            anyhow::bail!(
                "marker.file_name must be a bare file name: {:?}",
                self.marker.file_name
            );
        }

        Ok(())
    }
}

//! Per-run context: ephemeral workspace, build output, credential

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Opaque publish credential
///
/// Scoped to one run. The token is reachable only through [`Credential::expose`];
/// `Debug` and `Display` render a placeholder so the value cannot leak into
/// logs or diagnostics by accident.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read the credential from an environment variable
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self)
    }

    /// The raw token, for embedding into an authenticated remote URL
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([redacted])")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Mutable state shared by the steps of one run
///
/// Owns the ephemeral workspace: dropping the context at the end of the run
/// deletes the checkout, the installed artifacts inside it, and the build
/// output. Steps communicate only through the filesystem paths recorded here.
#[derive(Debug, Default)]
pub struct RunContext {
    workspace: Option<TempDir>,
    output_dir: Option<PathBuf>,
    credential: Option<Credential>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand ownership of the checked-out workspace to the run
    pub fn set_workspace(&mut self, dir: TempDir) {
        self.workspace = Some(dir);
    }

    /// Path of the workspace, once checkout has materialized it
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(|d| d.path())
    }

    /// Record where the build left its output
    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.output_dir = Some(dir);
    }

    /// Path of the build output directory, once the build has produced it
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("ghp_supersecret");
        let debug = format!("{:?}", credential);
        let display = format!("{}", credential);

        assert!(!debug.contains("supersecret"));
        assert!(!display.contains("supersecret"));
        assert_eq!(credential.expose(), "ghp_supersecret");
    }

    #[test]
    fn test_credential_from_env_ignores_empty() {
        std::env::set_var("DEPLOYLINE_TEST_EMPTY_TOKEN", "");
        assert!(Credential::from_env("DEPLOYLINE_TEST_EMPTY_TOKEN").is_none());
        assert!(Credential::from_env("DEPLOYLINE_TEST_UNSET_TOKEN").is_none());
    }

    #[test]
    fn test_context_paths() {
        let mut ctx = RunContext::new();
        assert!(ctx.workspace_path().is_none());
        assert!(ctx.output_dir().is_none());

        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().to_path_buf();
        ctx.set_workspace(dir);
        assert_eq!(ctx.workspace_path(), Some(expected.as_path()));

        ctx.set_output_dir(expected.join("dist"));
        assert_eq!(ctx.output_dir(), Some(expected.join("dist").as_path()));
    }

    #[test]
    fn test_workspace_is_ephemeral() {
        let path;
        {
            let mut ctx = RunContext::new();
            let dir = tempfile::tempdir().unwrap();
            path = dir.path().to_path_buf();
            ctx.set_workspace(dir);
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}

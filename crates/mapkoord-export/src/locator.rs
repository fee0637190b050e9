//! CodeWalker executable discovery.
//!
//! Locates the tool by probing, in order:
//! 1. An explicit hint (a file, or a directory containing the executable)
//! 2. The `CODEWALKER_PATH` environment variable
//! 3. Conventional install directories (Program Files, desktop, downloads,
//!    current directory)
//! 4. Every directory on `PATH`
//!
//! Discovery has no side effects and never fails; absence is `None`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Canonical file name of the tool executable.
pub const TOOL_FILE_NAME: &str = "CodeWalker.exe";

/// Environment variable that overrides discovery.
pub const TOOL_ENV_VAR: &str = "CODEWALKER_PATH";

/// Install folder name probed under the conventional roots.
const TOOL_DIR_NAME: &str = "CodeWalker";

/// How the executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// A caller-supplied or configured path.
    ExplicitHint,
    /// The `CODEWALKER_PATH` environment variable.
    Environment,
    /// A conventional installation directory.
    CommonPath,
    /// A directory on `PATH`.
    SystemPath,
}

/// A located, verified-existing tool executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInstallation {
    /// Absolute path to the executable.
    pub executable: PathBuf,
    /// Directory containing the executable; used as the working directory
    /// because the tool resolves its resources relative to itself.
    pub working_dir: PathBuf,
    /// How the executable was found.
    pub discovery_method: DiscoveryMethod,
}

impl ToolInstallation {
    fn new(executable: PathBuf, discovery_method: DiscoveryMethod) -> Self {
        let executable = std::path::absolute(&executable).unwrap_or(executable);
        let working_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            executable,
            working_dir,
            discovery_method,
        }
    }
}

/// Discovery inputs, captured once so probing is deterministic.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    file_name: String,
    env_override: Option<PathBuf>,
    install_dirs: Vec<PathBuf>,
    search_path: Vec<PathBuf>,
}

impl ToolLocator {
    /// Locator with no discovery sources; only hints resolve.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            env_override: None,
            install_dirs: Vec::new(),
            search_path: Vec::new(),
        }
    }

    /// Locator populated from the process environment.
    pub fn from_env() -> Self {
        let env_override = std::env::var_os(TOOL_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let search_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();

        Self {
            file_name: TOOL_FILE_NAME.to_string(),
            env_override,
            install_dirs: Self::common_install_dirs(),
            search_path,
        }
    }

    /// Replace the environment override.
    pub fn with_env_override(mut self, path: Option<PathBuf>) -> Self {
        self.env_override = path;
        self
    }

    /// Replace the conventional install directories.
    pub fn with_install_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.install_dirs = dirs;
        self
    }

    /// Replace the executable search path.
    pub fn with_search_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_path = dirs;
        self
    }

    /// Executable file name being searched for.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Resolve the tool: the hint first, then discovery.
    pub fn locate(&self, hint: Option<&Path>) -> Option<ToolInstallation> {
        hint.and_then(|h| self.resolve_hint(h))
            .or_else(|| self.discover())
    }

    /// Resolve an explicit hint.
    ///
    /// A file is taken as-is; a directory is accepted if it directly
    /// contains the executable.
    pub fn resolve_hint(&self, hint: &Path) -> Option<ToolInstallation> {
        if hint.as_os_str().is_empty() {
            return None;
        }
        match self.probe(hint) {
            Some(found) => {
                info!(path = %found.display(), "Using explicit CodeWalker path");
                Some(ToolInstallation::new(found, DiscoveryMethod::ExplicitHint))
            }
            None => {
                warn!(hint = %hint.display(), "Configured CodeWalker path does not exist");
                None
            }
        }
    }

    /// Search the environment override, install directories, and `PATH`.
    pub fn discover(&self) -> Option<ToolInstallation> {
        if let Some(env_path) = &self.env_override {
            debug!(path = %env_path.display(), var = TOOL_ENV_VAR, "Probing environment override");
            if let Some(found) = self.probe(env_path) {
                info!(path = %found.display(), "Found CodeWalker via {}", TOOL_ENV_VAR);
                return Some(ToolInstallation::new(found, DiscoveryMethod::Environment));
            }
        }

        for dir in &self.install_dirs {
            let candidate = dir.join(&self.file_name);
            debug!(path = %candidate.display(), "Probing install directory");
            if candidate.is_file() {
                info!(path = %candidate.display(), "Found CodeWalker in install directory");
                return Some(ToolInstallation::new(candidate, DiscoveryMethod::CommonPath));
            }
        }

        for dir in &self.search_path {
            let candidate = dir.join(&self.file_name);
            if candidate.is_file() {
                info!(path = %candidate.display(), "Found CodeWalker on PATH");
                return Some(ToolInstallation::new(candidate, DiscoveryMethod::SystemPath));
            }
        }

        debug!(file = %self.file_name, "CodeWalker not found");
        None
    }

    /// A file path, or a directory containing the executable.
    fn probe(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.is_dir() {
            let inner = path.join(&self.file_name);
            if inner.is_file() {
                return Some(inner);
            }
        }
        None
    }

    /// Conventional installation directories, in probe order.
    fn common_install_dirs() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        for var in ["ProgramFiles", "ProgramFiles(x86)"] {
            if let Some(root) = std::env::var_os(var) {
                candidates.push(PathBuf::from(root).join(TOOL_DIR_NAME));
            }
        }

        for root in [dirs::desktop_dir(), dirs::download_dir()].into_iter().flatten() {
            candidates.push(root.join(TOOL_DIR_NAME));
            candidates.push(root);
        }

        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd);
        }

        candidates
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, b"MZ").expect("write");
    }

    #[test]
    fn test_hint_file_wins() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join("tools").join("CodeWalker.exe");
        touch(&exe);

        let locator = ToolLocator::new(TOOL_FILE_NAME);
        let found = locator.locate(Some(&exe)).expect("found");
        assert_eq!(found.executable, exe);
        assert_eq!(found.working_dir, temp.path().join("tools"));
        assert_eq!(found.discovery_method, DiscoveryMethod::ExplicitHint);
    }

    #[test]
    fn test_hint_directory_containing_tool() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("CodeWalker.exe"));

        let found = ToolLocator::new(TOOL_FILE_NAME)
            .resolve_hint(temp.path())
            .expect("found");
        assert_eq!(found.executable, temp.path().join("CodeWalker.exe"));
    }

    #[test]
    fn test_missing_hint_falls_back_to_env() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join("env").join("CodeWalker.exe");
        touch(&exe);

        let locator = ToolLocator::new(TOOL_FILE_NAME).with_env_override(Some(exe.clone()));
        let found = locator
            .locate(Some(Path::new("/nonexistent/CodeWalker.exe")))
            .expect("found");
        assert_eq!(found.executable, exe);
        assert_eq!(found.discovery_method, DiscoveryMethod::Environment);
    }

    #[test]
    fn test_env_before_install_dirs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let env_exe = temp.path().join("env").join("CodeWalker.exe");
        let installed = temp.path().join("installed");
        touch(&env_exe);
        touch(&installed.join("CodeWalker.exe"));

        let locator = ToolLocator::new(TOOL_FILE_NAME)
            .with_env_override(Some(env_exe.clone()))
            .with_install_dirs(vec![installed]);
        assert_eq!(
            locator.discover().expect("found").discovery_method,
            DiscoveryMethod::Environment
        );
    }

    #[test]
    fn test_install_dirs_in_order_then_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        let on_path = temp.path().join("bin");
        std::fs::create_dir_all(&first).expect("mkdir");
        touch(&second.join("CodeWalker.exe"));
        touch(&on_path.join("CodeWalker.exe"));

        let locator = ToolLocator::new(TOOL_FILE_NAME)
            .with_install_dirs(vec![first, second.clone()])
            .with_search_path(vec![on_path.clone()]);
        let found = locator.discover().expect("found");
        assert_eq!(found.executable, second.join("CodeWalker.exe"));
        assert_eq!(found.discovery_method, DiscoveryMethod::CommonPath);

        let locator = ToolLocator::new(TOOL_FILE_NAME).with_search_path(vec![on_path.clone()]);
        let found = locator.discover().expect("found");
        assert_eq!(found.discovery_method, DiscoveryMethod::SystemPath);
        assert_eq!(found.working_dir, on_path);
    }

    #[test]
    fn test_directory_named_like_tool_is_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(temp.path().join("CodeWalker.exe")).expect("mkdir");

        let locator = ToolLocator::new(TOOL_FILE_NAME).with_search_path(vec![temp.path().into()]);
        assert!(locator.discover().is_none());
    }

    #[test]
    fn test_nothing_found_is_none() {
        let locator = ToolLocator::new(TOOL_FILE_NAME);
        assert!(locator.locate(None).is_none());
        assert!(locator.locate(Some(Path::new(""))).is_none());
    }

    #[test]
    fn test_relative_hint_is_made_absolute() {
        let temp = tempfile::tempdir_in(".").expect("tempdir");
        let name = temp.path().file_name().expect("dir name");
        let relative = Path::new(name).join("CodeWalker.exe");
        touch(&relative);

        let found = ToolLocator::new(TOOL_FILE_NAME)
            .resolve_hint(&relative)
            .expect("found");
        assert!(found.executable.is_absolute());
    }
}

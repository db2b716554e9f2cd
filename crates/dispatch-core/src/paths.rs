//! On-disk layout of the data directory.
//!
//! ```text
//! <root>/
//!   settings.yaml   presets
//!   dispatch.yaml   application settings
//!   dispatch.log    review interface log
//!   repos/          cached repository mirrors
//!   worktrees/      one directory per workspace
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolved locations under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform default: `~/.dispatch` on macOS, `$XDG_DATA_HOME/dispatch`
    /// (or `~/.local/share/dispatch`) elsewhere.
    pub fn platform_default() -> Result<Self> {
        let root = if cfg!(target_os = "macos") {
            dirs::home_dir().map(|h| h.join(".dispatch"))
        } else {
            dirs::data_dir().map(|d| d.join("dispatch"))
        };
        root.map(Self::new)
            .ok_or_else(|| Error::InvalidConfig("cannot determine home directory".into()))
    }

    /// Use `explicit` when given, otherwise the platform default.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        explicit.map_or_else(Self::platform_default, |p| Ok(Self::new(p)))
    }

    pub fn repos(&self) -> PathBuf {
        self.root.join("repos")
    }

    pub fn worktrees(&self) -> PathBuf {
        self.root.join("worktrees")
    }

    pub fn presets_file(&self) -> PathBuf {
        self.root.join("settings.yaml")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("dispatch.yaml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("dispatch.log")
    }

    /// Create the repos and worktrees directories.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(self.repos())?;
        std::fs::create_dir_all(self.worktrees())?;
        Ok(())
    }
}

/// Render `path` with the home directory collapsed to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return if rest.as_os_str().is_empty() {
            "~".to_string()
        } else {
            format!("~/{}", rest.display())
        };
    }
    path.display().to_string()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn subdirectories_hang_off_root() {
        let paths = DataPaths::new("/data");
        assert_eq!(paths.repos(), PathBuf::from("/data/repos"));
        assert_eq!(paths.worktrees(), PathBuf::from("/data/worktrees"));
        assert_eq!(paths.presets_file(), PathBuf::from("/data/settings.yaml"));
        assert_eq!(paths.settings_file(), PathBuf::from("/data/dispatch.yaml"));
    }

    #[test]
    fn explicit_root_wins() {
        let paths = DataPaths::resolve(Some(PathBuf::from("/custom"))).unwrap();
        assert_eq!(paths.root, PathBuf::from("/custom"));
    }

    #[test]
    fn ensure_creates_both_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path().join("d"));
        paths.ensure().unwrap();
        assert!(paths.repos().is_dir());
        assert!(paths.worktrees().is_dir());
    }

    #[test]
    fn display_path_outside_home_is_unchanged() {
        assert_eq!(display_path(Path::new("/opt/x")), "/opt/x");
    }
}

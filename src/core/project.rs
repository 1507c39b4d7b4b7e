//! Project discovery and layout
//!
//! A project is any directory containing a `.fleet/` folder. Records live in
//! `assets/` and `cases/` next to it, one YAML file per record.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory for a project root
pub const PROJECT_DIR: &str = ".fleet";

pub const ASSETS_DIR: &str = "assets";
pub const CASES_DIR: &str = "cases";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside a fleetcare project (no .fleet/ found). Run 'fleetcare init' first")]
    NotFound,

    #[error("A project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Walk up from the current directory to the nearest project root
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(|dir| Self {
                root: dir.to_path_buf(),
            })
            .ok_or(ProjectError::NotFound)
    }

    /// Create the project layout in `root`
    pub fn init(root: &Path, force: bool) -> Result<Self, ProjectError> {
        let marker = root.join(PROJECT_DIR);
        if marker.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }
        fs::create_dir_all(&marker)?;
        fs::create_dir_all(root.join(ASSETS_DIR))?;
        fs::create_dir_all(root.join(CASES_DIR))?;

        let config_path = marker.join("config.yaml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_PROJECT_CONFIG)?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(PROJECT_DIR).join("config.yaml")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn cases_dir(&self) -> PathBuf {
        self.root.join(CASES_DIR)
    }
}

const DEFAULT_PROJECT_CONFIG: &str = "\
# fleetcare project configuration
# author: Jane Doe

scanner:
  lookahead_days: 30
";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        assert!(project.assets_dir().is_dir());
        assert!(project.cases_dir().is_dir());
        assert!(project.config_path().is_file());
    }

    #[test]
    fn test_init_twice_needs_force() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path(), false).unwrap();
        assert!(matches!(
            Project::init(tmp.path(), false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(Project::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path(), false).unwrap();
        let nested = tmp.path().join("cases").join("archive");
        fs::create_dir_all(&nested).unwrap();

        let found = Project::discover_from(&nested).unwrap();
        assert_eq!(found.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound)
        ));
    }
}

//! YAML-file store
//!
//! One `<ID>.fleet.yaml` file per record under `assets/` and `cases/`.
//! Writes go to a temporary sibling first and are renamed into place.
//! A commit stages both files before renaming either, and puts the asset
//! file back if the case file cannot be published.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::core::store::{check_replace, Store};
use crate::entities::asset::Asset;
use crate::entities::service_case::ServiceCase;

const EXTENSION: &str = ".fleet.yaml";

#[derive(Debug)]
pub struct YamlStore {
    assets_dir: PathBuf,
    cases_dir: PathBuf,
    write_lock: Mutex<()>,
}

/// A record written to a temporary sibling of its final path
#[derive(Debug)]
struct Staged {
    path: PathBuf,
    tmp: PathBuf,
    /// Bytes at `path` before staging, `None` if the file did not exist
    previous: Option<Vec<u8>>,
}

impl Staged {
    fn new<T: Serialize>(path: &Path, record: &T) -> Result<Self, StoreError> {
        let yaml = serde_yml::to_string(record).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let previous = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => return Err(io_err(path, source)),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
        }
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(|source| io_err(&tmp, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            tmp,
            previous,
        })
    }

    fn publish(&self) -> Result<(), StoreError> {
        fs::rename(&self.tmp, &self.path).map_err(|source| {
            self.discard();
            io_err(&self.path, source)
        })
    }

    fn discard(&self) {
        let _ = fs::remove_file(&self.tmp);
    }

    /// Undo a successful [`Staged::publish`]
    fn restore(&self) -> Result<(), StoreError> {
        match &self.previous {
            Some(bytes) => {
                fs::write(&self.tmp, bytes).map_err(|source| io_err(&self.tmp, source))?;
                fs::rename(&self.tmp, &self.path).map_err(|source| io_err(&self.path, source))
            }
            None => fs::remove_file(&self.path).map_err(|source| io_err(&self.path, source)),
        }
    }
}

/// Publish `first` then `second`, rolling `first` back if `second` fails
fn publish_pair(first: Option<&Staged>, second: &Staged) -> Result<(), StoreError> {
    if let Some(first) = first {
        if let Err(e) = first.publish() {
            second.discard();
            return Err(e);
        }
    }
    if let Err(e) = second.publish() {
        if let Some(first) = first {
            if let Err(undo) = first.restore() {
                warn!(path = %first.path.display(), error = %undo, "could not roll back partial commit");
            }
        }
        return Err(e);
    }
    Ok(())
}

impl YamlStore {
    pub fn open(project: &Project) -> Self {
        Self {
            assets_dir: project.assets_dir(),
            cases_dir: project.cases_dir(),
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(dir: &Path, id: &EntityId) -> PathBuf {
        dir.join(format!("{}{}", id, EXTENSION))
    }

    fn asset_path(&self, id: &EntityId) -> PathBuf {
        Self::record_path(&self.assets_dir, id)
    }

    fn case_path(&self, id: &EntityId) -> PathBuf {
        Self::record_path(&self.cases_dir, id)
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| io_err(path, source))?;
        serde_yml::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(EXTENSION))
        {
            if let Some(record) = Self::read(entry.path())? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Check `record` against its stored copy in `dir` and stage it
    ///
    /// Returns the staged write and whether a stored copy existed.
    fn stage_checked<T: Entity>(dir: &Path, record: &T) -> Result<(Staged, bool), StoreError> {
        let path = Self::record_path(dir, record.id());
        let stored = Self::read::<T>(&path)?;
        check_replace(stored.as_ref(), record)?;
        Ok((Staged::new(&path, record)?, stored.is_some()))
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_unique_number(&self, case: &ServiceCase) -> Result<(), StoreError> {
        let taken = Self::read_all::<ServiceCase>(&self.cases_dir)?
            .iter()
            .any(|c| c.id != case.id && c.number == case.number);
        if taken {
            return Err(StoreError::Duplicate(case.number.clone()));
        }
        Ok(())
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl Store for YamlStore {
    fn load_asset(&self, id: &EntityId) -> Result<Option<Asset>, StoreError> {
        Self::read(&self.asset_path(id))
    }

    fn save_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        let _guard = self.guard();
        let (staged, _) = Self::stage_checked(&self.assets_dir, asset)?;
        staged.publish()
    }

    fn load_case(&self, id: &EntityId) -> Result<Option<ServiceCase>, StoreError> {
        Self::read(&self.case_path(id))
    }

    fn save_case(&self, case: &ServiceCase) -> Result<(), StoreError> {
        let _guard = self.guard();
        let (staged, existed) = Self::stage_checked(&self.cases_dir, case)?;
        if !existed {
            if let Err(e) = self.ensure_unique_number(case) {
                staged.discard();
                return Err(e);
            }
        }
        staged.publish()
    }

    fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        Self::read_all(&self.assets_dir)
    }

    fn list_cases(&self) -> Result<Vec<ServiceCase>, StoreError> {
        Self::read_all(&self.cases_dir)
    }

    fn delete_asset(&self, id: &EntityId) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let path = self.asset_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| io_err(&path, source))?;
        Ok(true)
    }

    fn commit(&self, case: &ServiceCase, asset: Option<&Asset>) -> Result<(), StoreError> {
        let _guard = self.guard();

        let staged_asset = asset
            .map(|asset| Self::stage_checked(&self.assets_dir, asset).map(|(staged, _)| staged))
            .transpose()?;
        let staged_case = match Self::stage_checked(&self.cases_dir, case) {
            Ok((staged, _)) => staged,
            Err(e) => {
                if let Some(staged) = &staged_asset {
                    staged.discard();
                }
                return Err(e);
            }
        };

        publish_pair(staged_asset.as_ref(), &staged_case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::asset::AssetKind;
    use crate::entities::service_case::CaseType;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, YamlStore) {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        let store = YamlStore::open(&project);
        (tmp, store)
    }

    #[test]
    fn test_asset_file_layout() {
        let (tmp, store) = setup();
        let asset = Asset::new("Projector", AssetKind::Equipment, "test", Utc::now());
        store.save_asset(&asset).unwrap();

        let path = tmp
            .path()
            .join("assets")
            .join(format!("{}.fleet.yaml", asset.id));
        assert!(path.is_file());

        let loaded = store.load_asset(&asset.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Projector");
        assert_eq!(store.list_assets().unwrap().len(), 1);
    }

    #[test]
    fn test_commit_writes_both_records() {
        let (_tmp, store) = setup();
        let mut asset = Asset::new("Van", AssetKind::Vehicle, "test", Utc::now());
        store.save_asset(&asset).unwrap();
        let mut case =
            ServiceCase::new("REP-2026-0001", "Brakes", CaseType::Repair, asset.id, "test", Utc::now());
        store.save_case(&case).unwrap();

        asset.entity_revision = 2;
        asset.status = crate::entities::asset::AssetStatus::Maintenance;
        case.entity_revision = 2;
        store.commit(&case, Some(&asset)).unwrap();

        assert_eq!(store.load_asset(&asset.id).unwrap().unwrap().entity_revision, 2);
        assert_eq!(store.load_case(&case.id).unwrap().unwrap().entity_revision, 2);
    }

    #[test]
    fn test_stale_commit_leaves_files_untouched() {
        let (_tmp, store) = setup();
        let asset = Asset::new("Van", AssetKind::Vehicle, "test", Utc::now());
        store.save_asset(&asset).unwrap();
        let case =
            ServiceCase::new("REP-2026-0001", "Brakes", CaseType::Repair, asset.id, "test", Utc::now());
        store.save_case(&case).unwrap();

        let mut next = case.clone();
        next.entity_revision = 3;
        assert!(store.commit(&next, Some(&asset)).is_err());
        assert_eq!(store.load_case(&case.id).unwrap().unwrap().entity_revision, 1);
    }

    #[test]
    fn test_failed_case_publish_restores_asset() {
        let (tmp, store) = setup();
        let asset = Asset::new("Van", AssetKind::Vehicle, "test", Utc::now());
        store.save_asset(&asset).unwrap();
        let case =
            ServiceCase::new("REP-2026-0001", "Brakes", CaseType::Repair, asset.id, "test", Utc::now());
        store.save_case(&case).unwrap();
        let asset_path = store.asset_path(&asset.id);
        let before = std::fs::read(&asset_path).unwrap();

        let mut next_asset = asset.clone();
        next_asset.entity_revision = 2;
        next_asset.status = crate::entities::asset::AssetStatus::Maintenance;
        let mut next_case = case.clone();
        next_case.entity_revision = 2;

        let (staged_asset, _) = YamlStore::stage_checked(&store.assets_dir, &next_asset).unwrap();
        let (staged_case, _) = YamlStore::stage_checked(&store.cases_dir, &next_case).unwrap();
        // The case rename can no longer succeed
        std::fs::remove_file(&staged_case.tmp).unwrap();

        assert!(publish_pair(Some(&staged_asset), &staged_case).is_err());
        assert_eq!(std::fs::read(&asset_path).unwrap(), before);
        assert_eq!(store.load_case(&case.id).unwrap().unwrap().entity_revision, 1);

        let leftovers: Vec<_> = WalkDir::new(tmp.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_unreadable_case_path_leaves_asset_untouched() {
        let (tmp, store) = setup();
        let asset = Asset::new("Van", AssetKind::Vehicle, "test", Utc::now());
        store.save_asset(&asset).unwrap();
        let case =
            ServiceCase::new("REP-2026-0001", "Brakes", CaseType::Repair, asset.id, "test", Utc::now());
        // A directory squats on the case file name
        std::fs::create_dir_all(store.case_path(&case.id).join("blocker")).unwrap();

        let mut next_asset = asset.clone();
        next_asset.entity_revision = 2;
        assert!(store.commit(&case, Some(&next_asset)).is_err());
        assert_eq!(store.load_asset(&asset.id).unwrap().unwrap().entity_revision, 1);
        assert!(!tmp
            .path()
            .join("assets")
            .join(format!("{}.fleet.yaml.tmp", asset.id))
            .exists());
    }

    #[test]
    fn test_delete_asset() {
        let (_tmp, store) = setup();
        let asset = Asset::new("Amp", AssetKind::Equipment, "test", Utc::now());
        store.save_asset(&asset).unwrap();
        assert!(store.delete_asset(&asset.id).unwrap());
        assert!(!store.delete_asset(&asset.id).unwrap());
        assert!(store.load_asset(&asset.id).unwrap().is_none());
    }
}

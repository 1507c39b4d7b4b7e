//! Persistence seam for assets and service cases
//!
//! Every write is revision-checked: a record carrying revision `n` is only
//! accepted if the stored copy is at `n - 1` (or absent when `n == 1`).
//! Writers bump `entity_revision` before saving.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::EntityId;
use crate::entities::asset::Asset;
use crate::entities::service_case::ServiceCase;

pub trait Store: Send + Sync {
    fn load_asset(&self, id: &EntityId) -> Result<Option<Asset>, StoreError>;

    fn save_asset(&self, asset: &Asset) -> Result<(), StoreError>;

    fn load_case(&self, id: &EntityId) -> Result<Option<ServiceCase>, StoreError>;

    fn save_case(&self, case: &ServiceCase) -> Result<(), StoreError>;

    fn list_assets(&self) -> Result<Vec<Asset>, StoreError>;

    fn list_cases(&self) -> Result<Vec<ServiceCase>, StoreError>;

    /// Remove an asset. Returns false if it did not exist.
    fn delete_asset(&self, id: &EntityId) -> Result<bool, StoreError>;

    /// Write a case and (optionally) its asset as one unit
    ///
    /// Both revisions are checked before either record is written.
    fn commit(&self, case: &ServiceCase, asset: Option<&Asset>) -> Result<(), StoreError>;
}

/// Check that `incoming` may replace a record stored at `stored`
pub(crate) fn check_revision(
    id: &EntityId,
    stored: Option<u32>,
    incoming: u32,
) -> Result<(), StoreError> {
    let expected = incoming.saturating_sub(1);
    let found = stored.unwrap_or(0);
    if found == expected && incoming >= 1 {
        Ok(())
    } else {
        Err(StoreError::RevisionMismatch {
            id: id.to_string(),
            expected,
            found,
        })
    }
}

/// Check that `incoming` may replace `stored`, a copy of the same record
pub(crate) fn check_replace<T: Entity>(stored: Option<&T>, incoming: &T) -> Result<(), StoreError> {
    check_revision(incoming.id(), stored.map(|r| r.revision()), incoming.revision())
}

#[derive(Debug, Default)]
struct Tables {
    assets: BTreeMap<EntityId, Asset>,
    cases: BTreeMap<EntityId, ServiceCase>,
}

/// In-process store; commits are atomic under a single write lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn load_asset(&self, id: &EntityId) -> Result<Option<Asset>, StoreError> {
        Ok(self.read().assets.get(id).cloned())
    }

    fn save_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        let mut tables = self.write();
        check_replace(tables.assets.get(&asset.id), asset)?;
        tables.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    fn load_case(&self, id: &EntityId) -> Result<Option<ServiceCase>, StoreError> {
        Ok(self.read().cases.get(id).cloned())
    }

    fn save_case(&self, case: &ServiceCase) -> Result<(), StoreError> {
        let mut tables = self.write();
        let stored = tables.cases.get(&case.id);
        check_replace(stored, case)?;
        if stored.is_none() && tables.cases.values().any(|c| c.number == case.number) {
            return Err(StoreError::Duplicate(case.number.clone()));
        }
        tables.cases.insert(case.id, case.clone());
        Ok(())
    }

    fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        Ok(self.read().assets.values().cloned().collect())
    }

    fn list_cases(&self) -> Result<Vec<ServiceCase>, StoreError> {
        Ok(self.read().cases.values().cloned().collect())
    }

    fn delete_asset(&self, id: &EntityId) -> Result<bool, StoreError> {
        Ok(self.write().assets.remove(id).is_some())
    }

    fn commit(&self, case: &ServiceCase, asset: Option<&Asset>) -> Result<(), StoreError> {
        let mut tables = self.write();
        check_replace(tables.cases.get(&case.id), case)?;
        if let Some(asset) = asset {
            check_replace(tables.assets.get(&asset.id), asset)?;
            tables.assets.insert(asset.id, asset.clone());
        }
        tables.cases.insert(case.id, case.clone());
        Ok(())
    }
}

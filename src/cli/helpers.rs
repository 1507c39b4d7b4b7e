//! Shared helper functions for CLI commands

use std::sync::Arc;

use miette::{IntoDiagnostic, Result};

use crate::core::config::Config;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::service::ServiceDesk;
use crate::core::shortid::ShortIdIndex;
use crate::core::yaml_store::YamlStore;

/// Everything a command needs to talk to the current project
pub struct Workspace {
    pub project: Project,
    pub desk: ServiceDesk,
    pub short_ids: ShortIdIndex,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load_for(Some(&project));
        let store = Arc::new(YamlStore::open(&project));
        let desk = ServiceDesk::with_config(store, &config);
        let short_ids = ShortIdIndex::load(&project);
        Ok(Self {
            project,
            desk,
            short_ids,
        })
    }

    /// Assign aliases to `ids` and persist the index
    pub fn remember(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.short_ids.ensure_all(ids.into_iter().map(|id| id.to_string()));
        if let Err(e) = self.short_ids.save(&self.project) {
            tracing::warn!(error = %e, "failed to save short id index");
        }
    }

    /// Alias for display, falling back to a truncated ID
    pub fn short(&self, id: &EntityId) -> String {
        self.short_ids
            .get_short_id(&id.to_string())
            .unwrap_or_else(|| format_short_id(id))
    }

    /// Resolve an alias, full ID or asset code to an asset ID
    pub fn resolve_asset(&self, reference: &str) -> Result<EntityId> {
        let resolved = self
            .short_ids
            .resolve(reference)
            .ok_or_else(|| miette::miette!("Unknown short ID '{}'", reference))?;
        if let Ok(id) = resolved.parse::<EntityId>() {
            if id.prefix() != EntityPrefix::Ast {
                return Err(miette::miette!("'{}' is not an asset ID", reference));
            }
            return Ok(id);
        }
        self.desk
            .list_assets()?
            .into_iter()
            .find(|a| {
                a.code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(reference.trim()))
            })
            .map(|a| a.id)
            .ok_or_else(|| miette::miette!("No asset found matching '{}'", reference))
    }

    /// Resolve an alias, full ID or case number to a case ID
    pub fn resolve_case(&self, reference: &str) -> Result<EntityId> {
        let resolved = self
            .short_ids
            .resolve(reference)
            .ok_or_else(|| miette::miette!("Unknown short ID '{}'", reference))?;
        if let Ok(id) = resolved.parse::<EntityId>() {
            if id.prefix() != EntityPrefix::Case {
                return Err(miette::miette!("'{}' is not a case ID", reference));
            }
            return Ok(id);
        }
        Ok(self.desk.find_case_by_number(&resolved)?.id)
    }
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Ask for confirmation unless `yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Ast);
        let formatted = format_short_id(&id);
        assert!(formatted.len() <= 16);
        assert!(formatted.starts_with("AST-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("Révision générale", 6), "Rév...");
    }

    #[test]
    fn test_confirm_skipped_with_yes() {
        assert!(confirm("Delete?", true).unwrap());
    }
}

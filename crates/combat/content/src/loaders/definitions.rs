//! Definition catalog loader.
//!
//! Each catalog is a RON list of definitions:
//!
//! ```ron
//! [
//!     (
//!         id: "second_wind",
//!         name: "Second Wind",
//!         cost: (bonus_action: 1),
//!         targeting: (shape: SelfOnly, range: 0),
//!         effects: [(kind: Heal(dice: "1d10+1"))],
//!     ),
//! ]
//! ```

use std::path::Path;
use std::str::FromStr;

use combat_core::{
    AbilityDefinition, CombatantTemplate, ContentRegistry, DamageType, ReactionDefinition,
    StatusDefinition,
};
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// A parsed catalog and the soft problems found in its source.
#[derive(Clone, Debug)]
pub struct Catalog<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

/// Loader for ability, status, reaction, and template catalogs.
pub struct DefinitionLoader;

impl DefinitionLoader {
    pub fn load_abilities(path: &Path) -> LoadResult<Catalog<AbilityDefinition>> {
        load_list(path, "ability")
    }

    pub fn load_statuses(path: &Path) -> LoadResult<Catalog<StatusDefinition>> {
        load_list(path, "status")
    }

    pub fn load_reactions(path: &Path) -> LoadResult<Catalog<ReactionDefinition>> {
        load_list(path, "reaction")
    }

    pub fn load_templates(path: &Path) -> LoadResult<Catalog<CombatantTemplate>> {
        load_list(path, "template")
    }

    /// Builds a validated registry from already-parsed catalogs.
    ///
    /// Duplicate ids and dangling references are errors; soft problems are
    /// kept as registry warnings.
    pub fn assemble(
        abilities: Vec<AbilityDefinition>,
        statuses: Vec<StatusDefinition>,
        reactions: Vec<ReactionDefinition>,
        templates: Vec<CombatantTemplate>,
    ) -> LoadResult<ContentRegistry> {
        let mut registry = ContentRegistry::new();
        for status in statuses {
            registry.add_status(status)?;
        }
        for ability in abilities {
            registry.add_ability(ability)?;
        }
        for reaction in reactions {
            registry.add_reaction(reaction)?;
        }
        for template in templates {
            registry.add_template(template)?;
        }
        registry
            .validate()
            .map_err(|e| anyhow::anyhow!("Content validation failed: {}", e))?;
        Ok(registry)
    }
}

fn load_list<T: DeserializeOwned>(path: &Path, kind: &str) -> LoadResult<Catalog<T>> {
    let content = read_file(path)?;
    let items: Vec<T> = ron::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Failed to parse {} catalog RON at {:?}: {}", kind, path, e)
    })?;
    tracing::debug!(kind, count = items.len(), path = %path.display(), "loaded catalog");

    let warnings = unknown_damage_types(&content)
        .into_iter()
        .map(|name| {
            format!(
                "{} catalog {} names unknown damage type '{}', treated as untyped",
                kind,
                path.display(),
                name
            )
        })
        .collect();
    Ok(Catalog { items, warnings })
}

/// Damage type names in `content` that do not parse, in source order.
///
/// Deserialization already maps them to `Untyped`; this keeps the names so
/// the engine can report them.
fn unknown_damage_types(content: &str) -> Vec<String> {
    const KEY: &str = "damage_type:";
    let mut unknown: Vec<String> = Vec::new();
    for (index, _) in content.match_indices(KEY) {
        let value = content[index + KEY.len()..].trim_start();
        let value = value.strip_prefix("Some(").map_or(value, str::trim_start);
        let Some(quoted) = value.strip_prefix('"') else {
            continue;
        };
        let Some(end) = quoted.find('"') else {
            continue;
        };
        let name = quoted[..end].trim();
        if DamageType::from_str(name).is_err() && !unknown.iter().any(|seen| seen == name) {
            unknown.push(name.to_owned());
        }
    }
    unknown
}

//! Content factory for building engine inputs from a data directory.

use std::path::{Path, PathBuf};

use combat_core::{
    AbilityDefinition, CombatConfig, CombatantTemplate, ContentRegistry, ReactionDefinition,
    StatusDefinition,
};

use crate::loaders::{Catalog, ConfigLoader, DefinitionLoader, LoadResult, ScenarioLoader};
use crate::scenario::Scenario;

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── abilities.ron
/// ├── statuses.ron
/// ├── reactions.ron
/// ├── templates.ron
/// └── scenarios/
///     ├── duel.json
///     └── skirmish.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load engine tunables from `config.toml`, or defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_abilities(&self) -> LoadResult<Catalog<AbilityDefinition>> {
        DefinitionLoader::load_abilities(&self.data_dir.join("abilities.ron"))
    }

    pub fn load_statuses(&self) -> LoadResult<Catalog<StatusDefinition>> {
        DefinitionLoader::load_statuses(&self.data_dir.join("statuses.ron"))
    }

    pub fn load_reactions(&self) -> LoadResult<Catalog<ReactionDefinition>> {
        DefinitionLoader::load_reactions(&self.data_dir.join("reactions.ron"))
    }

    pub fn load_templates(&self) -> LoadResult<Catalog<CombatantTemplate>> {
        DefinitionLoader::load_templates(&self.data_dir.join("templates.ron"))
    }

    /// Load every catalog and validate cross references.
    ///
    /// Soft problems found while reading the catalogs are added to the
    /// registry warnings, which the engine republishes when an encounter starts.
    pub fn load_registry(&self) -> LoadResult<ContentRegistry> {
        let abilities = self.load_abilities()?;
        let statuses = self.load_statuses()?;
        let reactions = self.load_reactions()?;
        let templates = self.load_templates()?;

        let mut registry = DefinitionLoader::assemble(
            abilities.items,
            statuses.items,
            reactions.items,
            templates.items,
        )?;
        let warnings = abilities
            .warnings
            .into_iter()
            .chain(statuses.warnings)
            .chain(reactions.warnings)
            .chain(templates.warnings);
        for warning in warnings {
            tracing::warn!(%warning, "content warning");
            registry.add_warning(warning);
        }
        tracing::info!(
            abilities = registry.abilities().count(),
            statuses = registry.statuses().count(),
            templates = registry.templates().count(),
            "content loaded"
        );
        Ok(registry)
    }

    /// Load a scenario from `scenarios/{name}.json`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        ScenarioLoader::load(&self.scenarios_dir().join(format!("{}.json", name)))
    }

    /// Names of every scenario file, sorted.
    pub fn scenario_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.scenarios_dir();
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to list scenarios in {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn scenarios_dir(&self) -> PathBuf {
        self.data_dir.join("scenarios")
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::DefinitionOracle;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.scenarios_dir(), Path::new("/tmp/data/scenarios"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), CombatConfig::default());
    }

    #[test]
    fn catalog_warnings_reach_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            std::fs::write(dir.path().join(name), content).unwrap();
        };
        write(
            "abilities.ron",
            r#"[(
                id: "chaos_bolt",
                name: "Chaos Bolt",
                effects: [(kind: Damage(dice: "2d8", damage_type: "chaos"))],
            )]"#,
        );
        write("statuses.ron", "[]");
        write("reactions.ron", "[]");
        write("templates.ron", "[]");

        let registry = ContentFactory::new(dir.path()).load_registry().unwrap();
        assert!(
            registry
                .warnings()
                .iter()
                .any(|w| w.contains("unknown damage type 'chaos'"))
        );
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_registry().unwrap_err();
        assert!(err.to_string().contains("abilities.ron"));
    }
}

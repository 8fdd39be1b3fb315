//! Encounter scenario loader (JSON).

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::scenario::Scenario;

/// Reads and writes [`Scenario`] files.
///
/// JSON format:
///
/// ```json
/// {
///   "id": "bridge_ambush",
///   "name": "Bridge Ambush",
///   "seed": 7,
///   "units": [
///     { "id": "hero", "name": "Aldric", "faction": "player", "template": "fighter",
///       "hp": 30, "maxHp": 44, "initiative": 15, "initiativeTiebreaker": 3,
///       "x": 0, "y": 0, "abilities": ["shove"], "tags": ["melee"] }
///   ]
/// }
/// ```
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario JSON at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        Ok(serde_json::from_str(content)?)
    }

    /// Writes a scenario as pretty-printed JSON with a trailing newline.
    pub fn save(path: &Path, scenario: &Scenario) -> LoadResult<()> {
        let mut json = serde_json::to_string_pretty(scenario)?;
        json.push('\n');
        std::fs::write(path, json)
            .map_err(|e| anyhow::anyhow!("Failed to write scenario {}: {}", path.display(), e))
    }
}

//! Simulator runtime configuration.
use std::env;
use std::path::PathBuf;

/// Options for one headless run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimConfig {
    /// Content directory; the bundled data when unset.
    pub data_dir: Option<PathBuf>,
    /// Scenario file stem under `scenarios/`; a generated 2v2 when unset.
    pub scenario: Option<String>,
    /// Dice seed. Also seeds the generator when no scenario is named.
    pub seed: Option<u64>,
    /// Overrides `max_rounds` from `config.toml`.
    pub max_rounds: Option<u32>,
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_DATA_DIR` - Content directory (default: bundled data)
    /// - `COMBAT_SCENARIO` - Scenario name, e.g. `skirmish` (default: random 2v2)
    /// - `COMBAT_SEED` - Encounter seed (default: scenario seed, then 0)
    /// - `COMBAT_MAX_ROUNDS` - Round limit before a draw (default: from config)
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.data_dir = lookup("COMBAT_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        config.scenario = lookup("COMBAT_SCENARIO")
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        config.seed = read_var(&lookup, "COMBAT_SEED");
        config.max_rounds = read_var::<u32>(&lookup, "COMBAT_MAX_ROUNDS").map(|rounds| rounds.max(1));

        config
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> SimConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SimConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), SimConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("COMBAT_DATA_DIR", "/srv/combat"),
            ("COMBAT_SCENARIO", " skirmish "),
            ("COMBAT_SEED", "1337"),
            ("COMBAT_MAX_ROUNDS", "12"),
        ]);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/combat")));
        assert_eq!(config.scenario.as_deref(), Some("skirmish"));
        assert_eq!(config.seed, Some(1337));
        assert_eq!(config.max_rounds, Some(12));
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = config(&[
            ("COMBAT_SEED", "lots"),
            ("COMBAT_MAX_ROUNDS", "0"),
            ("COMBAT_SCENARIO", "   "),
        ]);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_rounds, Some(1));
        assert_eq!(config.scenario, None);
    }
}

//! TOML scenario files combining balance, level, schedule and opening builds.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use lane_defence_core::config::{Balance, LevelLayout, WaveSchedule};
use lane_defence_simulation::MatchSetup;
use lane_defence_system_builder::BuildRequest;
use serde::Deserialize;

/// Scenario shipped with the binary.
const DEFAULT_SCENARIO: &str = include_str!("../scenarios/default.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScenarioFile {
    balance: Balance,
    level: LevelLayout,
    schedule: WaveSchedule,
    builds: Vec<BuildRequest>,
}

/// Validated scenario ready to be played.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scenario {
    /// Match configuration.
    pub(crate) setup: MatchSetup,
    /// Build orders placed before the match starts, in file order.
    pub(crate) builds: Vec<BuildRequest>,
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses the scenario embedded in the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_SCENARIO).context("built-in scenario is invalid")
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        if file.schedule.waves.is_empty() {
            bail!("scenario schedule declares no waves");
        }

        let scenario = Self {
            setup: MatchSetup {
                balance: file.balance,
                level: file.level,
                schedule: file.schedule,
            },
            builds: file.builds,
        };
        scenario
            .setup
            .validate()
            .context("scenario failed validation")?;
        Ok(scenario)
    }
}

//! Scenario files describing the board and the pieces present at start-up.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use piece_arena_core::{BoardSize, PieceConfig};
use serde::Deserialize;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

const BUILTIN_SCENARIO: &str = r#"
version = 1
board = { width = 800.0, height = 600.0 }

[[pieces]]
id = "hunter"
position = { x = 100.0, y = 100.0 }
target = { x = 700.0, y = 500.0 }
speed = 3.0
weapon = { cooldown = 300 }

[[pieces]]
id = "drifter"
position = { x = 700.0, y = 100.0 }
target = { x = 100.0, y = 500.0 }

[[pieces]]
id = "mayfly"
class = "piece ephemeral"
position = { x = 400.0, y = 300.0 }
size = 20.0
borderSize = 1.0
lifespan = 2000
"#;

/// Board dimensions and initial pieces of a simulation run.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    version: u32,
    pub(crate) board: BoardSize,
    #[serde(default)]
    pub(crate) pieces: Vec<PieceConfig>,
}

/// Loads a scenario from the TOML file at `path`.
pub(crate) fn load(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid scenario at {}", path.display()))
}

/// Scenario used when no file is supplied.
pub(crate) fn builtin() -> Result<Scenario> {
    parse(BUILTIN_SCENARIO).context("built-in scenario is invalid")
}

fn parse(contents: &str) -> Result<Scenario> {
    let scenario: Scenario =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    if scenario.version != SUPPORTED_SCENARIO_VERSION {
        bail!(
            "unsupported scenario version {}; expected {}",
            scenario.version,
            SUPPORTED_SCENARIO_VERSION
        );
    }
    if !(scenario.board.width > 0.0 && scenario.board.height > 0.0) {
        bail!(
            "board dimensions must be positive, found {}x{}",
            scenario.board.width,
            scenario.board.height
        );
    }
    Ok(scenario)
}

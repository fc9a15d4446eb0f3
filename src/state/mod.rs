mod filter;
mod rule;

use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};

pub use filter::is_active;
pub use rule::{state_meets_rule, NetStateRule};

/// Coarse execution mode of a network.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Train,
    #[default]
    Test,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Train => f.write_str("TRAIN"),
            Phase::Test => f.write_str("TEST"),
        }
    }
}

/// The execution context a network runs under.
///
/// Layers decide whether they take part in a run by matching their
/// include and exclude rules against this state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetState {
    pub phase: Phase,
    pub level: i32,
    pub stage: BTreeSet<String>,
}

impl NetState {
    /// Creates a new `NetState` at level 0 with no active stages.
    ///
    /// # Arguments
    /// * `phase` - The execution mode.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage.insert(stage.into());
        self
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stage.contains(stage)
    }
}

use serde::{Deserialize, Serialize};

use super::{NetState, Phase};
use crate::error::at;

/// A predicate over a [`NetState`], used to include or exclude a layer.
///
/// Every condition that is set must hold for the rule to match, a rule
/// with nothing set matches every state. The state must carry all of the
/// `stage`s and none of the `not_stage`s. Use several rules to express a
/// disjunction.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetStateRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_level: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stage: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    not_stage: Vec<String>,
}

impl NetStateRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn has_phase(&self) -> bool {
        self.phase.is_some()
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = Some(phase);
    }

    pub fn clear_phase(&mut self) {
        self.phase = None;
    }

    pub fn min_level(&self) -> Option<i32> {
        self.min_level
    }

    pub fn has_min_level(&self) -> bool {
        self.min_level.is_some()
    }

    pub fn set_min_level(&mut self, level: i32) {
        self.min_level = Some(level);
    }

    pub fn clear_min_level(&mut self) {
        self.min_level = None;
    }

    pub fn max_level(&self) -> Option<i32> {
        self.max_level
    }

    pub fn has_max_level(&self) -> bool {
        self.max_level.is_some()
    }

    pub fn set_max_level(&mut self, level: i32) {
        self.max_level = Some(level);
    }

    pub fn clear_max_level(&mut self) {
        self.max_level = None;
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn stage(&self, id: usize) -> &str {
        at(&self.stage, "stage", id).as_str()
    }

    pub fn stages(&self) -> &[String] {
        &self.stage
    }

    pub fn stage_size(&self) -> usize {
        self.stage.len()
    }

    pub fn add_stage(&mut self, stage: impl Into<String>) {
        self.stage.push(stage.into());
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn not_stage(&self, id: usize) -> &str {
        at(&self.not_stage, "not_stage", id).as_str()
    }

    pub fn not_stages(&self) -> &[String] {
        &self.not_stage
    }

    pub fn not_stage_size(&self) -> usize {
        self.not_stage.len()
    }

    pub fn add_not_stage(&mut self, stage: impl Into<String>) {
        self.not_stage.push(stage.into());
    }

    /// Builder-style phase setter.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.set_phase(phase);
        self
    }

    /// Builder-style inclusive level bounds, `None` leaves a side unbounded.
    pub fn with_levels(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_level = min;
        self.max_level = max;
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.add_stage(stage);
        self
    }

    pub fn with_not_stage(mut self, stage: impl Into<String>) -> Self {
        self.add_not_stage(stage);
        self
    }

    /// Returns whether `state` meets this rule.
    pub fn matches(&self, state: &NetState) -> bool {
        state_meets_rule(state, self)
    }
}

/// Decides whether `state` meets every condition set on `rule`.
pub fn state_meets_rule(state: &NetState, rule: &NetStateRule) -> bool {
    if let Some(phase) = rule.phase {
        if phase != state.phase {
            log::trace!("state phase {} differs from rule phase {phase}", state.phase);
            return false;
        }
    }

    if let Some(min) = rule.min_level {
        if state.level < min {
            log::trace!("state level {} is below rule min_level {min}", state.level);
            return false;
        }
    }

    if let Some(max) = rule.max_level {
        if state.level > max {
            log::trace!("state level {} is above rule max_level {max}", state.level);
            return false;
        }
    }

    if let Some(missing) = rule.stage.iter().find(|s| !state.has_stage(s)) {
        log::trace!("state is missing required stage '{missing}'");
        return false;
    }

    if let Some(present) = rule.not_stage.iter().find(|s| state.has_stage(s)) {
        log::trace!("state contains forbidden stage '{present}'");
        return false;
    }

    true
}

mod registry;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub use registry::SharedParams;

/// How strictly the shape of a shared parameter must match its owner's.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareMode {
    /// Every dimension must match.
    #[default]
    Strict,
    /// Only the total element count must match.
    Permissive,
}

impl ShareMode {
    /// Returns whether a tensor of `shape` may share the tensor of `owner_shape`.
    pub fn compatible(self, owner_shape: &[usize], shape: &[usize]) -> bool {
        match self {
            ShareMode::Strict => owner_shape == shape,
            ShareMode::Permissive => match (count(owner_shape), count(shape)) {
                (Some(owner), Some(got)) => owner == got,
                _ => false,
            },
        }
    }
}

/// Element count of `shape`, `None` if it doesn't fit in a `usize`.
fn count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

impl Display for ShareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareMode::Strict => f.write_str("STRICT"),
            ShareMode::Permissive => f.write_str("PERMISSIVE"),
        }
    }
}

/// Describes one learnable parameter slot of a layer.
///
/// A non-empty `name` turns the slot into a sharing key: every layer
/// declaring a param of the same name uses the same tensor, provided the
/// shapes pass the `share_mode` check. The multipliers scale the global
/// learning rate and weight decay for this parameter.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_mode: Option<ShareMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lr_mult: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decay_mult: Option<f32>,
}

impl ParamSpec {
    const DEFAULT_MULT: f32 = 1.0;

    /// Creates a new `ParamSpec` shared under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates a new unshared `ParamSpec`.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns whether this param takes part in sharing.
    pub fn is_shared(&self) -> bool {
        !self.name.is_empty()
    }

    /// Returns the share mode, `Strict` unless set otherwise.
    pub fn share_mode(&self) -> ShareMode {
        self.share_mode.unwrap_or_default()
    }

    pub fn has_share_mode(&self) -> bool {
        self.share_mode.is_some()
    }

    pub fn set_share_mode(&mut self, mode: ShareMode) {
        self.share_mode = Some(mode);
    }

    /// Returns the learning rate multiplier, 1.0 unless set otherwise.
    pub fn lr_mult(&self) -> f32 {
        self.lr_mult.unwrap_or(Self::DEFAULT_MULT)
    }

    pub fn has_lr_mult(&self) -> bool {
        self.lr_mult.is_some()
    }

    pub fn set_lr_mult(&mut self, mult: f32) {
        self.lr_mult = Some(mult);
    }

    pub fn clear_lr_mult(&mut self) {
        self.lr_mult = None;
    }

    /// Returns the weight decay multiplier, 1.0 unless set otherwise.
    pub fn decay_mult(&self) -> f32 {
        self.decay_mult.unwrap_or(Self::DEFAULT_MULT)
    }

    pub fn has_decay_mult(&self) -> bool {
        self.decay_mult.is_some()
    }

    pub fn set_decay_mult(&mut self, mult: f32) {
        self.decay_mult = Some(mult);
    }

    pub fn clear_decay_mult(&mut self) {
        self.decay_mult = None;
    }

    pub fn with_share_mode(mut self, mode: ShareMode) -> Self {
        self.set_share_mode(mode);
        self
    }

    pub fn with_lr_mult(mut self, mult: f32) -> Self {
        self.set_lr_mult(mult);
        self
    }

    pub fn with_decay_mult(mut self, mult: f32) -> Self {
        self.set_decay_mult(mult);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let spec = ParamSpec::anonymous();
        assert_eq!(spec.name(), "");
        assert!(!spec.is_shared());
        assert_eq!(spec.share_mode(), ShareMode::Strict);
        assert_eq!(spec.lr_mult(), 1.0);
        assert_eq!(spec.decay_mult(), 1.0);
        assert!(!spec.has_share_mode());
        assert!(!spec.has_lr_mult());
        assert!(!spec.has_decay_mult());
    }

    #[test]
    fn multipliers_report_presence() {
        let mut spec = ParamSpec::new("conv1_w").with_lr_mult(2.0).with_decay_mult(0.0);
        assert!(spec.is_shared());
        assert!(spec.has_lr_mult());
        assert_eq!(spec.lr_mult(), 2.0);
        assert!(spec.has_decay_mult());
        assert_eq!(spec.decay_mult(), 0.0);

        spec.clear_lr_mult();
        assert!(!spec.has_lr_mult());
        assert_eq!(spec.lr_mult(), 1.0);
    }

    #[test]
    fn strict_compares_every_dimension() {
        let mode = ShareMode::Strict;
        assert!(mode.compatible(&[2, 3], &[2, 3]));
        assert!(!mode.compatible(&[2, 3], &[3, 2]));
        assert!(!mode.compatible(&[6], &[6, 1]));
    }

    #[test]
    fn permissive_compares_counts() {
        let mode = ShareMode::Permissive;
        assert!(mode.compatible(&[2, 3], &[3, 2]));
        assert!(mode.compatible(&[6], &[1, 6, 1]));
        assert!(!mode.compatible(&[2, 3], &[2, 4]));
    }

    #[test]
    fn permissive_treats_overflowing_counts_as_incompatible() {
        let mode = ShareMode::Permissive;
        assert!(!mode.compatible(&[usize::MAX, 2], &[2]));
        assert!(!mode.compatible(&[2], &[usize::MAX, usize::MAX]));
        assert!(!mode.compatible(&[usize::MAX, 2], &[usize::MAX, 2]));
        assert!(ShareMode::Strict.compatible(&[usize::MAX, 2], &[usize::MAX, 2]));
    }

    #[test]
    fn deserializes_with_defaults() {
        let spec: ParamSpec =
            serde_json::from_str(r#"{"name": "shared", "share_mode": "PERMISSIVE"}"#).unwrap();
        assert_eq!(spec.name(), "shared");
        assert_eq!(spec.share_mode(), ShareMode::Permissive);
        assert!(!spec.has_lr_mult());
        assert_eq!(spec.decay_mult(), 1.0);
    }
}

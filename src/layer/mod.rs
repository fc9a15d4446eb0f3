mod validate;

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::{at, at_mut},
    param::ParamSpec,
    state::{self, NetState, NetStateRule, Phase},
    tensor::Tensor,
};

/// The full declarative configuration of one layer of a network.
///
/// Index-aligned sequences (`loss_weight` with `top`, `propagate_down`
/// with `bottom`, `param` with `blobs`) are either empty or as long as
/// their counterpart, see [`LayerParameter::validate`].
///
/// The layer owns handles to its parameter tensors. Cloning or copying a
/// layer shares those tensors rather than duplicating them.
#[derive(Serialize, Deserialize)]
#[serde(default, bound = "")]
pub struct LayerParameter<T> {
    name: String,
    #[serde(rename = "type")]
    layer_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<Phase>,
    bottom: Vec<String>,
    top: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    loss_weight: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    param: Vec<ParamSpec>,
    #[serde(skip)]
    blobs: Vec<Arc<T>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    propagate_down: Vec<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include: Vec<NetStateRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude: Vec<NetStateRule>,
}

impl<T> Default for LayerParameter<T> {
    fn default() -> Self {
        Self {
            name: Self::NO_NAME.to_string(),
            layer_type: Self::NO_TYPE.to_string(),
            phase: None,
            bottom: Vec::new(),
            top: Vec::new(),
            loss_weight: Vec::new(),
            param: Vec::new(),
            blobs: Vec::new(),
            propagate_down: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl<T> Clone for LayerParameter<T> {
    fn clone(&self) -> Self {
        let mut layer = Self::default();
        layer.copy_from(self);
        layer
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_from(source);
    }
}

/// Two layers are equal when they hold the same configuration and the
/// very same tensors.
impl<T> PartialEq for LayerParameter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.layer_type == other.layer_type
            && self.phase == other.phase
            && self.bottom == other.bottom
            && self.top == other.top
            && self.loss_weight == other.loss_weight
            && self.param == other.param
            && self.blobs.len() == other.blobs.len()
            && self
                .blobs
                .iter()
                .zip(&other.blobs)
                .all(|(a, b)| Arc::ptr_eq(a, b))
            && self.propagate_down == other.propagate_down
            && self.include == other.include
            && self.exclude == other.exclude
    }
}

impl<T: Tensor> fmt::Debug for LayerParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blob_shapes: Vec<_> = self.blobs.iter().map(|b| b.shape()).collect();

        f.debug_struct("LayerParameter")
            .field("name", &self.name)
            .field("type", &self.layer_type)
            .field("phase", &self.phase)
            .field("bottom", &self.bottom)
            .field("top", &self.top)
            .field("loss_weight", &self.loss_weight)
            .field("param", &self.param)
            .field("blobs", &blob_shapes)
            .field("propagate_down", &self.propagate_down)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .finish()
    }
}

impl<T> LayerParameter<T> {
    pub const NO_NAME: &'static str = "NO_NAME";
    pub const NO_TYPE: &'static str = "NO_TYPE";

    /// Creates a new `LayerParameter` with the given identity and nothing else.
    ///
    /// # Arguments
    /// * `name` - The name of the layer.
    /// * `layer_type` - The kind of computation the layer performs.
    pub fn new(name: impl Into<String>, layer_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer_type: layer_type.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn layer_type(&self) -> &str {
        &self.layer_type
    }

    pub fn set_layer_type(&mut self, layer_type: impl Into<String>) {
        self.layer_type = layer_type.into();
    }

    /// Returns the phase the layer is restricted to, `Test` unless set.
    pub fn phase(&self) -> Phase {
        self.phase.unwrap_or_default()
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

    // ---------------------------------------------------------------------
    // Topology
    // ---------------------------------------------------------------------

    /// # Panics
    /// If `id` is out of range.
    pub fn bottom(&self, id: usize) -> &str {
        at(&self.bottom, "bottom", id).as_str()
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn set_bottom(&mut self, id: usize, name: impl Into<String>) {
        *at_mut(&mut self.bottom, "bottom", id) = name.into();
    }

    pub fn bottoms(&self) -> &[String] {
        &self.bottom
    }

    pub fn bottom_size(&self) -> usize {
        self.bottom.len()
    }

    pub fn add_bottom(&mut self, name: impl Into<String>) {
        self.bottom.push(name.into());
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn top(&self, id: usize) -> &str {
        at(&self.top, "top", id).as_str()
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn set_top(&mut self, id: usize, name: impl Into<String>) {
        *at_mut(&mut self.top, "top", id) = name.into();
    }

    pub fn tops(&self) -> &[String] {
        &self.top
    }

    pub fn top_size(&self) -> usize {
        self.top.len()
    }

    pub fn add_top(&mut self, name: impl Into<String>) {
        self.top.push(name.into());
    }

    // ---------------------------------------------------------------------
    // Per top / per bottom flags
    // ---------------------------------------------------------------------

    /// # Panics
    /// If `id` is out of range.
    pub fn loss_weight(&self, id: usize) -> f32 {
        *at(&self.loss_weight, "loss_weight", id)
    }

    pub fn loss_weights(&self) -> &[f32] {
        &self.loss_weight
    }

    pub fn loss_weight_size(&self) -> usize {
        self.loss_weight.len()
    }

    pub fn add_loss_weight(&mut self, weight: f32) {
        self.loss_weight.push(weight);
    }

    pub fn clear_loss_weight(&mut self) {
        self.loss_weight.clear();
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn propagate_down(&self, id: usize) -> bool {
        *at(&self.propagate_down, "propagate_down", id)
    }

    pub fn propagate_downs(&self) -> &[bool] {
        &self.propagate_down
    }

    pub fn propagate_down_size(&self) -> usize {
        self.propagate_down.len()
    }

    pub fn add_propagate_down(&mut self, propagate: bool) {
        self.propagate_down.push(propagate);
    }

    // ---------------------------------------------------------------------
    // Parameters
    // ---------------------------------------------------------------------

    /// # Panics
    /// If `id` is out of range.
    pub fn param(&self, id: usize) -> &ParamSpec {
        at(&self.param, "param", id)
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn param_mut(&mut self, id: usize) -> &mut ParamSpec {
        at_mut(&mut self.param, "param", id)
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.param
    }

    pub fn param_size(&self) -> usize {
        self.param.len()
    }

    pub fn add_param(&mut self, spec: ParamSpec) {
        self.param.push(spec);
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn blob(&self, id: usize) -> &Arc<T> {
        at(&self.blobs, "blobs", id)
    }

    /// Replaces the tensor at `id`, dropping this layer's handle to the old one.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn set_blob(&mut self, id: usize, blob: Arc<T>) {
        *at_mut(&mut self.blobs, "blobs", id) = blob;
    }

    pub fn blobs(&self) -> &[Arc<T>] {
        &self.blobs
    }

    pub fn blobs_size(&self) -> usize {
        self.blobs.len()
    }

    pub fn add_blob(&mut self, blob: Arc<T>) {
        self.blobs.push(blob);
    }

    // ---------------------------------------------------------------------
    // Rules
    // ---------------------------------------------------------------------

    /// # Panics
    /// If `id` is out of range.
    pub fn include(&self, id: usize) -> &NetStateRule {
        at(&self.include, "include", id)
    }

    pub fn includes(&self) -> &[NetStateRule] {
        &self.include
    }

    pub fn include_size(&self) -> usize {
        self.include.len()
    }

    pub fn add_include(&mut self, rule: NetStateRule) {
        self.include.push(rule);
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn exclude(&self, id: usize) -> &NetStateRule {
        at(&self.exclude, "exclude", id)
    }

    pub fn excludes(&self) -> &[NetStateRule] {
        &self.exclude
    }

    pub fn exclude_size(&self) -> usize {
        self.exclude.len()
    }

    pub fn add_exclude(&mut self, rule: NetStateRule) {
        self.exclude.push(rule);
    }

    /// Returns whether this layer takes part in a run under `state`.
    pub fn is_active(&self, state: &NetState) -> bool {
        let active = state::is_active(&self.include, &self.exclude, state);
        log::trace!("layer '{}' active: {active}", self.name);
        active
    }

    // ---------------------------------------------------------------------
    // Whole-object operations
    // ---------------------------------------------------------------------

    /// Empties every sequence, keeping `name`, `type` and `phase`.
    pub fn clear(&mut self) {
        self.bottom.clear();
        self.top.clear();
        self.loss_weight.clear();
        self.param.clear();
        self.blobs.clear();
        self.propagate_down.clear();
        self.include.clear();
        self.exclude.clear();
    }

    /// Replaces the whole content of `self` with a snapshot of `other`.
    ///
    /// Tensors are shared with `other`, not duplicated.
    pub fn copy_from(&mut self, other: &Self) {
        self.name.clone_from(&other.name);
        self.layer_type.clone_from(&other.layer_type);
        self.phase = other.phase;

        self.bottom.clone_from(&other.bottom);
        self.top.clone_from(&other.top);
        self.loss_weight.clone_from(&other.loss_weight);
        self.param.clone_from(&other.param);
        self.blobs.clone_from(&other.blobs);
        self.propagate_down.clone_from(&other.propagate_down);
        self.include.clone_from(&other.include);
        self.exclude.clone_from(&other.exclude);
    }
}

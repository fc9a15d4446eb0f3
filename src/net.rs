use serde::{Deserialize, Serialize};

use crate::{
    error::{at, Result},
    layer::LayerParameter,
    state::NetState,
};

/// An ordered list of layer configurations forming a network, together
/// with the state it runs under unless told otherwise.
#[derive(Serialize, Deserialize)]
#[serde(default, bound = "")]
pub struct NetParameter<T> {
    pub name: String,
    pub state: NetState,
    #[serde(rename = "layer")]
    layers: Vec<LayerParameter<T>>,
}

impl<T> Default for NetParameter<T> {
    fn default() -> Self {
        Self {
            name: String::new(),
            state: NetState::default(),
            layers: Vec::new(),
        }
    }
}

impl<T> Clone for NetParameter<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: self.state.clone(),
            layers: self.layers.clone(),
        }
    }
}

impl<T> NetParameter<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn layer(&self, id: usize) -> &LayerParameter<T> {
        at(&self.layers, "layer", id)
    }

    pub fn layers(&self) -> &[LayerParameter<T>] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [LayerParameter<T>] {
        &mut self.layers
    }

    pub fn layer_size(&self) -> usize {
        self.layers.len()
    }

    pub fn add_layer(&mut self, layer: LayerParameter<T>) {
        self.layers.push(layer);
    }

    /// Iterates the layers taking part in a run under `state`, in order.
    pub fn active_layers<'a>(
        &'a self,
        state: &'a NetState,
    ) -> impl Iterator<Item = &'a LayerParameter<T>> + 'a {
        self.layers.iter().filter(move |layer| layer.is_active(state))
    }

    /// Returns a copy of this network keeping only the layers active under
    /// `state`, which becomes the state of the copy.
    ///
    /// Tensors are shared with the kept layers of `self`.
    pub fn filter(&self, state: &NetState) -> Self {
        let mut filtered = Self {
            name: self.name.clone(),
            state: state.clone(),
            layers: Vec::with_capacity(self.layers.len()),
        };

        for layer in &self.layers {
            if layer.is_active(state) {
                filtered.layers.push(layer.clone());
            } else {
                log::info!("the net state excludes layer '{}'", layer.name());
            }
        }

        filtered
    }

    /// Validates every layer, see [`LayerParameter::validate`].
    ///
    /// # Errors
    /// The error of the first malformed layer.
    pub fn validate(&self) -> Result<()> {
        self.layers.iter().try_for_each(LayerParameter::validate)
    }
}

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use super::ParamSpec;
use crate::{
    error::{ConfigError, Result},
    layer::LayerParameter,
    tensor::Tensor,
};

#[derive(Debug)]
struct Owner<T> {
    layer: String,
    spec: ParamSpec,
    tensor: Arc<T>,
}

/// Registry of named parameters shared across the layers of a network.
///
/// The first layer to bind a name owns the tensor, every later binder of
/// the same name is checked against it and handed the owner's tensor.
#[derive(Debug)]
pub struct SharedParams<T> {
    owners: HashMap<String, Owner<T>>,
}

impl<T> Default for SharedParams<T> {
    fn default() -> Self {
        Self {
            owners: HashMap::new(),
        }
    }
}

/// A name touched by a layer being bound, not yet visible in the registry.
struct Staged<T> {
    spec: ParamSpec,
    tensor: Arc<T>,
    owned_by_layer: bool,
}

impl<T: Tensor> SharedParams<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the tensor of one param slot of a layer.
    ///
    /// # Arguments
    /// * `layer` - The name of the layer declaring the param.
    /// * `spec` - The declaration of the param.
    /// * `tensor` - The layer's own tensor for this slot.
    ///
    /// # Returns
    /// The tensor the slot must use from now on: `tensor` itself for
    /// anonymous params and new owners, the owner's tensor otherwise.
    ///
    /// # Errors
    /// `ShareShapeMismatch` if the shapes fail the check of `spec`'s share
    /// mode, `ShareMultMismatch` if both sides explicitly set different
    /// multipliers. The registry is left untouched on error.
    pub fn bind(&mut self, layer: &str, spec: &ParamSpec, tensor: Arc<T>) -> Result<Arc<T>> {
        if !spec.is_shared() {
            return Ok(tensor);
        }

        match self.owners.entry(spec.name().to_string()) {
            Entry::Vacant(entry) => {
                log::debug!("layer '{layer}' owns param '{}'", spec.name());
                entry.insert(Owner {
                    layer: layer.to_string(),
                    spec: spec.clone(),
                    tensor: Arc::clone(&tensor),
                });
                Ok(tensor)
            }
            Entry::Occupied(mut entry) => {
                let owner = entry.get_mut();
                share(&mut owner.spec, &*owner.tensor, spec, &*tensor)?;
                log::info!(
                    "sharing param '{}' owned by layer '{}' with layer '{layer}'",
                    spec.name(),
                    owner.layer
                );
                Ok(Arc::clone(&owner.tensor))
            }
        }
    }

    /// Binds every param slot of `layer`, swapping its blobs for the
    /// tensors it must share.
    ///
    /// All slots are checked before anything changes: on error neither the
    /// registry nor the layer is modified.
    ///
    /// # Errors
    /// `MalformedConfiguration` if the layer's params and blobs don't line
    /// up, otherwise the errors of [`SharedParams::bind`].
    pub fn bind_layer(&mut self, layer: &mut LayerParameter<T>) -> Result<()> {
        layer.validate()?;

        let slots = layer.param_size().min(layer.blobs_size());
        let mut staged: HashMap<String, Staged<T>> = HashMap::new();

        for id in 0..slots {
            let spec = layer.param(id);
            if !spec.is_shared() {
                continue;
            }

            let tensor = layer.blob(id);
            match staged.entry(spec.name().to_string()) {
                Entry::Occupied(mut entry) => {
                    let entry = entry.get_mut();
                    share(&mut entry.spec, &*entry.tensor, spec, &**tensor)?;
                }
                Entry::Vacant(entry) => {
                    let pending = match self.owners.get(spec.name()) {
                        Some(owner) => {
                            let mut owner_spec = owner.spec.clone();
                            share(&mut owner_spec, &*owner.tensor, spec, &**tensor)?;
                            Staged {
                                spec: owner_spec,
                                tensor: Arc::clone(&owner.tensor),
                                owned_by_layer: false,
                            }
                        }
                        None => Staged {
                            spec: spec.clone(),
                            tensor: Arc::clone(tensor),
                            owned_by_layer: true,
                        },
                    };
                    entry.insert(pending);
                }
            }
        }

        for id in 0..slots {
            let bound = match staged.get(layer.param(id).name()) {
                Some(pending) => Arc::clone(&pending.tensor),
                None => continue,
            };
            layer.set_blob(id, bound);
        }

        for (name, pending) in staged {
            if pending.owned_by_layer {
                log::debug!("layer '{}' owns param '{name}'", layer.name());
                self.owners.insert(
                    name,
                    Owner {
                        layer: layer.name().to_string(),
                        spec: pending.spec,
                        tensor: pending.tensor,
                    },
                );
            } else if let Some(owner) = self.owners.get_mut(&name) {
                log::info!(
                    "sharing param '{name}' owned by layer '{}' with layer '{}'",
                    owner.layer,
                    layer.name()
                );
                owner.spec = pending.spec;
            }
        }

        Ok(())
    }

    /// Returns the name of the layer owning the param `name`.
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.owners.get(name).map(|owner| owner.layer.as_str())
    }

    /// Returns the tensor behind the param `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.owners.get(name).map(|owner| &owner.tensor)
    }

    /// Returns the effective spec of the param `name`, with the multipliers
    /// sharers filled in.
    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.owners.get(name).map(|owner| &owner.spec)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Checks `spec` and `tensor` against the owner of their name, then fills
/// the owner's unset multipliers from `spec`. `owner` is only updated once
/// every check passed.
fn share<T: Tensor>(
    owner: &mut ParamSpec,
    owner_tensor: &T,
    spec: &ParamSpec,
    tensor: &T,
) -> Result<()> {
    let mode = spec.share_mode();
    if !mode.compatible(owner_tensor.shape(), tensor.shape()) {
        return Err(ConfigError::ShareShapeMismatch {
            name: spec.name().to_string(),
            mode,
            owner_shape: owner_tensor.shape().to_vec(),
            shape: tensor.shape().to_vec(),
        });
    }

    if spec.has_lr_mult() && owner.has_lr_mult() && owner.lr_mult() != spec.lr_mult() {
        return Err(mult_mismatch(spec, "lr_mult", owner.lr_mult(), spec.lr_mult()));
    }

    if spec.has_decay_mult() && owner.has_decay_mult() && owner.decay_mult() != spec.decay_mult() {
        return Err(mult_mismatch(
            spec,
            "decay_mult",
            owner.decay_mult(),
            spec.decay_mult(),
        ));
    }

    if spec.has_lr_mult() {
        owner.set_lr_mult(spec.lr_mult());
    }
    if spec.has_decay_mult() {
        owner.set_decay_mult(spec.decay_mult());
    }

    Ok(())
}

fn mult_mismatch(spec: &ParamSpec, field: &'static str, owner: f32, got: f32) -> ConfigError {
    ConfigError::ShareMultMismatch {
        name: spec.name().to_string(),
        field,
        owner,
        got,
    }
}

use super::LayerParameter;
use crate::error::{ConfigError, Result};

impl<T> LayerParameter<T> {
    /// Checks that every index-aligned sequence is either empty or as long
    /// as the sequence it is aligned with.
    ///
    /// `param` is only checked against `blobs` once the layer holds tensors.
    ///
    /// # Errors
    /// `MalformedConfiguration` naming the first pair that doesn't line up.
    pub fn validate(&self) -> Result<()> {
        self.check_aligned("loss_weight", self.loss_weight.len(), "top", self.top.len())?;
        self.check_aligned(
            "propagate_down",
            self.propagate_down.len(),
            "bottom",
            self.bottom.len(),
        )?;

        if !self.blobs.is_empty() {
            self.check_aligned("param", self.param.len(), "blobs", self.blobs.len())?;
        }

        Ok(())
    }

    /// Checks `param` against the amount of learnable parameters the
    /// computation of this layer declares.
    ///
    /// # Errors
    /// `MalformedConfiguration` if `param` is neither empty nor `learnable` long.
    pub fn validate_param_count(&self, learnable: usize) -> Result<()> {
        self.check_aligned("param", self.param.len(), "learnable params", learnable)
    }

    fn check_aligned(&self, a: &'static str, got: usize, b: &'static str, expected: usize) -> Result<()> {
        if got == 0 || got == expected {
            return Ok(());
        }

        Err(ConfigError::MalformedConfiguration {
            layer: self.name.clone(),
            a,
            b,
            got,
            expected,
        })
    }
}

//! Declarative layer configuration for computation graphs.
//!
//! A [`LayerParameter`] describes one layer: its identity, the names of
//! its inputs and outputs, its learnable parameter slots and the rules
//! deciding under which [`NetState`] it takes part in a run.

pub mod error;
pub mod layer;
pub mod net;
pub mod param;
pub mod state;
pub mod tensor;

pub use error::{ConfigError, Result};
pub use layer::LayerParameter;
pub use net::NetParameter;
pub use param::{ParamSpec, ShareMode, SharedParams};
pub use state::{is_active, state_meets_rule, NetState, NetStateRule, Phase};
pub use tensor::Tensor;

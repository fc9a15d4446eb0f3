use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::param::ShareMode;

/// The result type used across the configuration model.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The configuration model's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An indexed accessor was asked for an element past the end of its sequence.
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        len: usize,
    },
    /// Two index-aligned sequences of a layer have incompatible lengths.
    MalformedConfiguration {
        layer: String,
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    /// A shared parameter doesn't fit the shape of the tensor that owns its name.
    ShareShapeMismatch {
        name: String,
        mode: ShareMode,
        owner_shape: Vec<usize>,
        shape: Vec<usize>,
    },
    /// A shared parameter explicitly sets a multiplier that differs from its owner's.
    ShareMultMismatch {
        name: String,
        field: &'static str,
        owner: f32,
        got: f32,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IndexOutOfRange { field, index, len } => {
                write!(f, "index {index} out of range for {field} of size {len}")
            }
            ConfigError::MalformedConfiguration {
                layer,
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "layer '{layer}' is malformed: {a} has {got} entries but {b} has {expected}"
            ),
            ConfigError::ShareShapeMismatch {
                name,
                mode,
                owner_shape,
                shape,
            } => write!(
                f,
                "cannot share param '{name}' ({mode} mode): owner shape is {owner_shape:?}, got {shape:?}"
            ),
            ConfigError::ShareMultMismatch {
                name,
                field,
                owner,
                got,
            } => write!(
                f,
                "shared param '{name}' has mismatched {field}: owner has {owner}, got {got}"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Bounds-checked indexing for the sequence accessors.
///
/// # Panics
/// If `index` is past the end of `items`, with an `IndexOutOfRange` message.
pub(crate) fn at<'a, X>(items: &'a [X], field: &'static str, index: usize) -> &'a X {
    let len = items.len();
    items
        .get(index)
        .unwrap_or_else(|| panic!("{}", ConfigError::IndexOutOfRange { field, index, len }))
}

/// Mutable counterpart of [`at`].
pub(crate) fn at_mut<'a, X>(items: &'a mut [X], field: &'static str, index: usize) -> &'a mut X {
    let len = items.len();
    items
        .get_mut(index)
        .unwrap_or_else(|| panic!("{}", ConfigError::IndexOutOfRange { field, index, len }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_returns_element_in_range() {
        let items = [1, 2, 3];
        assert_eq!(*at(&items, "top", 2), 3);
    }

    #[test]
    #[should_panic(expected = "index 3 out of range for bottom of size 3")]
    fn at_panics_past_the_end() {
        let items = ["a", "b", "c"];
        at(&items, "bottom", 3);
    }

    #[test]
    fn display_malformed() {
        let err = ConfigError::MalformedConfiguration {
            layer: "fc1".into(),
            a: "loss_weight",
            b: "top",
            got: 1,
            expected: 2,
        };
        assert_eq!(
            err.to_string(),
            "layer 'fc1' is malformed: loss_weight has 1 entries but top has 2"
        );
    }
}

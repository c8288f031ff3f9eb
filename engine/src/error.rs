use thiserror::Error;

/// Errors raised while building or running a layer pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("layer `{layer}` failed to draw: {reason}")]
    Layer { layer: String, reason: String },

    #[error("layer `{layer}` panicked while drawing")]
    Panicked { layer: String },

    #[error("a layer with id `{id}` is already registered")]
    DuplicateLayer { id: String },

    #[error("no layer at index {index}")]
    UnknownLayer { index: usize },
}

impl DrawError {
    pub fn layer(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Layer {
            layer: layer.into(),
            reason: reason.into(),
        }
    }
}

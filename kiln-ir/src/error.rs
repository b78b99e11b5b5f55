use thiserror::Error;

/// A lookup named a resource absent from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource '{name}'")]
pub struct UnknownResource {
    pub name: String,
}

impl UnknownResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An exposure named a binding the resource does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resource '{resource}' has no binding '{binding}'")]
pub struct UnknownBinding {
    pub resource: String,
    pub binding: String,
}

/// Failure to apply an [`Exposure`](crate::Exposure) to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExposureError {
    #[error(transparent)]
    Resource(#[from] UnknownResource),
    #[error(transparent)]
    Binding(#[from] UnknownBinding),
}

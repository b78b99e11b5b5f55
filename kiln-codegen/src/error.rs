use kiln_ir::{ExposureError, UnknownBinding, UnknownResource};
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while compiling a manifest.
///
/// Every variant aborts the unit being compiled: the whole pass for graph
/// errors, a single service manifest for resolution errors.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(kiln::manifest))]
    Manifest(Box<kiln_manifest::Error>),

    #[error("unknown resource '{name}'")]
    #[diagnostic(code(kiln::unknown_resource))]
    UnknownResource { name: String },

    #[error("resource '{resource}' has no binding '{binding}'")]
    #[diagnostic(code(kiln::unknown_binding))]
    UnknownBinding { resource: String, binding: String },

    #[error("reference '{expression}' names unknown resource '{name}'")]
    #[diagnostic(
        code(kiln::unresolved_reference),
        help("declare a resource named '{name}' in the manifest, or fix the reference")
    )]
    UnresolvedReference { expression: String, name: String },

    #[error("'{property}' of platform type '{platform_type}' has no rewrite rule")]
    #[diagnostic(code(kiln::unsupported_binding))]
    UnsupportedBinding {
        platform_type: String,
        property: String,
    },

    #[error("malformed expression in '{value}' at byte {position}: {reason}")]
    #[diagnostic(
        code(kiln::malformed_expression),
        help("references look like {{resource.property}}; write '{{{{' or '}}}}' for a literal brace")
    )]
    MalformedExpression {
        value: String,
        position: usize,
        reason: &'static str,
    },

    #[error("reference cycle: {chain}")]
    #[diagnostic(code(kiln::reference_cycle))]
    ReferenceCycle { chain: String },

    #[error("parent '{parent}' of '{child}' is a '{found}', expected a '{expected}'")]
    #[diagnostic(code(kiln::parent_mismatch))]
    ParentMismatch {
        child: String,
        parent: String,
        expected: String,
        found: String,
    },

    #[error("'{first}' and '{second}' both map to {target} '{key}'")]
    #[diagnostic(
        code(kiln::name_collision),
        help("rename one of them so the names differ by more than case or punctuation")
    )]
    NameCollision {
        first: String,
        second: String,
        target: &'static str,
        key: String,
    },

    #[error("resource '{resource}' cannot be lowered: {message}")]
    #[diagnostic(code(kiln::invalid_resource))]
    InvalidResource { resource: String, message: String },

    #[error("failed to resolve '{variable}'")]
    #[diagnostic(code(kiln::env))]
    Env {
        variable: String,
        #[source]
        source: Box<Error>,
    },

    #[error("validation failed with {count} error(s)")]
    #[diagnostic(code(kiln::validation))]
    Validation { count: usize },

    #[error("'{phase}' phase has not run")]
    #[diagnostic(code(kiln::phase_order))]
    PhaseOrder { phase: &'static str },
}

impl Error {
    /// The innermost error, skipping `Env` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Env { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<Box<kiln_manifest::Error>> for Error {
    fn from(err: Box<kiln_manifest::Error>) -> Self {
        Error::Manifest(err)
    }
}

impl From<UnknownResource> for Error {
    fn from(err: UnknownResource) -> Self {
        Error::UnknownResource { name: err.name }
    }
}

impl From<UnknownBinding> for Error {
    fn from(err: UnknownBinding) -> Self {
        Error::UnknownBinding {
            resource: err.resource,
            binding: err.binding,
        }
    }
}

impl From<ExposureError> for Error {
    fn from(err: ExposureError) -> Self {
        match err {
            ExposureError::Resource(e) => e.into(),
            ExposureError::Binding(e) => e.into(),
        }
    }
}

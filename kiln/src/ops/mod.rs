//! Core operations.
//!
//! This module contains the business logic for kiln commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod explain;
pub mod generate;

pub use check::check;
pub use explain::explain;
pub use generate::{GenerateOptions, generate};

/// Render a compile error with every cause, on one line.
pub(crate) fn describe(err: &kiln_codegen::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use kiln_codegen::Error;

    use super::*;

    #[test]
    fn test_describe_includes_root_cause() {
        let err = Error::Env {
            variable: "DB".into(),
            source: Box::new(Error::UnresolvedReference {
                expression: "{missing.connectionString}".into(),
                name: "missing".into(),
            }),
        };

        assert_eq!(
            describe(&err),
            "failed to resolve 'DB': reference '{missing.connectionString}' names unknown resource 'missing'"
        );
    }
}

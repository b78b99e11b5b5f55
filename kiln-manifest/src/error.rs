use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "manifest.json");
/// ctx.missing_type_error("api", None);
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a serde_json error.
    pub fn parse_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = offset_at(&self.src, source.line(), source.column())
            .map(|offset| SourceSpan::from((offset, 0)));
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, optionally pointing at a span.
    pub fn validation_error(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    /// Create a missing type tag error.
    pub fn missing_type_error(
        &self,
        resource: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::MissingType {
            src: self.named_source(),
            span,
            resource: resource.into(),
        })
    }

    /// Create a missing required field error.
    pub fn missing_field_error(
        &self,
        resource: impl Into<String>,
        ty: impl Into<String>,
        field: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::MissingField {
            src: self.named_source(),
            span,
            resource: resource.into(),
            ty: ty.into(),
            field: field.into(),
        })
    }

    /// Create an undefined binding protocol error.
    pub fn undefined_protocol_error(
        &self,
        resource: impl Into<String>,
        binding: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UndefinedProtocol {
            src: self.named_source(),
            span,
            resource: resource.into(),
            binding: binding.into(),
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        })
    }
}

/// Convert a 1-based line/column pair into a byte offset.
fn offset_at(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = line_start + column.saturating_sub(1);
    (offset <= src.len()).then_some(offset)
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("run the app host's manifest publisher to produce the manifest first"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest is not valid UTF-8")]
    #[diagnostic(code(kiln::encoding))]
    Encoding {
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to parse manifest")]
    #[diagnostic(code(kiln::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("resource '{resource}' has no type")]
    #[diagnostic(
        code(kiln::missing_type),
        help("every resource needs a \"type\" tag such as \"project.v0\" or \"redis.v0\"")
    )]
    MissingType {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: Option<SourceSpan>,
        resource: String,
    },

    #[error("resource '{resource}' of type '{ty}' is missing '{field}'")]
    #[diagnostic(code(kiln::missing_field))]
    MissingField {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: Option<SourceSpan>,
        resource: String,
        ty: String,
        field: String,
    },

    #[error("binding '{binding}' of resource '{resource}' uses undefined {field} '{value}'")]
    #[diagnostic(code(kiln::undefined_protocol), help("valid values are: {expected}"))]
    UndefinedProtocol {
        #[source_code]
        src: NamedSource<String>,
        #[label("undefined {field}")]
        span: Option<SourceSpan>,
        resource: String,
        binding: String,
        field: String,
        value: String,
        expected: String,
    },

    #[error("{message}")]
    #[diagnostic(code(kiln::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_at() {
        let src = "{\n  \"a\": 1,\n  \"b\"\n}";
        assert_eq!(offset_at(src, 1, 1), Some(0));
        assert_eq!(offset_at(src, 2, 3), Some(4));
        assert_eq!(offset_at(src, 3, 1), Some(12));
        assert_eq!(offset_at(src, 0, 0), None);
    }

    #[test]
    fn test_parse_error_has_span() {
        let ctx = SourceContext::new("{ \"resources\": ", "manifest.json");
        let source = serde_json::from_str::<serde_json::Value>(ctx.src()).unwrap_err();

        match *ctx.parse_error(source) {
            Error::Parse { span, .. } => assert!(span.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

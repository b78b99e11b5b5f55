//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use kiln_core::{Protocol, Scheme, Transport};
use miette::SourceSpan;

use crate::{BindingEntry, ResourceEntry, Result, error::SourceContext};

/// Fields a resource must carry, by type tag.
const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("project.v0", &["path"]),
    ("dockerfile.v0", &["path", "context"]),
    ("container.v0", &["image"]),
    ("postgres.database.v0", &["parent"]),
    ("azure.storage.blob.v0", &["parent"]),
    ("azure.storage.queue.v0", &["parent"]),
    ("azure.storage.table.v0", &["parent"]),
];

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current path
/// through the manifest, making it easier to point diagnostics at the right
/// place when validating nested structures.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "manifest.json");
/// let api = ctx.push("resources").push("api");
/// api.validate_resource("api", entry)?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Path segments (e.g., ["resources", "api", "bindings", "http"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Find the span of the innermost key of the current path.
    ///
    /// Each segment is searched after the previous one, so `resources.api.bindings.http`
    /// lands on the `http` binding of `api` rather than any other `http` key.
    pub fn find_span(&self) -> Option<SourceSpan> {
        let mut from = 0;
        let mut span = None;
        for segment in &self.path {
            let found = find_key_span(self.src(), from, segment)?;
            from = found.offset() + found.len();
            span = Some(found);
        }
        span
    }

    /// Validate that a resource name can be used inside reference expressions.
    pub fn validate_name(&self, name: &str) -> Result<()> {
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.chars().any(char::is_whitespace) {
            Some("name contains whitespace")
        } else if name.contains(['.', '{', '}']) {
            Some("name contains '.', '{' or '}', which are reserved by reference expressions")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(self.source.validation_error(
                format!("invalid resource name '{}': {}", name, reason),
                self.push(name).find_span(),
            )),
            None => Ok(()),
        }
    }

    /// Validate a resource entry. `self` must point at the resource.
    pub fn validate_resource(&self, name: &str, entry: &ResourceEntry) -> Result<()> {
        let Some(ty) = entry.ty() else {
            return Err(self.source.missing_type_error(name, self.find_span()));
        };

        let required = REQUIRED_FIELDS
            .iter()
            .find(|(tag, _)| *tag == ty)
            .map(|(_, fields)| *fields)
            .unwrap_or_default();
        for field in required {
            if !has_field(entry, field) {
                return Err(self
                    .source
                    .missing_field_error(name, ty, *field, self.find_span()));
            }
        }

        let bindings = self.push("bindings");
        for (binding_name, binding) in &entry.bindings {
            bindings
                .push(binding_name)
                .validate_binding(name, ty, binding_name, binding)?;
        }

        Ok(())
    }

    /// Validate a binding entry. `self` must point at the binding.
    fn validate_binding(
        &self,
        resource: &str,
        ty: &str,
        name: &str,
        binding: &BindingEntry,
    ) -> Result<()> {
        let Some(scheme) = binding.scheme.as_deref() else {
            return Err(self.source.missing_field_error(
                resource,
                ty,
                format!("bindings.{}.scheme", name),
                self.find_span(),
            ));
        };

        let checks = [
            (
                "scheme",
                Some(scheme),
                Scheme::parse(scheme).is_some(),
                expected(Scheme::ALL.iter().map(Scheme::as_str)),
            ),
            (
                "protocol",
                binding.protocol.as_deref(),
                binding
                    .protocol
                    .as_deref()
                    .is_none_or(|p| Protocol::parse(p).is_some()),
                expected(Protocol::ALL.iter().map(Protocol::as_str)),
            ),
            (
                "transport",
                binding.transport.as_deref(),
                binding
                    .transport
                    .as_deref()
                    .is_none_or(|t| Transport::parse(t).is_some()),
                expected(Transport::ALL.iter().map(Transport::as_str)),
            ),
        ];

        for (field, value, valid, expected) in checks {
            if let Some(value) = value
                && !valid
            {
                let span = self
                    .find_span()
                    .and_then(|at| find_string_span(self.src(), at.offset(), value));
                return Err(self.source.undefined_protocol_error(
                    resource, name, field, value, expected, span,
                ));
            }
        }

        Ok(())
    }
}

fn expected<'s>(values: impl Iterator<Item = &'s str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

fn has_field(entry: &ResourceEntry, field: &str) -> bool {
    let value = match field {
        "path" => entry.path.as_deref(),
        "context" => entry.context.as_deref(),
        "image" => entry.image.as_deref(),
        "parent" => entry.parent.as_deref(),
        _ => return true,
    };
    value.is_some_and(|v| !v.is_empty())
}

/// Find the span of an object key (`"key":`) at or after `from`.
pub(crate) fn find_key_span(src: &str, from: usize, key: &str) -> Option<SourceSpan> {
    let needle = format!("\"{}\"", key);
    let mut cursor = from;
    while let Some(pos) = src.get(cursor..)?.find(&needle) {
        let start = cursor + pos;
        let end = start + needle.len();
        if src[end..].trim_start().starts_with(':') {
            return Some(SourceSpan::from((start + 1, key.len())));
        }
        cursor = end;
    }
    None
}

/// Find the span of a string value (`"value"`) at or after `from`.
pub(crate) fn find_string_span(src: &str, from: usize, value: &str) -> Option<SourceSpan> {
    let needle = format!("\"{}\"", value);
    let pos = src.get(from..)?.find(&needle)?;
    Some(SourceSpan::from((from + pos + 1, value.len())))
}

//! Manifest parsing from files, strings and raw bytes.

use std::{path::Path, str::FromStr};

use super::{Manifest, validate::ParseContext};
use crate::{Error, Result};

/// Filename used in diagnostics when the manifest didn't come from a file.
const DEFAULT_FILENAME: &str = "manifest.json";

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, DEFAULT_FILENAME)
    }
}

impl Manifest {
    /// Parse a manifest from raw bytes, as produced by the app host publisher.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let content =
            std::str::from_utf8(bytes).map_err(|source| Box::new(Error::Encoding { source }))?;
        parse_manifest(content, DEFAULT_FILENAME)
    }

    /// Parse a manifest file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a manifest from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let ctx = ParseContext::new(content, filename);
    let manifest: Manifest =
        serde_json::from_str(content).map_err(|e| ctx.source_context().parse_error(e))?;
    validate_manifest(&manifest, &ctx)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, ctx: &ParseContext<'_>) -> Result<()> {
    let resources = ctx.push("resources");

    for (name, entry) in &manifest.resources {
        resources.validate_name(name)?;

        let res_ctx = resources.push(name);
        res_ctx.validate_resource(name, entry)?;
    }
    Ok(())
}

//! Shared naming helpers for generated artifacts.

/// Bicep keywords that can't be used as symbolic names
const BICEP_KEYWORDS: &[&str] = &[
    "metadata",
    "targetScope",
    "resource",
    "module",
    "param",
    "var",
    "output",
    "import",
    "existing",
    "if",
    "for",
    "in",
    "true",
    "false",
    "null",
    "type",
    "func",
];

/// Convert a resource name to the upper snake form used in environment keys
/// (e.g., "my-cache" -> "MY_CACHE")
pub fn alpha_snake_upper(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Convert a resource name to a Bicep symbolic name (e.g., "my-cache" -> "myCache")
pub fn to_bicep_identifier(s: &str) -> String {
    let mut out = String::new();
    for (i, part) in s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|p| !p.is_empty())
        .enumerate()
    {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.push(first.to_ascii_lowercase());
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.extend(chars);
        }
    }

    if out.is_empty() {
        return "resource".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'r');
    }
    if BICEP_KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Convert an environment variable name to a Container Apps secret name
/// (e.g., "ConnectionStrings__cache" -> "connectionstrings--cache")
pub fn to_secret_name(s: &str) -> String {
    let name: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    name.trim_matches('-').to_string()
}

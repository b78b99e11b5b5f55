//! Azure resource naming.

/// Lowercase alphanumeric prefix for names that allow nothing else
/// (storage accounts, registries).
pub fn compact_prefix(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Lowercase prefix for names that allow hyphens.
pub fn hyphen_prefix(name: &str) -> String {
    let prefix: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    prefix.trim_matches('-').to_string()
}

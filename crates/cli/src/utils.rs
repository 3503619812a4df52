//! Shared helpers for CLI commands.

/// Sanitize a migration name into a lower_snake identifier fragment.
///
/// Runs of non-alphanumeric characters collapse into single underscores;
/// leading and trailing separators are dropped.
pub fn sanitize_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut separate_next = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if separate_next && !result.is_empty() {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            separate_next = false;
        } else {
            separate_next = true;
        }
    }

    result
}

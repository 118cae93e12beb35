use serde::{Deserialize, Deserializer};

/// Normalizes a user-supplied name by stripping surrounding whitespace
/// and decomposing it into Unicode Normalization Form D. Course and
/// record names are normalized before any uniqueness check.
///
/// ```
/// use backend::normalization::normalize_name;
/// assert_eq!(normalize_name(" Rust 101 "), "Rust 101");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfd().to_string()
}

/// Whether a name is empty once normalized. Whitespace-only input
/// counts as missing for required-field checks.
pub fn is_blank(name: impl AsRef<str>) -> bool {
    name.as_ref().trim().is_empty()
}

/// Deserializes a `String` after running it through `normalize_name`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(normalize_name(s))
}

/// Deserializes an optional `String` after running it through `normalize_name`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_name))
}

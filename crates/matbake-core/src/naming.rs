//! Automatic baked-name suffixes (`T_Rock_BC`, `T_Rock_N`, ...).

use crate::property::PropertyType;

/// Removes one known property suffix from the end of `name`, if present.
pub fn strip_suffix(name: &str) -> &str {
    PropertyType::ALL
        .iter()
        .filter_map(|p| p.suffix())
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Rewrites `name` for `property`.
///
/// Any existing suffix is stripped first, so switching properties never
/// stacks suffixes. Properties without a suffix yield the bare base name, as
/// does `enabled == false`.
pub fn apply_suffix(name: &str, property: PropertyType, enabled: bool) -> String {
    let base = strip_suffix(name);
    match property.suffix() {
        Some(suffix) if enabled => format!("{base}{suffix}"),
        _ => base.to_string(),
    }
}

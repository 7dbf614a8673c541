//! Naming conventions shared by the resolver and the reconciler
//!
//! Every store entity is identified by a name derived from these helpers,
//! so they must stay stable across releases.

use tokensync_meta::Theme;

/// Upper-case the first character: `acme` -> `Acme`.
pub fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Key identifying a brand/theme mode independent of its display name.
pub fn mode_key(brand: &str, theme: Theme) -> String {
    format!("{brand}-{theme}")
}

/// Display name of a brand/theme mode: `Acme Light`.
pub fn mode_name(brand: &str, theme: Theme) -> String {
    format!("{} {}", display_name(brand), display_name(theme.as_str()))
}

/// Variable name of one size variant of a sized token.
pub fn sized_path(target_path: &str, size: &str) -> String {
    format!("{target_path}-{size}")
}

/// Variable name of the default-size pointer of a sized token.
pub fn default_path(target_path: &str) -> String {
    sized_path(target_path, "default")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes() {
        assert_eq!(display_name("acme"), "Acme");
        assert_eq!(display_name("Acme"), "Acme");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn mode_naming() {
        assert_eq!(mode_key("acme", Theme::Dark), "acme-dark");
        assert_eq!(mode_name("acme", Theme::Dark), "Acme Dark");
    }

    #[test]
    fn path_suffixes() {
        assert_eq!(sized_path("button/height", "md"), "button/height-md");
        assert_eq!(default_path("button/height"), "button/height-default");
    }
}

/// Static mapping from human-readable language name to the code the
/// translation service expects. Read-only for the process lifetime.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("French", "fr"),
    ("Spanish", "es"),
    ("German", "de"),
    ("Chinese (Simplified)", "zh-cn"),
    ("Hindi", "hi"),
    ("Arabic", "ar"),
    ("Russian", "ru"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("English", "en"),
    ("Telugu", "te"),
];

/// Look up the service code for a display name.
pub fn code_for(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// All supported display names, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    LANGUAGES.iter().map(|(display, _)| *display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(code_for("French"), Some("fr"));
        assert_eq!(code_for("Telugu"), Some("te"));
        assert_eq!(code_for("Chinese (Simplified)"), Some("zh-cn"));
        assert_eq!(code_for("English"), Some("en"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(code_for("french"), Some("fr"));
        assert_eq!(code_for("SPANISH"), Some("es"));
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(code_for("Klingon"), None);
        assert_eq!(code_for(""), None);
    }

    #[test]
    fn test_names_match_table() {
        assert_eq!(names().count(), LANGUAGES.len());
        assert_eq!(names().next(), Some("French"));
    }
}

/// Trimmed paragraphs must be longer than this many characters to count as a
/// requirement. A paragraph of exactly this length is dropped.
pub const MIN_REQUIREMENT_LEN: usize = 10;

/// Filter document paragraphs down to candidate requirement statements.
///
/// Each paragraph is trimmed and kept when its character count exceeds
/// [`MIN_REQUIREMENT_LEN`]. Order is preserved and duplicates are kept.
pub fn extract_requirements<S: AsRef<str>>(paragraphs: &[S]) -> Vec<String> {
    paragraphs
        .iter()
        .map(|paragraph| paragraph.as_ref().trim())
        .filter(|text| text.chars().count() > MIN_REQUIREMENT_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_filter() {
        let paragraphs = [
            "Short",
            "This is a sufficiently long requirement statement.",
            "   ",
            "1234567890",
        ];
        assert_eq!(
            extract_requirements(&paragraphs),
            vec!["This is a sufficiently long requirement statement.".to_string()]
        );
    }

    #[test]
    fn test_boundary_is_strict() {
        assert!(extract_requirements(&["  1234567890  "]).is_empty());
        assert_eq!(extract_requirements(&["12345678901"]), vec!["12345678901"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        assert!(extract_requirements(&["§§§§§§§§§§"]).is_empty());
        assert_eq!(extract_requirements(&["§§§§§§§§§§§"]).len(), 1);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let paragraphs = vec![
            "\tThe system shall record every login.\n".to_string(),
            "Passwords shall be hashed with a salt.".to_string(),
            "The system shall record every login.".to_string(),
        ];
        assert_eq!(
            extract_requirements(&paragraphs),
            vec![
                "The system shall record every login.",
                "Passwords shall be hashed with a salt.",
                "The system shall record every login.",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let paragraphs: Vec<String> = Vec::new();
        assert!(extract_requirements(&paragraphs).is_empty());
    }
}

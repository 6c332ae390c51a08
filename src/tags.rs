//! Tag normalization: maps free-text tag spellings to canonical display names.
//!
//! The table is static; the backend owns which combinations exist. All the
//! bot does is make sure users cannot fail a lookup over a hyphen.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical tag display names, as the backend knows them.
static CANONICAL_TAGS: &[&str] = &[
    "Action",
    "Adventure",
    "Anti-Hero Lead",
    "Comedy",
    "Contemporary",
    "Cultivation",
    "Cyberpunk",
    "Drama",
    "Dungeon",
    "Dystopia",
    "Fantasy",
    "Female Lead",
    "GameLit",
    "Grimdark",
    "High Fantasy",
    "Historical",
    "Horror",
    "Isekai",
    "LitRPG",
    "Low Fantasy",
    "Magic",
    "Male Lead",
    "Martial Arts",
    "Multiple Lead Characters",
    "Mystery",
    "Mythos",
    "Non-Human Lead",
    "Portal Fantasy",
    "Post Apocalyptic",
    "Progression",
    "Psychological",
    "Reincarnation",
    "Romance",
    "Satire",
    "School Life",
    "Sci-fi",
    "Secret Identity",
    "Slice of Life",
    "Space Opera",
    "Steampunk",
    "Strategy",
    "Super Heroes",
    "Supernatural",
    "Time Loop",
    "Time Travel",
    "Tragedy",
    "Urban Fantasy",
    "Villainous Lead",
    "Virtual Reality",
    "War and Military",
    "Wuxia",
    "Xianxia",
];

/// Extra spellings people actually type, mapped to canonical names.
static ALIASES: &[(&str, &str)] = &[
    ("science fiction", "Sci-fi"),
    ("scifi", "Sci-fi"),
    ("sf", "Sci-fi"),
    ("post apoc", "Post Apocalyptic"),
    ("postapocalyptic", "Post Apocalyptic"),
    ("lit rpg", "LitRPG"),
    ("vr", "Virtual Reality"),
    ("vrmmo", "Virtual Reality"),
    ("superhero", "Super Heroes"),
    ("superheroes", "Super Heroes"),
    ("antihero", "Anti-Hero Lead"),
    ("fl", "Female Lead"),
    ("ml", "Male Lead"),
    ("nonhuman", "Non-Human Lead"),
    ("military", "War and Military"),
    ("timeloop", "Time Loop"),
    ("sol", "Slice of Life"),
    ("progression fantasy", "Progression"),
    ("villain", "Villainous Lead"),
];

/// Lowercase with spaces, underscores and hyphens stripped.
fn fold(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

static FOLDED_LOOKUP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tag in CANONICAL_TAGS {
        map.insert(fold(tag), *tag);
    }
    for (alias, tag) in ALIASES {
        map.insert(fold(alias), *tag);
    }
    map
});

/// Normalize a free-text tag spelling to its canonical display name.
///
/// Matching order: exact, then case-insensitive, then with spaces,
/// underscores and hyphens stripped. `None` means the caller should treat
/// the input as a user error.
pub fn normalize(input: &str) -> Option<&'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(tag) = CANONICAL_TAGS.iter().find(|t| **t == trimmed) {
        return Some(tag);
    }
    if let Some(tag) = CANONICAL_TAGS.iter().find(|t| t.eq_ignore_ascii_case(trimmed)) {
        return Some(tag);
    }
    FOLDED_LOOKUP.get(&fold(trimmed)).copied()
}

/// All canonical tags, for help text.
pub fn all_tags() -> &'static [&'static str] {
    CANONICAL_TAGS
}

/// Tag suggestions for the Discord autocomplete callback.
///
/// Case-insensitive substring match against canonical names, capped at 25
/// entries (the platform's choice limit).
pub fn suggestions(partial: &str) -> Vec<&'static str> {
    let folded = fold(partial);
    CANONICAL_TAGS
        .iter()
        .filter(|tag| folded.is_empty() || fold(tag).contains(&folded))
        .take(25)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(normalize("Sci-fi"), Some("Sci-fi"));
        assert_eq!(normalize("Slice of Life"), Some("Slice of Life"));
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(normalize("sci-fi"), Some("Sci-fi"));
        assert_eq!(normalize("LITRPG"), Some("LitRPG"));
    }

    #[test]
    fn test_separator_stripped_match() {
        assert_eq!(normalize("slice_of_life"), Some("Slice of Life"));
        assert_eq!(normalize("sci fi"), Some("Sci-fi"));
        assert_eq!(normalize("anti hero lead"), Some("Anti-Hero Lead"));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(normalize("science fiction"), Some("Sci-fi"));
        assert_eq!(normalize("superhero"), Some("Super Heroes"));
        assert_eq!(normalize("vrmmo"), Some("Virtual Reality"));
    }

    #[test]
    fn test_unknown_tag_is_none() {
        assert_eq!(normalize("definitely not a tag"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn test_normalize_total_over_table_keys() {
        for tag in all_tags() {
            assert!(normalize(tag).is_some(), "table key '{}' failed", tag);
        }
    }

    #[test]
    fn test_normalize_idempotent() {
        for tag in all_tags() {
            let once = normalize(tag).unwrap();
            let twice = normalize(once).unwrap();
            assert_eq!(once, twice);
        }
        // Aliases land on a fixed point too
        let once = normalize("scifi").unwrap();
        assert_eq!(normalize(once), Some(once));
    }

    #[test]
    fn test_suggestions_capped_and_matching() {
        let all = suggestions("");
        assert!(all.len() <= 25);

        let fantasy = suggestions("fanta");
        assert!(fantasy.contains(&"Fantasy"));
        assert!(fantasy.contains(&"Urban Fantasy"));
        assert!(!fantasy.contains(&"Action"));
    }
}

use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Noise tokens that release groups and download sites tack onto filenames.
regex!(SITE_TAG_REGEX, r"\(z-lib\.org\)");
regex!(BRACKETED_REGEX, r"\[.*?\]");
regex!(EDITION_REGEX, r"\(.*?Edition\)");

/// An (author, title) pair recovered from a filename stem.
///
/// Both fields are best-effort: an empty `author` means the stem carried no
/// recognizable author segment, never that parsing failed. `title` is only
/// empty when the stem itself was empty after noise removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub author: String,
    pub title: String,
}

/// Extracts an author and title from a filename stem (no extension).
///
/// Strips bracketed annotations, the `(z-lib.org)` site tag and
/// `(… Edition)` qualifiers, then tries the common naming patterns in order:
///
/// 1. `"Author - Title"` — split on the first `" - "`.
/// 2. `"Lastname, Firstname"` — the comma-led form; if a `" - "` follows the
///    first name, everything after it is the title and the full
///    `"Lastname, Firstname"` is the author. Otherwise the post-comma text
///    is taken as the title.
/// 3. Anything else is a bare title with no author.
///
/// Never fails; every input yields *some* pair.
pub fn parse_stem(stem: &str) -> ParsedName {
    let cleaned = SITE_TAG_REGEX.replace_all(stem, "");
    let cleaned = BRACKETED_REGEX.replace_all(&cleaned, "");
    let cleaned = EDITION_REGEX.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    if let Some((author, title)) = cleaned.split_once(" - ") {
        return ParsedName {
            author: author.trim().to_string(),
            title: title.trim().to_string(),
        };
    }

    if let Some((surname, remaining)) = cleaned.split_once(',') {
        let surname = surname.trim();
        let remaining = remaining.trim();
        // "Nachname, Vorname - Titel": the separator sits after the first name.
        return match remaining.split_once(" - ") {
            Some((forename, title)) => ParsedName {
                author: format!("{}, {}", surname, forename.trim()),
                title: title.trim().to_string(),
            },
            None => ParsedName {
                author: surname.to_string(),
                title: remaining.to_string(),
            },
        };
    }

    ParsedName { author: String::new(), title: cleaned.to_string() }
}

/// Descriptive metadata read from an EPUB's OPF package document.
///
/// Every field is best-effort: an EPUB that omits a Dublin Core element
/// simply leaves the matching field empty. Empty string (or empty vec) is
/// the "unknown" value throughout, never an `Option` — consumers merge
/// these records field-by-field with external sources and blank-means-blank
/// keeps that merge trivial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookMetadata {
    /// Dublin Core title.
    pub title: String,
    /// Creators carrying the `aut` (author) role.
    pub authors: Vec<String>,
    pub publisher: String,
    /// Publication date as written in the package document (no fixed format
    /// in the wild, so it is kept verbatim).
    pub published: String,
    /// BCP 47-ish language tag, verbatim.
    pub language: String,
    /// Ten-character ISBN (digits plus a possible trailing `X`).
    pub isbn_10: String,
    /// Thirteen-digit ISBN.
    pub isbn_13: String,
    pub description: String,
    /// Subject/category tags.
    pub subjects: Vec<String>,
}

impl BookMetadata {
    /// The identifier to prefer for an external lookup: ISBN-13 when
    /// present, else ISBN-10, else nothing.
    pub fn isbn(&self) -> Option<&str> {
        if !self.isbn_13.is_empty() {
            Some(&self.isbn_13)
        } else if !self.isbn_10.is_empty() {
            Some(&self.isbn_10)
        } else {
            None
        }
    }

    /// First listed author, if any.
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

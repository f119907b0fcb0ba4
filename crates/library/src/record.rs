use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// The accepted ebook container formats.
///
/// Anything outside this set is excluded during scanning. The variant order
/// mirrors the preference ranking used for duplicate resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookFormat {
    Epub,
    Pdf,
    Mobi,
    Azw3,
}

impl BookFormat {
    /// Fixed preference rank for canonical-copy selection; higher is better.
    ///
    /// EPUB is the first-class documented format, PDF the generic
    /// fixed-layout one, MOBI and AZW3 the proprietary reader formats.
    pub fn priority(&self) -> u8 {
        match self {
            BookFormat::Epub => 4,
            BookFormat::Pdf => 3,
            BookFormat::Mobi => 2,
            BookFormat::Azw3 => 1,
        }
    }

    /// The lower-cased file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            BookFormat::Epub => "epub",
            BookFormat::Pdf => "pdf",
            BookFormat::Mobi => "mobi",
            BookFormat::Azw3 => "azw3",
        }
    }

    /// Parses an extension (with or without the leading dot),
    /// case-insensitively. `None` means "not an ebook".
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "epub" => Some(Self::Epub),
            "pdf" => Some(Self::Pdf),
            "mobi" => Some(Self::Mobi),
            "azw3" => Some(Self::Azw3),
            _ => None,
        }
    }

    /// Detects the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|ext| ext.to_str()).and_then(Self::from_extension)
    }
}

impl Display for BookFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.extension())
    }
}

/// One file in the collection.
///
/// Created once per matching file during a scan pass and immutable
/// thereafter; the grouping, selection and planning stages only read records
/// and produce derived structures. `author` and `title` use the empty string
/// as their "unknown" value, never an `Option`; `genre` is always non-empty
/// (the classifier falls back to its sentinel label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbookRecord {
    /// Absolute location of the file.
    pub source_path: PathBuf,
    /// Path relative to the scan root, used for reporting and for
    /// constructing quarantine targets.
    pub relative_path: PathBuf,
    pub format: BookFormat,
    pub size_bytes: u64,
    pub modified: OffsetDateTime,
    pub author: String,
    pub title: String,
    pub genre: String,
}

impl EbookRecord {
    /// The bare filename, for display and duplicate-reason strings.
    pub fn file_name(&self) -> String {
        self.source_path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

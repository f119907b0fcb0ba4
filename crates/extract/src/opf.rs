//! OPF package document parsing.
//!
//! An EPUB is a ZIP container whose descriptive metadata lives in an OPF
//! package document, located via `META-INF/container.xml`. Plenty of real
//! files ship a broken or missing container manifest, so lookup falls back
//! to the first `.opf` entry anywhere in the archive.

use crate::error::{ErrorKind, Result};
use crate::models::BookMetadata;
use exn::{OptionExt, ResultExt};
use roxmltree::{Document, Node};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const OPF_NS: &str = "http://www.idpf.org/2007/opf";
const CONTAINER_MANIFEST: &str = "META-INF/container.xml";

/// Extracts [`BookMetadata`] from the EPUB at `path`.
///
/// # Errors
/// Returns [`ErrorKind::Container`] when the file cannot be opened as a ZIP
/// archive, [`ErrorKind::MissingPackage`] when no OPF entry can be located,
/// and [`ErrorKind::MalformedPackage`] when the package document does not
/// parse as XML.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn extract(path: impl AsRef<Path>) -> Result<BookMetadata> {
    let path = path.as_ref();
    let file = File::open(path).or_raise(|| ErrorKind::Container(path.to_path_buf()))?;
    let mut archive = zip::ZipArchive::new(file).or_raise(|| ErrorKind::Container(path.to_path_buf()))?;

    let package_path = find_package_path(&mut archive)?;
    debug!(package = %package_path, "located OPF package document");
    let mut package_xml = String::new();
    archive
        .by_name(&package_path)
        .or_raise(|| ErrorKind::MissingPackage)?
        .read_to_string(&mut package_xml)
        .or_raise(|| ErrorKind::MalformedPackage)?;
    parse_package(&package_xml)
}

/// Best-effort variant of [`extract`]: any failure is logged and collapses
/// to an empty [`BookMetadata`]. Never raises to the caller.
pub fn extract_or_default(path: impl AsRef<Path>) -> BookMetadata {
    match extract(path.as_ref()) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %path.as_ref().display(), error = %e, "metadata extraction failed");
            BookMetadata::default()
        },
    }
}

/// Locates the OPF package document inside the archive.
///
/// Tries the `META-INF/container.xml` rootfile declaration first, then falls
/// back to the first entry with an `.opf` suffix.
fn find_package_path<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Result<String> {
    if let Ok(mut manifest) = archive.by_name(CONTAINER_MANIFEST) {
        let mut xml = String::new();
        if manifest.read_to_string(&mut xml).is_ok()
            && let Ok(doc) = Document::parse(&xml)
            && let Some(rootfile) = doc
                .descendants()
                .find(|node| node.is_element() && node.tag_name().name() == "rootfile")
                .and_then(|node| node.attribute("full-path"))
        {
            return Ok(rootfile.to_string());
        }
    }
    archive
        .file_names()
        .find(|name| name.ends_with(".opf"))
        .map(str::to_string)
        .ok_or_raise(|| ErrorKind::MissingPackage)
}

/// Parses the Dublin Core metadata block of an OPF package document.
pub(crate) fn parse_package(xml: &str) -> Result<BookMetadata> {
    let doc = Document::parse(xml).or_raise(|| ErrorKind::MalformedPackage)?;
    let mut metadata = BookMetadata::default();
    for node in doc.descendants().filter(Node::is_element) {
        if node.tag_name().namespace() != Some(DC_NS) {
            continue;
        }
        let text = node.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        match node.tag_name().name() {
            "title" if metadata.title.is_empty() => metadata.title = text.to_string(),
            "creator" => {
                // OPF 2 marks roles with an opf:role attribute; absence means author.
                let role = node.attribute((OPF_NS, "role")).unwrap_or("aut");
                if matches!(role, "aut" | "author") {
                    metadata.authors.push(text.to_string());
                }
            },
            "publisher" if metadata.publisher.is_empty() => metadata.publisher = text.to_string(),
            "date" if metadata.published.is_empty() => metadata.published = text.to_string(),
            "language" if metadata.language.is_empty() => metadata.language = text.to_string(),
            "description" if metadata.description.is_empty() => metadata.description = text.to_string(),
            "identifier" => record_identifier(&mut metadata, text),
            "subject" => metadata.subjects.push(text.to_string()),
            _ => {},
        }
    }
    Ok(metadata)
}

/// Sorts a `dc:identifier` value into the ISBN-10 or ISBN-13 slot.
///
/// Identifiers are messy in the wild: `urn:isbn:978-3-...`, bare digit runs,
/// ISBN-10s ending in `X`. Anything that compacts to the right length after
/// stripping separators counts.
fn record_identifier(metadata: &mut BookMetadata, value: &str) {
    let compact = value.replace('-', "");
    if value.to_lowercase().contains("isbn") || compact.len() == 13 {
        let digits: String = value.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 13 {
            metadata.isbn_13 = digits;
        }
    } else if compact.len() == 10 {
        let isbn: String =
            value.to_uppercase().chars().filter(|c| c.is_ascii_digit() || *c == 'X').collect();
        if isbn.len() == 10 {
            metadata.isbn_10 = isbn;
        }
    }
}

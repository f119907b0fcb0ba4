use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::record::{BookFormat, EbookRecord};
use crate::scan::error::{ErrorKind, Result as ScanResult};
use async_stream::stream;
use buchfink_classify::{GenreClassifier, parse_stem};
use exn::ResultExt;
use futures::{Stream, StreamExt, pin_mut};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};
use tracing::{debug, warn};

/// Reader-sidecar directories (Kindle `.sdr` companions) are not books.
const SIDECAR_SUFFIX: &str = ".sdr";

/// Progress events emitted by [`scan`] as it walks the collection.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) — exactly once.
/// 2. [`Scanned`](Self::Scanned) — zero or more times, one per accepted file.
/// 3. [`Complete`](Self::Complete) — exactly once, with the total record
///    count, signalling the stream is finished.
///
/// Per-entry failures are interleaved as `Err` items without terminating the
/// stream; only the caller decides whether they are fatal.
pub enum ScanEvent {
    /// Scanning has begun; emitted exactly once before any other event.
    Started,
    /// An accepted ebook file has been turned into a record.
    Scanned(Box<EbookRecord>),
    /// The walk is finished; carries the number of records yielded.
    Complete(u64),
}

enum WalkEntry {
    Record(Box<EbookRecord>),
    Descend(PathBuf),
    Skip,
}

/// Streams [`ScanEvent`]s for every accepted ebook file under `root`.
///
/// Directories are walked with an explicit stack; hidden segments and
/// reader-sidecar directories are pruned before descending, so nothing
/// beneath them is ever visited.
pub fn scan<'a>(
    root: &'a Path,
    classifier: &'a GenreClassifier,
) -> impl Stream<Item = LibraryResult<ScanEvent>> + 'a {
    stream! {
        for await event in scan_inner(root, classifier) {
            yield event.or_raise(|| LibraryErrorKind::Scan);
        }
    }
}

fn scan_inner<'a>(
    root: &'a Path,
    classifier: &'a GenreClassifier,
) -> impl Stream<Item = ScanResult<ScanEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(ScanEvent::Started);

        let mut found = 0u64;
        let mut stack = vec![root.to_path_buf()];
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(path = %current.display(), error = %err, "directory unreadable");
                    yield Err(exn::Exn::from(ErrorKind::ReadDir(current)));
                    continue 'dirs;
                },
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(err) => {
                        yield Err(exn::Exn::from(ErrorKind::from(err)));
                        continue 'entries;
                    },
                };
                match process_entry(root, classifier, entry).await {
                    Ok(WalkEntry::Record(record)) => {
                        found += 1;
                        yield Ok(ScanEvent::Scanned(record));
                    },
                    Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        }

        yield Ok(ScanEvent::Complete(found));
    })
}

/// Classifies a single directory entry: a record to yield, a directory to
/// descend into, or something to silently skip.
async fn process_entry(
    root: &Path,
    classifier: &GenreClassifier,
    entry: DirEntry,
) -> ScanResult<WalkEntry> {
    let path = entry.path();
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if name.starts_with('.') || name.ends_with(SIDECAR_SUFFIX) {
        debug!(path = %path.display(), "skipping hidden or sidecar entry");
        return Ok(WalkEntry::Skip);
    }

    let metadata = entry.metadata().await.or_raise(|| ErrorKind::Stat(path.clone()))?;
    if metadata.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if !metadata.is_file() {
        // Note: silently drop what is most likely a broken symlink.
        return Ok(WalkEntry::Skip);
    }
    let Some(format) = BookFormat::from_path(&path) else {
        return Ok(WalkEntry::Skip);
    };

    let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let parsed = parse_stem(&stem);
    let genre = classifier.classify(&parsed.author, &parsed.title);
    let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

    Ok(WalkEntry::Record(Box::new(EbookRecord {
        source_path: path,
        relative_path,
        format,
        size_bytes: metadata.len(),
        modified,
        author: parsed.author,
        title: parsed.title,
        genre,
    })))
}

/// Drains [`scan`] into a plain record list, applying the skip-and-warn
/// failure policy: an entry that cannot be statted or listed is logged and
/// excluded, never fatal.
pub async fn scan_records(root: &Path, classifier: &GenreClassifier) -> Vec<EbookRecord> {
    let mut records = Vec::new();
    let events = scan(root, classifier);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        match event {
            Ok(ScanEvent::Scanned(record)) => records.push(*record),
            Ok(ScanEvent::Started) | Ok(ScanEvent::Complete(_)) => {},
            Err(e) => warn!(error = %e, "skipping unreadable entry"),
        }
    }
    records
}

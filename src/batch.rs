//! Batch inspection of EPUB files
//!
//! Walks a file or a directory tree, opens every `.epub` it finds and
//! collects the metadata of each one. By default a file that cannot be read
//! as an EPUB is recorded as a per-item failure and the walk continues; in
//! strict mode the first failure aborts the whole batch.
//!
//! ```rust, ignore
//! # use epub_meta::batch::{BatchOptions, inspect_path};
//! let report = inspect_path("library/", &BatchOptions::default())?;
//! for item in report.failed() {
//!     eprintln!("skipped {}: {}", item.path.display(), item.outcome.as_ref().unwrap_err());
//! }
//! # Ok::<(), epub_meta::error::EpubError>(())
//! ```

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::{info, warn};
use walkdir::WalkDir;

use crate::{epub::EpubDoc, error::EpubError, types::EpubMetadata};

/// Options controlling a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Abort on the first item that fails to open
    pub strict: bool,

    /// Follow symbolic links while walking directories
    pub follow_links: bool,
}

/// The outcome of inspecting one file
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub outcome: Result<EpubMetadata, EpubError>,
}

/// Per-item results of a batch run, in walk order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Items that were opened and yielded a metadata record
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| item.outcome.is_ok())
    }

    /// Items that could not be read as an EPUB
    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| item.outcome.is_err())
    }
}

/// Inspects a single EPUB file or every EPUB below a directory
///
/// Directory entries are matched on a case-insensitive `.epub` suffix and
/// visited in file name order. A single file given directly is inspected
/// whatever its name.
///
/// # Return
/// - `Ok(BatchReport)`: One item per inspected file
/// - `Err(EpubError::NotFound)`: `path` does not exist
/// - `Err(EpubError)`: The walk itself failed, or `options.strict` is set
///   and an item failed
pub fn inspect_path<P: AsRef<Path>>(
    path: P,
    options: &BatchOptions,
) -> Result<BatchReport, EpubError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EpubError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let candidates = if path.is_dir() {
        collect_epubs(path, options)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = BatchReport::default();
    for candidate in candidates {
        let outcome = inspect_file(&candidate);

        if let Err(err) = &outcome {
            warn!(
                "The book {} is not a valid epub file: {}",
                candidate.display(),
                err
            );
        }

        let outcome = match outcome {
            Err(err) if options.strict => return Err(err),
            outcome => outcome,
        };

        report.items.push(BatchItem {
            path: candidate,
            outcome,
        });
    }

    info!(
        "Batch inspection complete: total={} succeeded={} failed={}",
        report.total(),
        report.succeeded().count(),
        report.failed().count()
    );

    Ok(report)
}

fn inspect_file(path: &Path) -> Result<EpubMetadata, EpubError> {
    let doc = EpubDoc::<File>::new(path)?;
    Ok(doc.close())
}

fn collect_epubs(root: &Path, options: &BatchOptions) -> Result<Vec<PathBuf>, EpubError> {
    let mut epubs = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && has_epub_extension(entry.path()) {
            epubs.push(entry.into_path());
        }
    }

    Ok(epubs)
}

fn has_epub_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
}

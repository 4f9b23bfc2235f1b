//! EPUB container introspection
//!
//! A Rust library for deciding whether a file is a well-formed EPUB container
//! and, if it is, reading its bibliographic metadata and locating its cover
//! image.
//!
//! Opening a publication follows only the structural path needed to reach the
//! package document: the ZIP archive is checked for integrity, the `mimetype`
//! entry is validated, `META-INF/container.xml` is resolved to the OPF package
//! document, and the Dublin Core metadata is extracted from it. Reading content
//! documents, writing EPUB files and DRM are out of scope.
//!
//! ## Features
//!
//! - Open from a filesystem path or any `Read + Seek` stream.
//! - Distinguishable failures: not found, corrupt archive, invalid format.
//! - Missing metadata is never an error; absent fields are `None`.
//! - Lazy cover lookup with tolerance for already-qualified cover paths.
//! - Optional batch inspection of a directory tree via the `batch` feature.
//!
//! ## Quick Start
//!
//! ```rust, ignore
//! # use epub_meta::epub::EpubDoc;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = EpubDoc::new("path/to/book.epub")?;
//!
//! let metadata = doc.metadata();
//! println!("Title: {:?}", metadata.title);
//! println!("Creator: {:?}", metadata.creator);
//!
//! if let Some((cover, extension)) = doc.get_cover()? {
//!     std::fs::write(format!("cover{}", extension), cover)?;
//! }
//!
//! let metadata = doc.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `batch` (default): Enable `epub_meta::batch`, which walks a directory and
//!   inspects every `.epub` file in it, continuing past per-file errors unless
//!   strict mode is requested.

pub(crate) mod utils;

#[cfg(feature = "batch")]
pub mod batch;
pub mod epub;
pub mod error;
mod metadata;
pub mod types;

pub use epub::EpubDoc;
pub use error::{EpubError, ErrorKind};
pub use types::{ContainerManifest, EpubMetadata, EpubSource, Identifier};

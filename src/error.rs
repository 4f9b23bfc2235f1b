//! Error Type Definition Module
//!
//! This module defines the errors that can surface while opening an EPUB
//! container and reading its package document. Every failure is returned as
//! a typed value; nothing in this crate reports failure through logging.
//!
//! ## Main Error Types
//!
//! - [EpubError] - Failures of the open/inspect operations
//! - [XmlError] - Failures of the internal XML tree reader
//! - [ErrorKind] - A flat discriminant for per-item abort/skip decisions

use std::path::PathBuf;

use thiserror::Error;

/// Types of errors that can occur while inspecting an EPUB container
///
/// The variants are grouped by [ErrorKind]. Missing metadata fields, a missing
/// or dangling cover reference and a missing NCX are not errors: they show up
/// as `None` in the extracted record.
#[derive(Debug, Error)]
pub enum EpubError {
    /// The source path does not exist on the filesystem
    ///
    /// Raised before any archive parsing is attempted.
    #[error("Not found: No such file \"{}\".", path.display())]
    NotFound { path: PathBuf },

    /// The bytes are not a readable ZIP archive
    ///
    /// This covers a broken central directory as well as entries that fail
    /// their CRC check when read back.
    #[error("Corrupt archive: {source}")]
    CorruptArchive { source: zip::result::ZipError },

    /// The archive is a valid ZIP but not a usable EPUB container
    ///
    /// The reason names the structural step that failed, for example
    /// `missing mimetype` or `no package document`.
    #[error("Invalid EPUB format: {reason}")]
    InvalidFormat { reason: String },

    /// The cover reference is an absolute path inside the archive
    ///
    /// Entry names in an OCF container are always relative, so a cover path
    /// beginning with `/` is a producer error and is rejected outright
    /// instead of being silently re-rooted.
    #[error("Absolute cover path: \"{path}\" must be relative to the container root.")]
    AbsoluteCoverPath { path: String },

    #[error("IO error: {source}")]
    IOError { source: std::io::Error },
}

/// Coarse classification of [EpubError]
///
/// Batch tooling uses this to decide, per item, whether to abort, skip,
/// or log and continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    CorruptArchive,
    InvalidFormat,
    InvariantViolation,
    Io,
}

impl EpubError {
    pub(crate) fn invalid_format<S: Into<String>>(reason: S) -> Self {
        EpubError::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EpubError::NotFound { .. } => ErrorKind::NotFound,
            EpubError::CorruptArchive { .. } => ErrorKind::CorruptArchive,
            EpubError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            EpubError::AbsoluteCoverPath { .. } => ErrorKind::InvariantViolation,
            EpubError::IOError { .. } => ErrorKind::Io,
        }
    }
}

impl From<zip::result::ZipError> for EpubError {
    fn from(value: zip::result::ZipError) -> Self {
        EpubError::CorruptArchive { source: value }
    }
}

impl From<std::io::Error> for EpubError {
    fn from(value: std::io::Error) -> Self {
        EpubError::IOError { source: value }
    }
}

#[cfg(feature = "batch")]
impl From<walkdir::Error> for EpubError {
    fn from(value: walkdir::Error) -> Self {
        EpubError::IOError {
            source: value.into(),
        }
    }
}

#[cfg(test)]
impl PartialEq for EpubError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound { path: l_path }, Self::NotFound { path: r_path }) => l_path == r_path,
            (
                Self::InvalidFormat { reason: l_reason },
                Self::InvalidFormat { reason: r_reason },
            ) => l_reason == r_reason,
            (
                Self::AbsoluteCoverPath { path: l_path },
                Self::AbsoluteCoverPath { path: r_path },
            ) => l_path == r_path,

            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Errors raised while building an XML element tree
///
/// The resolver never exposes these directly; they are folded into
/// [EpubError::InvalidFormat] together with the name of the document
/// that failed to parse.
#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum XmlError {
    /// The document contains no bytes, or only whitespace
    #[error("the document is empty")]
    EmptyDocument,

    /// No root element was closed before the end of input
    #[error("the document has no complete root element")]
    MissingRoot,

    /// The bytes are not valid text in the detected or declared encoding
    #[error("the document is not valid {encoding} text")]
    Decode { encoding: &'static str },

    /// The tokenizer rejected the document
    #[error("{message}")]
    Syntax { message: String },
}

impl From<quick_xml::Error> for XmlError {
    fn from(value: quick_xml::Error) -> Self {
        XmlError::Syntax {
            message: value.to_string(),
        }
    }
}

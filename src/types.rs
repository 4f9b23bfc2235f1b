use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::PathBuf,
};

/// The byte source an EPUB session is opened from
///
/// A `Path` is resolved to an absolute path and checked for existence before
/// any parsing happens. A `Stream` is used as-is: it is expected to be
/// positioned anywhere and to support random access.
#[derive(Debug)]
pub enum EpubSource<R> {
    /// A named file on the local filesystem
    Path(PathBuf),

    /// An already-open, seekable byte stream (a file handle, a `Cursor` over
    /// an in-memory buffer, ...)
    Stream(R),
}

impl<R> From<PathBuf> for EpubSource<R> {
    fn from(value: PathBuf) -> Self {
        EpubSource::Path(value)
    }
}

impl<R> From<&std::path::Path> for EpubSource<R> {
    fn from(value: &std::path::Path) -> Self {
        EpubSource::Path(value.to_path_buf())
    }
}

/// The reader an open archive is bound to
///
/// Unifies the two [EpubSource] variants behind one `Read + Seek` type so the
/// archive handle does not need to be boxed.
#[derive(Debug)]
pub enum SourceReader<R> {
    File(BufReader<File>),
    Stream(R),
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::File(file) => file.read(buf),
            SourceReader::Stream(stream) => stream.read(buf),
        }
    }
}

impl<R: Seek> Seek for SourceReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::File(file) => file.seek(pos),
            SourceReader::Stream(stream) => stream.seek(pos),
        }
    }
}

/// Locations resolved from `META-INF/container.xml` and the package spine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerManifest {
    /// Entry path of the OPF package document; never empty
    pub opf_path: String,

    /// Directory prefix of `opf_path`, with a trailing `/`
    ///
    /// Empty when the package document sits at the archive root. Every
    /// relative `href` in the package document is resolved against it.
    pub base_path: String,

    /// Entry path of the legacy NCX navigation document, if the spine names one
    pub ncx_path: Option<String>,
}

impl ContainerManifest {
    /// Builds the manifest for a package document path, deriving `base_path`
    pub(crate) fn new(opf_path: String) -> Self {
        let base_path = match opf_path.rfind('/') {
            Some(index) => opf_path[..=index].to_string(),
            None => String::new(),
        };

        Self {
            opf_path,
            base_path,
            ncx_path: None,
        }
    }

    /// Prefixes an `href` from the package document with `base_path`
    pub(crate) fn resolve(&self, href: &str) -> String {
        format!("{}{}", self.base_path, href)
    }
}

/// The identifying `<dc:identifier>` of a publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The element's `id` attribute, matched by the package `unique-identifier`
    pub id: Option<String>,

    /// The `opf:scheme` attribute, e.g. `ISBN` or `uuid`
    pub scheme: Option<String>,

    /// The raw text content, possibly carrying a `urn:uuid:` prefix
    pub value: String,
}

impl Identifier {
    /// Returns the value with a leading `urn:uuid:` prefix removed
    pub fn bare_value(&self) -> &str {
        self.value
            .strip_prefix("urn:uuid:")
            .unwrap_or(&self.value)
    }
}

/// Bibliographic metadata extracted from the OPF package document
///
/// Every field is `None` (or empty for `subject`) when the document does not
/// carry it. No display fallbacks are ever substituted here; that is up to
/// the caller. The record holds no reference to the archive and stays valid
/// after the session is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpubMetadata {
    pub title: Option<String>,

    /// Display name of the first `<dc:creator>`
    pub creator: Option<String>,

    pub language: Option<String>,

    pub identifier: Option<Identifier>,

    pub rights: Option<String>,

    pub date: Option<String>,

    /// Text of `<dc:description>`
    pub summary: Option<String>,

    /// Every non-blank `<dc:subject>`, in document order, duplicates kept
    pub subject: Vec<String>,

    /// Archive entry path of the cover image, already prefixed with the
    /// package base path
    ///
    /// The entry is not checked for existence at extraction time; producers
    /// do ship broken references.
    pub cover_image: Option<String>,
}

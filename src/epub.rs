use std::{
    fs::{File, canonicalize},
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf, absolute},
};

use log::{debug, warn};
use zip::ZipArchive;

use crate::{
    error::EpubError,
    metadata::OPF_NAMESPACE,
    types::{ContainerManifest, EpubMetadata, EpubSource, SourceReader},
    utils::{
        XmlElement, XmlReader, first_line, get_file_in_zip_archive, has_entry,
        verify_archive_integrity,
    },
};

const CONTAINER_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:container";
const CONTAINER_PATH: &str = "META-INF/container.xml";
const EPUB_MIMETYPE: &str = "application/epub+zip";
const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// An open EPUB inspection session
///
/// `EpubDoc` owns the archive handle for the lifetime of the session. The
/// container is validated and the metadata record is extracted eagerly when
/// the session is opened; afterwards only the cover image is read from the
/// archive, and only on request.
///
/// The archive is released when the session is dropped or explicitly
/// [closed](EpubDoc::close). If opening fails partway, every resource acquired
/// so far is released before the error is returned.
///
/// A session is meant for use from one thread at a time. To inspect many files
/// in parallel, open one session per file.
pub struct EpubDoc<R: Read + Seek> {
    archive: ZipArchive<SourceReader<R>>,

    /// The absolute path of the source file, when opened from a path
    source_path: Option<PathBuf>,

    container: ContainerManifest,

    metadata: EpubMetadata,
}

impl<R: Read + Seek> EpubDoc<R> {
    /// Opens and validates an EPUB container, then extracts its metadata
    ///
    /// # Parameters
    /// - `source`: A filesystem path or an already-open seekable stream
    ///
    /// # Return
    /// - `Ok(EpubDoc<R>)`: The validated session with its metadata record
    /// - `Err(EpubError::NotFound)`: The source path, made absolute against the
    ///   current directory, does not exist
    /// - `Err(EpubError::CorruptArchive)`: The bytes are not an intact ZIP archive
    /// - `Err(EpubError::InvalidFormat)`: The archive is not a usable EPUB container
    pub fn open(source: EpubSource<R>) -> Result<Self, EpubError> {
        match source {
            EpubSource::Path(path) => {
                let path = absolute(&path)?;
                if !path.exists() {
                    return Err(EpubError::NotFound { path });
                }

                let path = canonicalize(path)?;
                let file = File::open(&path)?;
                Self::from_source_reader(SourceReader::File(BufReader::new(file)), Some(path))
            }

            EpubSource::Stream(reader) => {
                Self::from_source_reader(SourceReader::Stream(reader), None)
            }
        }
    }

    /// Opens an EPUB container from a seekable stream
    ///
    /// This is a shorthand for `EpubDoc::open(EpubSource::Stream(reader))`.
    pub fn from_reader(reader: R) -> Result<Self, EpubError> {
        Self::open(EpubSource::Stream(reader))
    }

    fn from_source_reader(
        reader: SourceReader<R>,
        source_path: Option<PathBuf>,
    ) -> Result<Self, EpubError> {
        // Resolution order:
        // 1. The bytes must form an intact ZIP archive (every entry passes CRC)
        // 2. `mimetype` must exist and its first line start with `application/epub+zip`
        // 3. `META-INF/container.xml` must name a package document
        // 4. The package document must parse; its spine may name an NCX
        // 5. Metadata is extracted from the same package document

        let mut archive = ZipArchive::new(reader)?;
        verify_archive_integrity(&mut archive)?;

        Self::check_mimetype(&mut archive)?;

        let container_data = get_file_in_zip_archive(&mut archive, CONTAINER_PATH)?
            .ok_or_else(|| EpubError::invalid_format("missing container.xml"))?;
        let mut container = Self::parse_container(&container_data)?;

        let package_data = get_file_in_zip_archive(&mut archive, &container.opf_path)?
            .ok_or_else(|| EpubError::invalid_format("missing package document"))?;
        let package = XmlReader::parse_bytes(&package_data).map_err(|err| {
            EpubError::invalid_format(format!("unparseable package document: {}", err))
        })?;

        container.ncx_path = Self::parse_ncx_path(&package, &container);
        let metadata = EpubMetadata::from_package(&package, &container);

        Ok(Self {
            archive,
            source_path,
            container,
            metadata,
        })
    }

    /// Validate the `mimetype` entry
    ///
    /// Only the first line is inspected and only as a prefix, so producers
    /// that append a newline or other trailing bytes are accepted.
    fn check_mimetype(archive: &mut ZipArchive<SourceReader<R>>) -> Result<(), EpubError> {
        if !has_entry(archive, "mimetype") {
            return Err(EpubError::invalid_format("missing mimetype"));
        }

        let data = get_file_in_zip_archive(archive, "mimetype")?
            .ok_or_else(|| EpubError::invalid_format("missing mimetype"))?;

        match std::str::from_utf8(first_line(&data)) {
            Ok(line) if line.starts_with(EPUB_MIMETYPE) => Ok(()),
            _ => Err(EpubError::invalid_format("bad mimetype")),
        }
    }

    /// Parse the EPUB container file (META-INF/container.xml)
    ///
    /// Picks the first `<rootfile>` in the container namespace whose
    /// `media-type` is `application/oebps-package+xml` and whose `full-path`
    /// is not empty.
    ///
    /// # Return
    /// - `Ok(ContainerManifest)`: The package document path and its base path
    /// - `Err(EpubError::InvalidFormat)`: The file does not parse or names no
    ///   package document
    fn parse_container(data: &[u8]) -> Result<ContainerManifest, EpubError> {
        let root = XmlReader::parse_bytes(data).map_err(|err| {
            EpubError::invalid_format(format!("unparseable container.xml: {}", err))
        })?;

        root.find_elements(CONTAINER_NAMESPACE, "rootfile")
            .filter(|rootfile| {
                rootfile.get_attr("media-type").as_deref() == Some(PACKAGE_MEDIA_TYPE)
            })
            .find_map(|rootfile| rootfile.get_attr("full-path").filter(|path| !path.is_empty()))
            .map(ContainerManifest::new)
            .ok_or_else(|| EpubError::invalid_format("no package document"))
    }

    /// Locate the legacy NCX through the spine's `toc` attribute
    ///
    /// A missing spine, `toc` attribute or manifest item only leaves the
    /// path unset.
    fn parse_ncx_path(package: &XmlElement, container: &ContainerManifest) -> Option<String> {
        let Some(toc_id) = package
            .find_children(OPF_NAMESPACE, "spine")
            .next()
            .and_then(|spine| spine.get_attr("toc"))
        else {
            debug!("The package spine declares no toc; no NCX path resolved.");
            return None;
        };

        let href = package
            .find_elements(OPF_NAMESPACE, "item")
            .find(|item| item.get_attr("id").as_deref() == Some(toc_id.as_str()))
            .and_then(|item| item.get_attr("href"));

        if href.is_none() {
            debug!("Spine toc \"{}\" does not match any manifest item.", toc_id);
        }

        href.map(|href| container.resolve(&href))
    }

    /// Returns the metadata extracted when the session was opened
    pub fn metadata(&self) -> &EpubMetadata {
        &self.metadata
    }

    /// Returns the locations resolved from the container and package documents
    pub fn container(&self) -> &ContainerManifest {
        &self.container
    }

    /// Returns the absolute path of the source file, if opened from a path
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Opens the cover image as a readable stream
    ///
    /// The entry is probed first under the package base path joined with the
    /// cover path, then under the bare cover path, for producers that store
    /// an already-qualified path in the cover reference. Each call opens a
    /// fresh stream.
    ///
    /// # Return
    /// - `Ok(Some((stream, extension)))`: The cover entry and its file extension,
    ///   including the dot (empty if the path has none)
    /// - `Ok(None)`: The publication has no cover reference, or the reference
    ///   matches no archive entry
    /// - `Err(EpubError::AbsoluteCoverPath)`: The manifest href of the cover
    ///   starts with `/`
    /// - `Err(EpubError::CorruptArchive)`: The entry exists but cannot be opened
    pub fn get_cover_stream(&mut self) -> Result<Option<(impl Read + '_, String)>, EpubError> {
        let Some(cover) = self.metadata.cover_image.as_deref() else {
            return Ok(None);
        };

        // The manifest href, before it was joined to the base path
        let href = cover
            .strip_prefix(self.container.base_path.as_str())
            .unwrap_or(cover);
        if href.starts_with('/') {
            return Err(EpubError::AbsoluteCoverPath {
                path: href.to_string(),
            });
        }

        let extension = Path::new(cover)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let candidates = [self.container.resolve(cover), cover.to_string()];
        let Some(entry) = candidates
            .into_iter()
            .find(|candidate| has_entry(&self.archive, candidate))
        else {
            warn!(
                "Cover image \"{}\" is referenced but missing from the archive.",
                cover
            );
            return Ok(None);
        };

        let stream = self.archive.by_name(&entry)?;
        Ok(Some((stream, extension)))
    }

    /// Reads the cover image fully into memory
    ///
    /// Same lookup as [EpubDoc::get_cover_stream].
    ///
    /// # Return
    /// - `Ok(Some((Vec<u8>, String)))`: The cover bytes and the file extension
    /// - `Ok(None)`: No cover is available
    pub fn get_cover(&mut self) -> Result<Option<(Vec<u8>, String)>, EpubError> {
        match self.get_cover_stream()? {
            Some((mut stream, extension)) => {
                let mut data = Vec::new();
                stream
                    .read_to_end(&mut data)
                    .map_err(|err| EpubError::from(zip::result::ZipError::Io(err)))?;
                Ok(Some((data, extension)))
            }
            None => Ok(None),
        }
    }

    /// Ends the session, releasing the archive
    ///
    /// The metadata record is handed back; it holds no reference to the
    /// archive and stays usable.
    pub fn close(self) -> EpubMetadata {
        self.metadata
    }
}

impl EpubDoc<File> {
    /// Opens an EPUB file from a filesystem path
    ///
    /// This is a shorthand for `EpubDoc::open(EpubSource::Path(path))`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, EpubError> {
        Self::open(path.as_ref().into())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

    pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    pub const DUNWICH_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:opf="http://www.idpf.org/2007/opf" unique-identifier="id" version="2.0">
  <metadata>
    <dc:title>The Dunwich Horror</dc:title>
    <dc:creator opf:role="aut" opf:file-as="Lovecraft, H. P.">H. P. Lovecraft</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="id" opf:scheme="URI">http://www.gutenberg.org/ebooks/50133</dc:identifier>
    <dc:subject>Horror tales</dc:subject>
    <meta name="cover" content="cover-img"/>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="cover-img" href="images/cover.jpg" media-type="image/jpeg"/>
    <item id="chapter" href="text/chapter.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="chapter"/>
  </spine>
</package>"#;

    pub const COVER_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-payload";

    /// Builds a ZIP archive in memory; `mimetype` entries are stored, the
    /// rest deflated
    pub fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            let method = if *name == "mimetype" {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    /// A complete, valid EPUB 2 publication
    pub fn dunwich() -> Vec<u8> {
        zip(&[
            ("mimetype", b"application/epub+zip"),
            ("META-INF/container.xml", CONTAINER_XML.as_bytes()),
            ("OEBPS/content.opf", DUNWICH_OPF.as_bytes()),
            ("OEBPS/toc.ncx", b"<ncx/>"),
            ("OEBPS/images/cover.jpg", COVER_BYTES),
            ("OEBPS/text/chapter.xhtml", b"<html/>"),
        ])
    }

    /// A valid container around the given package document at `OEBPS/content.opf`
    pub fn with_package(opf: &str, extra: &[(&str, &[u8])]) -> Vec<u8> {
        let mut entries: Vec<(&str, &[u8])> = Vec::with_capacity(3 + extra.len());
        entries.push(("mimetype", b"application/epub+zip"));
        entries.push(("META-INF/container.xml", CONTAINER_XML.as_bytes()));
        entries.push(("OEBPS/content.opf", opf.as_bytes()));
        entries.extend_from_slice(extra);
        zip(&entries)
    }
}

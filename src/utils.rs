use std::{
    collections::HashMap,
    io::{self, Read, Seek},
};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape},
    events::{BytesStart, Event},
};
use zip::{ZipArchive, result::ZipError};

use crate::error::{EpubError, XmlError};

/// Namespace bound to the reserved `xml` prefix (`xml:lang`, `xml:space`)
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Upper bound on the decompressed size of an entry read into memory
const MAX_ENTRY_SIZE: u64 = 16 * 1024 * 1024;

/// Reads the contents of a named entry from a ZIP archive
///
/// The entry stream is opened and dropped inside this call, so no file
/// handle outlives the read. Entries that decompress past 16 MiB are
/// rejected.
///
/// ## Return
/// - `Ok(Some(Vec<u8>))`: The raw bytes of the entry
/// - `Ok(None)`: The archive has no entry with this name
/// - `Err(EpubError)`: The entry exists but could not be read back intact,
///   or is too large
pub fn get_file_in_zip_archive<R: Read + Seek>(
    zip_file: &mut ZipArchive<R>,
    file_name: &str,
) -> Result<Option<Vec<u8>>, EpubError> {
    read_entry_limited(zip_file, file_name, MAX_ENTRY_SIZE)
}

fn read_entry_limited<R: Read + Seek>(
    zip_file: &mut ZipArchive<R>,
    file_name: &str,
    limit: u64,
) -> Result<Option<Vec<u8>>, EpubError> {
    let mut buffer = Vec::<u8>::new();
    match zip_file.by_name(file_name) {
        Ok(file) => {
            file.take(limit + 1)
                .read_to_end(&mut buffer)
                .map_err(|err| EpubError::from(ZipError::Io(err)))?;

            if buffer.len() as u64 > limit {
                return Err(EpubError::invalid_format(format!(
                    "{} exceeds {} bytes",
                    file_name, limit
                )));
            }
            Ok(Some(buffer))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(EpubError::from(err)),
    }
}

/// Checks whether the archive has an entry with exactly this name
pub fn has_entry<R: Read + Seek>(zip_file: &ZipArchive<R>, file_name: &str) -> bool {
    zip_file.file_names().any(|name| name == file_name)
}

/// Verifies that every entry of the archive can be decompressed and
/// matches its recorded CRC-32
///
/// Each entry is streamed into a sink; the zip reader checks the checksum
/// once the entry has been read to its end.
///
/// ## Return
/// - `Ok(())`: Every file entry reads back intact
/// - `Err(EpubError::CorruptArchive)`: The first entry that failed
pub fn verify_archive_integrity<R: Read + Seek>(
    zip_archive: &mut ZipArchive<R>,
) -> Result<(), EpubError> {
    for index in 0..zip_archive.len() {
        let mut file = zip_archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        io::copy(&mut file, &mut io::sink()).map_err(|err| EpubError::from(ZipError::Io(err)))?;
    }

    Ok(())
}

/// Returns the bytes of `data` up to, but excluding, the first line feed
pub fn first_line(data: &[u8]) -> &[u8] {
    match data.iter().position(|&byte| byte == b'\n') {
        Some(end) => &data[..end],
        None => data,
    }
}

/// Provides functionality to decode byte data into strings
///
/// A byte order mark wins. Without one, data opening with a zero-padded `<`
/// is taken as UTF-16; anything else is decoded with the encoding named in
/// the XML declaration, or UTF-8 when none is declared. Bytes that are not
/// valid in the chosen encoding are rejected, never replaced.
pub trait DecodeBytes {
    fn decode(&self) -> Result<String, XmlError>;
}

impl DecodeBytes for [u8] {
    fn decode(&self) -> Result<String, XmlError> {
        if self.is_empty() {
            return Err(XmlError::EmptyDocument);
        }

        if let Some((encoding, bom_len)) = Encoding::for_bom(self) {
            return decode_strict(encoding, &self[bom_len..]);
        }

        match self {
            // '<' encoded as UTF-16 puts its zero byte first (BE) or second (LE);
            // NUL never appears in well-formed 8-bit XML
            [0x00, b'<', ..] => decode_strict(UTF_16BE, self),
            [b'<', 0x00, ..] => decode_strict(UTF_16LE, self),

            _ => {
                let encoding = extract_xml_encoding(self)
                    .and_then(|label| Encoding::for_label(label.as_bytes()))
                    // A UTF-16 label on 8-bit data is a mislabel; the bytes are ASCII-compatible
                    .filter(|encoding| *encoding != UTF_16BE && *encoding != UTF_16LE)
                    .unwrap_or(UTF_8);

                decode_strict(encoding, self)
            }
        }
    }
}

impl DecodeBytes for Vec<u8> {
    fn decode(&self) -> Result<String, XmlError> {
        self.as_slice().decode()
    }
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, XmlError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(XmlError::Decode {
            encoding: encoding.name(),
        })
}

/// Reads the `encoding` pseudo-attribute of the XML declaration
///
/// Only the first 100 bytes are searched, and only an ASCII declaration
/// is recognized.
fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|window| window == b"<?xml")?;
    let declaration = &prefix[xml_start..];
    let declaration = &declaration[..declaration
        .windows(2)
        .position(|window| window == b"?>")
        .unwrap_or(declaration.len())];

    let encoding_pos = declaration
        .windows(8)
        .position(|window| window.eq_ignore_ascii_case(b"encoding"))?;
    let rest = declaration[encoding_pos + 8..].trim_ascii_start();
    let rest = rest.strip_prefix(b"=")?.trim_ascii_start();

    let (&quote, value) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let end = value.iter().position(|&byte| byte == quote)?;
    std::str::from_utf8(&value[..end]).ok()
}

/// An attribute of an [XmlElement] with its resolved namespace
#[derive(Debug, Clone)]
pub struct XmlAttribute {
    /// The local name of the attribute
    pub name: String,

    pub prefix: Option<String>,

    /// Only prefixed attributes carry a namespace; the default namespace
    /// never applies to attributes
    pub namespace: Option<String>,

    /// The unescaped attribute value
    pub value: String,
}

/// Represents an element node in an XML document
#[derive(Debug)]
pub struct XmlElement {
    /// The local name of the element(excluding namespace prefix)
    pub name: String,

    /// The namespace prefix of the element
    pub prefix: Option<String>,

    /// The namespace URI the element's prefix (or the default namespace)
    /// resolves to at the element's position in the document
    pub namespace: Option<String>,

    pub attributes: Vec<XmlAttribute>,

    /// The direct character data of the element, CDATA included
    pub text: Option<String>,

    /// The children of the element
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create a new element
    pub fn new(name: String) -> Self {
        Self {
            name,
            prefix: None,
            namespace: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Checks the element's qualified name
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Gets the text content of the element and all its child elements
    ///
    /// Collects the text content of the current element and the text content of
    /// all its child elements, removing leading and trailing whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result.trim().to_string()
    }

    fn collect_text(&self, result: &mut String) {
        if let Some(text_value) = &self.text {
            result.push_str(text_value);
        }

        for child in &self.children {
            child.collect_text(result);
        }
    }

    /// Returns the value of an unprefixed attribute
    pub fn get_attr(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|attr| attr.prefix.is_none() && attr.name == name)
            .map(|attr| attr.value.clone())
    }

    /// Returns the value of an attribute in the given namespace
    pub fn get_attr_ns(&self, namespace: &str, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name && attr.namespace.as_deref() == Some(namespace))
            .map(|attr| attr.value.clone())
    }

    /// Finds this element and all its descendants with the given qualified
    /// name, in document order
    pub fn find_elements<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        Descendants { stack: vec![self] }.filter(move |element| element.is(namespace, name))
    }

    /// Finds the direct children with the given qualified name
    pub fn find_children<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.is(namespace, name))
    }
}

/// Pre-order walk over an element and its descendants
struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// In-scope namespace declarations, one frame per open element
///
/// The empty prefix stands for the default namespace.
struct NamespaceScopes {
    frames: Vec<HashMap<String, String>>,
}

impl NamespaceScopes {
    fn new() -> Self {
        Self { frames: Vec::new() }
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }

        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(prefix))
            // `xmlns=""` undeclares the default namespace
            .filter(|namespace| !namespace.is_empty())
            .cloned()
    }
}

/// XML parser used to parse XML content and build an XML element tree
pub struct XmlReader {}

impl XmlReader {
    /// Parses an XML from string and builds the root element
    ///
    /// Element and attribute prefixes are resolved against the declarations
    /// in scope where they appear, so a prefix rebound deeper in the
    /// document resolves to the inner binding.
    ///
    /// ## Return
    /// - `Ok(XmlElement)`: The root element of the XML element tree
    /// - `Err(XmlError)`: The document is empty, malformed or truncated
    pub fn parse(content: &str) -> Result<XmlElement, XmlError> {
        if content.trim().is_empty() {
            return Err(XmlError::EmptyDocument);
        }

        let mut reader = Reader::from_str(content);

        let mut buf = Vec::new();
        let mut stack = Vec::<XmlElement>::new();
        let mut scopes = NamespaceScopes::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,

                Event::Start(e) => {
                    let element = Self::open_element(&e, &mut scopes)?;
                    stack.push(element);
                }

                Event::End(_) => {
                    scopes.frames.pop();
                    if let Some(element) = stack.pop() {
                        Self::attach(&mut stack, &mut root, element)?;
                    }
                }

                Event::Empty(e) => {
                    let element = Self::open_element(&e, &mut scopes)?;
                    scopes.frames.pop();
                    Self::attach(&mut stack, &mut root, element)?;
                }

                Event::Text(e) => {
                    if let Some(element) = stack.last_mut() {
                        Self::push_text(element, &String::from_utf8_lossy(&e));
                    }
                }

                Event::CData(e) => {
                    if let Some(element) = stack.last_mut() {
                        Self::push_text(element, &String::from_utf8_lossy(&e));
                    }
                }

                Event::GeneralRef(e) => {
                    if let Some(element) = stack.last_mut() {
                        let resolved = match e.resolve_char_ref()? {
                            Some(ch) => ch.to_string(),
                            None => {
                                let name = String::from_utf8_lossy(&e);
                                match resolve_predefined_entity(&name) {
                                    Some(value) => value.to_string(),
                                    // Undeclared entities are kept verbatim
                                    None => format!("&{};", name),
                                }
                            }
                        };
                        Self::push_text(element, &resolved);
                    }
                }

                // Comment, PI, Decl and DocType carry nothing we read
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(XmlError::MissingRoot);
        }

        root.ok_or(XmlError::MissingRoot)
    }

    /// Parse XML from bytes and builds the root element
    pub fn parse_bytes(bytes: &[u8]) -> Result<XmlElement, XmlError> {
        let content = bytes.decode()?;
        Self::parse(&content)
    }

    /// Builds an element from a start tag and pushes its namespace frame
    fn open_element(
        start: &BytesStart<'_>,
        scopes: &mut NamespaceScopes,
    ) -> Result<XmlElement, XmlError> {
        let mut frame = HashMap::new();
        let mut raw_attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let raw_value = String::from_utf8_lossy(&attr.value).to_string();
            let value = unescape(&raw_value)
                .map_err(|err| XmlError::Syntax {
                    message: err.to_string(),
                })?
                .into_owned();

            if key == "xmlns" {
                frame.insert(String::new(), value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.insert(prefix.to_string(), value);
            } else {
                raw_attributes.push((key, value));
            }
        }
        scopes.frames.push(frame);

        let qname = start.name();
        let mut element =
            XmlElement::new(String::from_utf8_lossy(qname.local_name().as_ref()).to_string());
        element.prefix = qname
            .prefix()
            .map(|prefix| String::from_utf8_lossy(prefix.as_ref()).to_string());
        element.namespace = scopes.resolve(element.prefix.as_deref().unwrap_or(""));

        element.attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| match key.split_once(':') {
                Some((prefix, name)) => XmlAttribute {
                    name: name.to_string(),
                    namespace: scopes.resolve(prefix),
                    prefix: Some(prefix.to_string()),
                    value,
                },
                None => XmlAttribute {
                    name: key,
                    prefix: None,
                    namespace: None,
                    value,
                },
            })
            .collect();

        Ok(element)
    }

    /// Hands a closed element to its parent, or makes it the root
    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<(), XmlError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_some() => {
                return Err(XmlError::Syntax {
                    message: format!("unexpected second root element <{}>", element.name),
                });
            }
            None => *root = Some(element),
        }

        Ok(())
    }

    fn push_text(element: &mut XmlElement, text: &str) {
        element
            .text
            .get_or_insert_with(String::new)
            .push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zip::ZipArchive;

    use crate::{
        epub::fixtures,
        error::{EpubError, XmlError},
        utils::{DecodeBytes, XmlReader, extract_xml_encoding, first_line, read_entry_limited},
    };

    const OPF: &str = "http://www.idpf.org/2007/opf";
    const DC: &str = "http://purl.org/dc/elements/1.1/";

    /// Test with empty data
    #[test]
    fn test_decode_empty_data() {
        let data: Vec<u8> = vec![];
        assert_eq!(data.decode().unwrap_err(), XmlError::EmptyDocument);
    }

    /// Testing text decoding with UTF-8 BOM
    #[test]
    fn test_decode_utf8_with_bom() {
        let data: Vec<u8> = vec![0xEF, 0xBB, 0xBF, b'H', b'e', b'l', b'l', b'o'];
        assert_eq!(data.decode().unwrap(), "Hello");
    }

    /// Test text decoding with UTF-16 BE BOM
    #[test]
    fn test_decode_utf16_be_with_bom() {
        let data = vec![
            0xFE, 0xFF, // BOM
            0x00, b'H', // H
            0x00, b'e', // e
            0x00, b'l', // l
            0x00, b'l', // l
            0x00, b'o', // o
        ];
        assert_eq!(data.decode().unwrap(), "Hello");
    }

    /// Testing text decoding with UTF-16 LE BOM
    #[test]
    fn test_decode_utf16_le_with_bom() {
        let data = vec![
            0xFF, 0xFE, // BOM
            b'H', 0x00, // H
            b'e', 0x00, // e
            b'l', 0x00, // l
            b'l', 0x00, // l
            b'o', 0x00, // o
        ];
        assert_eq!(data.decode().unwrap(), "Hello");
    }

    #[test]
    fn test_decode_utf16_le_without_bom() {
        let data: Vec<u8> = "<a/>".encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect();
        assert_eq!(data.decode().unwrap(), "<a/>");
    }

    /// Testing ordinary UTF-8 text (without BOM)
    #[test]
    fn test_decode_plain_utf8() {
        let data = b"Hello, World!".to_vec();
        assert_eq!(data.decode().unwrap(), "Hello, World!");
    }

    #[test]
    fn test_decode_utf16_be_without_bom() {
        let data: Vec<u8> = "<a/>".encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect();
        assert_eq!(data.decode().unwrap(), "<a/>");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let data = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><t>Les Mis\xE9rables</t>";
        assert_eq!(
            data.decode().unwrap(),
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><t>Les Mis\u{e9}rables</t>"
        );

        let data = b"<?xml version='1.0' encoding = 'windows-1252' ?><t>\x93quoted\x94</t>";
        assert!(data.decode().unwrap().ends_with("<t>\u{201c}quoted\u{201d}</t>"));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let data = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><t>Les Mis\xE9rables</t>";
        assert_eq!(
            data.decode().unwrap_err(),
            XmlError::Decode { encoding: "UTF-8" }
        );

        // no declaration defaults to UTF-8
        let data = b"<t>\xFF\xFE\xFD</t>";
        assert_eq!(
            data.decode().unwrap_err(),
            XmlError::Decode { encoding: "UTF-8" }
        );

        // truncated UTF-16 code unit
        let data = b"<\x00a\x00/\x00>";
        assert!(matches!(data.decode().unwrap_err(), XmlError::Decode { .. }));
    }

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a/>"),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\"?><a/>"), None);
        assert_eq!(
            extract_xml_encoding(b"<?xml version=\"1.0\"?><a encoding=\"latin1\"/>"),
            None
        );
        assert_eq!(extract_xml_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line(b"application/epub+zip\n"), b"application/epub+zip");
        assert_eq!(first_line(b"application/epub+zip"), b"application/epub+zip");
        assert_eq!(first_line(b"a\r\nb"), b"a\r");
        assert_eq!(first_line(b""), b"");
    }

    #[test]
    fn test_parse_resolves_prefixed_and_default_namespaces() {
        let root = XmlReader::parse(
            r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <metadata>
    <dc:title>Title</dc:title>
  </metadata>
</package>"#,
        )
        .unwrap();

        assert!(root.is(OPF, "package"));
        let metadata = root.find_children(OPF, "metadata").next().unwrap();
        let title = metadata.find_children(DC, "title").next().unwrap();
        assert_eq!(title.prefix.as_deref(), Some("dc"));
        assert_eq!(title.text(), "Title");
    }

    #[test]
    fn test_parse_prefix_bound_on_element_itself() {
        let root = XmlReader::parse(
            r#"<package xmlns="http://www.idpf.org/2007/opf">
  <metadata>
    <dc:title xmlns:dc="http://purl.org/dc/elements/1.1/">Local</dc:title>
    <dc:title>Unbound</dc:title>
  </metadata>
</package>"#,
        )
        .unwrap();

        let titles: Vec<_> = root.find_elements(DC, "title").map(|e| e.text()).collect();
        assert_eq!(titles, vec!["Local"]);
    }

    #[test]
    fn test_parse_same_local_name_different_namespace() {
        let root = XmlReader::parse(
            r#"<root xmlns:a="urn:a" xmlns:b="urn:b"><a:item>1</a:item><b:item>2</b:item></root>"#,
        )
        .unwrap();

        assert_eq!(root.find_elements("urn:a", "item").count(), 1);
        assert_eq!(root.find_elements("urn:b", "item").next().unwrap().text(), "2");
    }

    #[test]
    fn test_default_namespace_undeclared() {
        let root =
            XmlReader::parse(r#"<root xmlns="urn:x"><inner xmlns=""><leaf/></inner></root>"#)
                .unwrap();

        let inner = root.children.first().unwrap();
        assert_eq!(inner.namespace, None);
        assert_eq!(inner.children[0].namespace, None);
    }

    #[test]
    fn test_namespaced_attributes() {
        let root = XmlReader::parse(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:opf="http://www.idpf.org/2007/opf">
  <item id="x" opf:scheme="ISBN" xml:lang="en"/>
</package>"#,
        )
        .unwrap();

        let item = root.find_elements(OPF, "item").next().unwrap();
        assert_eq!(item.get_attr("id").as_deref(), Some("x"));
        assert_eq!(item.get_attr("scheme"), None);
        assert_eq!(item.get_attr_ns(OPF, "scheme").as_deref(), Some("ISBN"));
        assert_eq!(
            item.get_attr_ns("http://www.w3.org/XML/1998/namespace", "lang")
                .as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_entities_and_cdata_in_text() {
        let root = XmlReader::parse(
            "<r><t>Pride &amp; Prejudice</t><c><![CDATA[<b>bold</b>]]></c><n>&#65;&#x42;</n></r>",
        )
        .unwrap();

        let texts: Vec<_> = root.children.iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["Pride & Prejudice", "<b>bold</b>", "AB"]);
    }

    #[test]
    fn test_attribute_values_unescaped() {
        let root = XmlReader::parse(r#"<r href="a&amp;b.xhtml"/>"#).unwrap();
        assert_eq!(root.get_attr("href").as_deref(), Some("a&b.xhtml"));
    }

    #[test]
    fn test_find_elements_in_document_order() {
        let root =
            XmlReader::parse(r#"<r xmlns="urn:x"><s>1</s><g><s>2</s></g><s>3</s></r>"#).unwrap();

        let order: Vec<_> = root.find_elements("urn:x", "s").map(|e| e.text()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(XmlReader::parse("").unwrap_err(), XmlError::EmptyDocument);
        assert_eq!(XmlReader::parse("   \n").unwrap_err(), XmlError::EmptyDocument);
        assert!(XmlReader::parse("<a><b></b>").is_err());
        assert!(matches!(
            XmlReader::parse("<a></b>").unwrap_err(),
            XmlError::Syntax { .. }
        ));
        assert_eq!(
            XmlReader::parse("just some text").unwrap_err(),
            XmlError::MissingRoot
        );
    }

    #[test]
    fn test_parse_rejects_second_root() {
        for content in ["<a/><b/>", "<a></a><b>text</b>", "<?xml version=\"1.0\"?><a/>\n<a/>"] {
            assert!(matches!(
                XmlReader::parse(content).unwrap_err(),
                XmlError::Syntax { .. }
            ));
        }
    }

    #[test]
    fn test_read_entry_limited() {
        let data = fixtures::zip(&[("small.xml", b"<a/>"), ("large.xml", &[b'x'; 64])]);
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();

        assert_eq!(
            read_entry_limited(&mut archive, "small.xml", 32).unwrap(),
            Some(b"<a/>".to_vec())
        );
        assert_eq!(
            read_entry_limited(&mut archive, "large.xml", 64).unwrap(),
            Some(vec![b'x'; 64])
        );
        assert_eq!(
            read_entry_limited(&mut archive, "large.xml", 32).unwrap_err(),
            EpubError::invalid_format("large.xml exceeds 32 bytes")
        );
        assert_eq!(
            read_entry_limited(&mut archive, "absent.xml", 32).unwrap(),
            None
        );
    }
}

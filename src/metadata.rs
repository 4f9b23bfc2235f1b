//! Metadata extraction from the OPF package document
//!
//! Reads the Dublin Core block of an already-parsed package document into an
//! [EpubMetadata] record and resolves the EPUB 2 cover reference
//! (`<meta name="cover" content="ITEM-ID"/>`) through the manifest. Nothing
//! here fails: a field that cannot be found is simply left as `None`.

use log::warn;

use crate::{
    types::{ContainerManifest, EpubMetadata, Identifier},
    utils::XmlElement,
};

pub(crate) const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub(crate) const OPF_NAMESPACE: &str = "http://www.idpf.org/2007/opf";

impl EpubMetadata {
    /// Extracts the metadata record from the root `<package>` element
    ///
    /// Dublin Core elements are looked up under `<metadata>`; if the package
    /// has no such block, the whole document is searched instead.
    ///
    /// # Parameters
    /// - `package`: The root element of the parsed package document
    /// - `container`: The resolved container locations, used to prefix the
    ///   cover `href` with the package base path
    pub(crate) fn from_package(package: &XmlElement, container: &ContainerManifest) -> Self {
        let metadata = package
            .find_children(OPF_NAMESPACE, "metadata")
            .next()
            .unwrap_or(package);

        Self {
            title: first_dc_text(metadata, "title"),
            creator: first_dc_text(metadata, "creator"),
            language: first_dc_text(metadata, "language"),
            identifier: unique_identifier(package, metadata),
            rights: first_dc_text(metadata, "rights"),
            date: first_dc_text(metadata, "date"),
            summary: first_dc_text(metadata, "description"),
            subject: metadata
                .find_elements(DC_NAMESPACE, "subject")
                .map(XmlElement::text)
                .filter(|subject| !subject.is_empty())
                .collect(),
            cover_image: cover_image(package, metadata, container),
        }
    }
}

/// Text of the first Dublin Core element with this name
///
/// Only the first element counts: if it is blank the field is absent, later
/// elements are not consulted.
fn first_dc_text(metadata: &XmlElement, name: &str) -> Option<String> {
    metadata
        .find_elements(DC_NAMESPACE, name)
        .next()
        .map(XmlElement::text)
        .filter(|text| !text.is_empty())
}

/// Picks the `<dc:identifier>` designated by the package `unique-identifier`
/// attribute, falling back to the first identifier in the document
fn unique_identifier(package: &XmlElement, metadata: &XmlElement) -> Option<Identifier> {
    let designated = package.get_attr("unique-identifier").and_then(|uid| {
        metadata
            .find_elements(DC_NAMESPACE, "identifier")
            .find(|element| element.get_attr("id").as_deref() == Some(uid.as_str()))
    });

    let element =
        designated.or_else(|| metadata.find_elements(DC_NAMESPACE, "identifier").next())?;

    Some(Identifier {
        id: element.get_attr("id"),
        scheme: element
            .get_attr_ns(OPF_NAMESPACE, "scheme")
            .or_else(|| element.get_attr("scheme")),
        value: element.text(),
    })
}

/// Follows `<meta name="cover">` to its manifest item and resolves the `href`
fn cover_image(
    package: &XmlElement,
    metadata: &XmlElement,
    container: &ContainerManifest,
) -> Option<String> {
    let cover_id = metadata
        .find_elements(OPF_NAMESPACE, "meta")
        .find(|meta| meta.get_attr("name").as_deref() == Some("cover"))?
        .get_attr("content")?;

    let item = package
        .find_elements(OPF_NAMESPACE, "item")
        .find(|item| item.get_attr("id").as_deref() == Some(cover_id.as_str()));

    match item.and_then(|item| item.get_attr("href")) {
        Some(href) => Some(container.resolve(&href)),
        None => {
            warn!(
                "Cover meta points at manifest item \"{}\", which has no usable href.",
                cover_id
            );
            None
        }
    }
}

//! OPF package document and container parsing
//!
//! Element matching uses local names only, so `dc:title`, `title` and
//! `opf:meta` are all recognised regardless of the namespace prefix a
//! producer chose.

use crate::error::{MetadataError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// A `<manifest><item>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: Option<String>,
}

impl ManifestItem {
    /// True if the media type (or, without one, the extension) is an image
    pub fn is_image(&self) -> bool {
        match &self.media_type {
            Some(media_type) => media_type.starts_with("image/"),
            None => is_image_name(&self.href),
        }
    }
}

/// True if a file name has a common raster image extension
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Parsed contents of an OPF package document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub titles: Vec<String>,
    pub creators: Vec<String>,
    pub publishers: Vec<String>,
    pub languages: Vec<String>,
    pub descriptions: Vec<String>,
    pub identifiers: Vec<String>,
    pub dates: Vec<String>,
    pub subjects: Vec<String>,
    pub rights: Vec<String>,

    /// `<meta name=".." content=".."/>` pairs in document order
    pub meta: Vec<(String, String)>,

    pub manifest: Vec<ManifestItem>,
}

impl PackageDocument {
    /// Manifest ID named by `<meta name="cover" content="..."/>`
    pub fn cover_id(&self) -> Option<&str> {
        self.meta
            .iter()
            .find(|(name, _)| name == "cover")
            .map(|(_, content)| content.as_str())
    }

    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    fn field_mut(&mut self, local_name: &[u8]) -> Option<&mut Vec<String>> {
        match local_name {
            b"title" => Some(&mut self.titles),
            b"creator" => Some(&mut self.creators),
            b"publisher" => Some(&mut self.publishers),
            b"language" => Some(&mut self.languages),
            b"description" => Some(&mut self.descriptions),
            b"identifier" => Some(&mut self.identifiers),
            b"date" => Some(&mut self.dates),
            b"subject" => Some(&mut self.subjects),
            b"rights" => Some(&mut self.rights),
            _ => None,
        }
    }
}

/// First value of a field, trimmed, if any non-empty value exists
pub fn first_value(values: &[String]) -> Option<String> {
    values
        .first()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

/// `full-path` of the first `<rootfile>` in `META-INF/container.xml`
pub fn parse_container(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.local_name().as_ref() == b"rootfile" =>
            {
                if let Some(path) = attribute(e, b"full-path").filter(|p| !p.is_empty()) {
                    return Some(path);
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Parse the metadata and manifest sections of an OPF document
pub fn parse_package(xml: &str) -> Result<PackageDocument> {
    let mut reader = Reader::from_str(xml);
    let mut doc = PackageDocument::default();

    let mut in_metadata = false;
    let mut in_manifest = false;
    // Local name of the Dublin Core element currently collecting text
    let mut current: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"metadata" => in_metadata = true,
                    b"manifest" => in_manifest = true,
                    b"meta" if in_metadata => push_meta(&mut doc, e),
                    b"item" if in_manifest => push_item(&mut doc, e),
                    _ if in_metadata && doc.field_mut(&name).is_some() => {
                        current = Some(name);
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"meta" if in_metadata => push_meta(&mut doc, e),
                b"item" if in_manifest => push_item(&mut doc, e),
                _ => {}
            },
            Event::Text(ref e) => {
                if current.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| MetadataError::OpfParse(err.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref e) => {
                if current.is_some() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"metadata" => in_metadata = false,
                    b"manifest" => in_manifest = false,
                    local => {
                        if current.as_deref() == Some(local) {
                            let value = text.trim().to_string();
                            if let Some(field) = doc.field_mut(local) {
                                if !value.is_empty() {
                                    field.push(value);
                                }
                            }
                            current = None;
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

fn push_meta(doc: &mut PackageDocument, element: &BytesStart<'_>) {
    if let (Some(name), Some(content)) = (attribute(element, b"name"), attribute(element, b"content")) {
        doc.meta.push((name, content));
    }
}

fn push_item(doc: &mut PackageDocument, element: &BytesStart<'_>) {
    if let (Some(id), Some(href)) = (attribute(element, b"id"), attribute(element, b"href")) {
        doc.manifest.push(ManifestItem {
            id,
            href,
            media_type: attribute(element, b"media-type"),
        });
    }
}

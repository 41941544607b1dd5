//! The `[Content_Types].xml` item.
//!
//! Defaults map file extensions to content types; overrides map individual
//! partnames. Both lists keep their source order so a package whose content
//! types were never touched is written back unchanged.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parsed content type declarations of a package.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// `(extension, content type)`, extension lowercased
    defaults: Vec<(String, String)>,

    /// `(partname, content type)`
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse content types from [Content_Types].xml.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => true,
                        b"Override" => false,
                        _ => continue,
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => {
                                key = Some(attr.unescape_value()?.into_owned());
                            },
                            b"ContentType" => {
                                content_type = Some(attr.unescape_value()?.into_owned());
                            },
                            _ => {},
                        }
                    }

                    if let (Some(key), Some(content_type)) = (key, content_type) {
                        if is_default {
                            map.defaults.push((key.to_lowercase(), content_type));
                        } else {
                            map.overrides.push((key, content_type));
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
        }

        Ok(map)
    }

    /// Content type of a part: its override, else the default for its
    /// extension.
    pub fn get(&self, partname: &PackURI) -> Result<&str> {
        if let Some((_, content_type)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
        {
            return Ok(content_type);
        }

        let ext = partname.ext().to_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, content_type)| content_type.as_str())
            .ok_or_else(|| OpcError::ContentTypeNotFound(partname.to_string()))
    }

    /// Register the content type of a new part. Returns `true` when the
    /// declarations changed.
    ///
    /// A matching default is reused; an unclaimed extension gets a new
    /// default; anything else becomes an override.
    pub fn register(&mut self, partname: &PackURI, content_type: &str) -> bool {
        let ext = partname.ext().to_lowercase();
        match self.defaults.iter().find(|(e, _)| *e == ext) {
            Some((_, existing)) if existing == content_type => false,
            None if !ext.is_empty() => {
                self.defaults.push((ext, content_type.to_string()));
                true
            },
            _ => {
                self.overrides
                    .retain(|(name, _)| name != partname.as_str());
                self.overrides
                    .push((partname.to_string(), content_type.to_string()));
                true
            },
        }
    }

    /// Serialize to a `[Content_Types].xml` item.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(
            256 + (self.defaults.len() + self.overrides.len()) * 140,
        );
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                quick_xml::escape::escape(ext.as_str()),
                quick_xml::escape::escape(content_type.as_str())
            ));
        }
        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                quick_xml::escape::escape(partname.as_str()),
                quick_xml::escape::escape(content_type.as_str())
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

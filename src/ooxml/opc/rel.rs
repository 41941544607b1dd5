//! Relationship-related objects for OPC packages.
//!
//! A `.rels` item lists the relationships from one source part (or the
//! package) to its targets. Relationships keep the order they were read in so
//! an unmodified collection serializes back in the same order.
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Relationship type URI.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Target reference as written in the `.rels` item.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Whether the target lives outside the package.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

/// Collection of relationships from a single source.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Directory of the source part, for resolving relative targets
    base_uri: String,

    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty collection for a source in directory `base_uri`.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: Vec::new(),
        }
    }

    /// Parse a `.rels` item.
    pub fn from_xml(base_uri: String, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut is_external = false;

                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(value),
                            b"Type" => reltype = Some(value),
                            b"Target" => target_ref = Some(value),
                            b"TargetMode" => is_external = value == target_mode::EXTERNAL,
                            _ => {},
                        }
                    }

                    match (r_id, reltype, target_ref) {
                        (Some(r_id), Some(reltype), Some(target_ref)) => {
                            rels.rels.push(Relationship {
                                r_id,
                                reltype,
                                target_ref,
                                is_external,
                            });
                        },
                        _ => {
                            return Err(OpcError::InvalidRelationship(
                                "Relationship element missing Id, Type or Target".to_string(),
                            ));
                        },
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(rels)
    }

    /// Get a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// Absolute partname of the internal target of `r_id`.
    pub fn target_partname(&self, r_id: &str) -> Result<PackURI> {
        let rel = self
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))?;
        self.resolve(rel)
    }

    /// Absolute partname of the single internal relationship of `reltype`.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<PackURI> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => self.resolve(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    fn resolve(&self, rel: &Relationship) -> Result<PackURI> {
        if rel.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &rel.target_ref).map_err(OpcError::InvalidPackUri)
    }

    /// Return the rId of an internal relationship of `reltype` to `target`,
    /// adding one with the next free rId when none exists.
    pub fn get_or_add(&mut self, reltype: &str, target: &PackURI) -> Result<String> {
        for rel in &self.rels {
            if rel.reltype == reltype && !rel.is_external && self.resolve(rel)? == *target {
                return Ok(rel.r_id.clone());
            }
        }

        let r_id = self.next_r_id();
        self.rels.push(Relationship {
            r_id: r_id.clone(),
            reltype: reltype.to_string(),
            target_ref: target.relative_ref(&self.base_uri),
            is_external: false,
        });
        Ok(r_id)
    }

    /// The lowest unused `rIdN`.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| rel.r_id.strip_prefix("rId"))
            .filter_map(|n| atoi_simd::parse::<u32, false, false>(n.as_bytes()).ok())
            .collect();
        used.sort_unstable();

        let mut next = 1u32;
        for n in used {
            match n.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }
        format!("rId{}", next)
    }

    /// Iterate relationships in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Number of relationships.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize to a `.rels` item.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.rels {
            let target_mode = if rel.is_external {
                r#" TargetMode="External""#
            } else {
                ""
            };
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                quick_xml::escape::escape(rel.r_id.as_str()),
                quick_xml::escape::escape(rel.reltype.as_str()),
                quick_xml::escape::escape(rel.target_ref.as_str()),
                target_mode
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/>
<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_and_resolve() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), SLIDE_RELS.as_bytes()).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(
            rels.part_with_reltype(rt::SLIDE_LAYOUT).unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            rels.target_partname("rId2").unwrap().as_str(),
            "/ppt/media/image1.png"
        );
        assert!(rels.target_partname("rId4").is_err());
        assert_eq!(rels.get("rId4").unwrap().target_ref(), "https://example.com/?a=1&b=2");
    }

    #[test]
    fn test_get_or_add_fills_first_gap_and_reuses() {
        let mut rels = Relationships::from_xml("/ppt/slides".to_string(), SLIDE_RELS.as_bytes()).unwrap();
        let existing = PackURI::new("/ppt/media/image1.png").unwrap();
        assert_eq!(rels.get_or_add(rt::IMAGE, &existing).unwrap(), "rId2");

        let fresh = PackURI::new("/ppt/media/image2.png").unwrap();
        assert_eq!(rels.get_or_add(rt::IMAGE, &fresh).unwrap(), "rId3");
        assert_eq!(rels.get("rId3").unwrap().target_ref(), "../media/image2.png");
    }

    #[test]
    fn test_to_xml_keeps_order_and_escapes() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), SLIDE_RELS.as_bytes()).unwrap();
        let xml = rels.to_xml();
        let r2 = xml.find("rId2").unwrap();
        let r1 = xml.find("rId1").unwrap();
        assert!(r2 < r1);
        assert!(xml.contains("a=1&amp;b=2"));
        let reparsed = Relationships::from_xml("/ppt/slides".to_string(), xml.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 3);
    }
}

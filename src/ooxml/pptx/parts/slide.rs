//! Slide parts.
//!
//! A slide (and likewise a layout or master) is held as a lossless XML tree
//! so shapes can be edited in place and everything else written back as it
//! was read.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::PackURI;
use crate::ooxml::xml::{XmlDocument, XmlElement};

/// Namespace prefixes bound on a part's root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    /// PresentationML
    pub p: String,
    /// DrawingML
    pub a: String,
    /// Office relationships
    pub r: String,
    /// Which of `p`, `a`, `r` the root already declares
    declared: [bool; 3],
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            p: "p".to_string(),
            a: "a".to_string(),
            r: "r".to_string(),
            declared: [false; 3],
        }
    }
}

impl Prefixes {
    /// Read the `xmlns:*` declarations of `root`.
    pub fn from_root(root: &XmlElement) -> Self {
        let mut ns = Self::default();
        for (key, value) in root.attrs() {
            let Some(prefix) = key.strip_prefix("xmlns:") else {
                continue;
            };
            let slot = match value.as_str() {
                namespace::PML_MAIN => 0,
                namespace::DML_MAIN => 1,
                namespace::OFC_RELATIONSHIPS => 2,
                _ => continue,
            };
            if !ns.declared[slot] {
                ns.declared[slot] = true;
                match slot {
                    0 => ns.p = prefix.to_string(),
                    1 => ns.a = prefix.to_string(),
                    _ => ns.r = prefix.to_string(),
                }
            }
        }
        ns
    }

    /// `xmlns:*` attributes (with a leading space) for namespaces the root
    /// does not declare, to put on a newly built element.
    pub fn missing_declarations(&self) -> String {
        let mut decls = String::new();
        let all = [
            (&self.p, namespace::PML_MAIN),
            (&self.a, namespace::DML_MAIN),
            (&self.r, namespace::OFC_RELATIONSHIPS),
        ];
        for (declared, (prefix, uri)) in self.declared.iter().zip(all) {
            if !declared {
                decls.push_str(&format!(r#" xmlns:{}="{}""#, prefix, uri));
            }
        }
        decls
    }
}

/// A slide, slide layout or slide master part.
#[derive(Debug, Clone)]
pub struct SlidePart {
    partname: PackURI,
    doc: XmlDocument,
    dirty: bool,
}

impl SlidePart {
    /// Parse a slide-like part.
    pub fn from_xml(partname: PackURI, xml: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(xml)?;
        let part = Self {
            partname,
            doc,
            dirty: false,
        };
        part.sp_tree()?;
        Ok(part)
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn root(&self) -> &XmlElement {
        self.doc.root()
    }

    /// Prefixes bound on the root element.
    pub fn prefixes(&self) -> Prefixes {
        Prefixes::from_root(self.doc.root())
    }

    /// The `<p:spTree>` under `<p:cSld>`.
    pub fn sp_tree(&self) -> Result<&XmlElement> {
        self.doc
            .root()
            .descend(&["cSld", "spTree"])
            .ok_or_else(|| self.missing_sp_tree())
    }

    /// The shape tree, mutably; marks the part dirty.
    pub fn sp_tree_mut(&mut self) -> Result<&mut XmlElement> {
        let err = self.missing_sp_tree();
        self.dirty = true;
        self.doc
            .root_mut()
            .child_mut("cSld")
            .and_then(|c| c.child_mut("spTree"))
            .ok_or(err)
    }

    fn missing_sp_tree(&self) -> OoxmlError {
        OoxmlError::InvalidFormat(format!("{} has no p:cSld/p:spTree", self.partname))
    }

    /// Largest `p:cNvPr` id anywhere in the shape tree, groups included.
    pub fn max_shape_id(&self) -> Result<u32> {
        fn walk(el: &XmlElement, max: &mut u32) {
            for child in el.children() {
                if child.local_name() == b"cNvPr" {
                    if let Some(id) = child.attr_u32("id") {
                        *max = (*max).max(id);
                    }
                } else {
                    walk(child, max);
                }
            }
        }

        let mut max = 0;
        walk(self.sp_tree()?, &mut max);
        Ok(max)
    }

    /// Whether the tree was handed out mutably since load.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize the tree.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.doc.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:grpSp><p:nvGrpSpPr><p:cNvPr id="9" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="14" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp></p:grpSp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_max_shape_id_includes_group_members() {
        let part = SlidePart::from_xml(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            SLIDE.as_bytes(),
        )
        .unwrap();
        assert_eq!(part.max_shape_id().unwrap(), 14);
        assert!(!part.is_dirty());
    }

    #[test]
    fn test_prefixes_follow_the_part() {
        let xml = r#"<pml:sld xmlns:pml="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:d="http://schemas.openxmlformats.org/drawingml/2006/main"><pml:cSld><pml:spTree/></pml:cSld></pml:sld>"#;
        let part =
            SlidePart::from_xml(PackURI::new("/ppt/slides/slide2.xml").unwrap(), xml.as_bytes())
                .unwrap();
        let ns = part.prefixes();
        assert_eq!(ns.p, "pml");
        assert_eq!(ns.a, "d");
        assert_eq!(ns.r, "r");
        assert_eq!(
            ns.missing_declarations(),
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#
        );
    }

    #[test]
    fn test_part_without_shape_tree_is_rejected() {
        let xml = br#"<p:sld xmlns:p="urn:p"><p:cSld/></p:sld>"#;
        assert!(
            SlidePart::from_xml(PackURI::new("/ppt/slides/slide3.xml").unwrap(), xml).is_err()
        );
    }
}

//! Picture (image) shape construction.
use crate::ooxml::error::Result;
use crate::ooxml::pptx::parts::slide::Prefixes;
use crate::ooxml::pptx::shapes::base::BoundingBox;
use crate::ooxml::xml::XmlElement;
use quick_xml::escape::escape;

/// What a new `<p:pic>` is made of.
#[derive(Debug, Clone)]
pub struct NewPicture<'a> {
    pub shape_id: u32,
    pub name: &'a str,
    pub descr: &'a str,
    /// Relationship id of the image part from the slide
    pub r_id: &'a str,
    pub bounding_box: BoundingBox,
}

impl NewPicture<'_> {
    /// Build the `<p:pic>` element, using the prefixes bound in the target
    /// part (and declaring any it lacks on the element itself).
    pub fn to_element(&self, ns: &Prefixes) -> Result<XmlElement> {
        let (p, a, r) = (ns.p.as_str(), ns.a.as_str(), ns.r.as_str());
        let bbox = &self.bounding_box;

        let xml = format!(
            r#"<{p}:pic{decls}><{p}:nvPicPr><{p}:cNvPr id="{id}" name="{name}" descr="{descr}"/><{p}:cNvPicPr><{a}:picLocks noChangeAspect="1"/></{p}:cNvPicPr><{p}:nvPr/></{p}:nvPicPr><{p}:blipFill><{a}:blip {r}:embed="{r_id}"/><{a}:stretch><{a}:fillRect/></{a}:stretch></{p}:blipFill><{p}:spPr><{a}:xfrm><{a}:off x="{x}" y="{y}"/><{a}:ext cx="{cx}" cy="{cy}"/></{a}:xfrm><{a}:prstGeom prst="rect"><{a}:avLst/></{a}:prstGeom></{p}:spPr></{p}:pic>"#,
            decls = ns.missing_declarations(),
            id = self.shape_id,
            name = escape(self.name),
            descr = escape(self.descr),
            r_id = escape(self.r_id),
            x = bbox.left,
            y = bbox.top,
            cx = bbox.width,
            cy = bbox.height,
        );

        XmlElement::parse_fragment(&xml)
    }
}

//! Base shape types for PowerPoint presentations.
//!
//! A [`Shape`] is a borrowed view over one direct child of `<p:spTree>`. It
//! never caches anything, so it cannot go stale: once the slide is mutated the
//! borrow checker forces callers to look the shape up again.
use crate::ooxml::pptx::shapes::textframe::TextFrame;
use crate::ooxml::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Element kind of a shape-tree child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// `p:sp`
    AutoShape,
    /// `p:pic`
    Picture,
    /// `p:graphicFrame` (table, chart, diagram, OLE object)
    GraphicFrame,
    /// `p:grpSp`
    Group,
    /// `p:cxnSp`
    Connector,
    /// `p:contentPart` (ink)
    ContentPart,
}

impl ShapeKind {
    /// Kind of a `p:spTree` child, or `None` for non-shape children such as
    /// `p:nvGrpSpPr` and `p:extLst`.
    pub fn from_local_name(local: &[u8]) -> Option<Self> {
        match local {
            b"sp" => Some(Self::AutoShape),
            b"pic" => Some(Self::Picture),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"grpSp" => Some(Self::Group),
            b"cxnSp" => Some(Self::Connector),
            b"contentPart" => Some(Self::ContentPart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoShape => "sp",
            Self::Picture => "pic",
            Self::GraphicFrame => "graphicFrame",
            Self::Group => "grpSp",
            Self::Connector => "cxnSp",
            Self::ContentPart => "contentPart",
        }
    }
}

/// Shape type enumeration.
///
/// What the engine can do with a shape: replace its text, replace its image,
/// or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// An autoshape; always carries a text frame
    Text,
    /// A picture holding a still image
    Picture,
    /// Anything else, including audio/video pictures
    Other(ShapeKind),
}

/// Position and size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// The `<p:ph>` marker of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    pub idx: Option<u32>,
    /// `type` attribute; absent means `obj`
    pub ph_type: Option<String>,
}

/// Media payload markers inside `p:nvPr` that turn a picture into a movie or
/// sound frame.
const MEDIA_MARKERS: &[&[u8]] = &[
    b"audioFile",
    b"videoFile",
    b"quickTimeFile",
    b"wavAudioFile",
    b"audioCd",
];

/// A read-only view of one shape on a slide.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    element: &'a XmlElement,
    kind: ShapeKind,
    /// Node position inside `p:spTree`
    position: usize,
    /// Geometry of the matching layout/master placeholder
    inherited: Option<BoundingBox>,
}

impl<'a> Shape<'a> {
    pub(crate) fn new(
        element: &'a XmlElement,
        kind: ShapeKind,
        position: usize,
        inherited: Option<BoundingBox>,
    ) -> Self {
        Self {
            element,
            kind,
            position,
            inherited,
        }
    }

    /// The `p:nvXxxPr` child (`p:nvSpPr`, `p:nvPicPr`, ...).
    fn non_visual(&self) -> Option<&'a XmlElement> {
        self.element
            .children()
            .find(|e| e.local_name().starts_with(b"nv"))
    }

    fn c_nv_pr(&self) -> Option<&'a XmlElement> {
        self.non_visual().and_then(|nv| nv.child("cNvPr"))
    }

    fn nv_pr(&self) -> Option<&'a XmlElement> {
        self.non_visual().and_then(|nv| nv.child("nvPr"))
    }

    /// `id` of `p:cNvPr`.
    pub fn shape_id(&self) -> Option<u32> {
        self.c_nv_pr().and_then(|c| c.attr_u32("id"))
    }

    /// `name` of `p:cNvPr`.
    pub fn name(&self) -> String {
        self.c_nv_pr()
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
    }

    /// Alt text (`descr` of `p:cNvPr`).
    pub fn description(&self) -> String {
        self.c_nv_pr()
            .and_then(|c| c.attr("descr"))
            .unwrap_or_default()
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn shape_type(&self) -> ShapeType {
        match self.kind {
            ShapeKind::AutoShape => ShapeType::Text,
            ShapeKind::Picture if !self.is_media() => ShapeType::Picture,
            kind => ShapeType::Other(kind),
        }
    }

    fn is_media(&self) -> bool {
        self.nv_pr().is_some_and(|nv| {
            nv.children()
                .any(|e| MEDIA_MARKERS.iter().any(|m| *m == e.local_name()))
        })
    }

    /// Node position inside `p:spTree`; valid until the tree changes.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The underlying element.
    #[inline]
    pub fn element(&self) -> &'a XmlElement {
        self.element
    }

    /// Placeholder marker, when this shape is a placeholder.
    pub fn placeholder(&self) -> Option<PlaceholderRef> {
        let ph = self.nv_pr()?.child("ph")?;
        Some(PlaceholderRef {
            idx: ph.attr_u32("idx"),
            ph_type: ph.attr("type"),
        })
    }

    /// Geometry written on the shape itself.
    pub fn own_bounding_box(&self) -> Option<BoundingBox> {
        let xfrm = self
            .element
            .child("spPr")
            .or_else(|| self.element.child("grpSpPr"))
            .and_then(|pr| pr.child("xfrm"))
            .or_else(|| self.element.child("xfrm"))?;
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        Some(BoundingBox {
            left: off.attr_i64("x")?,
            top: off.attr_i64("y")?,
            width: ext.attr_i64("cx")?,
            height: ext.attr_i64("cy")?,
        })
    }

    /// Effective geometry: the shape's own transform, else the one its
    /// placeholder inherits.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.own_bounding_box().or(self.inherited)
    }

    /// Check if this shape has a text frame.
    #[inline]
    pub fn has_text_frame(&self) -> bool {
        self.kind == ShapeKind::AutoShape
    }

    /// The `p:txBody`, if the shape has one yet.
    pub fn text_frame(&self) -> Option<TextFrame<'a>> {
        if !self.has_text_frame() {
            return None;
        }
        self.element.child("txBody").map(TextFrame::new)
    }

    /// Text of the shape; empty when it has none.
    pub fn text(&self) -> String {
        self.text_frame().map(|tf| tf.text()).unwrap_or_default()
    }

    /// Relationship id of the embedded image (`a:blip/@r:embed`).
    pub fn image_r_id(&self) -> Option<String> {
        let blip = self.element.child("blipFill")?.child("blip")?;
        blip.attrs()
            .into_iter()
            .find(|(key, _)| key.rsplit(':').next() == Some("embed") && key.contains(':'))
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(xml: &str) -> XmlElement {
        XmlElement::parse_fragment(xml).unwrap()
    }

    fn view(el: &XmlElement, inherited: Option<BoundingBox>) -> Shape<'_> {
        let kind = ShapeKind::from_local_name(el.local_name()).unwrap();
        Shape::new(el, kind, 0, inherited)
    }

    #[test]
    fn test_autoshape_identity_and_geometry() {
        let el = shape(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Title 3"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="100" y="50"/><a:ext cx="200" cy="100"/></a:xfrm></p:spPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:t>Hi</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let s = view(&el, None);
        assert_eq!(s.shape_id(), Some(4));
        assert_eq!(s.name(), "Title 3");
        assert_eq!(s.shape_type(), ShapeType::Text);
        assert_eq!(
            s.bounding_box(),
            Some(BoundingBox {
                left: 100,
                top: 50,
                width: 200,
                height: 100
            })
        );
        assert_eq!(s.text(), "Hi");
    }

    #[test]
    fn test_placeholder_falls_back_to_inherited_geometry() {
        let el = shape(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
        );
        let inherited = BoundingBox {
            left: 1,
            top: 2,
            width: 3,
            height: 4,
        };
        let s = view(&el, Some(inherited));
        assert_eq!(s.own_bounding_box(), None);
        assert_eq!(s.bounding_box(), Some(inherited));
        assert_eq!(
            s.placeholder(),
            Some(PlaceholderRef {
                idx: Some(1),
                ph_type: Some("body".to_string())
            })
        );
        assert!(s.has_text_frame());
        assert!(s.text_frame().is_none());
        assert_eq!(s.text(), "");
    }

    #[test]
    fn test_picture_and_media_picture() {
        let pic = shape(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="7" name="Picture 6"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
<p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr/></p:pic>"#,
        );
        let s = view(&pic, None);
        assert_eq!(s.shape_type(), ShapeType::Picture);
        assert_eq!(s.image_r_id().as_deref(), Some("rId2"));
        assert!(s.text_frame().is_none());

        let movie = shape(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="8" name="Movie"/><p:cNvPicPr/><p:nvPr><a:videoFile r:link="rId3"/></p:nvPr></p:nvPicPr><p:spPr/></p:pic>"#,
        );
        assert_eq!(
            view(&movie, None).shape_type(),
            ShapeType::Other(ShapeKind::Picture)
        );
    }

    #[test]
    fn test_graphic_frame_uses_its_own_xfrm() {
        let el = shape(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="9" name="Table"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>
<p:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></p:xfrm></p:graphicFrame>"#,
        );
        let s = view(&el, None);
        assert_eq!(s.shape_type(), ShapeType::Other(ShapeKind::GraphicFrame));
        assert_eq!(s.bounding_box().map(|b| b.height), Some(40));
        assert_eq!(s.text(), "");
    }
}

//! Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::layout::{InheritedGeometry, PlaceholderGeometry};
use crate::ooxml::pptx::media::{self, EmbeddableImage};
use crate::ooxml::pptx::parts::presentation::PresentationPart;
use crate::ooxml::pptx::parts::slide::SlidePart;
use crate::ooxml::pptx::slide::Slide;
use std::collections::HashMap;
use std::path::Path;

/// Main-part content types accepted as a presentation.
const PRESENTATION_TYPES: &[&str] = &[
    ct::PML_PRESENTATION_MAIN,
    ct::PML_PRES_MACRO_MAIN,
    ct::PML_TEMPLATE_MAIN,
    ct::PML_SLIDESHOW_MAIN,
];

/// A PowerPoint (.pptx) package.
///
/// Wraps an OPC package with its slides parsed into editable trees. Slides
/// that were never edited are written back with their original bytes.
pub struct Package {
    opc: OpcPackage,
    slides: Vec<Slide>,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Load a .pptx package from its bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main = opc
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = opc.content_type(&main)?;
        if !PRESENTATION_TYPES.contains(&content_type) {
            return Err(OoxmlError::InvalidContentType {
                expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN),
                got: content_type.to_string(),
            });
        }

        let presentation = PresentationPart::from_xml(opc.blob(&main)?)?;
        let pres_rels = opc.rels_for(&main)?;

        let mut inherited_by_layout: HashMap<PackURI, InheritedGeometry> = HashMap::new();
        let mut slides = Vec::with_capacity(presentation.slide_count());

        for slide_ref in presentation.slide_refs() {
            let partname = pres_rels.target_partname(&slide_ref.r_id)?;
            let part = SlidePart::from_xml(partname.clone(), opc.blob(&partname)?)?;
            let rels = opc.rels_for(&partname)?;

            let inherited = match rels.part_with_reltype(rt::SLIDE_LAYOUT) {
                Ok(layout) => match inherited_by_layout.get(&layout) {
                    Some(inherited) => inherited.clone(),
                    None => {
                        let inherited = load_inherited(&opc, &layout)?;
                        inherited_by_layout.insert(layout, inherited.clone());
                        inherited
                    },
                },
                Err(_) => InheritedGeometry::default(),
            };

            slides.push(Slide::new(slide_ref.slide_id, part, rels, inherited));
        }

        Ok(Self { opc, slides })
    }

    /// Slides in presentation order.
    #[inline]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// The slide with `p:sldId/@id == slide_id`.
    pub fn slide(&self, slide_id: u32) -> Option<&Slide> {
        self.slides.iter().find(|s| s.slide_id() == slide_id)
    }

    pub fn slide_mut(&mut self, slide_id: u32) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.slide_id() == slide_id)
    }

    /// Embed an image for use on a slide; returns the slide's relationship
    /// id to it.
    pub fn add_image(&mut self, slide_id: u32, image: &EmbeddableImage) -> Result<String> {
        let Self { opc, slides } = self;
        let slide = slides
            .iter_mut()
            .find(|s| s.slide_id() == slide_id)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("slide {}", slide_id)))?;
        let partname = media::add_image_part(opc, image)?;
        slide.relate_image(&partname)
    }

    /// Write pending slide changes into the package and serialize it.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        for slide in &self.slides {
            slide.flush(&mut self.opc)?;
        }
        Ok(self.opc.to_bytes()?)
    }

    /// The underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}

/// Placeholder geometry of a layout and of the master behind it.
fn load_inherited(opc: &OpcPackage, layout: &PackURI) -> Result<InheritedGeometry> {
    let layout_part = SlidePart::from_xml(layout.clone(), opc.blob(layout)?)?;
    let layout_geometry = PlaceholderGeometry::from_part(&layout_part)?;

    let master_geometry = match opc.rels_for(layout)?.part_with_reltype(rt::SLIDE_MASTER) {
        Ok(master) => {
            let master_part = SlidePart::from_xml(master.clone(), opc.blob(&master)?)?;
            PlaceholderGeometry::from_part(&master_part)?
        },
        Err(_) => PlaceholderGeometry::default(),
    };

    Ok(InheritedGeometry::new(layout_geometry, master_geometry))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ooxml::opc::package::tests::zip_of;
    use crate::ooxml::pptx::shapes::base::{BoundingBox, ShapeType};

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/slides/slide2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/></Types>"#;

    const PKG_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#;

    const PRES_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/></Relationships>"#;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/></Relationships>"#;

    const SLIDE2_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/></Relationships>"#;

    const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

    const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

    fn text_shape(id: u32, text: &str, bbox: (i64, i64, i64, i64)) -> String {
        let (x, y, cx, cy) = bbox;
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="2800" b="1"><a:latin typeface="Georgia"/></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
        )
    }

    fn picture(id: u32, bbox: (i64, i64, i64, i64)) -> String {
        let (x, y, cx, cy) = bbox;
        format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
        )
    }

    /// Two slides (ids 256 and 257). Slide 256: text `256_1` ("Old"),
    /// picture `256_2` (300x200 at 1000,500), a title placeholder `256_3`
    /// without its own transform. Slide 257: text `257_1` ("Second").
    pub(crate) fn two_slide_deck() -> Vec<u8> {
        let slide1 = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld><p:spTree>{GROUP_PROPS}{}{}<p:sp><p:nvSpPr><p:cNvPr id="3" name="Title 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            text_shape(1, "Old", (100, 50, 200, 100)),
            picture(2, (1000, 500, 300, 200)),
        );
        let slide2 = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld><p:spTree>{GROUP_PROPS}{}</p:spTree></p:cSld></p:sld>"#,
            text_shape(1, "Second", (0, 0, 10, 10)),
        );
        let layout = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {NS}><p:cSld><p:spTree>{GROUP_PROPS}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#
        );
        let master = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {NS}><p:cSld><p:spTree>{GROUP_PROPS}</p:spTree></p:cSld></p:sldMaster>"#
        );
        let png = crate::ooxml::pptx::media::tests::png(30, 20);

        zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PKG_RELS.as_bytes()),
            ("ppt/presentation.xml", PRESENTATION.as_bytes()),
            ("ppt/_rels/presentation.xml.rels", PRES_RELS.as_bytes()),
            ("ppt/slides/slide1.xml", slide1.as_bytes()),
            ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS.as_bytes()),
            ("ppt/slides/slide2.xml", slide2.as_bytes()),
            ("ppt/slides/_rels/slide2.xml.rels", SLIDE2_RELS.as_bytes()),
            ("ppt/slideLayouts/slideLayout1.xml", layout.as_bytes()),
            ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS.as_bytes()),
            ("ppt/slideMasters/slideMaster1.xml", master.as_bytes()),
            ("ppt/media/image1.png", png.as_slice()),
        ])
    }

    #[test]
    fn test_slides_and_shapes_in_document_order() {
        let pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let ids: Vec<u32> = pkg.slides().iter().map(|s| s.slide_id()).collect();
        assert_eq!(ids, vec![256, 257]);

        let slide = pkg.slide(256).unwrap();
        let shapes = slide.shapes().unwrap();
        let shape_ids: Vec<Option<u32>> = shapes.iter().map(|s| s.shape_id()).collect();
        assert_eq!(shape_ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(shapes[0].shape_type(), ShapeType::Text);
        assert_eq!(shapes[0].text(), "Old");
        assert_eq!(shapes[1].shape_type(), ShapeType::Picture);
    }

    #[test]
    fn test_title_placeholder_inherits_layout_geometry() {
        let pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let title = pkg.slide(256).unwrap().shape(3).unwrap().unwrap();
        assert_eq!(
            title.bounding_box(),
            Some(BoundingBox {
                left: 457200,
                top: 274638,
                width: 8229600,
                height: 1143000
            })
        );
    }

    #[test]
    fn test_unedited_package_keeps_part_bytes() {
        let original = two_slide_deck();
        let mut pkg = Package::from_bytes(&original).unwrap();
        let saved = pkg.to_bytes().unwrap();

        let before = OpcPackage::from_bytes(&original).unwrap();
        let after = OpcPackage::from_bytes(&saved).unwrap();
        for partname in before.partnames() {
            assert_eq!(before.blob(&partname).unwrap(), after.blob(&partname).unwrap());
        }
    }

    #[test]
    fn test_non_presentation_is_rejected() {
        let bytes = zip_of(&[
            (
                "[Content_Types].xml",
                br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#,
            ),
            ("_rels/.rels", PKG_RELS.as_bytes()),
            ("ppt/presentation.xml", b"<x/>"),
        ]);
        assert!(matches!(
            Package::from_bytes(&bytes),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }
}

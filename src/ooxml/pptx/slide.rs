//! Slides of a loaded presentation.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};
use crate::ooxml::pptx::layout::InheritedGeometry;
use crate::ooxml::pptx::parts::slide::{Prefixes, SlidePart};
use crate::ooxml::pptx::shapes::base::{Shape, ShapeKind};
use crate::ooxml::pptx::shapes::textframe;
use crate::ooxml::xml::{XmlElement, XmlNode};

/// A slide in a presentation.
///
/// Shapes are read through borrowed [`Shape`] views. Mutations address a
/// shape by its node position in `p:spTree`, which callers take from a view
/// right before mutating.
#[derive(Debug, Clone)]
pub struct Slide {
    slide_id: u32,
    part: SlidePart,
    rels: Relationships,
    rels_dirty: bool,
    inherited: InheritedGeometry,
}

impl Slide {
    pub(crate) fn new(
        slide_id: u32,
        part: SlidePart,
        rels: Relationships,
        inherited: InheritedGeometry,
    ) -> Self {
        Self {
            slide_id,
            part,
            rels,
            rels_dirty: false,
            inherited,
        }
    }

    /// Document-scoped slide id from `p:sldId/@id`.
    #[inline]
    pub fn slide_id(&self) -> u32 {
        self.slide_id
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        self.part.partname()
    }

    /// Shapes in shape-tree order.
    pub fn shapes(&self) -> Result<Vec<Shape<'_>>> {
        let sp_tree = self.part.sp_tree()?;
        let mut shapes = Vec::new();

        for pos in 0..sp_tree.nodes().len() {
            let Some(element) = sp_tree.element_at(pos) else {
                continue;
            };
            let Some(kind) = ShapeKind::from_local_name(element.local_name()) else {
                continue;
            };
            let bare = Shape::new(element, kind, pos, None);
            let inherited = match bare.own_bounding_box() {
                Some(_) => None,
                None => bare
                    .placeholder()
                    .and_then(|ph| self.inherited.resolve(&ph)),
            };
            shapes.push(Shape::new(element, kind, pos, inherited));
        }

        Ok(shapes)
    }

    /// The shape whose `p:cNvPr/@id` is `shape_id`.
    pub fn shape(&self, shape_id: u32) -> Result<Option<Shape<'_>>> {
        Ok(self
            .shapes()?
            .into_iter()
            .find(|s| s.shape_id() == Some(shape_id)))
    }

    /// Namespace prefixes bound in the slide part.
    pub fn prefixes(&self) -> Prefixes {
        self.part.prefixes()
    }

    /// Largest shape id in use on the slide.
    pub fn max_shape_id(&self) -> Result<u32> {
        self.part.max_shape_id()
    }

    /// The text body of the autoshape at `position`, created empty when
    /// missing. `None` if the element there is not an autoshape.
    pub fn text_body_mut(&mut self, position: usize) -> Result<Option<&mut XmlElement>> {
        let ns = self.part.prefixes();
        let sp = self
            .part
            .sp_tree_mut()?
            .element_at_mut(position)
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("no shape at {}", position)))?;
        if sp.local_name() != b"sp" {
            return Ok(None);
        }
        Ok(textframe::ensure_tx_body(sp, &ns.p, &ns.a))
    }

    /// Remove the shape at `position` from the shape tree.
    pub fn remove_shape(&mut self, position: usize) -> Result<XmlElement> {
        let sp_tree = self.part.sp_tree_mut()?;
        if sp_tree.element_at(position).is_none() {
            return Err(OoxmlError::InvalidFormat(format!("no shape at {}", position)));
        }
        match sp_tree.remove_node(position) {
            XmlNode::Element(element) => Ok(element),
            _ => Err(OoxmlError::InvalidFormat(format!("no shape at {}", position))),
        }
    }

    /// Insert a shape at node `position` of the shape tree.
    pub fn insert_shape(&mut self, position: usize, shape: XmlElement) -> Result<()> {
        self.part.sp_tree_mut()?.insert_child(position, shape);
        Ok(())
    }

    /// Add a shape on top of all others (before a trailing `p:extLst`).
    pub fn append_shape(&mut self, shape: XmlElement) -> Result<()> {
        let sp_tree = self.part.sp_tree_mut()?;
        match sp_tree
            .element_positions(|e| e.local_name() == b"extLst")
            .first()
        {
            Some(&pos) => sp_tree.insert_child(pos, shape),
            None => sp_tree.push_child(shape),
        }
        Ok(())
    }

    /// Relationship id from this slide to an image part, adding one if
    /// needed.
    pub fn relate_image(&mut self, image: &PackURI) -> Result<String> {
        let r_id = self.rels.get_or_add(rt::IMAGE, image)?;
        self.rels_dirty = true;
        Ok(r_id)
    }

    /// Write pending changes back into the package.
    pub(crate) fn flush(&self, opc: &mut OpcPackage) -> Result<()> {
        if self.part.is_dirty() {
            opc.set_blob(self.part.partname(), self.part.to_bytes()?)?;
        }
        if self.rels_dirty {
            opc.set_rels(self.part.partname(), &self.rels)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ooxml::opc::OpcPackage;
    use crate::ooxml::pptx::package::Package;
    use crate::ooxml::pptx::package::tests::two_slide_deck;
    use crate::ooxml::pptx::shapes::textframe;
    use crate::ooxml::xml::XmlElement;

    #[test]
    fn test_text_body_is_created_for_bare_autoshape() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let slide = pkg.slide_mut(256).unwrap();
        let bare = XmlElement::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="9" name="Bare"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
        )
        .unwrap();
        slide.append_shape(bare).unwrap();

        let position = slide.shape(9).unwrap().unwrap().position();
        let body = slide.text_body_mut(position).unwrap().unwrap();
        textframe::collapse_into_first_run(body, "a", "Filled");

        assert_eq!(slide.shape(9).unwrap().unwrap().text(), "Filled");
        assert_eq!(slide.max_shape_id().unwrap(), 9);
    }

    #[test]
    fn test_pictures_have_no_text_body() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let slide = pkg.slide_mut(256).unwrap();
        let position = slide.shape(2).unwrap().unwrap().position();
        assert!(slide.text_body_mut(position).unwrap().is_none());
    }

    #[test]
    fn test_remove_and_reinsert_keeps_order() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let slide = pkg.slide_mut(256).unwrap();
        let position = slide.shape(2).unwrap().unwrap().position();

        let removed = slide.remove_shape(position).unwrap();
        assert!(slide.shape(2).unwrap().is_none());
        slide.insert_shape(position, removed).unwrap();

        let ids: Vec<Option<u32>> = slide
            .shapes()
            .unwrap()
            .iter()
            .map(|s| s.shape_id())
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_edits_reach_saved_package() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        {
            let slide = pkg.slide_mut(257).unwrap();
            let position = slide.shape(1).unwrap().unwrap().position();
            let body = slide.text_body_mut(position).unwrap().unwrap();
            textframe::collapse_into_first_run(body, "a", "Saved");
        }
        let saved = pkg.to_bytes().unwrap();

        let reopened = Package::from_bytes(&saved).unwrap();
        let shape_text = reopened.slide(257).unwrap().shape(1).unwrap().unwrap().text();
        assert_eq!(shape_text, "Saved");

        // slide 256 was not touched
        let before = OpcPackage::from_bytes(&two_slide_deck()).unwrap();
        let after = OpcPackage::from_bytes(&saved).unwrap();
        let partname = reopened.slide(256).unwrap().partname().clone();
        assert_eq!(before.blob(&partname).unwrap(), after.blob(&partname).unwrap());
    }
}

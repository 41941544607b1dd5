//! Presentation part - the main part in a .pptx package.
//!
//! Corresponds to `/ppt/presentation.xml` in the package. Only the slide list
//! is read; the part itself is never rewritten.
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One `<p:sldId>` entry of `<p:sldIdLst>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Document-scoped slide id (`id` attribute, 256 and up)
    pub slide_id: u32,

    /// Relationship from the presentation part to the slide part
    pub r_id: String,
}

/// The slide list of the main presentation part.
#[derive(Debug, Clone)]
pub struct PresentationPart {
    slide_refs: Vec<SlideRef>,
}

impl PresentationPart {
    /// Parse the slide list out of presentation.xml.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut slide_refs = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"sldId" {
                        let mut slide_id = None;
                        let mut r_id = None;
                        for attr in e.attributes().flatten() {
                            // `id` is unqualified; the relationship id is `r:id`
                            // under whatever prefix the part bound
                            if attr.key.local_name().as_ref() != b"id" {
                                continue;
                            }
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                            if attr.key.prefix().is_some() {
                                r_id = Some(value.to_string());
                            } else {
                                slide_id = atoi_simd::parse::<u32, false, false>(value.trim().as_bytes()).ok();
                            }
                        }

                        match (slide_id, r_id) {
                            (Some(slide_id), Some(r_id)) => slide_refs.push(SlideRef { slide_id, r_id }),
                            _ => {
                                return Err(OoxmlError::InvalidFormat(
                                    "p:sldId without a numeric id and r:id".to_string(),
                                ));
                            },
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { slide_refs })
    }

    /// Slides in presentation order.
    #[inline]
    pub fn slide_refs(&self) -> &[SlideRef] {
        &self.slide_refs
    }

    /// Get the number of slides in the presentation.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slide_refs.len()
    }
}

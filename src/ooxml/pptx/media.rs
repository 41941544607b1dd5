//! Image media parts.
//!
//! Replacement images are decoded once to validate them and learn their pixel
//! size, then stored under `/ppt/media/imageN.<ext>`. A media part with the
//! same bytes is reused rather than duplicated.

use crate::ooxml::error::Result;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::format::ImageFormat;
use sha2::{Digest, Sha256};
use std::io::Cursor;

const MEDIA_DIR: &str = "/ppt/media/";

/// A validated image ready to be embedded.
#[derive(Debug, Clone)]
pub struct EmbeddableImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl EmbeddableImage {
    /// Decode `bytes`. Formats a slide can carry natively are kept as they
    /// are; any other decodable raster is re-encoded to PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> image::ImageResult<Self> {
        let sniffed = image::guess_format(&bytes)?;
        let decoded = image::ImageReader::with_format(Cursor::new(&bytes), sniffed).decode()?;
        let (width, height) = (decoded.width(), decoded.height());

        match ImageFormat::from_sniffed(sniffed) {
            Some(format) => Ok(Self {
                bytes,
                format,
                width,
                height,
            }),
            None => {
                let mut png = Cursor::new(Vec::new());
                decoded.write_to(&mut png, image::ImageFormat::Png)?;
                Ok(Self {
                    bytes: png.into_inner(),
                    format: ImageFormat::Png,
                    width,
                    height,
                })
            },
        }
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Pixel size `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Store `image` as a media part and return its partname, reusing an
/// existing part with identical content.
pub fn add_image_part(opc: &mut OpcPackage, image: &EmbeddableImage) -> Result<PackURI> {
    let media: Vec<PackURI> = opc
        .partnames()
        .filter(|p| p.as_str().starts_with(MEDIA_DIR))
        .filter(|p| ImageFormat::from_extension(p.ext()).is_some())
        .collect();

    let digest = Sha256::digest(image.bytes());
    for partname in &media {
        if Sha256::digest(opc.blob(partname)?) == digest {
            return Ok(partname.clone());
        }
    }

    let n = next_image_number(&media);
    let partname = PackURI::from_membername(&format!(
        "ppt/media/image{}.{}",
        n,
        image.format().extension()
    ));
    opc.add_part(&partname, image.format().mime_type(), image.bytes().to_vec())?;
    Ok(partname)
}

/// Lowest `N` not used by any `imageN.*` media part.
fn next_image_number(media: &[PackURI]) -> u32 {
    let mut used: Vec<u32> = media
        .iter()
        .filter_map(|p| p.filename().strip_prefix("image"))
        .filter_map(|rest| rest.split('.').next())
        .filter_map(|n| atoi_simd::parse::<u32, false, false>(n.as_bytes()).ok())
        .collect();
    used.sort_unstable();
    used.dedup();

    let mut next = 1;
    for n in used {
        if n == next {
            next += 1;
        } else if n > next {
            break;
        }
    }
    next
}

//! Image formats that can be embedded in a slide as-is.

use phf::phf_map;

/// Image format types embedded by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

/// Media part extensions, lowercased.
static EXTENSIONS: phf::Map<&'static str, ImageFormat> = phf_map! {
    "png" => ImageFormat::Png,
    "jpg" => ImageFormat::Jpeg,
    "jpeg" => ImageFormat::Jpeg,
    "jpe" => ImageFormat::Jpeg,
    "gif" => ImageFormat::Gif,
    "bmp" => ImageFormat::Bmp,
    "dib" => ImageFormat::Bmp,
    "tif" => ImageFormat::Tiff,
    "tiff" => ImageFormat::Tiff,
};

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Format for a media part extension (`JPG` and `jpeg` both map to JPEG).
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS.get(ext.to_ascii_lowercase().as_str()).copied()
    }

    /// Map a sniffed `image` crate format onto an embeddable one; anything
    /// else has to be re-encoded first.
    pub fn from_sniffed(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }
}

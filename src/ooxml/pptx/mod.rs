//! PowerPoint (.pptx) presentation support.
//!
//! - [`Package`]: a loaded .pptx with its slides parsed for editing
//! - [`Slide`]: one slide; shapes are read as [`Shape`] views and edited by
//!   position
//! - [`EmbeddableImage`]: a decoded image ready to go into `/ppt/media/`

pub mod format;
pub mod layout;
pub mod media;
pub mod package;
pub mod parts;
pub mod shapes;
pub mod slide;

pub use format::ImageFormat;
pub use media::EmbeddableImage;
pub use package::Package;
pub use shapes::{BoundingBox, Shape, ShapeKind, ShapeType, TextFrame};
pub use slide::Slide;

//! Shapes on slides: read-only views, text frames and new pictures.
pub mod base;
pub mod picture;
pub mod textframe;

pub use base::{BoundingBox, PlaceholderRef, Shape, ShapeKind, ShapeType};
pub use picture::NewPicture;
pub use textframe::TextFrame;

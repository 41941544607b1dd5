//! Parts of a .pptx package that are parsed rather than carried as bytes.
pub mod presentation;
pub mod slide;

pub use presentation::{PresentationPart, SlideRef};
pub use slide::{Prefixes, SlidePart};

//! Mutation operators.
//!
//! Each operator changes only the shape its key resolves to; the rest of the
//! slide is written back as it was read.
pub mod image;
pub mod text;

pub use image::{StackingPolicy, placement, replace_image};
pub use text::{TextPolicy, replace_text};

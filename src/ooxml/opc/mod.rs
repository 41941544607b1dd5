//! Open Packaging Conventions (OPC) implementation.
//!
//! The container layer of a `.pptx`: part names, content types, relationships
//! and the ZIP archive they live in. Parts are held as bytes; interpreting
//! them is left to [`crate::ooxml::pptx`].

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};

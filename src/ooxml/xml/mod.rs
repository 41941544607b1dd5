//! XML helpers shared by the package and presentation layers.

pub mod tree;

pub use tree::{XmlDocument, XmlElement, XmlNode};

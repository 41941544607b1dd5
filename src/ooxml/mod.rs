//! Office Open XML document model for presentations.
//!
//! The module is organized in layers:
//!
//! 1. **XML** (`xml`): a lossless element tree, so parts can be edited in
//!    place and written back byte-compatible where untouched
//! 2. **OPC** (`opc`): the ZIP container, part names, content types and
//!    relationships
//! 3. **PresentationML** (`pptx`): slides, shapes, placeholder inheritance
//!    and media
//!
//! # Example
//!
//! ```rust,no_run
//! use deckwright::ooxml::pptx::Package;
//!
//! let pkg = Package::open("deck.pptx")?;
//! for slide in pkg.slides() {
//!     for shape in slide.shapes()? {
//!         println!("{}_{:?}: {}", slide.slide_id(), shape.shape_id(), shape.name());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xml;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};

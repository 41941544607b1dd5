//! Shape inventory: every addressable shape with its current content.
use crate::error::Result;
use crate::key::{self, PrimaryKey};
use crate::ooxml::pptx::{Package, ShapeType};
use serde::{Deserialize, Serialize};

/// Value listed for picture shapes in place of text.
pub const IMAGE_SENTINEL: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub primary_key: PrimaryKey,
    /// Shape text, or [`IMAGE_SENTINEL`] for pictures
    pub value: String,
}

/// List the shapes of a deck in document order, leaving out ignored keys.
pub fn list(pkg: &Package, ignore: &[PrimaryKey]) -> Result<Vec<InventoryEntry>> {
    let entries: Vec<InventoryEntry> = key::keyed_shapes(pkg)?
        .into_iter()
        .filter(|(key, _)| !ignore.contains(key))
        .map(|(primary_key, shape)| InventoryEntry {
            primary_key,
            value: match shape.shape_type() {
                ShapeType::Picture => IMAGE_SENTINEL.to_string(),
                _ => shape.text(),
            },
        })
        .collect();

    tracing::debug!(shapes = entries.len(), ignored = ignore.len(), "listed shapes");
    Ok(entries)
}

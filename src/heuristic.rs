//! The heuristic: every shape's key with its content assignment and geometry.
use crate::assignment::{AssignmentTable, ContentAssignment};
use crate::error::Result;
use crate::key::{self, PrimaryKey};
use crate::ooxml::pptx::{BoundingBox, Package};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Assignment and geometry of one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicEntry {
    #[serde(skip)]
    pub key: Option<PrimaryKey>,
    /// `null` for decorative shapes
    pub research: Option<ContentAssignment>,
    /// `null` when the shape has no resolvable transform
    pub bounding_box: Option<BoundingBox>,
}

/// Key to entry, in document order.
///
/// Serializes as a JSON object whose keys are the primary keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heuristic {
    entries: Vec<HeuristicEntry>,
}

impl Heuristic {
    pub fn entries(&self) -> &[HeuristicEntry] {
        &self.entries
    }

    pub fn get(&self, key: &PrimaryKey) -> Option<&HeuristicEntry> {
        self.entries.iter().find(|e| e.key.as_ref() == Some(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the heuristic of a deck against an assignment table.
///
/// Slides in document order, shapes in shape-tree order. A key missing from
/// the table gets a `null` assignment. The result depends only on the two
/// inputs.
pub fn build(pkg: &Package, table: &AssignmentTable) -> Result<Heuristic> {
    let entries: Vec<HeuristicEntry> = key::keyed_shapes(pkg)?
        .into_iter()
        .map(|(key, shape)| HeuristicEntry {
            key: Some(key),
            research: table.get(&key).cloned(),
            bounding_box: shape.bounding_box(),
        })
        .collect();

    tracing::debug!(
        shapes = entries.len(),
        assigned = entries.iter().filter(|e| e.research.is_some()).count(),
        "built heuristic"
    );
    Ok(Heuristic { entries })
}

impl Serialize for Heuristic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            if let Some(key) = &entry.key {
                map.serialize_entry(key, entry)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Heuristic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HeuristicVisitor;

        impl<'de> Visitor<'de> for HeuristicVisitor {
            type Value = Heuristic;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from primary key to heuristic entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Heuristic, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, mut entry)) = map.next_entry::<PrimaryKey, HeuristicEntry>()? {
                    entry.key = Some(key);
                    entries.push(entry);
                }
                Ok(Heuristic { entries })
            }
        }

        deserializer.deserialize_map(HeuristicVisitor)
    }
}

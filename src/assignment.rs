//! Content assignments and the table that maps keys to them.
//!
//! Which content goes where is authored per template, not inferred from the
//! deck. The table is data: loaded from YAML or JSON, or the built-in table of
//! the reference template.
use crate::error::{DeckError, Result};
use crate::key::PrimaryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The role a shape's future content plays.
///
/// Serialized internally tagged by `research_type`. Given-content variants
/// carry a label naming caller-provided data; it travels as `prompt` like the
/// prompts of generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "research_type", rename_all = "snake_case")]
pub enum ContentAssignment {
    /// Generate an image from a prompt
    ImageGen { prompt: String },

    /// Use a caller-provided image (e.g. a chart)
    ImageGiven {
        #[serde(rename = "prompt")]
        label: String,
    },

    /// Generate text from a prompt
    TextGen {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_output_tokens: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recommended_output_tokens: Option<u32>,
    },

    /// Use caller-provided text (e.g. a statistic)
    TextGiven {
        #[serde(rename = "prompt")]
        label: String,
    },

    /// Generate a transit diagram from caller-provided lines
    SubwayGen {
        #[serde(rename = "prompt")]
        label: String,
    },
}

/// Kind of a [`ContentAssignment`], as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchType {
    ImageGen,
    ImageGiven,
    TextGen,
    TextGiven,
    SubwayGen,
}

impl ContentAssignment {
    pub fn research_type(&self) -> ResearchType {
        match self {
            Self::ImageGen { .. } => ResearchType::ImageGen,
            Self::ImageGiven { .. } => ResearchType::ImageGiven,
            Self::TextGen { .. } => ResearchType::TextGen,
            Self::TextGiven { .. } => ResearchType::TextGiven,
            Self::SubwayGen { .. } => ResearchType::SubwayGen,
        }
    }

    /// The prompt or label.
    pub fn prompt(&self) -> &str {
        match self {
            Self::ImageGen { prompt } | Self::TextGen { prompt, .. } => prompt,
            Self::ImageGiven { label } | Self::TextGiven { label } | Self::SubwayGen { label } => {
                label
            },
        }
    }

    /// `(max, recommended)` output tokens for generated text.
    pub fn token_hints(&self) -> (Option<u32>, Option<u32>) {
        match self {
            Self::TextGen {
                max_output_tokens,
                recommended_output_tokens,
                ..
            } => (*max_output_tokens, *recommended_output_tokens),
            _ => (None, None),
        }
    }

    fn text_gen(prompt: &str) -> Self {
        Self::TextGen {
            prompt: prompt.to_string(),
            max_output_tokens: None,
            recommended_output_tokens: None,
        }
    }
}

/// Mapping from key to assignment.
///
/// A key mapped to `null` and a key absent from the table both mean the shape
/// is decorative; listing it explicitly only documents the intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentTable {
    entries: BTreeMap<PrimaryKey, Option<ContentAssignment>>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table; `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DeckError::Config(format!("assignment table {}: {}", path.display(), e))
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let table = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded assignment table");
        Ok(table)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DeckError::Config(e.to_string()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_saphyr::from_str(text).map_err(|e| DeckError::Config(e.to_string()))
    }

    /// Assignment for `key`; `None` when absent or explicitly unassigned.
    pub fn get(&self, key: &PrimaryKey) -> Option<&ContentAssignment> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    pub fn insert(&mut self, key: PrimaryKey, assignment: Option<ContentAssignment>) {
        self.entries.insert(key, assignment);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The table of the reference two-slide research template.
    pub fn reference_template() -> Self {
        let mut table = Self::new();
        let mut put = |slide_id, shape_id, assignment| {
            table.insert(PrimaryKey::new(slide_id, shape_id), assignment)
        };

        put(
            256,
            2,
            Some(ContentAssignment::ImageGen {
                prompt: "Generate an image".to_string(),
            }),
        );
        put(
            256,
            3,
            Some(ContentAssignment::text_gen(
                "Summarize what the research query is in the location we're working on",
            )),
        );
        put(
            256,
            4,
            Some(ContentAssignment::SubwayGen {
                label: "subway_1".to_string(),
            }),
        );
        put(257, 2, None);
        put(
            257,
            3,
            Some(ContentAssignment::ImageGiven {
                label: "chart_1".to_string(),
            }),
        );
        put(
            257,
            4,
            Some(ContentAssignment::TextGiven {
                label: "stats_1".to_string(),
            }),
        );
        put(257, 5, None);
        put(
            257,
            6,
            Some(ContentAssignment::TextGiven {
                label: "stats_2".to_string(),
            }),
        );
        put(257, 7, None);
        put(
            257,
            8,
            Some(ContentAssignment::text_gen(
                "Generate a text based on the research query",
            )),
        );

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_tagged_by_research_type() {
        let json = serde_json::to_value(ContentAssignment::TextGiven {
            label: "stats_1".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"research_type": "text_given", "prompt": "stats_1"})
        );

        let gen_json = serde_json::to_value(ContentAssignment::text_gen("Write")).unwrap();
        assert_eq!(
            gen_json,
            serde_json::json!({"research_type": "text_gen", "prompt": "Write"})
        );
    }

    #[test]
    fn test_yaml_table() {
        let yaml = r#"
"256_2":
  research_type: image_gen
  prompt: A skyline at dusk
"256_3":
  research_type: text_gen
  prompt: Summarize
  max_output_tokens: 120
"256_9": null
"#;
        let table = AssignmentTable::from_yaml(yaml).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get(&PrimaryKey::new(256, 3)).unwrap().token_hints(),
            (Some(120), None)
        );
        assert!(table.get(&PrimaryKey::new(256, 9)).is_none());
        assert!(table.get(&PrimaryKey::new(1, 1)).is_none());
    }

    #[test]
    fn test_bad_keys_and_kinds_are_config_errors() {
        let bad_key = r#"{"256-2": null}"#;
        assert!(matches!(
            AssignmentTable::from_json(bad_key),
            Err(DeckError::Config(_))
        ));
        let bad_kind = r#"{"256_2": {"research_type": "video_gen", "prompt": "x"}}"#;
        assert!(matches!(
            AssignmentTable::from_json(bad_kind),
            Err(DeckError::Config(_))
        ));
    }

    #[test]
    fn test_reference_template() {
        let table = AssignmentTable::reference_template();
        assert_eq!(table.len(), 10);
        let chart = table.get(&"257_3".parse().unwrap()).unwrap();
        assert_eq!(chart.research_type(), ResearchType::ImageGiven);
        assert_eq!(chart.prompt(), "chart_1");
        assert!(table.get(&"257_5".parse().unwrap()).is_none());

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(AssignmentTable::from_json(&json).unwrap(), table);
    }
}

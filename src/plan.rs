//! Planning: turning the inventory and heuristic into research tasks, and the
//! slide jobs that come back from content producers.
use crate::assignment::{ContentAssignment, ResearchType};
use crate::heuristic::Heuristic;
use crate::inventory::InventoryEntry;
use crate::key::PrimaryKey;
use crate::ooxml::pptx::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One piece of content to produce for one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchTask {
    pub reference_element_key: PrimaryKey,
    pub bounding_box: Option<BoundingBox>,
    /// Generation prompt, or the resolved given content
    pub prompt: String,
    pub research_type: ResearchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub chart: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub id: String,
    pub value: String,
}

/// Content the caller already has, referenced by given-content labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidedContent {
    pub charts: Vec<Chart>,
    pub stats: Vec<Stat>,
    pub subway_lines: Vec<String>,
}

impl ProvidedContent {
    /// What a task's prompt becomes; `None` when given content is missing.
    fn resolve(&self, assignment: &ContentAssignment) -> Option<String> {
        match assignment {
            ContentAssignment::ImageGen { prompt } | ContentAssignment::TextGen { prompt, .. } => {
                Some(prompt.clone())
            },
            ContentAssignment::ImageGiven { label } => self
                .charts
                .iter()
                .find(|c| &c.id == label)
                .map(|c| c.chart.clone()),
            ContentAssignment::TextGiven { label } => self
                .stats
                .iter()
                .find(|s| &s.id == label)
                .map(|s| s.value.clone()),
            ContentAssignment::SubwayGen { .. } => {
                (!self.subway_lines.is_empty()).then(|| self.subway_lines.join(" "))
            },
        }
    }
}

/// Research tasks for every listed shape that has an assignment.
///
/// Shapes missing from the heuristic, unassigned shapes, and shapes whose
/// given content was not provided produce no task.
pub fn research_tasks(
    inventory: &[InventoryEntry],
    heuristic: &Heuristic,
    provided: &ProvidedContent,
) -> Vec<ResearchTask> {
    let tasks: Vec<ResearchTask> = inventory
        .iter()
        .filter_map(|item| {
            let key = item.primary_key;
            let entry = heuristic.get(&key)?;
            let assignment = entry.research.as_ref()?;
            let Some(prompt) = provided.resolve(assignment) else {
                debug!(%key, label = assignment.prompt(), "given content not provided");
                return None;
            };
            let (max_output_tokens, recommended_output_tokens) = assignment.token_hints();
            Some(ResearchTask {
                reference_element_key: key,
                bounding_box: entry.bounding_box,
                prompt,
                research_type: assignment.research_type(),
                max_output_tokens,
                recommended_output_tokens,
            })
        })
        .collect();

    debug!(tasks = tasks.len(), listed = inventory.len(), "planned research tasks");
    tasks
}

/// Only `create` jobs exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    #[default]
    Create,
}

/// What a job does to its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "jobTool", rename_all = "lowercase")]
pub enum JobParams {
    /// Replace the shape's text
    Text { content: String },
    /// Replace the picture with the image at `url` (URL or local path)
    Image { url: String },
}

/// Produced content for one shape, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideJob {
    #[serde(rename = "type", default)]
    pub kind: JobKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResearchTask>,
    pub reference_element_key: PrimaryKey,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    pub params: JobParams,
}

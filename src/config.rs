//! Service configuration.
//!
//! Read from YAML; every field has a default, so an empty file (or no file)
//! gives the reference layout: all documents and artifacts side by side in
//! one storage directory.
use crate::error::{DeckError, Result};
use crate::key::PrimaryKey;
use crate::mutate::{StackingPolicy, TextPolicy};
use crate::render::{CommandRenderer, INPUT_PLACEHOLDER, OUTDIR_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base for every relative path below
    pub storage_dir: PathBuf,

    /// The template deck; never modified
    pub source_document: PathBuf,

    /// Result of the mutations applied so far
    pub working_document: PathBuf,

    /// Inventory artifact
    pub shapes_info: PathBuf,

    /// Heuristic artifact
    pub heuristic: PathBuf,

    /// Assignment table (`.json`, else YAML); the reference template's
    /// table when unset
    pub assignment_table: Option<PathBuf>,

    /// Structural shapes left out of the inventory
    pub ignore_keys: Vec<PrimaryKey>,

    /// Image used by `update-image` when no reference is given
    pub default_image: PathBuf,

    pub fetch_timeout_secs: u64,

    pub stacking: StackingPolicy,

    pub text_policy: TextPolicy,

    pub renderer: RendererConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            source_document: PathBuf::from("reference.pptx"),
            working_document: PathBuf::from("reference_updated.pptx"),
            shapes_info: PathBuf::from("shapes_info.json"),
            heuristic: PathBuf::from("heuristic.json"),
            assignment_table: None,
            ignore_keys: vec![
                PrimaryKey::new(257, 2),
                PrimaryKey::new(257, 5),
                PrimaryKey::new(257, 7),
            ],
            default_image: PathBuf::from("image.png"),
            fetch_timeout_secs: 30,
            stacking: StackingPolicy::default(),
            text_policy: TextPolicy::default(),
            renderer: RendererConfig::default(),
        }
    }
}

/// External deck-to-images tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub program: String,
    /// `{input}` and `{outdir}` are substituted
    pub args: Vec<String>,
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "soffice".to_string(),
            args: vec![
                "--headless".to_string(),
                "--convert-to".to_string(),
                "png".to_string(),
                "--outdir".to_string(),
                OUTDIR_PLACEHOLDER.to_string(),
                INPUT_PLACEHOLDER.to_string(),
            ],
            output_dir: PathBuf::from("png"),
            timeout_secs: 120,
        }
    }
}

impl ServiceConfig {
    /// Load from a YAML file, or defaults when `path` is `None` or missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
            .map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(text).map_err(|e| DeckError::Config(e.to_string()))
    }

    /// `path` relative to the storage directory (absolute paths unchanged).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.storage_dir.join(path)
    }

    pub fn source_path(&self) -> PathBuf {
        self.resolve(&self.source_document)
    }

    pub fn working_path(&self) -> PathBuf {
        self.resolve(&self.working_document)
    }

    pub fn shapes_info_path(&self) -> PathBuf {
        self.resolve(&self.shapes_info)
    }

    pub fn heuristic_path(&self) -> PathBuf {
        self.resolve(&self.heuristic)
    }

    pub fn default_image_path(&self) -> PathBuf {
        self.resolve(&self.default_image)
    }

    pub fn render_dir(&self) -> PathBuf {
        self.resolve(&self.renderer.output_dir)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn command_renderer(&self) -> CommandRenderer {
        CommandRenderer::new(
            self.renderer.program.clone(),
            self.renderer.args.clone(),
            Duration::from_secs(self.renderer.timeout_secs),
        )
    }

    /// Create the storage and render directories. Failing here is fatal to
    /// the service.
    pub fn prepare_storage(&self) -> Result<()> {
        for dir in [self.storage_dir.clone(), self.render_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                DeckError::Config(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }
}

//! The operations exposed to outer surfaces.
//!
//! Read-only operations work on the source document. Mutations take the
//! working document (or the source, before the first mutation), apply one
//! change, and atomically save the result as the new working document, one
//! mutation per document at a time.
use crate::assignment::AssignmentTable;
use crate::config::ServiceConfig;
use crate::error::{DeckError, Result};
use crate::heuristic::{self, Heuristic};
use crate::image_source::{ImageFetcher, ImageSource};
use crate::inventory::{self, InventoryEntry};
use crate::key::PrimaryKey;
use crate::mutate;
use crate::ooxml::pptx::{EmbeddableImage, Package};
use crate::plan::{self, JobParams, ProvidedContent, ResearchTask, SlideJob};
use crate::render::{CommandRenderer, RenderOutput, Renderer};
use crate::store::{self, DocumentLocks};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    /// Key of the shape after the change
    pub reference_element_key: PrimaryKey,
    /// The saved working document
    pub document: PathBuf,
}

pub struct DeckService<R = CommandRenderer> {
    config: ServiceConfig,
    table: Arc<AssignmentTable>,
    fetcher: ImageFetcher,
    locks: DocumentLocks,
    renderer: R,
}

impl DeckService<CommandRenderer> {
    /// Build the service a configuration describes, creating its storage
    /// directories.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        config.prepare_storage()?;
        let table = match &config.assignment_table {
            Some(path) => AssignmentTable::from_path(&config.resolve(path))?,
            None => AssignmentTable::reference_template(),
        };
        let renderer = config.command_renderer();
        Ok(Self::with_renderer(config, table, renderer))
    }
}

impl<R: Renderer> DeckService<R> {
    pub fn with_renderer(config: ServiceConfig, table: AssignmentTable, renderer: R) -> Self {
        let fetcher = ImageFetcher::new(config.fetch_timeout());
        Self {
            config,
            table: Arc::new(table),
            fetcher,
            locks: DocumentLocks::new(),
            renderer,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// List the source document's shapes and persist the list.
    #[instrument(skip(self))]
    pub async fn list_shapes(&self) -> Result<Vec<InventoryEntry>> {
        let source = self.config.source_path();
        let ignore = self.config.ignore_keys.clone();
        let path = self.config.shapes_info_path();
        let out = path.clone();
        let entries = blocking(move || {
            let pkg = store::load(&source)?;
            let entries = inventory::list(&pkg, &ignore)?;
            store::write_json(&out, &entries)?;
            Ok(entries)
        })
        .await?;
        info!(shapes = entries.len(), path = %path.display(), "listed shapes");
        Ok(entries)
    }

    /// Build the source document's heuristic and persist it.
    #[instrument(skip(self))]
    pub async fn build_heuristic(&self) -> Result<Heuristic> {
        let source = self.config.source_path();
        let table = Arc::clone(&self.table);
        let path = self.config.heuristic_path();
        let out = path.clone();
        let heuristic = blocking(move || {
            let pkg = store::load(&source)?;
            let heuristic = heuristic::build(&pkg, &table)?;
            store::write_json(&out, &heuristic)?;
            Ok(heuristic)
        })
        .await?;
        info!(shapes = heuristic.len(), path = %path.display(), "built heuristic");
        Ok(heuristic)
    }

    /// Replace the text of one shape in the working document.
    #[instrument(skip(self, content), fields(chars = content.chars().count()))]
    pub async fn update_shape(&self, key: &str, content: &str) -> Result<MutationOutcome> {
        let key: PrimaryKey = key.parse()?;
        let policy = self.config.text_policy;
        let content = content.to_string();
        self.mutate(move |pkg| {
            mutate::replace_text(pkg, &key, &content, policy)?;
            Ok(key)
        })
        .await
    }

    /// Replace one picture in the working document with the image at
    /// `image_ref` (URL or path), or the configured default image.
    #[instrument(skip(self))]
    pub async fn update_image(&self, key: &str, image_ref: Option<&str>) -> Result<MutationOutcome> {
        let key: PrimaryKey = key.parse()?;
        let source = match image_ref {
            Some(reference) => ImageSource::from_reference(reference),
            None => ImageSource::Local(self.config.default_image_path()),
        };
        // fetched before the document is locked
        let image: EmbeddableImage = self.fetcher.fetch(&source).await?;
        let policy = self.config.stacking;
        self.mutate(move |pkg| mutate::replace_image(pkg, &key, &image, policy))
            .await
    }

    /// Apply a job handed back by a content producer.
    #[instrument(skip(self, job), fields(key = %job.reference_element_key))]
    pub async fn apply_job(&self, job: &SlideJob) -> Result<MutationOutcome> {
        let key = job.reference_element_key.to_string();
        match &job.params {
            JobParams::Text { content } => self.update_shape(&key, content).await,
            JobParams::Image { url } => self.update_image(&key, Some(url)).await,
        }
    }

    /// Render the working document to images.
    #[instrument(skip(self))]
    pub async fn convert_to_png(&self) -> Result<RenderOutput> {
        let working = self.config.working_path();
        if !working.is_file() {
            return Err(DeckError::document_not_found(working));
        }
        let images = self
            .renderer
            .render(&working, &self.config.render_dir())
            .await?;
        info!(count = images.len(), "rendered working document");
        Ok(RenderOutput::from(images))
    }

    /// Research tasks from the persisted inventory and heuristic.
    #[instrument(skip(self, provided))]
    pub async fn plan(&self, provided: &ProvidedContent) -> Result<Vec<ResearchTask>> {
        let inventory: Vec<InventoryEntry> = read_json(&self.config.shapes_info_path()).await?;
        let heuristic: Heuristic = read_json(&self.config.heuristic_path()).await?;
        Ok(plan::research_tasks(&inventory, &heuristic, provided))
    }

    /// Load, change, save under the working document's lock. The document
    /// work runs on the blocking pool while the lock is held.
    async fn mutate<F>(&self, change: F) -> Result<MutationOutcome>
    where
        F: FnOnce(&mut Package) -> Result<PrimaryKey> + Send + 'static,
    {
        let working = self.config.working_path();
        let _guard = self.locks.lock(&working).await;

        let base = if working.is_file() {
            working.clone()
        } else {
            self.config.source_path()
        };
        let (from, to) = (base.clone(), working.clone());
        let key = blocking(move || {
            let mut pkg = store::load(&from)?;
            let key = change(&mut pkg)?;
            store::save(&mut pkg, &to)?;
            Ok(key)
        })
        .await?;

        info!(key = %key, base = %base.display(), document = %working.display(), "saved mutation");
        Ok(MutationOutcome {
            reference_element_key: key,
            document: working,
        })
    }
}

/// Run document work on the blocking thread pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DeckError::Io(std::io::Error::other(e)))?
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DeckError::document_not_found(path));
        },
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

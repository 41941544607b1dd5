//! Rendering decks to images through an external tool.
use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Placeholder in renderer arguments for the document path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder in renderer arguments for the output directory.
pub const OUTDIR_PLACEHOLDER: &str = "{outdir}";

/// Turns a document into one image per slide.
pub trait Renderer: Send + Sync {
    /// Render `document` into `out_dir`; returns the produced images sorted
    /// by file name.
    fn render(
        &self,
        document: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;
}

/// What a render produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub images: Vec<PathBuf>,
    pub count: usize,
}

impl From<Vec<PathBuf>> for RenderOutput {
    fn from(images: Vec<PathBuf>) -> Self {
        let count = images.len();
        Self { images, count }
    }
}

/// Runs a configured command line; see [`INPUT_PLACEHOLDER`] and
/// [`OUTDIR_PLACEHOLDER`].
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn expand_args(&self, document: &Path, out_dir: &Path) -> Vec<String> {
        let input = document.display().to_string();
        let outdir = out_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTDIR_PLACEHOLDER, &outdir)
            })
            .collect()
    }
}

impl Renderer for CommandRenderer {
    async fn render(&self, document: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(out_dir).await?;
        for stale in list_pngs(out_dir).await? {
            tokio::fs::remove_file(&stale).await?;
        }

        let args = self.expand_args(document, out_dir);
        debug!(program = %self.program, ?args, "running renderer");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DeckError::Render(format!("cannot start {}: {}", self.program, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DeckError::Render(format!("timed out after {:?}", self.timeout)))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "renderer failed");
            return Err(DeckError::Render(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let images = list_pngs(out_dir).await?;
        debug!(count = images.len(), out_dir = %out_dir.display(), "rendered");
        Ok(images)
    }
}

/// `*.png` files directly in `dir`, sorted by name.
async fn list_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && entry.file_type().await?.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

//! deckwright command-line interface.
//!
//! Each subcommand runs one service operation and prints its result as JSON
//! on stdout. Failures print `{"error": "..."}` and exit with status 1.
use clap::{Parser, Subcommand};
use deckwright::error::{DeckError, ErrorPayload};
use deckwright::plan::{ProvidedContent, SlideJob};
use deckwright::{DeckService, ServiceConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "deckwright")]
#[command(about = "Address, inventory and mutate shapes in a PowerPoint template")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "DECKWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "DECKWRIGHT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every non-ignored shape with its text (or "image")
    ListShapes,

    /// Attach assignments and geometry to every shape
    BuildHeuristic,

    /// Replace the text of one shape
    UpdateShape {
        /// Shape key, `<slide_id>_<shape_id>`
        #[arg(long = "key")]
        reference_element_key: String,
        #[arg(long)]
        content: String,
    },

    /// Replace one picture
    UpdateImage {
        #[arg(long = "key")]
        reference_element_key: String,
        /// URL or local path; the configured default image when omitted
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Render the working document to PNG images
    ConvertToPng,

    /// Research tasks from the persisted inventory and heuristic
    Plan {
        /// JSON file with `charts`, `stats` and `subwayLines`
        #[arg(long)]
        provided: Option<PathBuf>,
    },

    /// Apply a slide job (JSON file)
    ApplyJob {
        #[arg(long)]
        job: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deckwright={}", cli.log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // storage that cannot be prepared is fatal
    let service = match ServiceConfig::load(cli.config.as_deref()).and_then(DeckService::from_config)
    {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "failed to start");
            return fail(&e);
        },
    };

    let result = match cli.command {
        Command::ListShapes => service.list_shapes().await.and_then(|r| to_json(&r)),
        Command::BuildHeuristic => service.build_heuristic().await.and_then(|r| to_json(&r)),
        Command::UpdateShape {
            reference_element_key,
            content,
        } => service
            .update_shape(&reference_element_key, &content)
            .await
            .and_then(|r| to_json(&r)),
        Command::UpdateImage {
            reference_element_key,
            image_url,
        } => service
            .update_image(&reference_element_key, image_url.as_deref())
            .await
            .and_then(|r| to_json(&r)),
        Command::ConvertToPng => service.convert_to_png().await.and_then(|r| to_json(&r)),
        Command::Plan { provided } => {
            let provided = match provided {
                Some(path) => read_json::<ProvidedContent>(&path),
                None => Ok(ProvidedContent::default()),
            };
            match provided {
                Ok(provided) => service.plan(&provided).await.and_then(|r| to_json(&r)),
                Err(e) => Err(e),
            }
        },
        Command::ApplyJob { job } => match read_json::<SlideJob>(&job) {
            Ok(job) => service.apply_job(&job).await.and_then(|r| to_json(&r)),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(error = %e, "operation failed");
            fail(&e)
        },
    }
}

fn fail(err: &DeckError) -> ExitCode {
    let payload = ErrorPayload::from(err);
    println!("{}", serde_json::to_string(&payload).unwrap_or_default());
    ExitCode::FAILURE
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DeckError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DeckError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))
}

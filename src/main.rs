//! OCR Annotator - review and correct OCR output
//!
//! Sends an image to a remote OCR endpoint, draws the recognized polygons and
//! texts over it, and lets the user fix, delete or add annotations before
//! exporting them as JSON and plain text.

mod annotation;
mod config;
mod dashboard;
mod error;
mod export;
mod ocr;
mod render;
mod session;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::ocr::HttpOcrClient;
use crate::render::Renderer;
use crate::session::AnnotationSession;

/// OCR Annotator - review and correct OCR results
#[derive(Parser, Debug)]
#[command(name = "ocr-annotator")]
#[command(about = "Run OCR on an image, edit the recognized text regions, export annotations")]
struct Args {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OCR endpoint URL, overrides the configuration
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Image to process on startup
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Process --image, save annotations and exit without opening a window
    #[arg(long, requires = "image")]
    headless: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(endpoint) = args.endpoint {
        config.ocr.endpoint = endpoint;
    }

    if args.init_config {
        let path = match args.config {
            Some(path) => path,
            None => storage::get_config_dir()?.join("config.toml"),
        };
        config::save_config(&config, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    info!("OCR endpoint: {}", config.ocr.endpoint);

    let endpoint = config.ocr.endpoint.clone();
    let client = HttpOcrClient::new(config.ocr.clone())?;
    let renderer = Renderer::new(config.render.clone()).context("Failed to set up renderer")?;
    info!("Rendered images are written to {:?}", renderer.output_path());
    let session = AnnotationSession::new(Arc::new(client), renderer, config.export.clone());

    match (args.headless, args.image) {
        (true, Some(image)) => run_headless(session, &image),
        (_, image) => {
            info!("Opening annotation window");
            dashboard::run_dashboard(session, endpoint, image)
                .map_err(|e| anyhow::anyhow!("Dashboard error: {e}"))
        }
    }
}

/// Load configuration from `path`, the per-user config file, or defaults
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    let config_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => storage::get_config_dir()
            .ok()
            .map(|dir| dir.join("config.toml"))
            .filter(|p| p.exists()),
    };

    if let Some(config_path) = config_path {
        match config::load_config(&config_path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
            Err(e) => warn!("Ignoring configuration {:?}: {:#}", config_path, e),
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Run OCR, render and save once, printing the status lines
fn run_headless(mut session: AnnotationSession, image: &Path) -> Result<()> {
    let outcome = session.process_image(image);
    println!("{}", outcome.message);
    if !outcome.is_refresh() {
        anyhow::bail!("OCR failed for {}", image.display());
    }
    if let Some(rendered) = outcome.image {
        println!("Rendered: {}", rendered.display());
    }
    for annotation in session.store().list() {
        println!("[{}] {}", annotation.id, annotation.text);
    }

    match session.save() {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(message) => anyhow::bail!("{message}"),
    }
}

//! Run command handler.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gemexec_core::config;
use gemexec_core::core::driver::RequestDriver;
use gemexec_core::providers::gemini::{GeminiClient, GeminiConfig};
use gemexec_core::render::{HtmlDocument, Renderer};
use tracing::info;

const PAGE_TITLE: &str = "gemexec";
const OPEN_FILE_NAME: &str = "gemexec.html";

pub struct RunOptions<'a> {
    pub config: &'a config::Config,
    pub model_override: Option<&'a str>,
    pub prompt_override: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub open: bool,
    pub fragment: bool,
}

pub async fn run(options: RunOptions<'_>) -> Result<()> {
    // Apply overrides if provided
    let config = {
        let mut c = options.config.clone();
        if let Some(model) = options.model_override {
            c.model = non_blank(model, "--model")?;
        }
        if let Some(prompt) = options.prompt_override {
            c.prompt = non_blank(prompt, "--prompt")?;
        }
        c
    };

    // The base URL is resolved only after the credential check passes.
    let driver = RequestDriver::new(
        config.driver_settings(),
        |api_key| -> Result<GeminiClient> {
            let base_url = config
                .gemini_base_url()
                .context("resolve Gemini base URL")?;
            Ok(GeminiClient::new(GeminiConfig::new(api_key, base_url)))
        },
    );

    let mut document = HtmlDocument::new(PAGE_TITLE);
    let outcome = driver.run(&mut Renderer::new(&mut document)).await;
    info!(?outcome, blocks = document.blocks().len(), "run finished");

    let target = output_target(options.output, config.output.as_deref(), options.open);
    match &target {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            document
                .write_to(BufWriter::new(file), options.fragment)
                .with_context(|| format!("write output to {}", path.display()))?;
            info!(path = %path.display(), "wrote rendered document");
        }
        None => document
            .write_to(io::stdout().lock(), options.fragment)
            .context("write output to stdout")?,
    }

    if options.open
        && let Some(path) = &target
    {
        open::that(path).with_context(|| format!("open {}", path.display()))?;
    }

    Ok(())
}

/// Output path: flag > config > temp file when opening > stdout (`None`).
fn output_target(flag: Option<&Path>, configured: Option<&str>, open: bool) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| {
            configured
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| open.then(|| std::env::temp_dir().join(OPEN_FILE_NAME)))
}

fn non_blank(value: &str, flag: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{flag} must not be empty");
    }
    Ok(trimmed.to_string())
}

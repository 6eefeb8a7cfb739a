//! openapi-collection CLI
//!
//! Reads an OpenAPI 3.x document from a file or URL and writes the resolved
//! operation collection as JSON to a file or stdout.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use openapi_collection::{generate_collection, ErrorPolicy, GenerateOptions, OpenApiLoader};

/// Flatten an OpenAPI document into resolved operation records
#[derive(Parser, Debug)]
#[command(name = "openapi-collection")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Resolve an OpenAPI 3.x document into an ordered operation collection")]
struct Args {
    /// OpenAPI document path or http(s) URL
    input: String,

    /// Write the collection here instead of stdout
    #[arg(short, long, env = "OPENAPI_COLLECTION_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON options file; flags given on the command line take precedence
    #[arg(long, env = "OPENAPI_COLLECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Leave out operations that fail to resolve instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn options(&self) -> anyhow::Result<GenerateOptions> {
        let mut options = match &self.config {
            Some(path) => GenerateOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => GenerateOptions::default(),
        };

        if let Some(output) = &self.output {
            options.output = Some(output.clone());
        }
        if self.skip_invalid {
            options.on_error = ErrorPolicy::SkipOperation;
        }
        if self.pretty {
            options.pretty = true;
        }

        Ok(options)
    }
}

/// Whether the input names a remote document rather than a local file
fn is_remote(input: &str) -> bool {
    url::Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for the collection
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = args.options()?;

    let document = if is_remote(&args.input) {
        OpenApiLoader::fetch(&args.input).await
    } else {
        OpenApiLoader::load_file(&args.input)
    }
    .with_context(|| format!("Failed to load OpenAPI document {}", args.input))?;

    let collection = generate_collection(&document, &options)
        .context("Failed to generate operation collection")?;

    let json = if options.pretty {
        serde_json::to_string_pretty(&collection)?
    } else {
        serde_json::to_string(&collection)?
    };

    match &options.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} operations to {}", collection.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

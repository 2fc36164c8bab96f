use clap::{Parser, Subcommand};
use retouch::analysis::{AnalysisEngine, Thresholds};
use retouch::imaging::{EditRequest, Factor};
use retouch::pipeline::EditPipeline;
use retouch::store::{FsImageStore, ImageStore, Pool};
use retouch::{config, output};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Edit and analyze uploaded images")]
#[command(long_about = "\
Edit and analyze uploaded images

The store root holds two pools: uploaded originals and derived edits.
Edits are never applied in place; every edit writes a new file to the
derived pool, named after its source:

  uploads/
  ├── config.toml                   # Optional, overrides stock defaults
  ├── originals/
  │   └── beach.jpg
  └── edited/
      ├── beach_edited_1717171717171.png
      └── beach_grayscale_1717171719000.png

Lookups by name search edited/ first, then originals/.

Run 'retouch gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Store root directory
    #[arg(long, default_value = "uploads", global = true)]
    root: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy image files into the originals pool
    Import {
        /// Files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List stored images
    List {
        /// Also list derived edits
        #[arg(long)]
        derived: bool,
    },
    /// Apply edits to a stored image, writing a new derived image
    Edit {
        /// Name of the source image (original or derived)
        name: String,
        /// Brightness multiplier, 1.0 = unchanged
        #[arg(long)]
        brightness: Option<f64>,
        /// Contrast multiplier, 1.0 = unchanged
        #[arg(long)]
        contrast: Option<f64>,
        /// Convert to grayscale
        #[arg(long)]
        grayscale: bool,
        /// Edit parameters as a JSON object; explicit flags win
        #[arg(long)]
        params: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure brightness, contrast, and vibrancy
    Analyze {
        /// Name of the image to analyze
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,
        /// Analyze every original
        #[arg(long)]
        all: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy a stored image out of the store
    Export {
        /// Name of the stored image
        name: String,
        /// Destination file or directory
        dest: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        command => {
            let config = config::load_config(&cli.root)?;
            let store = FsImageStore::open(&cli.root, &config.store)?;
            run(command, &config, &store)?;
        }
    }

    Ok(())
}

fn run(
    command: Command,
    config: &config::RetouchConfig,
    store: &FsImageStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Import { files } => {
            for file in files {
                let name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| format!("{} has no usable file name", file.display()))?;
                let bytes = std::fs::read(&file)?;
                let stored = store.put_original(&bytes, name)?;
                println!("{} → {}", file.display(), stored);
            }
        }
        Command::List { derived } => {
            output::print_listing("Originals", &store.list_originals()?);
            if derived {
                println!();
                output::print_listing("Derived", &store.list_derived()?);
            }
        }
        Command::Edit {
            name,
            brightness,
            contrast,
            grayscale,
            params,
            json,
        } => {
            let request = edit_request(params.as_deref(), brightness, contrast, grayscale)?;
            let artifact = EditPipeline::new(store).apply(&name, &request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&artifact)?);
            } else {
                output::print_artifact(&artifact);
            }
        }
        Command::Analyze { name, json, .. } => {
            let engine = AnalysisEngine::new(store, Thresholds::from_config(&config.analysis));
            match name {
                Some(name) => {
                    let result = engine.analyze(&name)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        output::print_analysis(&result);
                    }
                }
                None => {
                    init_thread_pool(&config.processing);
                    let results = engine.analyze_all()?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&batch_json(&results)?)?);
                    } else {
                        output::print_batch(&results);
                    }
                }
            }
        }
        Command::Export { name, dest } => {
            let (pool, path) = store.locate(&name)?;
            let dest = if dest.is_dir() { dest.join(&name) } else { dest };
            std::fs::copy(&path, &dest)?;
            let pool = match pool {
                Pool::Originals => "originals",
                Pool::Derived => "derived",
            };
            info!(name = %name, pool, dest = %dest.display(), "exported");
            println!("{} → {}", name, dest.display());
        }
        Command::GenConfig => unreachable!("gen-config runs without a store"),
    }
    Ok(())
}

/// Route logs to stderr, filtered by the `-v` count.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Build the edit request: `--params` first, explicit flags on top.
fn edit_request(
    params: Option<&str>,
    brightness: Option<f64>,
    contrast: Option<f64>,
    grayscale: bool,
) -> retouch::Result<EditRequest> {
    let mut request = match params {
        Some(text) => EditRequest::from_json_str(text)?,
        None => EditRequest::default(),
    };
    if let Some(b) = brightness {
        request.brightness = Some(Factor::new("brightness", b)?);
    }
    if let Some(c) = contrast {
        request.contrast = Some(Factor::new("contrast", c)?);
    }
    if grayscale {
        request.grayscale = true;
    }
    Ok(request)
}

/// One JSON entry per image: the result, or the error message and kind.
fn batch_json(
    results: &[(String, retouch::Result<retouch::analysis::AnalysisResult>)],
) -> serde_json::Result<Value> {
    results
        .iter()
        .map(|(name, outcome)| match outcome {
            Ok(result) => serde_json::to_value(result),
            Err(e) => Ok(serde_json::json!({
                "source": name,
                "error": e.to_string(),
                "kind": format!("{:?}", e.kind()),
            })),
        })
        .collect::<serde_json::Result<Vec<_>>>()
        .map(Value::Array)
}

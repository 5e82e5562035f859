mod cli;

use imgconvert::{
    config,
    conversion::{JobOutcome, JobStatus},
    remote::ConvertApiClient,
    ConversionReport, ImageConverter,
};
use imgconvert_common::formats::{destination_formats, source_formats};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options of the `convert` command that override the loaded config.
struct ConvertOptions {
    quality: Option<u32>,
    dpi: Option<u32>,
    no_store: bool,
    output_dir: Option<PathBuf>,
    secret: Option<String>,
    overrides: Vec<String>,
}

async fn convert(
    path: &Path,
    to: &str,
    options: ConvertOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(secret) = options.secret {
        config.api.secret = Some(secret);
    }
    if let Some(quality) = options.quality {
        config.conversion.image_quality = quality;
    }
    if let Some(dpi) = options.dpi {
        config.conversion.image_dpi = dpi;
    }
    if options.no_store {
        config.conversion.store_files = false;
    }
    if let Some(dir) = options.output_dir {
        config.conversion.output_dir = Some(dir);
    }

    let mut settings = config.converter_settings()?;
    for entry in &options.overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Invalid --set {:?}, expected KEY=VALUE", entry))?;
        settings = settings.with_field(key.trim(), value)?;
    }

    let remote = Arc::new(ConvertApiClient::from_config(&config.api));
    let converter = ImageConverter::new(settings, remote).with_policy(config.dispatch_policy()?);
    tracing::debug!("Converter: {:?}", converter);

    match converter.convert(path, to).await? {
        ConversionReport::File(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        ConversionReport::Directory(report) => {
            if report.is_empty() {
                println!("No supported images found in {}", path.display());
                return Ok(());
            }

            for outcome in report.outcomes() {
                print_outcome(outcome);
            }

            println!();
            println!(
                "{} images in {} groups: {} converted, {} skipped, {} failed",
                report.len(),
                report.groups.len(),
                report.converted(),
                report.skipped(),
                report.failed()
            );

            if !report.is_success() {
                anyhow::bail!("{} of {} conversions failed", report.failed(), report.len());
            }
            Ok(())
        }
    }
}

fn print_outcome(outcome: &JobOutcome) {
    let source = outcome.source_path.display();
    match outcome.status {
        JobStatus::Converted(ref saved) => println!(
            "✓ {} -> {} ({} bytes)",
            source,
            saved.path.display(),
            saved.size_bytes
        ),
        JobStatus::Skipped => println!("- {} (already in target format)", source),
        JobStatus::Failed(ref e) => println!("✗ {}: {}", source, e),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imgconvert=trace,imgconvert_common=debug,reqwest=debug".to_string()
        } else {
            "imgconvert=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            path,
            to,
            quality,
            dpi,
            no_store,
            output_dir,
            secret,
            overrides,
        } => {
            let options = ConvertOptions {
                quality,
                dpi,
                no_store,
                output_dir,
                secret,
                overrides,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert(&path, &to, options, cli.config.as_deref()))
        }
        Commands::Formats => list_formats(),
        Commands::Init { path, force } => init_config(&path, force),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imgconvert {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn list_formats() -> Result<()> {
    println!("Destination formats: {}", destination_formats().join(", "));
    println!("Source formats: {}", source_formats().join(", "));
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    config::persist::save_config(path, &config::Config::default(), force)?;
    println!("Wrote default config to {:?}", path);
    println!("Set api.secret (or IMGCONVERT_API_SECRET) before converting.");
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  API: {}", config.api.base_url);
            println!(
                "  Secret: {}",
                if config.api.secret.is_some() {
                    "configured"
                } else {
                    "missing"
                }
            );
            println!(
                "  Quality: {}, DPI: {}, store files: {}",
                config.conversion.image_quality,
                config.conversion.image_dpi,
                config.conversion.store_files
            );
            println!(
                "  Batch: {} per group, {}s delay, {} workers",
                config.batch.group_size, config.batch.group_delay_secs, config.batch.max_workers
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  API: {}", config.api.base_url);
            println!(
                "  Batch: {} per group, {}s delay",
                config.batch.group_size, config.batch.group_delay_secs
            );
        }
    }

    Ok(())
}

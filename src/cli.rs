use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgconvert")]
#[command(author, version, about = "Image format conversion through ConvertAPI")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an image, or every supported image in a directory
    Convert {
        /// Image file or directory of images
        #[arg(required = true)]
        path: PathBuf,

        /// Target format (jpg, png, svg, webp, tiff)
        #[arg(short, long = "to")]
        to: String,

        /// Output quality (10-100)
        #[arg(short, long)]
        quality: Option<u32>,

        /// Output resolution in DPI (10-800)
        #[arg(long)]
        dpi: Option<u32>,

        /// Do not keep converted files on the remote service
        #[arg(long)]
        no_store: bool,

        /// Directory for converted files (default: next to the source)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// ConvertAPI secret (overrides config and environment)
        #[arg(long)]
        secret: Option<String>,

        /// Override a setting, e.g. --set image_quality=80
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// List supported source and destination formats
    Formats,

    /// Write a default configuration file
    Init {
        /// Where to write the file
        #[arg(default_value = "imgconvert.toml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

//! CLI commands using clap

use crate::application::DEFAULT_BATCH_SECTORS;
use crate::domain::entities::BackendKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// discin - sector input for disc images and optical drives
///
/// Reads fixed-size 2048-byte sectors from an image file or a raw device,
/// authenticating and decrypting protected media when a security module is
/// available.
#[derive(Parser)]
#[command(name = "discin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read fixed-size sectors from disc images and devices", long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with input options
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend override (auto, file, device)
    #[arg(short, long, global = true)]
    pub backend: Option<BackendKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the backend and size of an input
    Info {
        /// Disc image or device path
        target: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy a sector range to a file
    Dump {
        /// Disc image or device path
        target: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// First sector
        #[arg(short, long, default_value_t = 0)]
        start: u32,

        /// Number of sectors (defaults to the rest of the medium)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Sectors per read
        #[arg(long, default_value_t = DEFAULT_BATCH_SECTORS)]
        batch: u32,

        /// Write protected sectors without decrypting them
        #[arg(long)]
        raw: bool,
    },

    /// Digest a sector range
    Hash {
        /// Disc image or device path
        target: String,

        /// First sector
        #[arg(short, long, default_value_t = 0)]
        start: u32,

        /// Number of sectors (defaults to the rest of the medium)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Digest algorithm
        #[arg(short, long, value_enum, default_value_t = HashAlgorithm::Sha256)]
        algorithm: HashAlgorithm,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashAlgorithm {
    Sha256,
    Crc32,
}

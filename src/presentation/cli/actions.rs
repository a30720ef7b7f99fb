//! Command handlers

use super::commands::{Cli, Commands, HashAlgorithm};
use super::progress::ProgressReporter;
use crate::application::dto::InputOptions;
use crate::application::{InputDriver, SectorReader};
use crate::domain::repositories::SectorInput;
use crate::infrastructure::input::InputHandle;
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Executes the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let options = load_options(&cli)?;

    match cli.command {
        Commands::Info { target, json } => info(&target, &options, json),
        Commands::Dump {
            target,
            output,
            start,
            count,
            batch,
            raw,
        } => dump(&target, &options, &output, start, count, batch, raw),
        Commands::Hash {
            target,
            start,
            count,
            algorithm,
        } => hash(&target, &options, start, count, algorithm),
    }
}

fn load_options(cli: &Cli) -> Result<InputOptions> {
    let mut options = match &cli.config {
        Some(path) => InputOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => InputOptions::default(),
    };

    if let Some(backend) = cli.backend {
        options.backend = backend;
    }

    Ok(options)
}

fn open(target: &str, options: &InputOptions) -> Result<InputHandle> {
    let driver = InputDriver::setup(target, options)
        .with_context(|| format!("Failed to select a backend for {}", target))?;
    let mut handle = driver
        .open(target)
        .with_context(|| format!("Failed to open {}", target))?;

    if handle.is_protected() {
        handle
            .authenticate()
            .with_context(|| format!("Failed to authenticate {}", target))?;
    }

    Ok(handle)
}

/// Resolves an optional count against the medium size
fn resolve_range(handle: &InputHandle, start: u32, count: Option<u32>) -> Result<u32> {
    let total = handle.total_sectors();
    if start > total {
        bail!("Start sector {} is beyond the end of the medium ({} sectors)", start, total);
    }
    Ok(count.unwrap_or(total - start))
}

fn info(target: &str, options: &InputOptions, json: bool) -> Result<()> {
    let handle = open(target, options)?;
    let backend = handle.backend();
    let total = handle.total_sectors();
    let protected = handle.is_protected();
    let device = handle.device_info();
    handle.close().context("Failed to close input")?;

    if json {
        let report = serde_json::json!({
            "target": target,
            "backend": backend,
            "total_sectors": total,
            "sector_size": crate::core::SECTOR_SIZE,
            "protected": protected,
            "device": device,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Target:    {}", target);
        println!("Backend:   {}", backend);
        println!("Sectors:   {}", total);
        println!("Protected: {}", if protected { "yes" } else { "no" });
        if let Some(device) = device {
            println!(
                "Device:    {} sectors of {} bytes",
                device.total_sectors, device.sector_size
            );
        }
    }

    Ok(())
}

fn dump(
    target: &str,
    options: &InputOptions,
    output: &Path,
    start: u32,
    count: Option<u32>,
    batch: u32,
    raw: bool,
) -> Result<()> {
    let mut handle = open(target, options)?;
    let count = resolve_range(&handle, start, count)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let progress = ProgressReporter::for_sectors(count as u64, "Dumping sectors...");
    let mut write_error = None;

    let mut reader = SectorReader::new(&mut handle).with_batch_sectors(batch)?;
    if raw {
        reader = reader.raw();
    }
    let summary = reader.read_range(start, count, |_, data| match writer.write_all(data) {
        Ok(()) => {
            progress.advance((data.len() / crate::core::SECTOR_SIZE) as u32);
            true
        }
        Err(e) => {
            write_error = Some(e);
            false
        }
    })?;

    if let Some(e) = write_error {
        return Err(e).with_context(|| format!("Failed to write {}", output.display()));
    }
    writer.flush()?;
    progress.finish("Done");

    if summary.sectors_read < count {
        warn!(
            "Medium ended early: {} of {} sectors dumped",
            summary.sectors_read, count
        );
    }
    info!(
        "Dumped {} sectors from {} to {}",
        summary.sectors_read,
        target,
        output.display()
    );

    handle.close().context("Failed to close input")?;
    Ok(())
}

fn hash(
    target: &str,
    options: &InputOptions,
    start: u32,
    count: Option<u32>,
    algorithm: HashAlgorithm,
) -> Result<()> {
    let mut handle = open(target, options)?;
    let count = resolve_range(&handle, start, count)?;

    let mut sha = Sha256::new();
    let mut crc = crc32fast::Hasher::new();

    let summary = SectorReader::new(&mut handle).read_range(start, count, |_, data| {
        match algorithm {
            HashAlgorithm::Sha256 => sha.update(data),
            HashAlgorithm::Crc32 => crc.update(data),
        }
        true
    })?;

    let digest = match algorithm {
        HashAlgorithm::Sha256 => hex::encode(sha.finalize()),
        HashAlgorithm::Crc32 => format!("{:08x}", crc.finalize()),
    };

    println!("{}  {} [{}+{}]", digest, target, start, summary.sectors_read);
    handle.close().context("Failed to close input")?;
    Ok(())
}

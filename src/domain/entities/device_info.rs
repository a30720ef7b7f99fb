//! Device metadata and backend identity

use crate::core::SECTOR_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry reported by a raw storage device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeviceInfo {
    /// Native logical sector size in bytes
    pub sector_size: u32,
    /// Number of sectors on the medium
    pub total_sectors: u32,
}

impl DeviceInfo {
    pub fn new(sector_size: u32, total_sectors: u32) -> Self {
        Self {
            sector_size,
            total_sectors,
        }
    }

    /// Whether the native sector size matches the fixed logical sector size
    pub fn has_logical_sector_size(&self) -> bool {
        self.sector_size as usize == SECTOR_SIZE
    }

    /// Raw little-endian layout used for debug dumps
    pub fn to_le_bytes(&self) -> [u8; 8] {
        let mut raw = [0u8; 8];
        raw[..4].copy_from_slice(&self.sector_size.to_le_bytes());
        raw[4..].copy_from_slice(&self.total_sectors.to_le_bytes());
        raw
    }
}

/// Which concrete backend serves an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pick `Device` for device nodes and `File` for everything else
    #[default]
    Auto,
    /// Plain file or disc image
    File,
    /// Raw storage device with sector-granular reads
    Device,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "auto"),
            BackendKind::File => write!(f, "file"),
            BackendKind::Device => write!(f, "device"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "file" => Ok(BackendKind::File),
            "device" | "dev" => Ok(BackendKind::Device),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

//! Batched sector streaming
//!
//! Walks a sector range through any [`SectorInput`] in fixed-size batches,
//! decrypting protected batches before handing them to a callback.

use crate::core::sector::sectors_to_bytes;
use crate::core::{InputError, Result};
use crate::domain::repositories::SectorInput;
use tracing::{debug, warn};

/// Default number of sectors per batch
pub const DEFAULT_BATCH_SECTORS: u32 = 32;

/// Totals of a streamed range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadSummary {
    /// Sectors handed to the callback
    pub sectors_read: u32,
    /// Callback invocations
    pub batches: u32,
}

pub struct SectorReader<'a, I: SectorInput> {
    input: &'a mut I,
    batch_sectors: u32,
    decrypt: bool,
}

impl<'a, I: SectorInput> SectorReader<'a, I> {
    pub fn new(input: &'a mut I) -> Self {
        Self {
            input,
            batch_sectors: DEFAULT_BATCH_SECTORS,
            decrypt: true,
        }
    }

    /// Sets the batch size in sectors
    pub fn with_batch_sectors(mut self, sectors: u32) -> Result<Self> {
        if sectors == 0 {
            return Err(InputError::InvalidConfig(
                "batch size must be at least one sector".to_string(),
            ));
        }
        self.batch_sectors = sectors;
        Ok(self)
    }

    /// Hands ciphertext to the callback instead of decrypting it
    pub fn raw(mut self) -> Self {
        self.decrypt = false;
        self
    }

    /// Streams `count` sectors from `start`, calling `callback` with the
    /// first sector number and the bytes of each delivered batch.
    ///
    /// Stops at end of medium or when the callback returns `false`. A batch
    /// that delivers nothing while the input reports a failure (a failed seek
    /// or a device read status) is a `ReadFailed` error, not end of medium.
    pub fn read_range<F>(&mut self, start: u32, count: u32, mut callback: F) -> Result<ReadSummary>
    where
        F: FnMut(u32, &[u8]) -> bool,
    {
        if start as u64 + count as u64 > u32::MAX as u64 + 1 {
            return Err(InputError::InvalidConfig(format!(
                "sector range {}+{} exceeds the addressable sectors",
                start, count
            )));
        }

        let mut buffer = vec![0u8; sectors_to_bytes(self.batch_sectors.min(count.max(1)))];
        let mut summary = ReadSummary::default();
        let decrypt = self.decrypt && self.input.is_protected();

        while summary.sectors_read < count {
            // In range: start + sectors_read < start + count <= 2^32
            let sector = start + summary.sectors_read;
            let wanted = (count - summary.sectors_read).min(self.batch_sectors);

            let delivered = self.input.read_sectors(sector, wanted, &mut buffer)?;
            if delivered == 0 {
                if let Some(message) = self.input.last_error() {
                    warn!("Stopped at sector {}: {}", sector, message);
                    return Err(InputError::ReadFailed {
                        sector,
                        message: message.to_string(),
                    });
                }
                break;
            }

            let data = &mut buffer[..sectors_to_bytes(delivered)];
            if decrypt {
                self.input.decrypt(data, delivered)?;
            }

            summary.sectors_read += delivered;
            summary.batches += 1;

            if !callback(sector, data) {
                break;
            }

            if delivered < wanted {
                debug!("End of medium after sector {}", sector as u64 + delivered as u64);
                break;
            }
        }

        Ok(summary)
    }
}

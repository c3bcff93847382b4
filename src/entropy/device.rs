//! Kernel Random Device Source.
//!
//! Reads sequentially from a character device such as `/dev/urandom`. Reads on
//! a blocking device (`/dev/random`) may stall until the kernel pool refills;
//! there is no timeout.

use core::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::EntropySource;
use crate::error::{EntropyError, Result, TransferError};
use crate::io_retry::read_full;

/// Opens random devices for the selector.
pub trait DeviceOpener: Send + Sync {
    /// Opens `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// Opens devices from the real filesystem, read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOpener;

impl DeviceOpener for FsOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }
}

/// An open random device.
pub struct DeviceSource {
    path: PathBuf,
    reader: Box<dyn Read + Send>,
}

impl DeviceSource {
    /// Opens the first device in `paths` that `opener` accepts.
    pub fn open(opener: &dyn DeviceOpener, paths: &[PathBuf]) -> Option<Self> {
        for path in paths {
            match opener.open(path) {
                Ok(reader) => {
                    log::debug!("Using random device {}", path.display());
                    return Some(Self::from_reader(path.clone(), reader));
                }
                Err(e) => log::debug!("Random device {} unavailable: {}", path.display(), e),
            }
        }
        None
    }

    /// Wraps an already open reader.
    pub fn from_reader(path: PathBuf, reader: Box<dyn Read + Send>) -> Self {
        Self { path, reader }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for DeviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSource").field("path", &self.path).finish()
    }
}

impl EntropySource for DeviceSource {
    fn name(&self) -> &'static str {
        "RandomDevice"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        read_full(&mut *self.reader, dest).map_err(|err| {
            match err {
                TransferError::Closed => {
                    log::warn!("Entropy error! {} returned end of file", self.path.display())
                }
                TransferError::Io(e) => {
                    log::warn!("Entropy error! Error in read of {} ({})", self.path.display(), e)
                }
            }
            EntropyError::ReadFailure
        })
    }
}

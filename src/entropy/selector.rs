//! Source Selector.
//!
//! Decides which backend serves a new handle. For the device family the
//! decision to use EGD is latched process-wide: once a device probe has failed
//! and an EGD socket was configured, later initializations go straight to EGD
//! without probing devices again.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::device::{DeviceOpener, DeviceSource, FsOpener};
use super::egd::EgdClient;
use super::handle::EntropyHandle;
use super::platform::{PlatformSource, ProviderFactory, SystemProviders};
use crate::config::{Backend, EntropyConfig};
use crate::error::{EntropyError, Result};

/// Write-once record of the EGD decision.
#[derive(Debug)]
pub struct SelectionLatch {
    egd: OnceLock<PathBuf>,
}

impl SelectionLatch {
    pub const fn new() -> Self {
        Self { egd: OnceLock::new() }
    }

    /// Socket path captured when EGD mode was latched.
    pub fn egd_socket(&self) -> Option<&Path> {
        self.egd.get().map(PathBuf::as_path)
    }

    pub fn is_egd(&self) -> bool {
        self.egd.get().is_some()
    }

    /// Latches EGD mode. If another caller got there first, its path wins.
    fn latch_egd(&self, socket_path: PathBuf) -> &Path {
        self.egd.get_or_init(|| socket_path)
    }
}

impl Default for SelectionLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// The latch shared by every selector in the process unless overridden.
pub static PROCESS_LATCH: SelectionLatch = SelectionLatch::new();

/// Opens entropy handles according to an [`EntropyConfig`].
pub struct SourceSelector {
    config: EntropyConfig,
    latch: &'static SelectionLatch,
    opener: Arc<dyn DeviceOpener>,
    providers: Arc<dyn ProviderFactory>,
}

impl SourceSelector {
    /// Selector over the real filesystem and providers, using [`PROCESS_LATCH`].
    pub fn new(config: EntropyConfig) -> Self {
        Self {
            config,
            latch: &PROCESS_LATCH,
            opener: Arc::new(FsOpener),
            providers: Arc::new(SystemProviders),
        }
    }

    pub fn with_latch(mut self, latch: &'static SelectionLatch) -> Self {
        self.latch = latch;
        self
    }

    pub fn with_device_opener(mut self, opener: Arc<dyn DeviceOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_providers(mut self, providers: Arc<dyn ProviderFactory>) -> Self {
        self.providers = providers;
        self
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }

    /// Opens a handle on the configured backend.
    ///
    /// `seed` is mixed into the platform service as auxiliary input; the
    /// device and EGD backends ignore it.
    pub fn initialize(&self, seed: Option<&[u8]>) -> Result<EntropyHandle> {
        match self.config.backend {
            Backend::PlatformService => {
                PlatformSource::initialize(Arc::clone(&self.providers), seed).map(EntropyHandle::Platform)
            }
            Backend::Device => {
                if seed.is_some() {
                    log::debug!("Seed material is not supported by device or EGD sources; ignored");
                }
                self.initialize_device()
            }
        }
    }

    fn initialize_device(&self) -> Result<EntropyHandle> {
        if let Some(socket_path) = self.latch.egd_socket() {
            return Ok(EntropyHandle::Egd(EgdClient::new(socket_path)));
        }

        if let Some(device) = DeviceSource::open(&*self.opener, &self.config.device_paths) {
            return Ok(EntropyHandle::Device(device));
        }

        match self.config.egd_socket_path() {
            Some(socket_path) => {
                let socket_path = self.latch.latch_egd(socket_path);
                log::info!(
                    "No random device available, using EGD socket {}",
                    socket_path.display()
                );
                Ok(EntropyHandle::Egd(EgdClient::new(socket_path)))
            }
            None => {
                log::warn!(
                    "No random device available and {} is not set",
                    self.config.egd_socket_var
                );
                Err(EntropyError::SourceUnavailable)
            }
        }
    }
}

//! Platform Cryptographic Service Source.
//!
//! Acquires a provider context from the host crypto service, preferring a
//! hardware-accelerated generator and falling back to the general-purpose
//! software one.
//!
//! # Design
//! - **Seed mixing**: caller seed material is handed to the provider as
//!   auxiliary input only. The provider may ignore it; output is never a
//!   deterministic function of the seed.
//! - **One retry**: a failed generate releases the context, acquires a fresh
//!   one and tries exactly once more.

use core::fmt;
use std::sync::Arc;

use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use super::EntropySource;
use crate::error::{EntropyError, Result};

/// Provider families, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// On-chip generator (RDRAND).
    Hardware,
    /// The operating system's general-purpose generator.
    Software,
}

/// Acquisition preference.
pub const PROVIDER_PREFERENCE: [ProviderKind; 2] = [ProviderKind::Hardware, ProviderKind::Software];

/// An acquired provider context. Dropping it releases the context.
pub trait CryptoProvider: Send {
    fn name(&self) -> &'static str;

    /// Overwrites `dest` with random bytes.
    ///
    /// Existing contents of `dest` may be used by the provider as auxiliary
    /// input.
    fn generate(&mut self, dest: &mut [u8]) -> Result<()>;
}

/// Hands out provider contexts.
pub trait ProviderFactory: Send + Sync {
    /// Acquires a context of the given kind, or `None` if it is unavailable.
    fn acquire(&self, kind: ProviderKind) -> Option<Box<dyn CryptoProvider>>;
}

/// The host's own providers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProviders;

impl ProviderFactory for SystemProviders {
    fn acquire(&self, kind: ProviderKind) -> Option<Box<dyn CryptoProvider>> {
        match kind {
            ProviderKind::Hardware => {
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                {
                    super::rdrand::RdRandProvider::detect()
                        .map(|p| Box::new(p) as Box<dyn CryptoProvider>)
                }
                #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
                {
                    None
                }
            }
            ProviderKind::Software => Some(Box::new(OsProvider)),
        }
    }
}

/// Software provider backed by the operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsProvider;

impl CryptoProvider for OsProvider {
    fn name(&self) -> &'static str {
        "OsRng"
    }

    fn generate(&mut self, dest: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(dest).map_err(|e| {
            log::warn!("OS random generator failed: {}", e);
            EntropyError::ProviderFailure
        })
    }
}

/// Tries every kind in [`PROVIDER_PREFERENCE`] order.
pub fn acquire_provider(factory: &dyn ProviderFactory) -> Option<Box<dyn CryptoProvider>> {
    PROVIDER_PREFERENCE.iter().find_map(|&kind| factory.acquire(kind))
}

/// An open platform-service handle.
pub struct PlatformSource {
    factory: Arc<dyn ProviderFactory>,
    provider: Option<Box<dyn CryptoProvider>>,
}

impl PlatformSource {
    /// Acquires a provider and mixes in `seed`, if any.
    pub fn initialize(factory: Arc<dyn ProviderFactory>, seed: Option<&[u8]>) -> Result<Self> {
        let Some(mut provider) = acquire_provider(&*factory) else {
            log::warn!("No cryptographic provider could be acquired");
            return Err(EntropyError::SourceUnavailable);
        };
        log::debug!("Acquired {} provider", provider.name());

        if let Some(seed) = seed.filter(|s| !s.is_empty()) {
            // The provider overwrites the copy; it is wiped on drop either way.
            let mut scratch = Zeroizing::new(seed.to_vec());
            if provider.generate(&mut scratch).is_err() {
                log::debug!("{} provider rejected seed material", provider.name());
            }
        }

        Ok(Self {
            factory,
            provider: Some(provider),
        })
    }

    /// Name of the held provider, `None` once released.
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Releases the provider context. Later fills fail.
    pub fn release(&mut self) {
        self.provider = None;
    }
}

impl fmt::Debug for PlatformSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSource")
            .field("provider", &self.provider_name())
            .finish()
    }
}

impl EntropySource for PlatformSource {
    fn name(&self) -> &'static str {
        "PlatformService"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        let provider = self.provider.as_mut().ok_or(EntropyError::ProviderFailure)?;
        if provider.generate(dest).is_ok() {
            return Ok(());
        }

        // The context may have been lost; start over once with a fresh one.
        self.provider = None;
        log::info!("Crypto provider failed, re-acquiring");
        let Some(mut fresh) = acquire_provider(&*self.factory) else {
            log::warn!("Crypto provider could not be re-acquired");
            return Err(EntropyError::ProviderFailure);
        };
        if fresh.generate(dest).is_err() {
            log::warn!("Crypto provider {} failed after re-acquisition", fresh.name());
            return Err(EntropyError::ProviderFailure);
        }
        self.provider = Some(fresh);
        Ok(())
    }
}

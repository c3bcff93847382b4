//! Entropy acquisition backends.
//!
//! This module defines the interface shared by every host entropy source and
//! the selector that picks one of them for a caller.
//!
//! # Design
//! - **Closed set**: kernel random devices, the platform crypto service, or an
//!   Entropy Gathering Daemon (EGD) over a Unix socket.
//! - **All or nothing**: a fill either delivers the full length or fails.
//! - **Unmodified bytes**: sources are read raw, nothing is mixed or cached.

pub mod device;
pub mod egd;
pub mod handle;
pub mod platform;
pub mod selector;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod rdrand;

use crate::error::Result;

/// A trait for host entropy sources.
pub trait EntropySource {
    /// Returns a unique identifier for the source.
    fn name(&self) -> &'static str;

    /// Fills `dest` with random bytes from the source.
    ///
    /// # Arguments
    /// * `dest` - Buffer to fill with entropy.
    ///
    /// # Returns
    /// * `Ok(())` once every byte of `dest` has been written.
    /// * `Err(EntropyError)` if the source fails. `dest` may then hold a
    ///   partial fill and must be discarded.
    fn fill(&mut self, dest: &mut [u8]) -> Result<()>;
}

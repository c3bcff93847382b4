//! Host entropy acquisition for managed random-number-generator APIs.
//!
//! A caller opens a handle with [`initialize`], fills buffers from it with
//! [`fill`] or [`EntropyHandle::fill`], then closes it with [`release`]. The
//! handle is served by one of:
//! - a kernel random device (`/dev/urandom`, then `/dev/random`),
//! - an Entropy Gathering Daemon on a Unix socket, when no device opens and
//!   `MONO_EGD_SOCKET` names one,
//! - the platform cryptographic service.
//!
//! Bytes are returned exactly as the backend produced them.

pub mod config;
pub mod entropy;
pub mod error;
mod io_retry;

pub use config::{Backend, EntropyConfig};
pub use entropy::handle::EntropyHandle;
pub use entropy::selector::SourceSelector;
pub use entropy::EntropySource;
pub use error::{EntropyError, Result};

use zeroize::Zeroizing;

/// Opens a handle with the default configuration and the process-wide latch.
///
/// `seed` is auxiliary input for the platform service and ignored elsewhere.
pub fn initialize(seed: Option<&[u8]>) -> Result<EntropyHandle> {
    SourceSelector::new(EntropyConfig::default()).initialize(seed)
}

/// Returns exactly `len` bytes from `handle`, or an error.
pub fn fill(handle: &mut EntropyHandle, len: usize) -> Result<Zeroizing<Vec<u8>>> {
    handle.fill_vec(len)
}

/// Closes `handle`.
pub fn release(handle: EntropyHandle) {
    handle.release()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_default_round_trip() {
        let mut handle = initialize(None).unwrap();
        let a = fill(&mut handle, 32).unwrap();
        let b = fill(&mut handle, 32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(*a, *b);
        release(handle);
    }
}

//! Entropy Handle.
//!
//! The opaque value handed to the caller between `initialize` and `release`.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::device::DeviceSource;
use super::egd::EgdClient;
use super::platform::PlatformSource;
use super::EntropySource;
use crate::error::Result;

/// An open entropy source, owned by a single caller.
#[derive(Debug)]
pub enum EntropyHandle {
    /// An open kernel random device.
    Device(DeviceSource),
    /// A platform crypto provider context.
    Platform(PlatformSource),
    /// EGD mode. Connects anew for every fill.
    Egd(EgdClient),
}

impl EntropyHandle {
    fn source(&mut self) -> &mut dyn EntropySource {
        match self {
            EntropyHandle::Device(source) => source,
            EntropyHandle::Platform(source) => source,
            EntropyHandle::Egd(source) => source,
        }
    }

    /// Name of the backend serving this handle.
    pub fn source_name(&self) -> &'static str {
        match self {
            EntropyHandle::Device(source) => source.name(),
            EntropyHandle::Platform(source) => source.name(),
            EntropyHandle::Egd(source) => source.name(),
        }
    }

    /// Fills all of `dest`, or fails.
    ///
    /// On failure `dest` may hold a partial fill and must be discarded.
    pub fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        if dest.is_empty() {
            return Ok(());
        }
        self.source().fill(dest)
    }

    /// Returns `len` fresh bytes in a buffer that is wiped on drop.
    pub fn fill_vec(&mut self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(vec![0u8; len]);
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Closes the source. Device descriptors and provider contexts are released.
    pub fn release(self) {
        if let EntropyHandle::Platform(mut source) = self {
            source.release();
        }
    }
}

impl RngCore for EntropyHandle {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(err) = EntropyHandle::fill(self, dest) {
            panic!("Entropy source failed: {}", err);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        EntropyHandle::fill(self, dest).map_err(rand_core::Error::new)
    }
}

impl CryptoRng for EntropyHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::platform::tests::ScriptedFactory;
    use crate::entropy::platform::ProviderKind;
    use crate::error::EntropyError;
    use crate::io_retry::tests::ScriptedStream;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    fn device_handle(bytes: &[u8]) -> EntropyHandle {
        EntropyHandle::Device(DeviceSource::from_reader(
            PathBuf::from("/dev/test"),
            Box::new(ScriptedStream::new(bytes)),
        ))
    }

    #[test]
    fn test_fill_vec() {
        let mut handle = device_handle(&[0xde, 0xad, 0xbe, 0xef, 0x00]);
        let bytes = handle.fill_vec(4).unwrap();
        assert_eq!(hex::encode(&*bytes), "deadbeef");
        assert_eq!(handle.source_name(), "RandomDevice");
    }

    #[test]
    fn test_empty_fill_touches_nothing() {
        // An unreachable socket would fail any real request.
        let mut handle = EntropyHandle::Egd(EgdClient::new("/nonexistent/egd.sock"));
        assert!(handle.fill(&mut []).is_ok());
        assert_eq!(handle.fill_vec(0).unwrap().len(), 0);
        assert_eq!(handle.fill_vec(1).err(), Some(EntropyError::ConnectionFailure));
    }

    #[test]
    fn test_rng_core() {
        let mut handle = device_handle(&[1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(handle.next_u32(), 1);
        assert_eq!(handle.next_u64(), 2);

        let mut buf = [0u8; 1];
        assert!(handle.try_fill_bytes(&mut buf).is_err());
    }

    #[test]
    #[should_panic(expected = "Entropy source failed")]
    fn test_fill_bytes_panics_on_failure() {
        let mut handle = device_handle(&[]);
        let mut buf = [0u8; 8];
        handle.fill_bytes(&mut buf);
    }

    #[test]
    fn test_release_platform() {
        let factory = ScriptedFactory::new(&[ProviderKind::Hardware], &[]);
        let handle = EntropyHandle::Platform(PlatformSource::initialize(factory.clone(), None).unwrap());
        assert_eq!(handle.source_name(), "PlatformService");
        handle.release();
        assert_eq!(factory.ledger.released.load(Ordering::SeqCst), 1);
    }
}

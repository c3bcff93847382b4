//! Intel Secure Key (RDRAND) Provider.
//!
//! The hardware-accelerated provider kind on x86/x86_64. Availability is
//! checked with CPUID at acquisition time, so a provider only exists on CPUs
//! that implement the instruction.

use super::platform::CryptoProvider;
use crate::error::{EntropyError, Result};

#[cfg(target_arch = "x86")]
use core::arch::x86::_rdrand32_step;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_rdrand64_step;

/// Consecutive failed RDRAND steps tolerated before giving up.
const MAX_RETRIES: usize = 10;

/// Hardware RDRAND provider.
#[derive(Debug)]
pub struct RdRandProvider {
    _private: (),
}

impl RdRandProvider {
    /// Returns a provider if the running CPU supports RDRAND.
    pub fn detect() -> Option<Self> {
        if std::is_x86_feature_detected!("rdrand") {
            Some(Self { _private: () })
        } else {
            None
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn step() -> Option<[u8; 8]> {
        let mut val: u64 = 0;
        // Safety: `detect` confirmed RDRAND support before construction.
        let success = unsafe { _rdrand64_step(&mut val) };
        (success == 1).then(|| val.to_le_bytes())
    }

    #[cfg(target_arch = "x86")]
    fn step() -> Option<[u8; 4]> {
        let mut val: u32 = 0;
        // Safety: `detect` confirmed RDRAND support before construction.
        let success = unsafe { _rdrand32_step(&mut val) };
        (success == 1).then(|| val.to_le_bytes())
    }
}

impl CryptoProvider for RdRandProvider {
    fn name(&self) -> &'static str {
        "RdRand"
    }

    fn generate(&mut self, dest: &mut [u8]) -> Result<()> {
        let mut i = 0;
        let mut retry_count = 0;

        while i < dest.len() {
            match Self::step() {
                Some(bytes) => {
                    let copy_len = core::cmp::min(bytes.len(), dest.len() - i);
                    dest[i..i + copy_len].copy_from_slice(&bytes[..copy_len]);
                    i += copy_len;
                    retry_count = 0;
                }
                None => {
                    retry_count += 1;
                    if retry_count > MAX_RETRIES {
                        log::warn!("RDRAND did not return data after {} attempts", MAX_RETRIES);
                        return Err(EntropyError::ProviderFailure);
                    }
                }
            }
        }
        Ok(())
    }
}

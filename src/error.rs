//! Error types for entropy acquisition.

use core::fmt;
use std::io;

/// Errors reported to the caller of `initialize` / `fill`.
///
/// Every variant means the requested operation was not satisfied. A fill that
/// returns an error may have written some bytes into the destination buffer;
/// those bytes must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// No random device, no crypto provider and no EGD endpoint configured.
    SourceUnavailable,
    /// The EGD socket could not be connected, or socket I/O failed.
    ConnectionFailure,
    /// The EGD peer stopped mid-exchange (zero-length read or write).
    ProtocolViolation,
    /// The platform provider failed to generate bytes, even after re-acquisition.
    ProviderFailure,
    /// A random device read returned end-of-file or an error.
    ReadFailure,
}

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyError::SourceUnavailable => write!(f, "No entropy source available"),
            EntropyError::ConnectionFailure => write!(f, "EGD connection failed"),
            EntropyError::ProtocolViolation => write!(f, "EGD peer closed the exchange early"),
            EntropyError::ProviderFailure => write!(f, "Crypto provider failed to generate bytes"),
            EntropyError::ReadFailure => write!(f, "Random device read failed"),
        }
    }
}

impl std::error::Error for EntropyError {}

/// Outcome of a failed [`crate::io_retry`] transfer.
#[derive(Debug)]
pub enum TransferError {
    /// The peer or device transferred zero bytes before the target was reached.
    Closed,
    /// A non-interruption I/O error.
    Io(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Closed => write!(f, "zero-length transfer"),
            TransferError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<io::Error> for TransferError {
    fn from(err: io::Error) -> Self {
        TransferError::Io(err)
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, EntropyError>;

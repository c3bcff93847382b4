//! Entropy Gathering Daemon (EGD) Client.
//!
//! Speaks the EGD socket protocol: a command byte, optionally followed by a
//! length byte, answered by raw entropy. Reads use the blocking command so a
//! request waits until the daemon has gathered enough entropy, which matches
//! the behavior of a blocking random device.
//!
//! A connection is opened per fill and closed when the fill ends, successful
//! or not.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::EntropySource;
use crate::error::{EntropyError, Result, TransferError};
use crate::io_retry::{read_full, write_full};

/// Largest count a single read request can carry (one length byte).
pub const EGD_MAX_CHUNK: usize = 255;

/// EGD command codes used by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EgdCommand {
    /// Ask how many bits of entropy the daemon holds.
    QueryEntropy = 0x00,
    /// Read `count` bytes, blocking until the daemon can serve them all.
    ReadBlocking = 0x02,
}

/// A blocking read request: `{command, count}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgdRequest {
    pub count: u8,
}

impl EgdRequest {
    /// Request for the next chunk of a fill with `remaining` bytes left.
    ///
    /// `remaining` must be non-zero.
    pub fn for_remaining(remaining: usize) -> Self {
        // `min` keeps the value within one byte.
        Self {
            count: remaining.min(EGD_MAX_CHUNK) as u8,
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        [EgdCommand::ReadBlocking as u8, self.count]
    }
}

fn transfer_failure(stage: &str, err: TransferError) -> EntropyError {
    match err {
        TransferError::Closed => {
            log::warn!("EGD {} failed: daemon closed the connection", stage);
            EntropyError::ProtocolViolation
        }
        TransferError::Io(e) => {
            log::warn!("EGD {} failed: {}", stage, e);
            EntropyError::ConnectionFailure
        }
    }
}

/// Runs the chunked read exchange over an already connected stream.
///
/// Each chunk sends one request, then reads exactly `count` bytes into `dest`
/// at the running offset.
pub fn exchange<S>(stream: &mut S, dest: &mut [u8]) -> Result<()>
where
    S: Read + Write + ?Sized,
{
    let mut offset = 0;
    while offset < dest.len() {
        let request = EgdRequest::for_remaining(dest.len() - offset);
        write_full(stream, &request.to_bytes()).map_err(|e| transfer_failure("request", e))?;

        let end = offset + request.count as usize;
        read_full(stream, &mut dest[offset..end]).map_err(|e| transfer_failure("response", e))?;
        offset = end;
    }
    Ok(())
}

/// Sends the entropy-level query over a connected stream.
pub fn query_entropy<S>(stream: &mut S) -> Result<u32>
where
    S: Read + Write + ?Sized,
{
    write_full(stream, &[EgdCommand::QueryEntropy as u8]).map_err(|e| transfer_failure("query", e))?;
    let mut level = [0u8; 4];
    read_full(stream, &mut level).map_err(|e| transfer_failure("query response", e))?;
    Ok(u32::from_be_bytes(level))
}

/// Client for a daemon listening on a Unix stream socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EgdClient {
    socket_path: PathBuf,
}

impl EgdClient {
    pub fn new<P: Into<PathBuf>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Fills `dest` over a fresh connection.
    pub fn fill(&self, dest: &mut [u8]) -> Result<()> {
        #[cfg(unix)]
        {
            let mut stream = self.connect()?;
            exchange(&mut stream, dest)
        }
        #[cfg(not(unix))]
        {
            let _ = dest;
            log::warn!("EGD sockets are not supported on this platform");
            Err(EntropyError::ConnectionFailure)
        }
    }

    /// Returns the number of entropy bits the daemon reports as pooled.
    pub fn available_bits(&self) -> Result<u32> {
        #[cfg(unix)]
        {
            let mut stream = self.connect()?;
            query_entropy(&mut stream)
        }
        #[cfg(not(unix))]
        {
            Err(EntropyError::ConnectionFailure)
        }
    }

    #[cfg(unix)]
    fn connect(&self) -> Result<std::os::unix::net::UnixStream> {
        std::os::unix::net::UnixStream::connect(&self.socket_path).map_err(|e| {
            log::warn!(
                "Entropy problem! Can't connect to egd socket {} ({})",
                self.socket_path.display(),
                e
            );
            EntropyError::ConnectionFailure
        })
    }
}

impl EntropySource for EgdClient {
    fn name(&self) -> &'static str {
        "Egd"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        EgdClient::fill(self, dest)
    }
}

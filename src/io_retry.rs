//! Interrupt-tolerant byte transfers.
//!
//! Shared by the EGD client and the device reader: a transfer is repeated until
//! the target count is reached. `ErrorKind::Interrupted` is retried silently, a
//! zero-length transfer or any other error ends the loop.

use std::io::{self, Read, Write};

use crate::error::TransferError;

/// Drives `op` until `len` bytes have been transferred.
///
/// `op` receives the current offset and returns how many bytes it moved.
pub(crate) fn transfer_all<F>(len: usize, mut op: F) -> Result<(), TransferError>
where
    F: FnMut(usize) -> io::Result<usize>,
{
    let mut offset = 0;
    while offset < len {
        match op(offset) {
            Ok(0) => return Err(TransferError::Closed),
            Ok(n) => offset += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::Io(e)),
        }
    }
    Ok(())
}

/// Reads exactly `buf.len()` bytes.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<(), TransferError> {
    let len = buf.len();
    transfer_all(len, |offset| reader.read(&mut buf[offset..]))
}

/// Writes all of `buf`.
pub(crate) fn write_full<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<(), TransferError> {
    transfer_all(buf.len(), |offset| writer.write(&buf[offset..]))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// One scripted step of a [`ScriptedStream`] operation.
    #[derive(Debug, Clone)]
    pub enum Step {
        /// Move at most this many bytes.
        Bytes(usize),
        /// Fail with `ErrorKind::Interrupted`.
        Interrupt,
        /// Fail with the given kind.
        Fail(io::ErrorKind),
    }

    /// In-memory stream whose reads and writes follow a script.
    ///
    /// Once a script runs out, reads serve everything available and writes
    /// accept everything.
    pub struct ScriptedStream {
        pub input: VecDeque<u8>,
        pub written: Vec<u8>,
        pub reads: VecDeque<Step>,
        pub writes: VecDeque<Step>,
    }

    impl ScriptedStream {
        pub fn new(input: &[u8]) -> Self {
            Self {
                input: input.iter().copied().collect(),
                written: Vec::new(),
                reads: VecDeque::new(),
                writes: VecDeque::new(),
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let limit = match self.reads.pop_front() {
                Some(Step::Bytes(n)) => n,
                Some(Step::Interrupt) => return Err(io::ErrorKind::Interrupted.into()),
                Some(Step::Fail(kind)) => return Err(kind.into()),
                None => usize::MAX,
            };
            let n = buf.len().min(limit).min(self.input.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.input.pop_front().unwrap_or(0);
            }
            Ok(n)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let limit = match self.writes.pop_front() {
                Some(Step::Bytes(n)) => n,
                Some(Step::Interrupt) => return Err(io::ErrorKind::Interrupted.into()),
                Some(Step::Fail(kind)) => return Err(kind.into()),
                None => usize::MAX,
            };
            let n = buf.len().min(limit);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_read_full_retries_interrupts() {
        let mut stream = ScriptedStream::new(&[1, 2, 3, 4, 5, 6]);
        stream.reads.extend([
            Step::Interrupt,
            Step::Bytes(2),
            Step::Interrupt,
            Step::Interrupt,
            Step::Bytes(1),
        ]);

        let mut buf = [0u8; 6];
        read_full(&mut stream, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_read_full_zero_is_closed() {
        let mut stream = ScriptedStream::new(&[9, 9]);
        let mut buf = [0u8; 4];
        match read_full(&mut stream, &mut buf) {
            Err(TransferError::Closed) => {}
            other => panic!("expected Closed, got {:?}", other),
        }
        // Partial bytes stay where they landed.
        assert_eq!(&buf[..2], &[9, 9]);
    }

    #[test]
    fn test_read_full_hard_error() {
        let mut stream = ScriptedStream::new(&[0; 8]);
        stream.reads.extend([Step::Bytes(3), Step::Fail(io::ErrorKind::ConnectionReset)]);

        let mut buf = [0u8; 8];
        match read_full(&mut stream, &mut buf) {
            Err(TransferError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_full_partial_and_interrupted() {
        let mut stream = ScriptedStream::new(&[]);
        stream.writes.extend([Step::Interrupt, Step::Bytes(1), Step::Interrupt]);

        write_full(&mut stream, &[2, 45]).unwrap();
        assert_eq!(stream.written, vec![2, 45]);
    }

    #[test]
    fn test_empty_transfer_never_calls_op() {
        let mut calls = 0;
        transfer_all(0, |_| {
            calls += 1;
            Ok(1)
        })
        .unwrap();
        assert_eq!(calls, 0);
    }
}

// src/relay.rs
//
// The unidirectional relay worker: read whatever the source has, write all
// of it to the destination, repeat until an I/O failure or a stop request.
// Two of these, pointed in opposite directions, make up a bridge.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Default transfer buffer capacity per direction, in bytes. Overridable
/// with `--buffer-size`.
pub const DEFAULT_TRANSFER_BUFFER: usize = 1024;

// ============================================================================
// Termination
// ============================================================================

/// Why a relay worker stopped.
#[derive(Debug)]
pub enum TerminationReason {
    /// Reading from the source failed.
    ReadError(io::Error),
    /// Writing to the destination failed.
    WriteError(io::Error),
    /// The coordinator asked the worker to stop.
    Stopped,
}

impl TerminationReason {
    /// True for I/O failures, false for a requested stop.
    pub fn is_error(&self) -> bool {
        !matches!(self, TerminationReason::Stopped)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::ReadError(e) => write!(f, "read failed: {}", e),
            TerminationReason::WriteError(e) => write!(f, "write failed: {}", e),
            TerminationReason::Stopped => write!(f, "stop requested"),
        }
    }
}

// ============================================================================
// Relay Loop
// ============================================================================

/// Copy bytes from `source` to `destination` until either side fails or
/// `stop` is set.
///
/// Timeouts and zero-length reads are idle cycles, not failures: a serial
/// read with a configured timeout reports "no data yet" as `TimedOut` (or
/// occasionally as a zero-length read), and the worker simply tries again.
/// The port's timeout bounds write calls too, so a timed-out write means
/// a full output buffer and is likewise retried. A short write is
/// completed before the next read, so bytes reach the destination in
/// exactly the order they were read. A stop request is honored between
/// iterations and between write attempts.
///
/// This blocks until termination; the caller is expected to give it a
/// dedicated blocking thread.
pub fn relay<R, W>(
    mut source: R,
    mut destination: W,
    buffer_size: usize,
    stop: &AtomicBool,
) -> TerminationReason
where
    R: Read,
    W: Write,
{
    let mut buffer = vec![0u8; buffer_size];

    loop {
        if stop.load(Ordering::SeqCst) {
            return TerminationReason::Stopped;
        }

        match source.read(&mut buffer) {
            Ok(0) => {
                // Nothing buffered right now; not end-of-stream for a
                // serial descriptor.
            }
            Ok(n) => {
                if let Err(reason) = write_full(&mut destination, &buffer[..n], stop) {
                    return reason;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                // Timeout is expected for serial reads
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return TerminationReason::ReadError(e),
        }
    }
}

/// Push `chunk` into `destination` in full. A `TimedOut` write is a
/// saturated output buffer, not a dead destination, and the attempt is
/// repeated; a write that accepts zero bytes cannot make progress and
/// fails as `WriteZero`.
fn write_full<W>(
    destination: &mut W,
    mut chunk: &[u8],
    stop: &AtomicBool,
) -> Result<(), TerminationReason>
where
    W: Write,
{
    while !chunk.is_empty() {
        if stop.load(Ordering::SeqCst) {
            return Err(TerminationReason::Stopped);
        }

        match destination.write(chunk) {
            Ok(0) => {
                return Err(TerminationReason::WriteError(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "destination accepted no bytes",
                )))
            }
            Ok(n) => chunk = &chunk[n..],
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(TerminationReason::WriteError(e)),
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

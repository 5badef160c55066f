// src/bridge.rs
//
// The bridge coordinator: one relay worker per direction, and the first
// worker to terminate ends the bridge. The survivor is told to stop and
// joined before this returns, so no device handle is ever closed under a
// live worker.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::relay::{relay, TerminationReason};

// ============================================================================
// Types
// ============================================================================

/// One side of the bridge: a display name plus the independently owned
/// reader and writer halves of an open device.
pub struct Endpoint<R, W> {
    pub name: String,
    pub reader: R,
    pub writer: W,
}

/// A relay direction. A and B follow the order the endpoints were handed
/// to [`run_bridge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    AToB,
    BToA,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AToB => write!(f, "A->B"),
            Direction::BToA => write!(f, "B->A"),
        }
    }
}

/// How a bridge run ended: which direction terminated first, and why.
#[derive(Debug)]
pub struct BridgeOutcome {
    pub direction: Direction,
    pub reason: TerminationReason,
}

impl fmt::Display for BridgeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} relay: {}", self.direction, self.reason)
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Run the bridge to completion.
///
/// Spawns one blocking relay worker per direction, waits for the first to
/// terminate, then sets the shared stop flag and joins the survivor. The
/// survivor notices the flag at its next idle cycle, so teardown completes
/// within one read-timeout interval. Every reader and writer half drops
/// inside its worker, closing each device exactly once, and only after
/// both workers have returned.
pub async fn run_bridge<RA, WA, RB, WB>(
    a: Endpoint<RA, WA>,
    b: Endpoint<RB, WB>,
    buffer_size: usize,
) -> BridgeOutcome
where
    RA: Read + Send + 'static,
    WA: Write + Send + 'static,
    RB: Read + Send + 'static,
    WB: Write + Send + 'static,
{
    let Endpoint {
        name: a_name,
        reader: a_reader,
        writer: a_writer,
    } = a;
    let Endpoint {
        name: b_name,
        reader: b_reader,
        writer: b_writer,
    } = b;

    let label_ab = format!("{} --> {}", a_name, b_name);
    let label_ba = format!("{} --> {}", b_name, a_name);

    let stop = Arc::new(AtomicBool::new(false));

    let stop_ab = stop.clone();
    let mut ab =
        tokio::task::spawn_blocking(move || relay(a_reader, b_writer, buffer_size, &stop_ab));
    info!("relay started: {}", label_ab);

    let stop_ba = stop.clone();
    let mut ba =
        tokio::task::spawn_blocking(move || relay(b_reader, a_writer, buffer_size, &stop_ba));
    info!("relay started: {}", label_ba);

    // First worker to terminate ends the bridge.
    let (direction, first) = tokio::select! {
        res = &mut ab => (Direction::AToB, res),
        res = &mut ba => (Direction::BToA, res),
    };

    stop.store(true, Ordering::SeqCst);

    let (label_first, label_survivor, survivor) = match direction {
        Direction::AToB => (&label_ab, &label_ba, ba),
        Direction::BToA => (&label_ba, &label_ab, ab),
    };

    let reason = match first {
        Ok(reason) => reason,
        Err(e) => {
            error!("relay task panicked ({}): {}", label_first, e);
            TerminationReason::ReadError(io::Error::new(
                io::ErrorKind::Other,
                "relay task panicked",
            ))
        }
    };
    warn!("relay terminated: {} ({})", label_first, reason);

    // The survivor normally ends with Stopped; a concurrent failure of its
    // own is worth the louder line.
    match survivor.await {
        Ok(sibling) if sibling.is_error() => {
            warn!("relay stopped with its own failure: {} ({})", label_survivor, sibling)
        }
        Ok(sibling) => info!("relay stopped: {} ({})", label_survivor, sibling),
        Err(e) => error!("relay task panicked ({}): {}", label_survivor, e),
    }

    // Both workers have returned, so all four halves are dropped and both
    // devices are closed.
    info!("bridge closed");

    BridgeOutcome { direction, reason }
}

// ============================================================================
// Tests
// ============================================================================

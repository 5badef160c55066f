// src/settings.rs
//
// Bridge configuration: the supported baud-rate set and the validated
// settings a bridge runs with. Validation happens here, after argument
// parsing, so that a bad value is reported as a setting problem rather
// than a malformed command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

// ============================================================================
// Baud Rates
// ============================================================================

/// Baud rates the bridge accepts. Both devices are always configured with
/// the same rate; anything outside this set is rejected before any port is
/// opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B9600,
    B19200,
    B115200,
    B921600,
    B1000000,
    B1152000,
    B1500000,
}

impl BaudRate {
    /// Every supported rate, ascending. Drives the help text and the
    /// rejection message for unsupported values.
    pub const ALL: [BaudRate; 7] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B115200,
        BaudRate::B921600,
        BaudRate::B1000000,
        BaudRate::B1152000,
        BaudRate::B1500000,
    ];

    /// The numeric rate handed to the serial layer.
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B115200 => 115200,
            BaudRate::B921600 => 921600,
            BaudRate::B1000000 => 1000000,
            BaudRate::B1152000 => 1152000,
            BaudRate::B1500000 => 1500000,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|rate| rate.as_u32() == value)
            .ok_or_else(|| format!("unsupported baud rate: {}", value))
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.as_u32()
    }
}

impl FromStr for BaudRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exact numeric match only; no prefix matching.
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid baud rate: {}", s))?;
        BaudRate::try_from(value)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

// ============================================================================
// Bridge Settings
// ============================================================================

/// Fully validated runtime configuration for one bridge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Device path of the first endpoint.
    pub serial_a: String,
    /// Device path of the second endpoint.
    pub serial_b: String,
    /// Line rate applied to both devices.
    pub speed: BaudRate,
    /// Blocking read mode: longer read timeout, fewer idle wakeups.
    pub block: bool,
    /// Transfer buffer capacity per relay direction, in bytes.
    pub buffer_size: usize,
}

impl BridgeSettings {
    /// Validate raw option values into runnable settings.
    ///
    /// The baud rate arrives as raw text and must parse to a supported
    /// rate; the two device paths must be non-empty and distinct; the
    /// buffer must hold at least one byte.
    pub fn resolve(
        serial_a: String,
        serial_b: String,
        speed: Option<&str>,
        block: bool,
        buffer_size: usize,
    ) -> Result<Self, BridgeError> {
        let speed = match speed {
            Some(value) => value.parse::<BaudRate>().map_err(BridgeError::Setting)?,
            None => return Err(BridgeError::Setting("no baud rate given".to_string())),
        };

        if serial_a.is_empty() || serial_b.is_empty() {
            return Err(BridgeError::Setting("empty device path".to_string()));
        }

        if serial_a == serial_b {
            return Err(BridgeError::Setting(format!(
                "serial A and serial B are the same [{}]",
                serial_a
            )));
        }

        if buffer_size == 0 {
            return Err(BridgeError::Setting(
                "transfer buffer size must be at least 1 byte".to_string(),
            ));
        }

        Ok(Self {
            serial_a,
            serial_b,
            speed,
            block,
            buffer_size,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

// src/error.rs
//
// Error taxonomy and process exit statuses.
// The numeric exit values are part of the external contract: wrapping
// scripts distinguish a bad command line from a bad setting, an open
// failure, and a bridge that ran and then died.

use std::process::ExitCode;

use crate::bridge::BridgeOutcome;

// ============================================================================
// Errors
// ============================================================================

/// Top-level failure of the bridge binary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A resolved option value is invalid: missing or unsupported baud
    /// rate, identical device paths, empty path, zero buffer.
    #[error("invalid setting: {0}")]
    Setting(String),

    /// A serial device could not be opened or configured.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// Serial ports could not be enumerated for the listing.
    #[error("failed to list serial ports: {0}")]
    List(serialport::Error),

    /// The bridge ran and then terminated on an I/O failure.
    #[error("passthrough ended: {0}")]
    Passthrough(BridgeOutcome),
}

// ============================================================================
// Exit Statuses
// ============================================================================

/// Process exit statuses.
///
/// Success covers help-style invocations (`--help`, `--list`); a bridge
/// that actually relayed always exits with `Passthrough`, because a healthy
/// bridge never returns on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Argument = 1,
    Setting = 2,
    Open = 3,
    Passthrough = 4,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl From<&BridgeError> for ExitStatus {
    fn from(err: &BridgeError) -> Self {
        match err {
            BridgeError::Setting(_) => ExitStatus::Setting,
            BridgeError::Open { .. } => ExitStatus::Open,
            // Enumeration failures are serial-subsystem failures, same slot
            // as a failed open.
            BridgeError::List(_) => ExitStatus::Open,
            BridgeError::Passthrough(_) => ExitStatus::Passthrough,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Direction;
    use crate::relay::TerminationReason;

    #[test]
    fn test_exit_status_values() {
        assert_eq!(ExitStatus::Success as u8, 0);
        assert_eq!(ExitStatus::Argument as u8, 1);
        assert_eq!(ExitStatus::Setting as u8, 2);
        assert_eq!(ExitStatus::Open as u8, 3);
        assert_eq!(ExitStatus::Passthrough as u8, 4);
    }

    #[test]
    fn test_exit_status_for_errors() {
        let setting = BridgeError::Setting("no baud rate given".to_string());
        assert!(matches!(ExitStatus::from(&setting), ExitStatus::Setting));

        let open = BridgeError::Open {
            path: "/dev/ttyUSB0".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
        };
        assert!(matches!(ExitStatus::from(&open), ExitStatus::Open));

        let list = BridgeError::List(serialport::Error::new(
            serialport::ErrorKind::Unknown,
            "enumeration failed",
        ));
        assert!(matches!(ExitStatus::from(&list), ExitStatus::Open));

        let passthrough = BridgeError::Passthrough(BridgeOutcome {
            direction: Direction::AToB,
            reason: TerminationReason::Stopped,
        });
        assert!(matches!(
            ExitStatus::from(&passthrough),
            ExitStatus::Passthrough
        ));
    }

    #[test]
    fn test_open_error_names_the_device() {
        let err = BridgeError::Open {
            path: "/dev/ttyUSB1".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
        };
        let text = err.to_string();
        assert!(text.contains("/dev/ttyUSB1"), "message was: {}", text);
    }
}

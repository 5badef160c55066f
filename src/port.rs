// src/port.rs
//
// Serial device setup: open a device with the bridge line parameters and
// split it into independently owned reader and writer halves. Also
// provides the port listing behind `--list`.

use std::time::Duration;

use serde::Serialize;
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::info;

use crate::bridge::Endpoint;
use crate::settings::BaudRate;

/// Read timeout in blocking mode: one long wait per attempt.
pub const BLOCKING_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Read timeout in non-blocking mode: a short poll.
pub const POLL_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// The endpoint type for real devices: both halves are boxed ports sharing
/// one descriptor.
pub type SerialEndpoint = Endpoint<Box<dyn SerialPort>, Box<dyn SerialPort>>;

// ============================================================================
// Open and Configure
// ============================================================================

/// Read timeout for the given blocking mode.
///
/// The relay treats an expired timeout as an idle cycle, so the mode only
/// changes how often an idle worker wakes up (and how quickly it notices a
/// stop request), never whether data gets relayed.
pub fn read_timeout(block: bool) -> Duration {
    if block {
        BLOCKING_READ_TIMEOUT
    } else {
        POLL_READ_TIMEOUT
    }
}

/// Open and configure one bridge device, returning its endpoint.
///
/// Line parameters are fixed: 8 data bits, 2 stop bits, no parity, no flow
/// control. TTYs open in exclusive mode, so a second open of the same
/// device fails instead of interleaving bytes with the bridge.
pub fn open_endpoint(
    path: &str,
    speed: BaudRate,
    block: bool,
) -> Result<SerialEndpoint, serialport::Error> {
    let reader = serialport::new(path, speed.as_u32())
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::Two)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .timeout(read_timeout(block))
        .open()?;
    let writer = reader.try_clone()?;

    info!("opened {} at {} baud (8-N-2)", path, speed);

    Ok(Endpoint {
        name: path.to_string(),
        reader,
        writer,
    })
}

// ============================================================================
// Port Listing
// ============================================================================

/// One row of the `--list` output.
#[derive(Clone, Debug, Serialize)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

/// List the serial ports available on this machine.
///
/// On macOS only the /dev/cu.* (calling unit) devices are shown; their
/// /dev/tty.* twins block on open waiting for carrier detect and are
/// useless for a bridge.
pub fn list_ports() -> Result<Vec<PortInfo>, serialport::Error> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .filter(|_p| {
            #[cfg(target_os = "macos")]
            {
                !_p.port_name.starts_with("/dev/tty.")
            }
            #[cfg(not(target_os = "macos"))]
            {
                true
            }
        })
        .map(port_info)
        .collect())
}

fn port_info(port: serialport::SerialPortInfo) -> PortInfo {
    match port.port_type {
        SerialPortType::UsbPort(usb) => PortInfo {
            port_name: port.port_name,
            port_type: "USB".to_string(),
            manufacturer: usb.manufacturer,
            product: usb.product,
            serial_number: usb.serial_number,
            vid: Some(usb.vid),
            pid: Some(usb.pid),
        },
        other => PortInfo {
            port_name: port.port_name,
            port_type: match other {
                SerialPortType::BluetoothPort => "Bluetooth",
                SerialPortType::PciPort => "PCI",
                _ => "Unknown",
            }
            .to_string(),
            manufacturer: None,
            product: None,
            serial_number: None,
            vid: None,
            pid: None,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_timeout_by_mode() {
        assert_eq!(read_timeout(true), BLOCKING_READ_TIMEOUT);
        assert_eq!(read_timeout(false), POLL_READ_TIMEOUT);
        // Non-blocking mode must poll faster than blocking mode waits.
        assert!(read_timeout(false) < read_timeout(true));
    }

    #[test]
    fn test_port_info_keeps_usb_metadata() {
        let info = port_info(serialport::SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x0403,
                pid: 0x6001,
                serial_number: Some("A1B2C3".to_string()),
                manufacturer: Some("FTDI".to_string()),
                product: Some("FT232R".to_string()),
            }),
        });
        assert_eq!(info.port_type, "USB");
        assert_eq!(info.vid, Some(0x0403));
        assert_eq!(info.product.as_deref(), Some("FT232R"));
    }

    #[test]
    fn test_port_info_non_usb() {
        let info = port_info(serialport::SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        });
        assert_eq!(info.port_type, "Unknown");
        assert!(info.vid.is_none());
    }
}

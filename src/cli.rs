// src/cli.rs
//
// Command-line surface and the top-level run flow: parse, resolve the
// settings, open both devices, hand them to the bridge. A healthy bridge
// never returns, so any bridge run ends in a passthrough error; Ok is
// reserved for help-style invocations such as `--list`.

use clap::Parser;
use tracing::{debug, info, warn};

use crate::bridge::run_bridge;
use crate::error::BridgeError;
use crate::port;
use crate::relay::DEFAULT_TRANSFER_BUFFER;
use crate::settings::{BaudRate, BridgeSettings};

fn baud_rate_help() -> String {
    let rates = BaudRate::ALL
        .iter()
        .map(|rate| format!("  {}", rate))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Supported baud rates:\n{}", rates)
}

/// Bridge two serial devices, relaying bytes in both directions.
#[derive(Debug, Parser)]
#[command(name = "uartpass", version, about, after_help = baud_rate_help(), arg_required_else_help = true)]
pub struct Cli {
    /// First serial device to pass through
    #[arg(value_name = "SERIAL_A", required_unless_present = "list")]
    pub serial_a: Option<String>,

    /// Second serial device to pass through
    #[arg(value_name = "SERIAL_B", required_unless_present = "list")]
    pub serial_b: Option<String>,

    /// Baud rate for both devices
    // Raw text, not u32: rejection of any bad value belongs to settings
    // resolution, not the argument parser.
    #[arg(short, long, value_name = "BAUD")]
    pub speed: Option<String>,

    /// Blocking read mode: wait for data instead of polling
    #[arg(short, long)]
    pub block: bool,

    /// Transfer buffer capacity per direction, in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_TRANSFER_BUFFER)]
    pub buffer_size: usize,

    /// List available serial ports and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print the port listing as JSON
    #[arg(long, requires = "list")]
    pub json: bool,
}

impl Cli {
    /// Validate the parsed options into runnable bridge settings.
    pub fn resolve(self) -> Result<BridgeSettings, BridgeError> {
        BridgeSettings::resolve(
            self.serial_a.unwrap_or_default(),
            self.serial_b.unwrap_or_default(),
            self.speed.as_deref(),
            self.block,
            self.buffer_size,
        )
    }
}

// ============================================================================
// Run Flow
// ============================================================================

/// Run the binary's top-level flow for an already-parsed command line.
pub async fn run(cli: Cli) -> Result<(), BridgeError> {
    if cli.list {
        return print_port_listing(cli.json);
    }

    let settings = cli.resolve()?;
    debug!(
        "settings: serial_a={} serial_b={} speed={} block={} buffer_size={}",
        settings.serial_a, settings.serial_b, settings.speed, settings.block, settings.buffer_size
    );

    let a = port::open_endpoint(&settings.serial_a, settings.speed, settings.block).map_err(
        |source| BridgeError::Open {
            path: settings.serial_a.clone(),
            source,
        },
    )?;
    let b = port::open_endpoint(&settings.serial_b, settings.speed, settings.block).map_err(
        |source| BridgeError::Open {
            path: settings.serial_b.clone(),
            source,
        },
    )?;

    info!(
        "passing through {} <--> {} at {} baud",
        settings.serial_a, settings.serial_b, settings.speed
    );

    let outcome = run_bridge(a, b, settings.buffer_size).await;
    Err(BridgeError::Passthrough(outcome))
}

fn print_port_listing(json: bool) -> Result<(), BridgeError> {
    let ports = port::list_ports().map_err(BridgeError::List)?;

    if json {
        match serde_json::to_string_pretty(&ports) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("failed to render port listing as JSON: {}", e),
        }
        return Ok(());
    }

    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for p in &ports {
        let mut line = format!("{}  [{}]", p.port_name, p.port_type);
        if let (Some(vid), Some(pid)) = (p.vid, p.pid) {
            line.push_str(&format!(" {:04x}:{:04x}", vid, pid));
        }
        if let Some(product) = &p.product {
            line.push_str(&format!(" {}", product));
        }
        println!("{}", line);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_devices_unless_listing() {
        assert!(Cli::try_parse_from(["uartpass"]).is_err());
        assert!(Cli::try_parse_from(["uartpass", "/dev/ttyUSB0"]).is_err());
        assert!(Cli::try_parse_from(["uartpass", "--list"]).is_ok());
    }

    #[test]
    fn test_cli_parses_bridge_options() {
        let cli = Cli::try_parse_from([
            "uartpass",
            "-s",
            "115200",
            "-b",
            "/dev/ttyUSB0",
            "/dev/ttyUSB1",
        ])
        .expect("command line should parse");
        assert_eq!(cli.serial_a.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.serial_b.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(cli.speed.as_deref(), Some("115200"));
        assert!(cli.block);
        assert_eq!(cli.buffer_size, DEFAULT_TRANSFER_BUFFER);
    }

    #[test]
    fn test_cli_buffer_size_override() {
        let cli = Cli::try_parse_from([
            "uartpass",
            "--buffer-size",
            "4096",
            "/dev/ttyUSB0",
            "/dev/ttyUSB1",
        ])
        .expect("command line should parse");
        assert_eq!(cli.buffer_size, 4096);
    }

    #[test]
    fn test_cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["uartpass", "--turbo", "a", "b"]).is_err());
    }

    #[test]
    fn test_cli_json_requires_list() {
        assert!(Cli::try_parse_from(["uartpass", "--json"]).is_err());
        assert!(Cli::try_parse_from(["uartpass", "--list", "--json"]).is_ok());
    }

    #[test]
    fn test_cli_missing_speed_is_a_setting_error() {
        // A missing baud rate is a setting problem, not a parse failure.
        let cli = Cli::try_parse_from(["uartpass", "/dev/ttyUSB0", "/dev/ttyUSB1"])
            .expect("command line should parse");
        assert!(matches!(cli.resolve(), Err(BridgeError::Setting(_))));
    }

    #[test]
    fn test_cli_non_numeric_speed_is_a_setting_error() {
        // Same taxonomy for a garbled rate: the command line parses, and
        // resolution reports the setting problem.
        let cli = Cli::try_parse_from(["uartpass", "-s", "fast", "/dev/ttyUSB0", "/dev/ttyUSB1"])
            .expect("command line should parse");
        match cli.resolve() {
            Err(BridgeError::Setting(msg)) => {
                assert!(msg.contains("fast"), "message was: {}", msg)
            }
            other => panic!("expected setting error, got {:?}", other),
        }
    }

    #[test]
    fn test_baud_rate_help_lists_all_rates() {
        let help = baud_rate_help();
        for rate in BaudRate::ALL {
            assert!(help.contains(&rate.to_string()), "missing {}", rate);
        }
    }
}

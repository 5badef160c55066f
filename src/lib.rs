// src/lib.rs
//
// uartpass: a serial passthrough bridge. Opens two serial devices with
// matching line parameters and relays bytes in both directions until
// either side fails, then tears the bridge down.
//
// Module map:
//   relay    - the unidirectional copy loop (one worker per direction)
//   bridge   - the coordinator pairing two workers over two devices
//   port     - device open/configure/split, port listing
//   settings - supported baud rates and validated bridge settings
//   error    - error taxonomy and process exit statuses
//   cli      - command-line surface and top-level run flow

pub mod bridge;
pub mod cli;
pub mod error;
pub mod port;
pub mod relay;
pub mod settings;

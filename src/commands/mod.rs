//! CLI command implementations
//!
//! Every command receives a bus that has already been through `begin()`
//! and had the requested mode, bit order and clock applied.

mod list;
mod loopback;
mod transfer;

pub use list::list_ports;
pub use loopback::run_loopback;
pub use transfer::run_transfer;

/// Format bytes as space separated hex
fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

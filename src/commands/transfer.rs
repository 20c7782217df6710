//! Transfer command implementation

use super::hex;
use crate::ports::Bus;

/// Send `data` in one full-duplex transfer and print the received bytes
pub fn run_transfer(bus: &mut Bus, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let rx = if let [byte] = data {
        vec![bus.transfer(*byte)?]
    } else {
        let mut rx = vec![0u8; data.len()];
        bus.transfer_buffer(data, &mut rx)?;
        rx
    };

    println!("TX: {}", hex(data));
    println!("RX: {}", hex(&rx));
    Ok(())
}

//! Loopback self-test
//!
//! With MOSI wired to MISO every byte shifted out comes straight back, so
//! both the single-byte and the buffered transfer must echo their input.

use super::hex;
use crate::ports::Bus;

/// Byte used for the single-byte check
const PROBE_BYTE: u8 = 0x42;

/// Pattern repeated to fill the buffer check
const PATTERN: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

fn pattern(len: usize) -> Vec<u8> {
    PATTERN.iter().copied().cycle().take(len).collect()
}

/// Run the loopback self-test
pub fn run_loopback(bus: &mut Bus, len: usize) -> Result<(), Box<dyn std::error::Error>> {
    let rx = bus.transfer(PROBE_BYTE)?;
    if rx != PROBE_BYTE {
        return Err(format!(
            "Single byte loopback failed: sent {:02X}, received {:02X}",
            PROBE_BYTE, rx
        )
        .into());
    }
    println!("Single byte: {:02X} -> {:02X} OK", PROBE_BYTE, rx);

    let tx = pattern(len);
    let mut rx = vec![0u8; len];
    bus.transfer_buffer(&tx, &mut rx)?;
    if let Some(pos) = tx.iter().zip(&rx).position(|(a, b)| a != b) {
        return Err(format!(
            "Buffer loopback failed at byte {}: sent {:02X}, received {:02X}",
            pos, tx[pos], rx[pos]
        )
        .into());
    }
    println!("Buffer ({} bytes): {} OK", len, hex(&rx));

    println!("Loopback test passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern() {
        assert_eq!(pattern(4), PATTERN.to_vec());
        assert_eq!(pattern(6), vec![0xDE, 0xAD, 0xBE, 0xEF, 0xDE, 0xAD]);
        assert!(pattern(0).is_empty());
    }

    #[cfg(feature = "dummy")]
    fn dummy_bus(port: spishim_dummy::DummyPort) -> Bus {
        use spishim_core::port::{GpioController, PowerManagement, SpiPort};
        use spishim_dummy::{DummyGpio, DummyPower};

        let port: Box<dyn SpiPort> = Box::new(port);
        let gpio: Box<dyn GpioController> = Box::new(DummyGpio::new());
        let power: Box<dyn PowerManagement> = Box::new(DummyPower::new());
        let mut bus = spishim_core::SpiBus::new(port, gpio, power);
        bus.begin().unwrap();
        bus
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_loopback_on_dummy() {
        use spishim_dummy::DummyPort;

        let mut bus = dummy_bus(DummyPort::loopback());
        assert!(run_loopback(&mut bus, 8).is_ok());

        let mut bus = dummy_bus(DummyPort::with_idle_byte(0xFF));
        assert!(run_loopback(&mut bus, 4).is_err());
    }
}

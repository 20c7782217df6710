//! Error reporting through the bus on top of a spidev port

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};
use spishim_core::port::{NoGpio, NoPowerManagement};
use spishim_core::{DataMode, Error, SpiBus};
use spishim_linux_spi::{LinuxSpi, LinuxSpiConfig};

struct ErrorCounter {
    errors: AtomicUsize,
}

impl Log for ErrorCounter {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Error {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static LOGGER: ErrorCounter = ErrorCounter {
    errors: AtomicUsize::new(0),
};

fn errors_during(f: impl FnOnce()) -> usize {
    let before = LOGGER.errors.load(Ordering::SeqCst);
    f();
    LOGGER.errors.load(Ordering::SeqCst) - before
}

// Single test: the logger is process-global
#[test]
fn test_each_failure_logged_once() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let config = LinuxSpiConfig::new("/dev/does-not-exist-spidev9.9");
    let mut bus = SpiBus::new(LinuxSpi::new(&config), NoGpio, NoPowerManagement);

    let logged = errors_during(|| assert_eq!(bus.begin(), Err(Error::DeviceOpenFailed)));
    assert_eq!(logged, 1);

    let logged = errors_during(|| {
        assert_eq!(bus.set_data_mode(DataMode::Mode3), Err(Error::DeviceNotOpen))
    });
    assert_eq!(logged, 1);

    let logged = errors_during(|| assert_eq!(bus.transfer(0x42), Err(Error::DeviceNotOpen)));
    assert_eq!(logged, 1);

    let mut rx = [0u8; 2];
    let logged = errors_during(|| {
        assert_eq!(
            bus.transfer_buffer(&[1, 2], &mut rx),
            Err(Error::DeviceNotOpen)
        )
    });
    assert_eq!(logged, 1);
}

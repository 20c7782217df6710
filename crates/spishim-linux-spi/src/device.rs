//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the `SpiPort`
//! trait using Linux's spidev interface.

use crate::error::{LinuxSpiError, Result};

use spishim_core::error::Result as CoreResult;
use spishim_core::port::{RawHandle, SpiPort};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default spidev device node
pub const DEFAULT_SPIDEV_PATH: &str = "/dev/spidev1.0";

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_LSB_FIRST: u8 = 2;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    // Generate ioctl functions
    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_lsb_first,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_LSB_FIRST,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    // SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)])

    /// Size of struct spi_ioc_transfer (pointers are carried as __u64)
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        // _IOC(dir, type, nr, size) = ((dir)<<30)|((size)<<16)|((type)<<8)|(nr), _IOC_WRITE = 1
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

impl SpiIocTransfer {
    /// Full-duplex descriptor; zeroed speed/bits fields use the device settings
    fn full_duplex(tx: &[u8], rx: &mut [u8]) -> Self {
        Self {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: tx.len() as u32,
            ..Default::default()
        }
    }
}

/// Configuration for a Linux SPI port
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev1.0")
    pub device: String,
    /// sysfs `power/control` file of the controller, if runtime PM should
    /// be disabled on `begin()`
    pub power_control: Option<String>,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_SPIDEV_PATH.to_string(),
            power_control: None,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Disable runtime power management through the given sysfs file
    pub fn with_power_control(mut self, path: impl Into<String>) -> Self {
        self.power_control = Some(path.into());
        self
    }
}

/// Linux SPI port using the spidev interface
///
/// The device node is opened on `SpiPort::open()` (normally from
/// `SpiBus::begin()`) and closed on `SpiPort::close()` or drop.
pub struct LinuxSpi {
    /// Device path
    device: String,
    /// File handle for spidev device, `None` while closed
    file: Option<File>,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
}

impl LinuxSpi {
    /// Create a closed port for the configured device
    pub fn new(config: &LinuxSpiConfig) -> Self {
        Self {
            device: config.device.clone(),
            file: None,
            max_kernel_buf_size: 0,
        }
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }

    fn open_file(&mut self) -> Result<()> {
        if self.device.is_empty() {
            return Err(LinuxSpiError::InvalidParameter(
                "No device specified. Use dev=/dev/spidevX.Y".into(),
            ));
        }

        log::debug!("linux_spi: Opening device {}", self.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: self.device.clone(),
                source: e,
            })?;

        self.max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            self.max_kernel_buf_size
        );
        log::info!(
            "linux_spi: Opened {} (fd {})",
            self.device,
            file.as_raw_fd()
        );

        self.file = Some(file);
        Ok(())
    }

    fn fd(&self) -> Result<RawHandle> {
        self.file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .ok_or_else(|| LinuxSpiError::NotOpen(self.device.clone()))
    }

    /// Set the native SPI mode byte
    pub fn set_mode(&mut self, mode: u8) -> Result<()> {
        let fd = self.fd()?;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }
        log::debug!("linux_spi: Set mode to {}", mode);
        Ok(())
    }

    /// Set the LSB-first flag
    pub fn set_lsb_first(&mut self, lsb_first: bool) -> Result<()> {
        let fd = self.fd()?;
        let value = lsb_first as u8;
        unsafe {
            ioctl::spi_ioc_wr_lsb_first(fd, &value).map_err(|e| {
                LinuxSpiError::SetBitOrderFailed {
                    lsb_first,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        log::debug!("linux_spi: Set LSB first to {}", lsb_first);
        Ok(())
    }

    /// Set a new SPI clock speed
    pub fn set_speed(&mut self, speed_hz: u32) -> Result<()> {
        let fd = self.fd()?;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed_hz).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed: speed_hz,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        log::debug!("linux_spi: Set speed to {} Hz", speed_hz);
        Ok(())
    }

    /// Perform a full-duplex SPI transfer
    ///
    /// Submits a single SPI_IOC_MESSAGE(1) descriptor with both transmit
    /// and receive buffers set.
    pub fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        let fd = self.fd()?;

        if tx.len() != rx.len() {
            return Err(LinuxSpiError::InvalidParameter(format!(
                "tx and rx lengths differ ({} vs {})",
                tx.len(),
                rx.len()
            )));
        }
        if tx.len() > self.max_kernel_buf_size {
            return Err(LinuxSpiError::InvalidParameter(format!(
                "transfer of {} bytes exceeds spidev buffer size {}",
                tx.len(),
                self.max_kernel_buf_size
            )));
        }

        let transfer = SpiIocTransfer::full_duplex(tx, rx);

        let ioctl_num = ioctl::spi_ioc_message(1);
        let ret = unsafe { libc::ioctl(fd, ioctl_num, &transfer as *const SpiIocTransfer) };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

/// Convert a backend error to its core category
///
/// The bus logs the failure; the detailed cause is kept at debug level.
fn report<T>(result: Result<T>) -> CoreResult<T> {
    result.map_err(|e| {
        log::debug!("linux_spi: {}", e);
        e.kind()
    })
}

impl SpiPort for LinuxSpi {
    fn open(&mut self) -> CoreResult<()> {
        report(self.open_file())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("linux_spi: Closed {}", self.device);
        }
    }

    fn handle(&self) -> Option<RawHandle> {
        self.file.as_ref().map(|f| f.as_raw_fd())
    }

    fn write_lsb_first(&mut self, lsb_first: bool) -> CoreResult<()> {
        report(self.set_lsb_first(lsb_first))
    }

    fn write_mode(&mut self, mode: u8) -> CoreResult<()> {
        report(self.set_mode(mode))
    }

    fn write_max_speed_hz(&mut self, speed_hz: u32) -> CoreResult<()> {
        report(self.set_speed(speed_hz))
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> CoreResult<()> {
        report(self.spi_transfer(tx, rx))
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    // spidev's default bufsiz is one page
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse port options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                if value.is_empty() {
                    return Err("Empty dev value. Use dev=/dev/spidevX.Y".to_string());
                }
                config.device = value.to_string();
            }
            "power" => {
                config.power_control = match *value {
                    "" | "none" => None,
                    path => Some(path.to_string()),
                };
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spishim_core::Error as CoreError;

    #[test]
    fn test_transfer_struct_layout() {
        assert_eq!(
            std::mem::size_of::<SpiIocTransfer>(),
            ioctl::SPI_IOC_TRANSFER_SIZE
        );
    }

    #[test]
    fn test_message_ioctl_number() {
        assert_eq!(ioctl::spi_ioc_message(1), 0x4020_6b00);
        assert_eq!(ioctl::spi_ioc_message(2), 0x4040_6b00);
    }

    #[test]
    fn test_full_duplex_descriptor() {
        let tx = [1u8, 2, 3, 4];
        let mut rx = [0u8; 4];
        let xfer = SpiIocTransfer::full_duplex(&tx, &mut rx);
        assert_eq!(xfer.tx_buf, tx.as_ptr() as u64);
        assert_eq!(xfer.rx_buf, rx.as_ptr() as u64);
        assert_eq!(xfer.len, 4);
        assert_eq!(xfer.speed_hz, 0);
        assert_eq!(xfer.bits_per_word, 0);
        assert_eq!(xfer.cs_change, 0);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, DEFAULT_SPIDEV_PATH);
        assert_eq!(config.power_control, None);

        let config = parse_options(&[
            ("dev", "/dev/spidev0.1"),
            ("power", "/sys/devices/foo/power/control"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/spidev0.1");
        assert_eq!(
            config.power_control.as_deref(),
            Some("/sys/devices/foo/power/control")
        );

        let config = parse_options(&[("power", "none")]).unwrap();
        assert_eq!(config.power_control, None);

        assert!(parse_options(&[("dev", "")]).is_err());
    }

    #[test]
    fn test_open_missing_device() {
        let mut spi = LinuxSpi::new(&LinuxSpiConfig::new("/dev/does-not-exist-spidev9.9"));
        assert_eq!(SpiPort::open(&mut spi), Err(CoreError::DeviceOpenFailed));
        assert!(!spi.is_open());
    }

    #[test]
    fn test_closed_port_fails() {
        let mut spi = LinuxSpi::new(&LinuxSpiConfig::default());
        assert_eq!(spi.handle(), None);
        assert_eq!(spi.write_mode(0), Err(CoreError::DeviceNotOpen));
        assert_eq!(spi.write_lsb_first(true), Err(CoreError::DeviceNotOpen));
        assert_eq!(spi.write_max_speed_hz(1_000_000), Err(CoreError::DeviceNotOpen));
        let mut rx = [0u8; 1];
        assert_eq!(
            SpiPort::transfer(&mut spi, &[0x42], &mut rx),
            Err(CoreError::DeviceNotOpen)
        );
        spi.close();
    }
}

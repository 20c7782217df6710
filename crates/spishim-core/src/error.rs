//! Error types for spishim-core
//!
//! This module provides a no_std compatible error type shared by the bus
//! and every port backend.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Device errors
    /// The SPI device could not be opened (missing driver, permissions, path)
    DeviceOpenFailed,
    /// The operation needs an open device but the port is closed
    DeviceNotOpen,

    // Configuration errors
    /// The device rejected a bit order, mode or speed setting
    ConfigurationRejected,
    /// Unrecognized mode, bit order or divider value, or mismatched buffers
    InvalidArgument,

    // Transfer errors
    /// The transfer ioctl failed
    TransferFailed,

    // Capability errors
    /// Slave mode / interrupt driven operation was requested
    UnsupportedOperation,
    /// Chip-select or pin multiplexer setup failed
    GpioFailed,
    /// Disabling controller power management failed
    PowerManagementFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOpenFailed => write!(f, "failed to open SPI device"),
            Self::DeviceNotOpen => write!(f, "SPI device is not open"),
            Self::ConfigurationRejected => write!(f, "SPI configuration rejected by device"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::TransferFailed => write!(f, "SPI transfer failed"),
            Self::UnsupportedOperation => write!(f, "SPI slave mode is not supported"),
            Self::GpioFailed => write!(f, "GPIO operation failed"),
            Self::PowerManagementFailed => write!(f, "failed to disable power management"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

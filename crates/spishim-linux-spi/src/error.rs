//! Error types for Linux SPI operations

use spishim_core::Error as CoreError;
use thiserror::Error;

/// Linux SPI specific errors
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Device is not open
    #[error("SPI device {0} is not open")]
    NotOpen(String),

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to {mode}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bit order
    #[error("Failed to set LSB-first flag to {lsb_first}: {source}")]
    SetBitOrderFailed {
        lsb_first: bool,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI transfer failed
    #[error("SPI transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failed to write the power control file
    #[error("Failed to write {path}: {source}")]
    PowerControlFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LinuxSpiError {
    /// Core error category for this failure
    pub fn kind(&self) -> CoreError {
        match self {
            Self::OpenFailed { .. } => CoreError::DeviceOpenFailed,
            Self::NotOpen(_) => CoreError::DeviceNotOpen,
            Self::SetModeFailed { .. }
            | Self::SetBitOrderFailed { .. }
            | Self::SetSpeedFailed { .. } => CoreError::ConfigurationRejected,
            Self::TransferFailed(_) => CoreError::TransferFailed,
            Self::InvalidParameter(_) => CoreError::InvalidArgument,
            Self::PowerControlFailed { .. } => CoreError::PowerManagementFailed,
        }
    }
}

impl From<LinuxSpiError> for CoreError {
    fn from(e: LinuxSpiError) -> Self {
        e.kind()
    }
}

/// Result type for Linux SPI operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;

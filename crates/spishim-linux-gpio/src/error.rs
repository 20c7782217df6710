//! Error types for Linux GPIO operations

use spishim_core::Error as CoreError;
use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines
    #[error("Failed to request GPIO line(s) {offsets:?} on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        offsets: Vec<u32>,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set GPIO line {offset}: {source}")]
    SetValueFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to reconfigure GPIO lines
    #[error("Failed to reconfigure GPIO line {offset}: {source}")]
    ReconfigureFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Line was written before being configured as an output
    #[error("GPIO line {0} is not configured as an output")]
    NotOutput(u32),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl LinuxGpioError {
    /// Core error category for this failure
    pub fn kind(&self) -> CoreError {
        match self {
            Self::InvalidParameter(_) => CoreError::InvalidArgument,
            _ => CoreError::GpioFailed,
        }
    }
}

impl From<LinuxGpioError> for CoreError {
    fn from(e: LinuxGpioError) -> Self {
        e.kind()
    }
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;

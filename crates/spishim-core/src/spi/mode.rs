//! Clock polarity/phase modes and bit order

use crate::error::Error;

/// Arduino `SPI_MODE0` code
pub const SPI_MODE0: u8 = 0;
/// Arduino `SPI_MODE1` code
pub const SPI_MODE1: u8 = 1;
/// Arduino `SPI_MODE2` code
pub const SPI_MODE2: u8 = 2;
/// Arduino `SPI_MODE3` code
pub const SPI_MODE3: u8 = 3;

/// Arduino `LSBFIRST` code
pub const LSBFIRST: u8 = 0;
/// Arduino `MSBFIRST` code
pub const MSBFIRST: u8 = 1;

/// Kernel clock phase bit (`SPI_CPHA` in `linux/spi/spidev.h`)
pub const SPI_CPHA: u8 = 0x01;
/// Kernel clock polarity bit (`SPI_CPOL` in `linux/spi/spidev.h`)
pub const SPI_CPOL: u8 = 0x02;

/// SPI clock polarity/phase combination
///
/// * Mode0: CPOL 0, CPHA 0
/// * Mode1: CPOL 0, CPHA 1
/// * Mode2: CPOL 1, CPHA 0
/// * Mode3: CPOL 1, CPHA 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataMode {
    /// CPOL 0, CPHA 0
    #[default]
    Mode0,
    /// CPOL 0, CPHA 1
    Mode1,
    /// CPOL 1, CPHA 0
    Mode2,
    /// CPOL 1, CPHA 1
    Mode3,
}

impl DataMode {
    /// All modes in ordinal order
    pub const ALL: [DataMode; 4] = [Self::Mode0, Self::Mode1, Self::Mode2, Self::Mode3];

    /// Native spidev mode value (`SPI_MODE_0` .. `SPI_MODE_3`)
    ///
    /// Each logical mode maps to the kernel mode of the same ordinal.
    pub const fn native(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => SPI_CPHA,
            Self::Mode2 => SPI_CPOL,
            Self::Mode3 => SPI_CPOL | SPI_CPHA,
        }
    }

    /// Clock polarity (idle level of SCK)
    pub const fn cpol(self) -> bool {
        self.native() & SPI_CPOL != 0
    }

    /// Clock phase (sample on the trailing edge when set)
    pub const fn cpha(self) -> bool {
        self.native() & SPI_CPHA != 0
    }
}

impl TryFrom<u8> for DataMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            SPI_MODE0 => Ok(Self::Mode0),
            SPI_MODE1 => Ok(Self::Mode1),
            SPI_MODE2 => Ok(Self::Mode2),
            SPI_MODE3 => Ok(Self::Mode3),
            _ => Err(Error::InvalidArgument),
        }
    }
}

impl core::fmt::Display for DataMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mode {}", self.native())
    }
}

/// Order in which the bits of each byte are shifted out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

impl BitOrder {
    /// Value of the spidev "LSB first" flag
    pub const fn lsb_first(self) -> bool {
        matches!(self, Self::LsbFirst)
    }
}

impl TryFrom<u8> for BitOrder {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            LSBFIRST => Ok(Self::LsbFirst),
            MSBFIRST => Ok(Self::MsbFirst),
            _ => Err(Error::InvalidArgument),
        }
    }
}

impl core::fmt::Display for BitOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MsbFirst => write!(f, "MSB first"),
            Self::LsbFirst => write!(f, "LSB first"),
        }
    }
}

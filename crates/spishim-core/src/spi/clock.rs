//! Clock divider table and clock source selection

use crate::error::Error;

/// Reference frequency the dividers are expressed against (the `DIV4` speed)
pub const BASE_CLOCK_HZ: u32 = 4_000_000;

/// Highest clock speed the controller accepts
pub const MAX_CLOCK_HZ: u32 = 25_000_000;

/// Arduino `SPI_CLOCK_DIV4` code
pub const SPI_CLOCK_DIV4: u8 = 0x00;
/// Arduino `SPI_CLOCK_DIV16` code
pub const SPI_CLOCK_DIV16: u8 = 0x01;
/// Arduino `SPI_CLOCK_DIV64` code
pub const SPI_CLOCK_DIV64: u8 = 0x02;
/// Arduino `SPI_CLOCK_DIV128` code
pub const SPI_CLOCK_DIV128: u8 = 0x03;
/// Arduino `SPI_CLOCK_DIV2` code
pub const SPI_CLOCK_DIV2: u8 = 0x04;
/// Arduino `SPI_CLOCK_DIV8` code
pub const SPI_CLOCK_DIV8: u8 = 0x05;
/// Arduino `SPI_CLOCK_DIV32` code
pub const SPI_CLOCK_DIV32: u8 = 0x06;
/// `SPI_CLOCK_DIV1` code
pub const SPI_CLOCK_DIV1: u8 = 0x07;

/// Step-wise clock divider
///
/// The divider names are inherited from the AVR API where the bus clock
/// was derived from a 16 MHz system clock. Here they are anchored so that
/// `Div4` gives `BASE_CLOCK_HZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClockDivider {
    /// 4 x base (16 MHz)
    Div1,
    /// 2 x base (8 MHz)
    Div2,
    /// base (4 MHz)
    #[default]
    Div4,
    /// base / 2 (2 MHz)
    Div8,
    /// base / 4 (1 MHz)
    Div16,
    /// base / 8 (500 kHz)
    Div32,
    /// base / 16 (250 kHz)
    Div64,
    /// base / 32 (125 kHz)
    Div128,
}

impl ClockDivider {
    /// All dividers from fastest to slowest
    pub const ALL: [ClockDivider; 8] = [
        Self::Div1,
        Self::Div2,
        Self::Div4,
        Self::Div8,
        Self::Div16,
        Self::Div32,
        Self::Div64,
        Self::Div128,
    ];

    /// Target clock frequency in Hz
    pub const fn speed_hz(self) -> u32 {
        match self {
            Self::Div1 => BASE_CLOCK_HZ << 2,
            Self::Div2 => BASE_CLOCK_HZ << 1,
            Self::Div4 => BASE_CLOCK_HZ,
            Self::Div8 => BASE_CLOCK_HZ >> 1,
            Self::Div16 => BASE_CLOCK_HZ >> 2,
            Self::Div32 => BASE_CLOCK_HZ >> 3,
            Self::Div64 => BASE_CLOCK_HZ >> 4,
            Self::Div128 => BASE_CLOCK_HZ >> 5,
        }
    }

    /// Arduino code for this divider
    pub const fn code(self) -> u8 {
        match self {
            Self::Div1 => SPI_CLOCK_DIV1,
            Self::Div2 => SPI_CLOCK_DIV2,
            Self::Div4 => SPI_CLOCK_DIV4,
            Self::Div8 => SPI_CLOCK_DIV8,
            Self::Div16 => SPI_CLOCK_DIV16,
            Self::Div32 => SPI_CLOCK_DIV32,
            Self::Div64 => SPI_CLOCK_DIV64,
            Self::Div128 => SPI_CLOCK_DIV128,
        }
    }

    /// Divide ratio relative to the nominal 16 MHz AVR clock
    pub const fn ratio(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
        }
    }

    /// Parse a divide ratio (1, 2, 4, ..., 128)
    pub fn from_ratio(ratio: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.ratio() == ratio)
    }
}

impl TryFrom<u8> for ClockDivider {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.code() == code)
            .ok_or(Error::InvalidArgument)
    }
}

impl core::fmt::Display for ClockDivider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DIV{}", self.ratio())
    }
}

/// Which clock setting is authoritative
///
/// Setting a divider supersedes an explicit speed and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockSource {
    /// One of the enumerated divider steps
    Divider(ClockDivider),
    /// Explicit speed in Hz, already clamped to `MAX_CLOCK_HZ`
    Explicit(u32),
}

impl ClockSource {
    /// Build an explicit clock source, clamping to the controller ceiling
    pub fn explicit(hz: u32) -> Self {
        Self::Explicit(hz.min(MAX_CLOCK_HZ))
    }

    /// Frequency this source asks the device for
    pub fn speed_hz(self) -> u32 {
        match self {
            Self::Divider(div) => div.speed_hz(),
            Self::Explicit(hz) => hz,
        }
    }

    /// Divider in effect, if any
    pub fn divider(self) -> Option<ClockDivider> {
        match self {
            Self::Divider(div) => Some(div),
            Self::Explicit(_) => None,
        }
    }
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::Divider(ClockDivider::default())
    }
}

impl core::fmt::Display for ClockSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Divider(div) => write!(f, "{} ({} kHz)", div, div.speed_hz() / 1000),
            Self::Explicit(hz) => write!(f, "{} kHz", hz / 1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_speeds() {
        let expected = [
            (ClockDivider::Div1, 16_000_000),
            (ClockDivider::Div2, 8_000_000),
            (ClockDivider::Div4, 4_000_000),
            (ClockDivider::Div8, 2_000_000),
            (ClockDivider::Div16, 1_000_000),
            (ClockDivider::Div32, 500_000),
            (ClockDivider::Div64, 250_000),
            (ClockDivider::Div128, 125_000),
        ];
        for (div, hz) in expected {
            assert_eq!(div.speed_hz(), hz, "{}", div);
        }
    }

    #[test]
    fn test_divider_codes_roundtrip() {
        for div in ClockDivider::ALL {
            assert_eq!(ClockDivider::try_from(div.code()), Ok(div));
        }
        assert_eq!(ClockDivider::try_from(0x08), Err(Error::InvalidArgument));
        assert_eq!(ClockDivider::try_from(0xFF), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_divider_from_ratio() {
        assert_eq!(ClockDivider::from_ratio(1), Some(ClockDivider::Div1));
        assert_eq!(ClockDivider::from_ratio(128), Some(ClockDivider::Div128));
        assert_eq!(ClockDivider::from_ratio(3), None);
    }

    #[test]
    fn test_explicit_clamp() {
        assert_eq!(ClockSource::explicit(30_000_000), ClockSource::Explicit(MAX_CLOCK_HZ));
        assert_eq!(ClockSource::explicit(1_000_000), ClockSource::Explicit(1_000_000));
        assert_eq!(ClockSource::explicit(MAX_CLOCK_HZ).speed_hz(), MAX_CLOCK_HZ);
    }

    #[test]
    fn test_default_source() {
        let src = ClockSource::default();
        assert_eq!(src.divider(), Some(ClockDivider::Div4));
        assert_eq!(src.speed_hz(), BASE_CLOCK_HZ);
    }
}

//! SPI bus parameter types
//!
//! Logical clock mode, bit order and clock divider values, together with
//! their translation to the native encodings understood by the kernel
//! spidev driver.

mod clock;
mod mode;

pub use clock::{
    ClockDivider, ClockSource, BASE_CLOCK_HZ, MAX_CLOCK_HZ, SPI_CLOCK_DIV1, SPI_CLOCK_DIV128,
    SPI_CLOCK_DIV16, SPI_CLOCK_DIV2, SPI_CLOCK_DIV32, SPI_CLOCK_DIV4, SPI_CLOCK_DIV64,
    SPI_CLOCK_DIV8,
};
pub use mode::{
    BitOrder, DataMode, LSBFIRST, MSBFIRST, SPI_CPHA, SPI_CPOL, SPI_MODE0, SPI_MODE1, SPI_MODE2,
    SPI_MODE3,
};

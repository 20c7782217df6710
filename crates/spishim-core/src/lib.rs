//! spishim-core - Arduino-style SPI master bus
//!
//! This crate provides the `SpiBus` facade that exposes the familiar
//! `begin` / `set_data_mode` / `transfer` / `end` API on top of a pluggable
//! SPI port. It is `no_std` compatible; the Linux spidev and GPIO backends
//! live in their own crates.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable trait impls for `Box<T>`
//!
//! # Example
//!
//! ```ignore
//! use spishim_core::{BitOrder, DataMode, ClockDivider, SpiBus};
//! use spishim_core::port::{NoGpio, NoPowerManagement};
//!
//! let mut bus = SpiBus::new(port, NoGpio, NoPowerManagement);
//! bus.begin()?;
//! bus.set_data_mode(DataMode::Mode3)?;
//! bus.set_clock_divider(ClockDivider::Div16)?;
//! let id = bus.transfer(0x9F)?;
//! bus.end();
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod error;
pub mod port;
pub mod spi;

pub use bus::{SpiBus, DEFAULT_CS_PIN, TRANSFER_FAILED_SENTINEL};
pub use error::{Error, Result};
pub use spi::{BitOrder, ClockDivider, ClockSource, DataMode};

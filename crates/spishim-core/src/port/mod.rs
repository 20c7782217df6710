//! Port traits and abstractions
//!
//! This module defines the capabilities `SpiBus` is built from: the SPI
//! device itself, the GPIO controller used for chip select and pin muxing,
//! and the optional platform power-management hook.

mod traits;

pub use traits::*;

#![no_std]
#![doc = include_str!("../README.md")]
//!
//! ## Module Organization
//!
//! - [`fdc2x1x`]: TI FDC2x1x capacitance-to-digital converter
//! - [`seesaw`]: Adafruit STEMMA soil sensor (seesaw firmware)
//! - [`sht4x`]: Sensirion SHT4x temperature and humidity sensor
//! - [`Component`], [`Sink`], [`DeviceState`]: the lifecycle shared by all drivers
//! - [`Poller`]: periodic scheduling of a component
//!
//! ## Basic Usage
//!
//! ```no_run
//! # async fn example(
//! #   i2c: impl embedded_hal_async::i2c::I2c,
//! #   delay: impl embedded_hal_async::delay::DelayNs,
//! #   sink: &mut impl plant_sensors::Sink,
//! # ) {
//! use plant_sensors::fdc2x1x::{Config, Fdc2x1x};
//!
//! let mut fdc = Fdc2x1x::new(i2c, delay, Config::default());
//!
//! // Identity check, soft reset and register configuration
//! if fdc.initialize().await.is_ok() {
//!   // Publishes channel 0 when a new conversion is available
//!   let _ = fdc.sample(sink).await;
//! }
//! # }
//! ```

#[macro_use]
mod fmt;

mod component;
pub mod fdc2x1x;
mod host;
pub mod seesaw;
pub mod sht4x;
#[cfg(test)]
mod testing;

pub use component::*;
pub use host::*;

/// Driver error type.
///
/// Wraps the underlying I2C error and adds the device-specific error
/// conditions shared by the drivers in this crate.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// I2C communication error
  I2c(E),
  /// Identity register held an unexpected value
  WrongChipId(u16),
  /// Checksum mismatch on a received word
  Crc,
  /// Register contents could not be decoded
  Data,
}

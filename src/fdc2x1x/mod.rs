//! TI FDC2x1x capacitance-to-digital converter.
//!
//! Covers the FDC2112/FDC2114 (12-bit) and FDC2212/FDC2214 (28-bit) parts.
//! The driver configures channel 0 for continuous conversion of a
//! single-ended LC tank and publishes the raw conversion result; see
//! [`Sample::frequency_hz`] and [`capacitance_pf`] to turn it into physical
//! units.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<E>(
//! #   i2c: impl embedded_hal_async::i2c::I2c<Error = E>,
//! #   delay: impl embedded_hal_async::delay::DelayNs,
//! # ) -> Result<(), plant_sensors::Error<E>> {
//! use plant_sensors::fdc2x1x::{Config, Fdc2x1x};
//!
//! let mut fdc = Fdc2x1x::new(i2c, delay, Config { address: 0x2B });
//! fdc.initialize().await?;
//!
//! let status = fdc.get_status().await?;
//! if status.unread_ch0 {
//!   let sample = fdc.get_sample().await?;
//!   let f_sensor = sample.frequency_hz(40_000_000.0, 1);
//! }
//! # Ok(())
//! # }
//! ```

use core::fmt;

use embedded_hal_async::{delay::DelayNs, i2c::*};

use crate::{Component, DeviceState, Error, Health, Poll, Sink};

mod defs;
mod init;
mod rw;
mod sample;

pub use sample::*;

/// Bus settings of an FDC2x1x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  /// 7-bit address, 0x2A with ADDR low, 0x2B with ADDR high.
  pub address: u8,
}

impl Default for Config {
  fn default() -> Self {
    Config { address: defs::ADDR_DEFAULT }
  }
}

/// Identity registers read during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity {
  pub manufacturer_id: u16,
  pub device_id: u16,
}

impl Identity {
  pub fn model(&self) -> Model {
    match self.device_id {
      defs::DEVICE_ID_FDC211X => Model::Fdc211x,
      defs::DEVICE_ID_FDC221X => Model::Fdc221x,
      other => Model::Unknown(other),
    }
  }
}

/// Converter family as reported by `DEVICE_ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Model {
  /// FDC2112 / FDC2114, 12-bit results
  Fdc211x,
  /// FDC2212 / FDC2214, 28-bit results
  Fdc221x,
  Unknown(u16),
}

impl fmt::Display for Model {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Model::Fdc211x => f.write_str("FDC2112/FDC2114"),
      Model::Fdc221x => f.write_str("FDC2212/FDC2214"),
      Model::Unknown(id) => write!(f, "unknown ({:#06x})", id),
    }
  }
}

/// FDC2x1x device driver instance.
///
/// Owns the I2C bus and the delay provider. Every method is a short sequence
/// of single-register transactions; nothing is retried.
pub struct Fdc2x1x<I, D> {
  i2c: I,
  delay: D,
  config: Config,
  health: Health,
  identity: Option<Identity>,
}

impl<I, D, E> Fdc2x1x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  pub fn new(i2c: I, delay: D, config: Config) -> Self {
    Self { i2c, delay, config, health: Health::default(), identity: None }
  }

  /// Give back the bus and the delay provider.
  pub fn release(self) -> (I, D) {
    (self.i2c, self.delay)
  }

  pub fn config(&self) -> Config {
    self.config
  }

  pub fn state(&self) -> DeviceState {
    self.health.state()
  }

  /// Identity seen by the last setup attempt, if it got that far.
  pub fn identity(&self) -> Option<Identity> {
    self.identity
  }

  /// `true` while the last sample cycle ended in a bus error.
  pub fn has_warning(&self) -> bool {
    self.health.has_warning()
  }

  /// Forget the setup outcome (sensor was power-cycled).
  pub fn reset(&mut self) {
    self.health.reset();
    self.identity = None;
  }

  pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    writeln!(out, "FDC2x1x:")?;
    writeln!(out, "  Address: {:#04x}", self.config.address)?;
    match self.health.state() {
      DeviceState::Failed(reason) => writeln!(out, "  Communication with FDC2x1x failed: {}", reason)?,
      state => {
        writeln!(out, "  State: {}", state)?;
        writeln!(out, "  Device detected: {}", if self.identity.is_some() { "YES" } else { "NO" })?;
      }
    }
    if let Some(id) = self.identity {
      writeln!(out, "  Model: {}", id.model())?;
    }
    if self.health.has_warning() {
      writeln!(out, "  Warning: last sample failed")?;
    }
    Ok(())
  }
}

impl<I, D, E> Component for Fdc2x1x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  type Error = Error<E>;

  async fn initialize(&mut self) -> Result<(), Self::Error> {
    Fdc2x1x::initialize(self).await
  }

  fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    Fdc2x1x::describe(self, out)
  }

  async fn poll<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Self::Error> {
    self.sample(sink).await
  }

  fn state(&self) -> DeviceState {
    self.health.state()
  }

  fn reset(&mut self) {
    Fdc2x1x::reset(self)
  }
}

#[cfg(test)]
mod tests {
  extern crate std;

  use std::string::String;

  use embedded_hal_mock::eh1::i2c::Mock;
  use futures::executor::block_on;

  use super::*;
  use crate::testing::{fdc_setup, read16, NoDelay};
  use crate::SetupFailure;

  #[test]
  fn model_from_device_id() {
    let id = |device_id| Identity { manufacturer_id: 0x5449, device_id };
    assert_eq!(id(0x3054).model(), Model::Fdc211x);
    assert_eq!(id(0x3055).model(), Model::Fdc221x);
    assert_eq!(id(0x1234).model(), Model::Unknown(0x1234));
  }

  #[test]
  fn describe_ready_device() {
    let mut i2c = Mock::new(&fdc_setup(0x2A));
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config::default());
    block_on(fdc.initialize()).unwrap();

    let mut out = String::new();
    fdc.describe(&mut out).unwrap();
    assert_eq!(
      out,
      "FDC2x1x:\n  Address: 0x2a\n  State: ready\n  Device detected: YES\n  Model: FDC2212/FDC2214\n"
    );
    i2c.done();
  }

  #[test]
  fn describe_failed_device() {
    let mut i2c = Mock::new(&[read16(0x2A, 0x7E, 0x0000)]);
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config::default());
    assert!(block_on(fdc.initialize()).is_err());
    assert_eq!(fdc.state(), DeviceState::Failed(SetupFailure::WrongChipId));

    let mut out = String::new();
    fdc.describe(&mut out).unwrap();
    assert!(out.contains("Communication with FDC2x1x failed: unexpected chip id"));
    assert!(!out.contains("Model"));
    i2c.done();
  }

  #[test]
  fn reset_forgets_setup() {
    let mut i2c = Mock::new(&fdc_setup(0x2A));
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config::default());
    block_on(fdc.initialize()).unwrap();

    Component::reset(&mut fdc);
    assert_eq!(Component::state(&fdc), DeviceState::Uninitialized);
    assert_eq!(fdc.identity(), None);
    i2c.done();
  }
}

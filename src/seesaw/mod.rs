//! Adafruit STEMMA soil sensor.
//!
//! The board runs Adafruit's seesaw firmware on a SAMD09: a capacitive touch
//! input measures soil moisture and the MCU's die sensor gives the board
//! temperature. Registers are addressed by a module base byte plus a
//! function byte.

use core::fmt;

use embedded_hal_async::{delay::DelayNs, i2c::*};

use crate::{Channel, Component, DeviceState, Error, Health, Poll, Reading, SetupFailure, Sink};

mod defs;
mod rw;

use defs::*;

/// Bus settings of a soil sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  /// 7-bit address, 0x36..=0x39 depending on the AD0/AD1 jumpers.
  pub address: u8,
  /// Touch input wired to the probe.
  pub touch_pin: u8,
}

impl Default for Config {
  fn default() -> Self {
    Config { address: ADDR_DEFAULT, touch_pin: 0 }
  }
}

/// Firmware identity read during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity {
  pub hw_id: u8,
  pub options: u8,
  pub version: u8,
}

type SetupResult<T, E> = Result<T, (SetupFailure, Error<E>)>;

pub struct SoilSensor<I, D> {
  i2c: I,
  delay: D,
  config: Config,
  health: Health,
  identity: Option<Identity>,
}

impl<I, D, E> SoilSensor<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  pub fn new(i2c: I, delay: D, config: Config) -> Self {
    Self { i2c, delay, config, health: Health::default(), identity: None }
  }

  pub fn release(self) -> (I, D) {
    (self.i2c, self.delay)
  }

  pub fn state(&self) -> DeviceState {
    self.health.state()
  }

  pub fn identity(&self) -> Option<Identity> {
    self.identity
  }

  pub fn reset(&mut self) {
    self.health.reset();
    self.identity = None;
  }

  /// Software reset, then check the hardware id is 0x55.
  ///
  /// Options and version are read for the logs only.
  pub async fn initialize(&mut self) -> Result<(), Error<E>> {
    self.health.begin_setup();
    self.identity = None;

    match self.bring_up().await {
      Ok(identity) => {
        self.identity = Some(identity);
        self.health.set_ready();
        info!("soil sensor initialized");
        Ok(())
      }
      Err((reason, e)) => {
        error!("soil sensor setup failed: {}", reason);
        self.health.fail(reason);
        Err(e)
      }
    }
  }

  async fn bring_up(&mut self) -> SetupResult<Identity, E> {
    debug!("sending software reset");
    self
      .write_u8(Module::Status, StatusReg::SwReset.into(), SW_RESET_VALUE)
      .await
      .map_err(|e| (SetupFailure::ResetFailed, e))?;
    self.delay.delay_ms(RESET_DELAY_MS).await;

    let read_failed = |e| (SetupFailure::ReadDeviceIdFailed, e);

    let hw_id = self.read_u8(Module::Status, StatusReg::HwId.into()).await.map_err(read_failed)?;
    debug!("hardware id: {=u8:#x}", hw_id);
    if hw_id != HW_ID_CODE {
      error!("unexpected hardware id {=u8:#x}, expected {=u8:#x}", hw_id, HW_ID_CODE);
      return Err((SetupFailure::WrongChipId, Error::WrongChipId(hw_id.into())));
    }

    let options = self.read_u8(Module::Status, StatusReg::Options.into()).await.map_err(read_failed)?;
    let version = self.read_u8(Module::Status, StatusReg::Version.into()).await.map_err(read_failed)?;
    debug!("options: {=u8:#x}, version: {=u8:#x}", options, version);

    Ok(Identity { hw_id, options, version })
  }

  /// Board temperature in degrees Celsius (16.16 fixed point on the wire).
  pub async fn get_temperature(&mut self) -> Result<f32, Error<E>> {
    let mut b = [0u8; 4];
    self.read_bytes(Module::Status, StatusReg::Temp.into(), &mut b, READ_DELAY_US).await?;
    let raw = i32::from_be_bytes(b);
    trace!("temperature raw: {=i32:#x}", raw);
    Ok(raw as f32 / 65536.0)
  }

  /// Capacitive reading of the probe.
  ///
  /// The firmware sometimes answers with values above 4095; those are read
  /// again after 1 ms, up to four reads in total. The last value is returned
  /// even if it is still out of range.
  ///
  /// A `touch_pin` past the last touch function is rejected with
  /// [`Error::Data`] before anything goes on the bus.
  pub async fn get_moisture(&mut self) -> Result<u16, Error<E>> {
    let function = match TOUCH_CHANNEL_OFFSET.checked_add(self.config.touch_pin) {
      Some(function) => function,
      None => {
        error!("touch pin {} out of range", self.config.touch_pin);
        return Err(Error::Data);
      }
    };
    let mut value = u16::MAX;

    for attempt in 1..=TOUCH_ATTEMPTS {
      self.delay.delay_ms(TOUCH_RETRY_DELAY_MS).await;
      let mut b = [0u8; 2];
      self.read_bytes(Module::Touch, function, &mut b, TOUCH_READ_DELAY_US).await?;
      value = u16::from_be_bytes(b);
      trace!("touch attempt {}: {}", attempt, value);
      if value <= TOUCH_MAX_VALID {
        return Ok(value);
      }
    }

    warn!("touch reading still out of range after {} attempts", TOUCH_ATTEMPTS);
    Ok(value)
  }

  /// Publish temperature and moisture.
  ///
  /// A bus error raises the soft warning and aborts the cycle; nothing from
  /// that cycle is published.
  pub async fn sample<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Error<E>> {
    if !self.health.is_ready() {
      return Ok(Poll::Skipped);
    }

    let reading = match self.get_temperature().await {
      Ok(t) => self.get_moisture().await.map(|m| (t, m)),
      Err(e) => Err(e),
    };

    match reading {
      Ok((temperature, moisture)) => {
        sink.publish(Channel::Temperature, Reading::Celsius(temperature));
        sink.publish(Channel::Moisture, Reading::Counts(moisture.into()));
        self.health.clear_warning(sink);
        Ok(Poll::Published)
      }
      Err(e) => {
        warn!("soil sensor read failed");
        self.health.raise_warning(sink);
        Err(e)
      }
    }
  }

  pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    writeln!(out, "Adafruit STEMMA Soil Sensor:")?;
    writeln!(out, "  Address: {:#04x}", self.config.address)?;
    writeln!(out, "  Touch pin: {}", self.config.touch_pin)?;
    match self.health.state() {
      DeviceState::Failed(reason) => writeln!(out, "  Communication with STEMMA soil sensor failed: {}", reason)?,
      state => writeln!(out, "  State: {}", state)?,
    }
    if let Some(id) = self.identity {
      writeln!(out, "  Firmware version: {}, options: {:#04x}", id.version, id.options)?;
    }
    Ok(())
  }
}

impl<I, D, E> Component for SoilSensor<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  type Error = Error<E>;

  async fn initialize(&mut self) -> Result<(), Self::Error> {
    SoilSensor::initialize(self).await
  }

  fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    SoilSensor::describe(self, out)
  }

  async fn poll<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Self::Error> {
    self.sample(sink).await
  }

  fn state(&self) -> DeviceState {
    self.health.state()
  }

  fn reset(&mut self) {
    SoilSensor::reset(self)
  }
}

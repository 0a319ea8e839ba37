//! Sensirion SHT4x temperature and humidity sensor.
//!
//! Every response word is followed by a CRC-8 which is checked before the
//! word is used. An optional heater pulse can be fired when the air is
//! humid, to drive off condensation before reading the humidity.

use core::fmt;

use embedded_hal_async::{delay::DelayNs, i2c::*};

use crate::{Channel, Component, DeviceState, Error, Health, Poll, Reading, SetupFailure, Sink};

mod defs;

use defs::*;
pub use defs::HeaterPulse;

/// When and how to run the heater.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterConfig {
  pub pulse: HeaterPulse,
  /// Relative humidity in percent above which the heater fires.
  pub humidity_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  pub address: u8,
  /// `None` keeps the heater off.
  pub heater: Option<HeaterConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Config { address: ADDR_DEFAULT, heater: None }
  }
}

/// One temperature and humidity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
  /// Degrees Celsius
  pub temperature: f32,
  /// Relative humidity in percent, 0..=100
  pub humidity: f32,
}

impl Measurement {
  pub fn from_raw(temperature: u16, humidity: u16) -> Self {
    let temperature = -45.0 + 175.0 * temperature as f32 / 65535.0;
    let humidity = (-6.0 + 125.0 * humidity as f32 / 65535.0).clamp(0.0, 100.0);
    Measurement { temperature, humidity }
  }

  /// Temperature in 0.01 °C, truncated.
  pub fn temperature_centi(&self) -> i16 {
    (self.temperature * 100.0) as i16
  }

  /// Relative humidity in 0.01 %, truncated. 10000 is 100 %.
  pub fn humidity_centi(&self) -> u16 {
    (self.humidity * 100.0) as u16
  }
}

/// Checksum the sensor appends to every response word.
pub fn crc8(data: &[u8]) -> u8 {
  CRC.checksum(data)
}

pub struct Sht4x<I, D> {
  i2c: I,
  delay: D,
  config: Config,
  health: Health,
  serial: Option<u32>,
}

impl<I, D, E> Sht4x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  pub fn new(i2c: I, delay: D, config: Config) -> Self {
    Self { i2c, delay, config, health: Health::default(), serial: None }
  }

  pub fn release(self) -> (I, D) {
    (self.i2c, self.delay)
  }

  pub fn state(&self) -> DeviceState {
    self.health.state()
  }

  pub fn serial(&self) -> Option<u32> {
    self.serial
  }

  pub fn reset(&mut self) {
    self.health.reset();
    self.serial = None;
  }

  /// Soft reset, then read the serial number as a presence check.
  pub async fn initialize(&mut self) -> Result<(), Error<E>> {
    self.health.begin_setup();
    self.serial = None;

    if let Err(e) = self.soft_reset().await {
      error!("SHT4x soft reset failed");
      self.health.fail(SetupFailure::ResetFailed);
      return Err(e);
    }

    match self.get_serial().await {
      Ok(serial) => {
        info!("SHT4x serial: {=u32:#x}", serial);
        self.serial = Some(serial);
        self.health.set_ready();
        Ok(())
      }
      Err(e) => {
        error!("SHT4x serial number read failed");
        self.health.fail(SetupFailure::ReadDeviceIdFailed);
        Err(e)
      }
    }
  }

  pub async fn soft_reset(&mut self) -> Result<(), Error<E>> {
    self.command(Command::SoftReset.into()).await?;
    self.delay.delay_ms(RESET_DELAY_MS).await;
    Ok(())
  }

  pub async fn get_serial(&mut self) -> Result<u32, Error<E>> {
    self.command(Command::ReadSerial.into()).await?;
    self.delay.delay_ms(SERIAL_DELAY_MS).await;
    let [hi, lo] = self.read_words().await?;
    Ok((u32::from(hi) << 16) | u32::from(lo))
  }

  /// High precision measurement, heater off.
  pub async fn measure(&mut self) -> Result<Measurement, Error<E>> {
    self.measure_with(Command::MeasureHighPrecision.into(), MEASURE_DELAY_MS).await
  }

  /// Fire a heater pulse and return the measurement taken at its end.
  pub async fn measure_heated(&mut self, pulse: HeaterPulse) -> Result<Measurement, Error<E>> {
    self.measure_with(pulse.into(), pulse.wait_ms()).await
  }

  /// Measure, running the heater if it is configured and the conditions
  /// call for it. A heated cycle only replaces the humidity; the temperature
  /// it reports is skewed by the heater.
  pub async fn read(&mut self) -> Result<Measurement, Error<E>> {
    let mut m = self.measure().await?;

    if let Some(heater) = self.config.heater {
      if m.humidity > heater.humidity_threshold && m.temperature < HEATER_MAX_TEMP_C {
        info!("activating heater");
        m.humidity = self.measure_heated(heater.pulse).await?.humidity;
      }
    }

    debug!("SHT4x: {} C, {} %RH", m.temperature, m.humidity);
    Ok(m)
  }

  /// Publish temperature and humidity.
  ///
  /// On failure both channels are reported unavailable and the warning is
  /// raised.
  pub async fn sample<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Error<E>> {
    if !self.health.is_ready() {
      return Ok(Poll::Skipped);
    }

    match self.read().await {
      Ok(m) => {
        sink.publish(Channel::Temperature, Reading::Celsius(m.temperature));
        sink.publish(Channel::Humidity, Reading::Percent(m.humidity));
        self.health.clear_warning(sink);
        Ok(Poll::Published)
      }
      Err(e) => {
        warn!("SHT4x read failed");
        sink.unavailable(Channel::Temperature);
        sink.unavailable(Channel::Humidity);
        self.health.raise_warning(sink);
        Err(e)
      }
    }
  }

  pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    writeln!(out, "SHT4x:")?;
    writeln!(out, "  Address: {:#04x}", self.config.address)?;
    match self.health.state() {
      DeviceState::Failed(reason) => writeln!(out, "  Communication with SHT4x failed: {}", reason)?,
      state => writeln!(out, "  State: {}", state)?,
    }
    if let Some(serial) = self.serial {
      writeln!(out, "  Serial number: {:#010x}", serial)?;
    }
    match self.config.heater {
      Some(h) => writeln!(out, "  Heater: {:?} above {} %RH", h.pulse, h.humidity_threshold)?,
      None => writeln!(out, "  Heater: off")?,
    }
    Ok(())
  }

  async fn measure_with(&mut self, command: u8, wait_ms: u32) -> Result<Measurement, Error<E>> {
    self.command(command).await?;
    self.delay.delay_ms(wait_ms).await;
    let [t, rh] = self.read_words().await?;
    trace!("raw t: {=u16:#x}, raw rh: {=u16:#x}", t, rh);
    Ok(Measurement::from_raw(t, rh))
  }

  async fn command(&mut self, command: u8) -> Result<(), Error<E>> {
    self.i2c.write(self.config.address, &[command]).await.map_err(Error::I2c)
  }

  // Two words, each followed by its CRC.
  async fn read_words(&mut self) -> Result<[u16; 2], Error<E>> {
    let mut b = [0u8; 6];
    self.i2c.read(self.config.address, &mut b).await.map_err(Error::I2c)?;

    let mut words = [0u16; 2];
    for (word, chunk) in words.iter_mut().zip(b.chunks_exact(3)) {
      if crc8(&chunk[..2]) != chunk[2] {
        warn!("CRC mismatch on {=u8:#x} {=u8:#x}", chunk[0], chunk[1]);
        return Err(Error::Crc);
      }
      *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
  }
}

impl<I, D, E> Component for Sht4x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  type Error = Error<E>;

  async fn initialize(&mut self) -> Result<(), Self::Error> {
    Sht4x::initialize(self).await
  }

  fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    Sht4x::describe(self, out)
  }

  async fn poll<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Self::Error> {
    self.sample(sink).await
  }

  fn state(&self) -> DeviceState {
    self.health.state()
  }

  fn reset(&mut self) {
    Sht4x::reset(self)
  }
}

#[cfg(test)]
mod tests {
  extern crate std;

  use std::string::String;
  use std::vec;
  use std::vec::Vec;

  use embedded_hal::i2c::ErrorKind;
  use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
  use futures::executor::block_on;

  use super::*;
  use crate::testing::{NoDelay, RecordingSink};

  const ADDR: u8 = 0x44;

  fn words(a: u16, b: u16) -> Vec<u8> {
    let [a0, a1] = a.to_be_bytes();
    let [b0, b1] = b.to_be_bytes();
    vec![a0, a1, crc8(&[a0, a1]), b0, b1, crc8(&[b0, b1])]
  }

  fn setup() -> Vec<Transaction> {
    vec![
      Transaction::write(ADDR, vec![0x94]),
      Transaction::write(ADDR, vec![0x89]),
      Transaction::read(ADDR, words(0x1234, 0x5678)),
    ]
  }

  fn measurement(command: u8, t: u16, rh: u16) -> [Transaction; 2] {
    [Transaction::write(ADDR, vec![command]), Transaction::read(ADDR, words(t, rh))]
  }

  #[test]
  fn crc_matches_datasheet_example() {
    assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    assert_eq!(crc8(&[0x00, 0x00]), 0x81);
  }

  #[test]
  fn conversion_and_matter_units() {
    let m = Measurement::from_raw(0x6666, 0x8000);
    assert_eq!(m.temperature, 25.0);
    assert_eq!(m.temperature_centi(), 2500);
    assert_eq!(m.humidity_centi(), 5650);

    let cold = Measurement::from_raw(0x0000, 0x0000);
    assert_eq!(cold.temperature_centi(), -4500);
    assert_eq!(cold.humidity, 0.0);

    assert_eq!(Measurement::from_raw(0xFFFF, 0xFFFF).humidity_centi(), 10000);
  }

  #[test]
  fn setup_reads_serial() {
    let mut i2c = Mock::new(&setup());
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());

    block_on(sht.initialize()).unwrap();
    assert_eq!(sht.state(), DeviceState::Ready);
    assert_eq!(sht.serial(), Some(0x1234_5678));
    i2c.done();
  }

  #[test]
  fn reset_failure() {
    let mut i2c = Mock::new(&[Transaction::write(ADDR, vec![0x94]).with_error(ErrorKind::Other)]);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());

    assert!(block_on(sht.initialize()).is_err());
    assert_eq!(sht.state(), DeviceState::Failed(SetupFailure::ResetFailed));
    i2c.done();
  }

  #[test]
  fn serial_crc_error_fails_setup() {
    let mut i2c = Mock::new(&[
      Transaction::write(ADDR, vec![0x94]),
      Transaction::write(ADDR, vec![0x89]),
      Transaction::read(ADDR, vec![0x12, 0x34, 0x00, 0x56, 0x78, 0x7D]),
    ]);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());

    assert!(matches!(block_on(sht.initialize()), Err(Error::Crc)));
    assert_eq!(sht.state(), DeviceState::Failed(SetupFailure::ReadDeviceIdFailed));
    assert_eq!(sht.serial(), None);
    i2c.done();
  }

  #[test]
  fn sample_publishes_temperature_and_humidity() {
    let mut expectations = setup();
    expectations.extend(measurement(0xFD, 0x6666, 0x8000));
    let mut i2c = Mock::new(&expectations);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());
    let mut sink = RecordingSink::default();

    block_on(sht.initialize()).unwrap();
    assert_eq!(block_on(sht.sample(&mut sink)).unwrap(), Poll::Published);
    assert_eq!(sink.published.len(), 2);
    assert_eq!(sink.published[0], (Channel::Temperature, Reading::Celsius(25.0)));
    assert!(matches!(sink.published[1], (Channel::Humidity, Reading::Percent(_))));
    i2c.done();
  }

  #[test]
  fn heater_replaces_humidity_only() {
    let mut expectations = setup();
    expectations.extend(measurement(0xFD, 0x6666, 0xF000));
    expectations.extend(measurement(0x32, 0xD000, 0x8000));
    let mut i2c = Mock::new(&expectations);
    let heater = HeaterConfig { pulse: HeaterPulse::High100ms, humidity_threshold: 80.0 };
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config { heater: Some(heater), ..Config::default() });

    block_on(sht.initialize()).unwrap();
    let m = block_on(sht.read()).unwrap();
    assert_eq!(m.temperature, 25.0);
    assert_eq!(m.humidity_centi(), 5650);
    i2c.done();
  }

  #[test]
  fn heater_stays_off_when_hot() {
    let mut expectations = setup();
    expectations.extend(measurement(0xFD, 0xD000, 0xF000));
    let mut i2c = Mock::new(&expectations);
    let heater = HeaterConfig { pulse: HeaterPulse::Low1s, humidity_threshold: 50.0 };
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config { heater: Some(heater), ..Config::default() });

    block_on(sht.initialize()).unwrap();
    let m = block_on(sht.read()).unwrap();
    assert_eq!(m.humidity, 100.0);
    i2c.done();
  }

  #[test]
  fn heater_stays_off_at_threshold() {
    // Humidity exactly at the threshold.
    let mut expectations = setup();
    expectations.extend(measurement(0xFD, 0x6666, 0xBFFF));
    let mut i2c = Mock::new(&expectations);
    let threshold = Measurement::from_raw(0x6666, 0xBFFF).humidity;
    let heater = HeaterConfig { pulse: HeaterPulse::Medium1s, humidity_threshold: threshold };
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config { heater: Some(heater), ..Config::default() });

    block_on(sht.initialize()).unwrap();
    let m = block_on(sht.read()).unwrap();
    assert_eq!(m.humidity, threshold);
    i2c.done();
  }

  #[test]
  fn initialize_after_failure_restarts() {
    let mut expectations = vec![Transaction::write(ADDR, vec![0x94]).with_error(ErrorKind::Other)];
    expectations.extend(setup());
    let mut i2c = Mock::new(&expectations);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());

    assert!(block_on(sht.initialize()).is_err());
    assert_eq!(sht.state(), DeviceState::Failed(SetupFailure::ResetFailed));

    block_on(sht.initialize()).unwrap();
    assert_eq!(sht.state(), DeviceState::Ready);
    assert_eq!(sht.serial(), Some(0x1234_5678));
    i2c.done();
  }

  #[test]
  fn failed_read_marks_channels_unavailable() {
    let mut expectations = setup();
    expectations.push(Transaction::write(ADDR, vec![0xFD]).with_error(ErrorKind::Other));
    let mut i2c = Mock::new(&expectations);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());
    let mut sink = RecordingSink::default();

    block_on(sht.initialize()).unwrap();
    assert!(block_on(sht.sample(&mut sink)).is_err());
    assert!(sink.published.is_empty());
    assert_eq!(sink.unavailable, [Channel::Temperature, Channel::Humidity]);
    assert_eq!(sink.warnings, [true]);
    i2c.done();
  }

  #[test]
  fn not_ready_is_skipped() {
    let mut i2c = Mock::new(&[] as &[Transaction]);
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());
    let mut sink = RecordingSink::default();

    assert_eq!(block_on(sht.sample(&mut sink)).unwrap(), Poll::Skipped);
    i2c.done();
  }

  #[test]
  fn describe_shows_serial_and_heater() {
    let mut i2c = Mock::new(&setup());
    let mut sht = Sht4x::new(i2c.clone(), NoDelay, Config::default());
    block_on(sht.initialize()).unwrap();

    let mut out = String::new();
    sht.describe(&mut out).unwrap();
    assert!(out.contains("  Serial number: 0x12345678\n"));
    assert!(out.contains("  Heater: off\n"));
    i2c.done();
  }
}

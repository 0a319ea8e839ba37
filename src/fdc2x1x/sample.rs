use core::f32::consts::PI;

use embedded_hal_async::{delay::DelayNs, i2c::*};
use micromath::F32Ext;

use super::{defs::*, Fdc2x1x};
use crate::{Channel, Error, Poll, Reading, Sink};

impl<I, D, E> Fdc2x1x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Read and decode `STATUS`. Reading clears the unread-conversion flags.
  pub async fn get_status(&mut self) -> Result<Status, Error<E>> {
    self.read(Reg::Status).await
  }

  /// Read the channel 0 result, MSB word first.
  pub async fn get_sample(&mut self) -> Result<Sample, Error<E>> {
    let msb = self.read_u16(Reg::DataCh0Msb).await?;
    trace!("CH0 MSB: {=u16:#x}", msb);
    let lsb = self.read_u16(Reg::DataCh0Lsb).await?;
    trace!("CH0 LSB: {=u16:#x}", lsb);
    Ok(Sample::from_registers(msb, lsb))
  }

  /// One poll cycle: publish channel 0 if a new conversion is waiting.
  ///
  /// - Not `Ready`: returns [`Poll::Skipped`] without touching the bus.
  /// - CH0 has no unread conversion: [`Poll::NoData`], data registers are
  ///   not read.
  /// - Any bus error: the soft warning is raised on `sink`, the cycle is
  ///   aborted and the error returned. The device stays `Ready`.
  /// - Otherwise the result is published on [`Channel::Data`] 0 and a
  ///   previously raised warning is cleared.
  ///
  /// Amplitude and watchdog flags are logged and never block publication.
  pub async fn sample<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Error<E>> {
    if !self.health.is_ready() {
      return Ok(Poll::Skipped);
    }

    match self.read_cycle().await {
      Ok(Some(sample)) => {
        sink.publish(Channel::Data(0), Reading::Counts(sample.value));
        self.health.clear_warning(sink);
        Ok(Poll::Published)
      }
      Ok(None) => Ok(Poll::NoData),
      Err(e) => {
        self.health.raise_warning(sink);
        Err(e)
      }
    }
  }

  async fn read_cycle(&mut self) -> Result<Option<Sample>, Error<E>> {
    let status = match self.get_status().await {
      Ok(status) => status,
      Err(e) => {
        warn!("failed to read status register");
        return Err(e);
      }
    };
    debug!("status: {}", status);
    if status.has_error() {
      warn!(
        "CH{} flagged: watchdog {}, amplitude high {}, amplitude low {}",
        status.error_channel,
        status.watchdog_timeout,
        status.amplitude_high,
        status.amplitude_low
      );
    }

    if !status.unread_ch0 {
      trace!("no new conversion on CH0");
      return Ok(None);
    }

    let sample = match self.get_sample().await {
      Ok(sample) => sample,
      Err(e) => {
        warn!("failed to read channel 0 data");
        return Err(e);
      }
    };
    debug!("CH0 data: {=u32} ({=u32:#x})", sample.value, sample.value);
    if sample.has_warning() {
      warn!("CH0 result flagged: amplitude {}, watchdog {}", sample.amplitude_warning, sample.watchdog_warning);
    }

    Ok(Some(sample))
  }
}

/// Decoded `STATUS` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct Status {
  pub unread_ch3: bool,
  pub unread_ch2: bool,
  pub unread_ch1: bool,
  pub unread_ch0: bool,
  #[skip(2)]
  pub data_ready: bool,
  #[skip(2)]
  pub amplitude_low: bool,
  pub amplitude_high: bool,
  pub watchdog_timeout: bool,
  /// Channel that raised the error flags.
  #[skip(2)]
  #[bits(2)]
  pub error_channel: u8,
}

impl Status {
  /// Watchdog timeout or amplitude warning on [`Status::error_channel`].
  pub fn has_error(&self) -> bool {
    self.watchdog_timeout || self.amplitude_high || self.amplitude_low
  }

  /// Unread conversion flag of `channel` (0..=3).
  pub fn is_unread(&self, channel: u8) -> bool {
    match channel {
      0 => self.unread_ch0,
      1 => self.unread_ch1,
      2 => self.unread_ch2,
      3 => self.unread_ch3,
      _ => false,
    }
  }
}

/// A channel conversion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
  /// Unsigned result, up to 28 bits.
  pub value: u32,
  /// Sensor oscillation amplitude out of range during the conversion.
  pub amplitude_warning: bool,
  /// Sensor oscillation stopped during the conversion.
  pub watchdog_warning: bool,
}

impl Sample {
  /// Combine the `DATA_CHx_MSB` and `DATA_CHx_LSB` words.
  ///
  /// Bits 11:0 of the MSB word are result bits 27:16. The flag bits 13:12
  /// are taken from the unmasked word.
  pub fn from_registers(msb: u16, lsb: u16) -> Self {
    Sample {
      value: (((msb & DATA_MSB_MASK) as u32) << 16) | lsb as u32,
      amplitude_warning: msb & DATA_MSB_AMPLITUDE != 0,
      watchdog_warning: msb & DATA_MSB_WATCHDOG != 0,
    }
  }

  pub fn has_warning(&self) -> bool {
    self.amplitude_warning || self.watchdog_warning
  }

  /// Sensor frequency: `fin_sel * f_ref * value / 2^28`.
  ///
  /// `fin_sel` is `CHx_FIN_SEL` (1 for the default configuration) and
  /// `f_ref_hz` the reference clock after `CHx_FREF_DIVIDER`.
  pub fn frequency_hz(&self, f_ref_hz: f32, fin_sel: u8) -> f32 {
    fin_sel as f32 * f_ref_hz * (self.value as f32 / (1u32 << 28) as f32)
  }
}

/// Capacitance of the LC tank: `1 / (L * (2 pi f)^2) - C_parasitic`.
pub fn capacitance_pf(f_sensor_hz: f32, inductance_uh: f32, parasitic_pf: f32) -> f32 {
  let omega = 2.0 * PI * f_sensor_hz;
  1.0e18 / (inductance_uh * omega.powi(2)) - parasitic_pf
}

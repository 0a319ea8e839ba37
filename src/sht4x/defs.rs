#![allow(dead_code)]

use crc::{Crc, CRC_8_NRSC_5};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Command {
  MeasureHighPrecision = 0xFD,
  MeasureMediumPrecision = 0xF6,
  MeasureLowPrecision = 0xE0,
  ReadSerial = 0x89,
  SoftReset = 0x94,
}

impl From<Command> for u8 {
  #[inline]
  fn from(c: Command) -> Self {
    c as u8
  }
}

/// Heater pulse: power level and duration.
///
/// Each pulse ends with a high precision measurement taken while the heater
/// is still on.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaterPulse {
  /// 200 mW for 1 s
  High1s = 0x39,
  /// 200 mW for 0.1 s
  High100ms = 0x32,
  /// 110 mW for 1 s
  Medium1s = 0x2F,
  /// 110 mW for 0.1 s
  Medium100ms = 0x24,
  /// 20 mW for 1 s
  Low1s = 0x1E,
  /// 20 mW for 0.1 s
  Low100ms = 0x15,
}

impl HeaterPulse {
  pub(crate) fn wait_ms(self) -> u32 {
    match self {
      HeaterPulse::High1s | HeaterPulse::Medium1s | HeaterPulse::Low1s => 1100,
      HeaterPulse::High100ms | HeaterPulse::Medium100ms | HeaterPulse::Low100ms => 110,
    }
  }
}

impl From<HeaterPulse> for u8 {
  #[inline]
  fn from(p: HeaterPulse) -> Self {
    p as u8
  }
}

pub(crate) const ADDR_DEFAULT: u8 = 0x44;

pub(crate) const RESET_DELAY_MS: u32 = 1;
pub(crate) const SERIAL_DELAY_MS: u32 = 1;
pub(crate) const MEASURE_DELAY_MS: u32 = 10;

/// The heater must not run above this temperature.
pub(crate) const HEATER_MAX_TEMP_C: f32 = 65.0;

/// Sensirion word checksum: polynomial 0x31, initial value 0xFF, no
/// reflection, no final xor.
pub(crate) const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

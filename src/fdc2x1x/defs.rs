#![allow(dead_code)]

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Reg {
  DataCh0Msb = 0x00,
  DataCh0Lsb = 0x01,
  DataCh1Msb = 0x02,
  DataCh1Lsb = 0x03,
  DataCh2Msb = 0x04,
  DataCh2Lsb = 0x05,
  DataCh3Msb = 0x06,
  DataCh3Lsb = 0x07,
  RcountCh0 = 0x08,
  RcountCh1 = 0x09,
  RcountCh2 = 0x0A,
  RcountCh3 = 0x0B,
  OffsetCh0 = 0x0C,
  OffsetCh1 = 0x0D,
  OffsetCh2 = 0x0E,
  OffsetCh3 = 0x0F,
  SettlecountCh0 = 0x10,
  SettlecountCh1 = 0x11,
  SettlecountCh2 = 0x12,
  SettlecountCh3 = 0x13,
  ClockDividersCh0 = 0x14,
  ClockDividersCh1 = 0x15,
  ClockDividersCh2 = 0x16,
  ClockDividersCh3 = 0x17,
  Status = 0x18,
  ErrorConfig = 0x19,
  Config = 0x1A,
  MuxConfig = 0x1B,
  ResetDev = 0x1C,
  DriveCh0 = 0x1E,
  DriveCh1 = 0x1F,
  DriveCh2 = 0x20,
  DriveCh3 = 0x21,
  ManufacturerId = 0x7E,
  DeviceId = 0x7F,
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

#[repr(u16)]
pub(crate) enum Command {
  Reset = 0x8000,
}

impl From<Command> for u16 {
  #[inline]
  fn from(c: Command) -> Self {
    c as u16
  }
}

// "TI" in ASCII
pub(crate) const MANUFACTURER_ID_TI: u16 = 0x5449;
pub(crate) const DEVICE_ID_FDC211X: u16 = 0x3054;
pub(crate) const DEVICE_ID_FDC221X: u16 = 0x3055;

pub(crate) const ADDR_DEFAULT: u8 = 0x2A;

pub(crate) const POWER_UP_DELAY_MS: u32 = 100;
pub(crate) const RESET_DELAY_MS: u32 = 10;

// DATA_CHx_MSB layout: [13] watchdog, [12] amplitude, [11:0] result bits 27:16
pub(crate) const DATA_MSB_MASK: u16 = 0x0FFF;
pub(crate) const DATA_MSB_AMPLITUDE: u16 = 1 << 12;
pub(crate) const DATA_MSB_WATCHDOG: u16 = 1 << 13;

/// Channel 0, single-ended sensor, continuous conversion.
///
/// Applied in this order after the soft reset.
pub(crate) const CONFIGURATION: [(Reg, u16); 7] = [
  // CH0_FIN_SEL = 1, CH0_FREF_DIVIDER = 1
  (Reg::ClockDividersCh0, 0x1001),
  (Reg::DriveCh0, 0x8000),
  (Reg::SettlecountCh0, 0x0020),
  (Reg::RcountCh0, 0x8329),
  (Reg::MuxConfig, 0x020D),
  (Reg::ErrorConfig, 0x3800),
  (Reg::Config, 0x1481),
];

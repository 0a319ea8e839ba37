#![allow(dead_code)]

/// Module base, the high byte of every seesaw register address.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Module {
  Status = 0x00,
  Touch = 0x0F,
}

impl From<Module> for u8 {
  #[inline]
  fn from(m: Module) -> Self {
    m as u8
  }
}

/// Functions of the status module.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum StatusReg {
  HwId = 0x01,
  Version = 0x02,
  Options = 0x03,
  Temp = 0x04,
  SwReset = 0x7F,
}

impl From<StatusReg> for u8 {
  #[inline]
  fn from(r: StatusReg) -> Self {
    r as u8
  }
}

pub(crate) const HW_ID_CODE: u8 = 0x55;
pub(crate) const SW_RESET_VALUE: u8 = 0xFF;
pub(crate) const TOUCH_CHANNEL_OFFSET: u8 = 0x10;

pub(crate) const ADDR_DEFAULT: u8 = 0x36;

pub(crate) const RESET_DELAY_MS: u32 = 500;
// Time the firmware needs between address write and data read.
pub(crate) const READ_DELAY_US: u32 = 125;
pub(crate) const TOUCH_READ_DELAY_US: u32 = 5000;
pub(crate) const TOUCH_RETRY_DELAY_MS: u32 = 1;

/// Largest valid capacitive touch reading (12-bit).
pub(crate) const TOUCH_MAX_VALID: u16 = 4095;
pub(crate) const TOUCH_ATTEMPTS: u8 = 4;

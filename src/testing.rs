//! Bus scripts and fakes shared by the unit tests.

extern crate std;

use std::vec;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::Transaction;

use crate::{Channel, Reading, Sink};

/// Delay provider that returns immediately.
pub(crate) struct NoDelay;

impl DelayNs for NoDelay {
  async fn delay_ns(&mut self, _ns: u32) {}
}

/// Sink that records every call.
#[derive(Default)]
pub(crate) struct RecordingSink {
  pub published: Vec<(Channel, Reading)>,
  pub warnings: Vec<bool>,
  pub unavailable: Vec<Channel>,
}

impl Sink for RecordingSink {
  fn publish(&mut self, channel: Channel, reading: Reading) {
    self.published.push((channel, reading));
  }

  fn warning(&mut self, active: bool) {
    self.warnings.push(active);
  }

  fn unavailable(&mut self, channel: Channel) {
    self.unavailable.push(channel);
  }
}

/// Big-endian 16-bit register read.
pub(crate) fn read16(addr: u8, reg: u8, value: u16) -> Transaction {
  Transaction::write_read(addr, vec![reg], value.to_be_bytes().to_vec())
}

/// Big-endian 16-bit register write.
pub(crate) fn write16(addr: u8, reg: u8, value: u16) -> Transaction {
  let [msb, lsb] = value.to_be_bytes();
  Transaction::write(addr, vec![reg, msb, lsb])
}

/// Complete, successful FDC2x1x setup sequence.
pub(crate) fn fdc_setup(addr: u8) -> Vec<Transaction> {
  vec![
    read16(addr, 0x7E, 0x5449),
    read16(addr, 0x7F, 0x3055),
    write16(addr, 0x1C, 0x8000),
    write16(addr, 0x14, 0x1001),
    write16(addr, 0x1E, 0x8000),
    write16(addr, 0x10, 0x0020),
    write16(addr, 0x08, 0x8329),
    write16(addr, 0x1B, 0x020D),
    write16(addr, 0x19, 0x3800),
    write16(addr, 0x1A, 0x1481),
  ]
}

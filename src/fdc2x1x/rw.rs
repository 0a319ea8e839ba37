use embedded_hal_async::{delay::DelayNs, i2c::*};

use super::{defs::Reg, Fdc2x1x};
use crate::Error;

// All registers are 16 bits wide, MSB first on the wire.
impl<I, D, E> Fdc2x1x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Read a register into a bit-packed view (LSB of the word is bit 0).
  pub(crate) async fn read<T: TryFrom<[u8; 2]>>(&mut self, reg: Reg) -> Result<T, Error<E>> {
    let raw = self.read_u16(reg).await?;
    T::try_from(raw.to_le_bytes()).map_err(|_| Error::Data)
  }

  pub(crate) async fn read_u16(&mut self, reg: Reg) -> Result<u16, Error<E>> {
    let mut b = [0u8; 2];
    self
      .i2c
      .write_read(self.config.address, &[reg.into()], &mut b)
      .await
      .map_err(Error::I2c)?;
    Ok(u16::from_be_bytes(b))
  }

  pub(crate) async fn write_u16(&mut self, reg: Reg, value: u16) -> Result<(), Error<E>> {
    let [msb, lsb] = value.to_be_bytes();
    self.i2c.write(self.config.address, &[reg.into(), msb, lsb]).await.map_err(Error::I2c)
  }
}

#[cfg(test)]
mod tests {
  extern crate std;

  use std::vec;

  use embedded_hal::i2c::ErrorKind;
  use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
  use futures::executor::block_on;

  use super::*;
  use crate::fdc2x1x::Config;
  use crate::testing::NoDelay;

  #[test]
  fn write_is_msb_first() {
    let mut i2c = Mock::new(&[Transaction::write(0x2A, vec![0x1A, 0x14, 0x81])]);
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config::default());

    block_on(fdc.write_u16(Reg::Config, 0x1481)).unwrap();
    i2c.done();
  }

  #[test]
  fn read_is_msb_first() {
    let mut i2c = Mock::new(&[Transaction::write_read(0x2A, vec![0x7F], vec![0x30, 0x55])]);
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config::default());

    assert_eq!(block_on(fdc.read_u16(Reg::DeviceId)).unwrap(), 0x3055);
    i2c.done();
  }

  #[test]
  fn bus_error_is_passed_through() {
    let mut i2c = Mock::new(&[Transaction::write_read(0x2B, vec![0x18], vec![0, 0]).with_error(ErrorKind::Other)]);
    let mut fdc = Fdc2x1x::new(i2c.clone(), NoDelay, Config { address: 0x2B });

    let err = block_on(fdc.read_u16(Reg::Status)).unwrap_err();
    assert!(matches!(err, Error::I2c(ErrorKind::Other)));
    i2c.done();
  }
}

use embedded_hal_async::{delay::DelayNs, i2c::*};

use super::{defs::Module, SoilSensor};
use crate::Error;

// A seesaw read is two transactions: the address, then after a pause the data.
impl<I, D, E> SoilSensor<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  pub(crate) async fn read_bytes(
    &mut self,
    module: Module,
    function: u8,
    buf: &mut [u8],
    delay_us: u32,
  ) -> Result<(), Error<E>> {
    self.i2c.write(self.config.address, &[module.into(), function]).await.map_err(Error::I2c)?;
    self.delay.delay_us(delay_us).await;
    self.i2c.read(self.config.address, buf).await.map_err(Error::I2c)
  }

  pub(crate) async fn read_u8(&mut self, module: Module, function: u8) -> Result<u8, Error<E>> {
    let mut b = [0u8; 1];
    self.read_bytes(module, function, &mut b, super::defs::READ_DELAY_US).await?;
    Ok(b[0])
  }

  pub(crate) async fn write_u8(&mut self, module: Module, function: u8, value: u8) -> Result<(), Error<E>> {
    self.i2c.write(self.config.address, &[module.into(), function, value]).await.map_err(Error::I2c)
  }
}

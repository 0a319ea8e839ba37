use embedded_hal_async::{delay::DelayNs, i2c::*};

use super::{defs::*, Fdc2x1x, Identity};
use crate::{Error, SetupFailure};

type SetupResult<T, E> = Result<T, (SetupFailure, Error<E>)>;

impl<I, D, E> Fdc2x1x<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Bring the converter up.
  ///
  /// Sequence:
  /// - Wait for power-up, then check `MANUFACTURER_ID` is TI (0x5449).
  /// - Read `DEVICE_ID` (logged, not validated).
  /// - Soft reset via `RESET_DEV`.
  /// - Program channel 0: clock dividers, drive current, settle count,
  ///   reference count, mux, error config and finally `CONFIG`, which starts
  ///   conversions.
  ///
  /// The first failing step leaves the driver `Failed` with the matching
  /// [`SetupFailure`] and returns the error. Nothing is retried or rolled
  /// back; call again to retry from the top.
  pub async fn initialize(&mut self) -> Result<(), Error<E>> {
    self.health.begin_setup();
    self.identity = None;

    match self.bring_up().await {
      Ok(()) => {
        self.health.set_ready();
        info!("FDC2x1x initialized");
        Ok(())
      }
      Err((reason, e)) => {
        error!("FDC2x1x setup failed: {}", reason);
        self.health.fail(reason);
        Err(e)
      }
    }
  }

  /// Read the identity registers without touching the setup state.
  pub async fn get_identity(&mut self) -> Result<Identity, Error<E>> {
    let manufacturer_id = self.read_u16(Reg::ManufacturerId).await?;
    let device_id = self.read_u16(Reg::DeviceId).await?;
    Ok(Identity { manufacturer_id, device_id })
  }

  /// Reset all registers to their power-on defaults. Conversions stop.
  pub async fn soft_reset(&mut self) -> Result<(), Error<E>> {
    self.write_u16(Reg::ResetDev, Command::Reset.into()).await?;
    self.delay.delay_ms(RESET_DELAY_MS).await;
    Ok(())
  }

  async fn bring_up(&mut self) -> SetupResult<(), E> {
    self.delay.delay_ms(POWER_UP_DELAY_MS).await;

    let manufacturer_id = self
      .read_u16(Reg::ManufacturerId)
      .await
      .map_err(|e| (SetupFailure::ReadManufacturerIdFailed, e))?;
    info!("manufacturer id: {=u16:#x}", manufacturer_id);

    if manufacturer_id != MANUFACTURER_ID_TI {
      error!("unexpected manufacturer id {=u16:#x}, expected {=u16:#x}", manufacturer_id, MANUFACTURER_ID_TI);
      return Err((SetupFailure::WrongChipId, Error::WrongChipId(manufacturer_id)));
    }

    let device_id = self.read_u16(Reg::DeviceId).await.map_err(|e| (SetupFailure::ReadDeviceIdFailed, e))?;
    info!("device id: {=u16:#x}", device_id);
    self.identity = Some(Identity { manufacturer_id, device_id });

    self.soft_reset().await.map_err(|e| (SetupFailure::ResetFailed, e))?;
    debug!("soft reset complete");

    for (reg, value) in CONFIGURATION {
      if let Err(e) = self.write_u16(reg, value).await {
        error!("failed to write {} = {=u16:#x}", reg, value);
        return Err((SetupFailure::ConfigurationFailed, e));
      }
    }

    Ok(())
  }
}

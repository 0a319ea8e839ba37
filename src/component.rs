//! Lifecycle shared by every driver: setup state, published readings and the
//! `Component` capability the host drives.

use core::fmt;

/// Reason a setup attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupFailure {
  /// Manufacturer identity register could not be read
  ReadManufacturerIdFailed,
  /// Identity register did not match the expected chip
  WrongChipId,
  /// Device identity register could not be read
  ReadDeviceIdFailed,
  /// Soft reset command was not accepted
  ResetFailed,
  /// A configuration register write failed
  ConfigurationFailed,
}

impl fmt::Display for SetupFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      SetupFailure::ReadManufacturerIdFailed => "failed to read manufacturer id",
      SetupFailure::WrongChipId => "unexpected chip id",
      SetupFailure::ReadDeviceIdFailed => "failed to read device id",
      SetupFailure::ResetFailed => "soft reset failed",
      SetupFailure::ConfigurationFailed => "configuration write failed",
    })
  }
}

/// Setup state of a driver instance.
///
/// `Uninitialized -> Ready` on a successful `initialize()`,
/// `Uninitialized -> Failed` on any setup error. The host may move any state
/// back to `Uninitialized` with [`Component::reset`], e.g. after the sensor
/// was power-cycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
  #[default]
  Uninitialized,
  Failed(SetupFailure),
  Ready,
}

impl DeviceState {
  pub fn is_ready(self) -> bool {
    self == DeviceState::Ready
  }

  pub fn is_failed(self) -> bool {
    matches!(self, DeviceState::Failed(_))
  }
}

impl fmt::Display for DeviceState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DeviceState::Uninitialized => f.write_str("uninitialized"),
      DeviceState::Failed(reason) => write!(f, "failed ({})", reason),
      DeviceState::Ready => f.write_str("ready"),
    }
  }
}

/// Logical channel a reading is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
  /// Converter data channel (FDC2x1x CH0..CH3)
  Data(u8),
  Temperature,
  Humidity,
  Moisture,
}

/// A published value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
  /// Raw converter counts
  Counts(u32),
  /// Degrees Celsius
  Celsius(f32),
  /// Percent (relative humidity)
  Percent(f32),
}

/// Receiver of readings and of the soft-warning condition.
///
/// All calls are fire-and-forget.
pub trait Sink {
  fn publish(&mut self, channel: Channel, reading: Reading);

  /// A transient runtime error was raised (`true`) or cleared (`false`).
  fn warning(&mut self, _active: bool) {}

  /// The last value on `channel` is no longer valid.
  fn unavailable(&mut self, _channel: Channel) {}
}

impl<S: Sink + ?Sized> Sink for &mut S {
  fn publish(&mut self, channel: Channel, reading: Reading) {
    (**self).publish(channel, reading)
  }

  fn warning(&mut self, active: bool) {
    (**self).warning(active)
  }

  fn unavailable(&mut self, channel: Channel) {
    (**self).unavailable(channel)
  }
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
  /// Component is not `Ready`; nothing was done
  Skipped,
  /// Bus traffic happened but no new value was available
  NoData,
  /// New values were published
  Published,
  /// Cycle aborted by a transient error (reported by [`crate::Poller::tick`])
  Aborted,
}

/// Capability implemented by every driver and driven by the host.
#[allow(async_fn_in_trait)]
pub trait Component {
  type Error;

  /// One-shot identity check and configuration.
  async fn initialize(&mut self) -> Result<(), Self::Error>;

  /// Write a human readable config dump.
  fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result;

  /// Read the sensor and publish into `sink`. Must be a no-op unless `Ready`.
  async fn poll<S: Sink>(&mut self, sink: &mut S) -> Result<Poll, Self::Error>;

  fn state(&self) -> DeviceState;

  /// Forget the setup outcome, the next `initialize()` starts from scratch.
  fn reset(&mut self);
}

/// Setup state plus the soft-warning flag, owned by each driver.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Health {
  state: DeviceState,
  warning: bool,
}

impl Health {
  pub(crate) fn state(&self) -> DeviceState {
    self.state
  }

  pub(crate) fn is_ready(&self) -> bool {
    self.state.is_ready()
  }

  pub(crate) fn has_warning(&self) -> bool {
    self.warning
  }

  /// Entry of every setup attempt: a failed device starts over.
  pub(crate) fn begin_setup(&mut self) {
    if self.state.is_failed() {
      self.state = DeviceState::Uninitialized;
    }
  }

  pub(crate) fn set_ready(&mut self) {
    self.state = DeviceState::Ready;
  }

  /// A failed device reports the setup failure, not a stale sample warning.
  pub(crate) fn fail(&mut self, reason: SetupFailure) {
    self.state = DeviceState::Failed(reason);
    self.warning = false;
  }

  pub(crate) fn reset(&mut self) {
    self.state = DeviceState::Uninitialized;
    self.warning = false;
  }

  pub(crate) fn raise_warning<S: Sink>(&mut self, sink: &mut S) {
    self.warning = true;
    sink.warning(true);
  }

  pub(crate) fn clear_warning<S: Sink>(&mut self, sink: &mut S) {
    if self.warning {
      self.warning = false;
      sink.warning(false);
    }
  }
}

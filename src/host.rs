use core::fmt;

use embedded_hal_async::delay::DelayNs;

use crate::{Component, DeviceState, Poll, Sink};

/// Polling schedule of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollingConfig {
  /// Time between two polls in milliseconds.
  pub update_interval_ms: u32,
}

impl Default for PollingConfig {
  fn default() -> Self {
    PollingConfig { update_interval_ms: 60_000 }
  }
}

/// Drives a [`Component`] through its lifecycle on a fixed period.
///
/// Setup failures park the component in `Failed` and later ticks are no-ops
/// until [`Poller::resume`] is called. Errors during a poll are transient:
/// they are logged, the cycle is dropped and the next tick tries again.
pub struct Poller<C, D> {
  component: C,
  delay: D,
  config: PollingConfig,
}

impl<C, D> Poller<C, D>
where
  C: Component,
  D: DelayNs,
{
  pub fn new(component: C, delay: D, config: PollingConfig) -> Self {
    Self { component, delay, config }
  }

  pub fn component(&self) -> &C {
    &self.component
  }

  pub fn component_mut(&mut self) -> &mut C {
    &mut self.component
  }

  pub fn config(&self) -> PollingConfig {
    self.config
  }

  /// Give back the component and the delay provider.
  pub fn release(self) -> (C, D) {
    (self.component, self.delay)
  }

  /// Run the component's setup once and return the resulting state.
  pub async fn setup(&mut self) -> DeviceState {
    if self.component.initialize().await.is_err() {
      error!("component setup failed, marking it failed");
    }
    let state = self.component.state();
    debug!("component state after setup: {}", state);
    state
  }

  /// Recover after the sensor was power-cycled (e.g. resume from sleep).
  pub async fn resume(&mut self) -> DeviceState {
    self.component.reset();
    self.setup().await
  }

  /// Poll once.
  pub async fn tick<S: Sink>(&mut self, sink: &mut S) -> Poll {
    match self.component.poll(sink).await {
      Ok(outcome) => outcome,
      Err(_) => {
        warn!("poll aborted, retrying on next tick");
        Poll::Aborted
      }
    }
  }

  /// One period of [`Poller::run_with_wake`]: resume if the host saw a
  /// wake-up, then poll.
  pub async fn cycle<S: Sink>(&mut self, sink: &mut S, woke: bool) -> Poll {
    if woke {
      info!("wake-up, setting the component up again");
      self.resume().await;
    }
    self.tick(sink).await
  }

  /// Poll forever, sleeping `update_interval_ms` between ticks.
  ///
  /// For hosts without a wake hook: a component that failed setup stays
  /// skipped. Never returns.
  pub async fn run<S: Sink>(&mut self, sink: &mut S) {
    self.run_with_wake(sink, || false).await
  }

  /// Like [`Poller::run`], but asks `woke` before every tick whether the
  /// sensor lost power. When it answers `true` the component is reset and
  /// set up again before it is polled.
  ///
  /// Runs setup first if the component was never initialized. Never returns.
  pub async fn run_with_wake<S: Sink, F: FnMut() -> bool>(&mut self, sink: &mut S, mut woke: F) {
    if self.component.state() == DeviceState::Uninitialized {
      self.setup().await;
    }
    loop {
      let woke = woke();
      self.cycle(sink, woke).await;
      self.delay.delay_ms(self.config.update_interval_ms).await;
    }
  }

  /// Component config dump followed by the polling schedule.
  pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    self.component.describe(out)?;
    writeln!(out, "  Update interval: {} ms", self.config.update_interval_ms)
  }
}

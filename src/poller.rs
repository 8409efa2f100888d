//! Periodic sampling of a calibrated [`SensorSession`].
//!
//! The loop runs as a single tokio task that owns the session: read, hand the
//! result to a [`SampleSink`], sleep `1 / frequency`, repeat. Reads never
//! overlap, and a failed read is reported and skipped, never fatal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use tokio::task::JoinHandle;

use crate::sms::{CalibrationError, Clock, ReadError, SensorSession, SmsBackend, SmsVector4};

/// 1 mHz.
pub const MIN_POLLING_FREQUENCY: f64 = 0.001;
/// 1 kHz.
pub const MAX_POLLING_FREQUENCY: f64 = 1000.0;
pub const DEFAULT_POLLING_FREQUENCY: f64 = 60.0;

/// Clamps into `[MIN_POLLING_FREQUENCY, MAX_POLLING_FREQUENCY]`. NaN maps to
/// the minimum.
pub fn clamp_frequency(hz: f64) -> f64 {
    if hz.is_nan() {
        return MIN_POLLING_FREQUENCY;
    }
    hz.clamp(MIN_POLLING_FREQUENCY, MAX_POLLING_FREQUENCY)
}

/// Polling frequency in Hz, shared between the loop and its handle.
///
/// Out-of-range values are clamped on `set`, never rejected.
#[derive(Debug, Clone)]
pub struct PollingFrequency(Arc<AtomicU64>);

impl PollingFrequency {
    pub fn new(hz: f64) -> Self {
        Self(Arc::new(AtomicU64::new(clamp_frequency(hz).to_bits())))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, hz: f64) {
        self.0.store(clamp_frequency(hz).to_bits(), Ordering::Release);
    }

    /// Delay between the end of one tick and the start of the next.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.get())
    }
}

impl Default for PollingFrequency {
    fn default() -> Self {
        Self::new(DEFAULT_POLLING_FREQUENCY)
    }
}

/// Outcome of one tick, as forwarded over a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollEvent {
    Sample(SmsVector4),
    Error(ReadError),
}

/// Consumer of the loop's output. Called on the loop task.
pub trait SampleSink: Send + 'static {
    fn on_sample(&mut self, sample: SmsVector4);

    fn on_error(&mut self, error: ReadError) {
        tracing::warn!("Read error: {}", error);
    }
}

/// Wraps a closure as a [`SampleSink`]; errors get the default logging.
pub struct FnSink<F>(pub F);

impl<F> SampleSink for FnSink<F>
where
    F: FnMut(SmsVector4) + Send + 'static,
{
    fn on_sample(&mut self, sample: SmsVector4) {
        (self.0)(sample)
    }
}

impl SampleSink for Sender<PollEvent> {
    fn on_sample(&mut self, sample: SmsVector4) {
        forward(self, PollEvent::Sample(sample));
    }

    fn on_error(&mut self, error: ReadError) {
        tracing::warn!("Read error: {}", error);
        forward(self, PollEvent::Error(error));
    }
}

// Non-blocking: a slow consumer loses events instead of stalling the loop.
fn forward(tx: &Sender<PollEvent>, event: PollEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::debug!("poll channel full, event dropped"),
        Err(TrySendError::Disconnected(_)) => tracing::debug!("poll channel closed, event dropped"),
    }
}

/// Drives a [`SensorSession`] at a bounded frequency.
pub struct Poller<B: SmsBackend, C: Clock> {
    session: SensorSession<B, C>,
    frequency: PollingFrequency,
}

impl<B, C> Poller<B, C>
where
    B: SmsBackend + Send + 'static,
    C: Clock + Send + 'static,
{
    pub fn new(session: SensorSession<B, C>) -> Self {
        Self {
            session,
            frequency: PollingFrequency::default(),
        }
    }

    /// Calibrates `session` and spawns the loop on success. Calibration errors
    /// go back to the caller; nothing is retried.
    pub fn start<S: SampleSink>(
        mut session: SensorSession<B, C>,
        hz: f64,
        sink: S,
    ) -> Result<PollerHandle, CalibrationError> {
        session.calibrate()?;
        let mut poller = Self::new(session);
        poller.set_polling_frequency(hz);
        Ok(poller.spawn(sink))
    }

    pub fn polling_frequency(&self) -> f64 {
        self.frequency.get()
    }

    pub fn set_polling_frequency(&mut self, hz: f64) {
        self.frequency.set(hz);
    }

    pub fn session(&self) -> &SensorSession<B, C> {
        &self.session
    }

    /// One read, delivered to `sink`.
    pub fn tick<S: SampleSink + ?Sized>(&mut self, sink: &mut S) {
        match self.session.read() {
            Ok(sample) => {
                tracing::trace!("sample {}", sample);
                sink.on_sample(sample);
            }
            Err(e) => sink.on_error(e),
        }
    }

    /// Polls until the future is dropped.
    pub async fn run<S: SampleSink>(mut self, mut sink: S) {
        tracing::info!("Polling SMS at {} Hz", self.frequency.get());
        loop {
            self.tick(&mut sink);
            tokio::time::sleep(self.frequency.period()).await;
        }
    }

    /// Moves the loop onto a tokio task. Must be called within a runtime.
    pub fn spawn<S: SampleSink>(self, sink: S) -> PollerHandle {
        let frequency = self.frequency.clone();
        let task = tokio::spawn(self.run(sink));
        PollerHandle { frequency, task }
    }
}

/// Owner of a running loop.
///
/// Dropping the handle aborts the loop, but the session (and the sensor claim)
/// is only released once the runtime next polls the aborted task. Call
/// [`stop`](Self::stop) and await it before re-acquiring the sensor.
pub struct PollerHandle {
    frequency: PollingFrequency,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn polling_frequency(&self) -> f64 {
        self.frequency.get()
    }

    /// Takes effect from the next delay.
    pub fn set_polling_frequency(&self, hz: f64) {
        self.frequency.set(hz);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits until its session (and the sensor) is released.
    pub async fn stop(mut self) {
        self.task.abort();
        // Resolves once the task's future, and the session in it, is dropped.
        let _ = (&mut self.task).await;
        tracing::info!("SMS polling stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

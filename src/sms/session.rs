use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::backend::{log_native_message, LogFn, RawAcceleration, SmsBackend};
use super::error::{CalibrationError, ReadError, StatusCode};
use super::vector::SmsVector4;

const SMS_SUCCESS: i32 = 0;

/// Source of sample timestamps, in seconds.
pub trait Clock {
    fn now(&mut self) -> f64;
}

/// Wall-clock seconds since the UNIX epoch, at the OS clock's resolution.
///
/// Stamps are comparable across processes, but follow system clock
/// adjustments: a step back (NTP, manual change) makes later samples carry
/// smaller timestamps. Use [`MonotonicClock`] when ordering matters more.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// Seconds since the clock was created. Never decreases.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl<F: FnMut() -> f64> Clock for F {
    fn now(&mut self) -> f64 {
        self()
    }
}

/// Where a session stands, derived from its two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not calibrated, or calibration itself failed.
    Uninitialized,
    /// Calibrated and the probe read went through.
    Ready,
    /// Calibrated, but the probe read failed. Terminal for this session.
    ReadFailed,
}

/// Gated access to the Sudden Motion Sensor.
///
/// Reads are refused until [`calibrate`](Self::calibrate) has both started the
/// sensor and completed one probe read. The flags are set once and never
/// reset: recovering from a failed probe means building a new session.
///
/// The backend's `shutdown` runs exactly once, when the session is dropped.
pub struct SensorSession<B: SmsBackend, C: Clock = SystemClock> {
    backend: B,
    clock: C,
    log: LogFn,
    scratch: RawAcceleration,
    is_calibrated: bool,
    is_readable: bool,
}

impl<B: SmsBackend> SensorSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<B: SmsBackend, C: Clock> SensorSession<B, C> {
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self {
            backend,
            clock,
            log: log_native_message,
            scratch: RawAcceleration::default(),
            is_calibrated: false,
            is_readable: false,
        }
    }

    /// Replaces the function receiving the backend's startup messages.
    pub fn with_log(mut self, log: LogFn) -> Self {
        self.log = log;
        self
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    pub fn is_readable(&self) -> bool {
        self.is_readable
    }

    pub fn state(&self) -> SessionState {
        match (self.is_calibrated, self.is_readable) {
            (true, true) => SessionState::Ready,
            (true, false) => SessionState::ReadFailed,
            (false, _) => SessionState::Uninitialized,
        }
    }

    /// Starts the sensor, then probes it with one read.
    ///
    /// A probe failure is a calibration failure (`ReadAccessRefused`) even
    /// though startup itself succeeded; the session stays calibrated but
    /// unreadable.
    pub fn calibrate(&mut self) -> Result<(), CalibrationError> {
        let code = self.backend.startup(self.log);
        if code != SMS_SUCCESS {
            let status = StatusCode::new(code);
            tracing::error!("SMS startup failed: {}", status);
            return Err(CalibrationError::CalibrationFailed(status));
        }
        self.is_calibrated = true;

        self.probe()
    }

    fn probe(&mut self) -> Result<(), CalibrationError> {
        self.is_readable = true;
        match self.read() {
            Ok(sample) => {
                tracing::info!("SMS calibrated, probe read {}", sample);
                Ok(())
            }
            Err(ReadError::Read(status)) => {
                self.is_readable = false;
                tracing::error!("SMS probe read failed: {}", status);
                Err(CalibrationError::ReadAccessRefused(status))
            }
            // Both flags are set above, so the gate cannot refuse.
            Err(ReadError::NotReady) => {
                self.is_readable = false;
                Err(CalibrationError::ReadAccessRefused(StatusCode::new(SMS_SUCCESS)))
            }
        }
    }

    /// Takes one sample, converted to m·s⁻² and stamped with the clock.
    pub fn read(&mut self) -> Result<SmsVector4, ReadError> {
        if !(self.is_calibrated && self.is_readable) {
            return Err(ReadError::NotReady);
        }

        self.scratch = RawAcceleration::default();
        let code = self.backend.read(&mut self.scratch);
        if code != SMS_SUCCESS {
            return Err(ReadError::Read(StatusCode::new(code)));
        }

        let t = self.clock.now();
        Ok(SmsVector4::from_raw(&self.scratch, t))
    }
}

impl<B: SmsBackend, C: Clock> Drop for SensorSession<B, C> {
    fn drop(&mut self) {
        self.backend.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::sms::error::SmsLibError;

    /// Counts native calls; shared so they stay visible after the session is gone.
    #[derive(Debug, Default)]
    pub struct CallCounts {
        pub startup: AtomicUsize,
        pub read: AtomicUsize,
        pub shutdown: AtomicUsize,
    }

    /// Backend returning scripted codes. `read_codes` is consumed front to back;
    /// once empty every read succeeds.
    pub struct ScriptedBackend {
        pub startup_code: i32,
        pub read_codes: Vec<i32>,
        pub axes: RawAcceleration,
        pub calls: Arc<CallCounts>,
    }

    impl ScriptedBackend {
        pub fn new(startup_code: i32, read_codes: &[i32]) -> (Self, Arc<CallCounts>) {
            let calls = Arc::new(CallCounts::default());
            let backend = Self {
                startup_code,
                read_codes: read_codes.iter().rev().copied().collect(),
                axes: RawAcceleration { x: 1.0, y: 2.0, z: 3.0 },
                calls: calls.clone(),
            };
            (backend, calls)
        }
    }

    impl SmsBackend for ScriptedBackend {
        fn startup(&mut self, log: LogFn) -> i32 {
            self.calls.startup.fetch_add(1, Ordering::SeqCst);
            log("scripted startup");
            self.startup_code
        }

        fn read(&mut self, out: &mut RawAcceleration) -> i32 {
            self.calls.read.fetch_add(1, Ordering::SeqCst);
            let code = self.read_codes.pop().unwrap_or(SMS_SUCCESS);
            if code == SMS_SUCCESS {
                *out = self.axes;
            }
            code
        }

        fn shutdown(&mut self) {
            self.calls.shutdown.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stepping_clock() -> impl FnMut() -> f64 {
        let mut t = 100.0;
        move || {
            t += 0.5;
            t
        }
    }

    #[test]
    fn test_read_before_calibrate_is_not_ready() {
        let (backend, calls) = ScriptedBackend::new(0, &[]);
        let mut session = SensorSession::new(backend);

        assert_eq!(session.read(), Err(ReadError::NotReady));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(calls.startup.load(Ordering::SeqCst), 0);
        assert_eq!(calls.read.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_calibrate_success_probes_once() {
        let (backend, calls) = ScriptedBackend::new(0, &[]);
        let mut session = SensorSession::with_clock(backend, stepping_clock());

        session.calibrate().unwrap();
        assert!(session.is_calibrated());
        assert!(session.is_readable());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(calls.startup.load(Ordering::SeqCst), 1);
        assert_eq!(calls.read.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_startup_failure_leaves_session_uncalibrated() {
        let (backend, calls) = ScriptedBackend::new(-3, &[]);
        let mut session = SensorSession::new(backend);

        let err = session.calibrate().unwrap_err();
        assert_eq!(err, CalibrationError::CalibrationFailed(StatusCode::new(-3)));
        assert_eq!(err.underlying(), SmsLibError::FailOpening);
        assert!(!session.is_calibrated());
        assert!(!session.is_readable());
        // no probe after a failed startup
        assert_eq!(calls.read.load(Ordering::SeqCst), 0);
        assert_eq!(session.read(), Err(ReadError::NotReady));
    }

    #[test]
    fn test_probe_failure_refuses_read_access() {
        let (backend, calls) = ScriptedBackend::new(0, &[-1]);
        let mut session = SensorSession::new(backend);

        let err = session.calibrate().unwrap_err();
        assert_eq!(err, CalibrationError::ReadAccessRefused(StatusCode::new(-1)));
        assert!(session.is_calibrated());
        assert!(!session.is_readable());
        assert_eq!(session.state(), SessionState::ReadFailed);

        // the gate holds from now on, without touching the backend
        assert_eq!(session.read(), Err(ReadError::NotReady));
        assert_eq!(calls.read.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_failure_reports_code_and_keeps_session_ready() {
        let (backend, _calls) = ScriptedBackend::new(0, &[0, -2]);
        let mut session = SensorSession::with_clock(backend, stepping_clock());
        session.calibrate().unwrap();

        assert_eq!(
            session.read(),
            Err(ReadError::Read(StatusCode::new(-2)))
        );
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.read().is_ok());
    }

    #[test]
    fn test_read_converts_units_and_stamps_time() {
        let (backend, _calls) = ScriptedBackend::new(0, &[]);
        let mut session = SensorSession::with_clock(backend, || 42.25);
        session.calibrate().unwrap();

        assert_eq!(
            session.read().unwrap(),
            SmsVector4::new(10.0, 20.0, 30.0, 42.25)
        );
    }

    #[test]
    fn test_shutdown_runs_once_on_drop() {
        let (backend, calls) = ScriptedBackend::new(0, &[]);
        {
            let mut session = SensorSession::new(backend);
            session.calibrate().unwrap();
            assert_eq!(calls.shutdown.load(Ordering::SeqCst), 0);
        }
        assert_eq!(calls.shutdown.load(Ordering::SeqCst), 1);

        // also released when calibration never succeeded
        let (backend, calls) = ScriptedBackend::new(-4, &[]);
        let mut session = SensorSession::new(backend);
        let _ = session.calibrate();
        drop(session);
        assert_eq!(calls.shutdown.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let mut clock = MonotonicClock::new();
        let mut last = clock.now();
        assert!(last >= 0.0);
        for _ in 0..1000 {
            let t = clock.now();
            assert!(t >= last, "{t} < {last}");
            last = t;
        }
    }

    #[test]
    fn test_monotonic_clock_stamps_increase_across_reads() {
        let (backend, _calls) = ScriptedBackend::new(0, &[]);
        let mut session = SensorSession::with_clock(backend, MonotonicClock::new());
        session.calibrate().unwrap();

        let first = session.read().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = session.read().unwrap();
        assert!(second.t > first.t);
    }

    #[test]
    fn test_system_clock_is_epoch_seconds() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800.0);
    }

    #[test]
    fn test_log_function_reaches_backend() {
        use std::sync::atomic::AtomicBool;

        static LOGGED: AtomicBool = AtomicBool::new(false);
        fn record(message: &str) {
            if message == "scripted startup" {
                LOGGED.store(true, Ordering::SeqCst);
            }
        }

        let (backend, _calls) = ScriptedBackend::new(0, &[]);
        let mut session = SensorSession::new(backend).with_log(record);
        session.calibrate().unwrap();
        assert!(LOGGED.load(Ordering::SeqCst));
    }
}

/// Reading as laid out by the native library's `sms_acceleration` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawAcceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Receives status messages from the backend during startup.
pub type LogFn = fn(&str);

/// Default [`LogFn`]: forwards backend messages to `tracing` under the `smslib` target.
pub fn log_native_message(message: &str) {
    tracing::debug!(target: "smslib", "{}", message);
}

/// The three native entry points a `SensorSession` drives.
///
/// Status codes follow SMSLib: 0 is success, negatives are the `SMS_FAIL_*`
/// constants.
pub trait SmsBackend {
    /// `smsStartup`: connect to the sensor and calibrate.
    fn startup(&mut self, log: LogFn) -> i32;

    /// `smsGetData`: fill `out` with one reading.
    fn read(&mut self, out: &mut RawAcceleration) -> i32;

    /// `smsShutdown`: release the connection.
    fn shutdown(&mut self);
}

impl<B: SmsBackend + ?Sized> SmsBackend for Box<B> {
    fn startup(&mut self, log: LogFn) -> i32 {
        (**self).startup(log)
    }

    fn read(&mut self, out: &mut RawAcceleration) -> i32 {
        (**self).read(out)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

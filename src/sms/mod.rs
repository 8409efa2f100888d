//! Sudden Motion Sensor session: calibration gate, error mapping and the
//! native SMSLib boundary.

pub mod backend;
pub mod error;
pub mod native_macos;
pub mod session;
pub mod vector;

pub use backend::{log_native_message, LogFn, RawAcceleration, SmsBackend};
pub use error::{map_error, CalibrationError, ReadError, SessionError, SmsLibError, StatusCode};
pub use native_macos::{native_available, NativeSmsLib};
pub use session::{Clock, MonotonicClock, SensorSession, SessionState, SystemClock};
pub use vector::SmsVector4;

// macOS Sudden Motion Sensor access via the externally supplied SMSLib.
//
// SMSLib talks to the SMS through IOKit and keeps a single, process-wide
// connection. `NativeSmsLib` therefore claims that connection on `acquire()`
// and gives it back on drop; a second `acquire()` while one is alive fails.
//
// SMSLib reports debug output by messaging an Objective-C object/selector pair
// passed to `smsStartup`. We pass nil for both (messaging nil is a no-op), so
// the library stays silent; the log function only sees our own status lines.
//
// The FFI block is only compiled on macOS with `--features native`. Other
// builds still get the type, but `acquire()` reports `SessionError::Unavailable`.

use std::sync::atomic::{AtomicBool, Ordering};

use super::backend::{LogFn, RawAcceleration, SmsBackend};
use super::error::{SessionError, StatusCode};

#[cfg(not(all(target_os = "macos", feature = "native")))]
const NOT_LINKED: i32 = -100;

/// true while some `SensorClaim` holds the native connection.
static SENSOR_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Exclusive right to the process-wide SMS connection. Released on drop.
#[derive(Debug)]
pub struct SensorClaim {
    _private: (),
}

impl SensorClaim {
    pub fn try_claim() -> Result<Self, SessionError> {
        SENSOR_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { _private: () })
            .map_err(|_| SessionError::AlreadyClaimed)
    }
}

impl Drop for SensorClaim {
    fn drop(&mut self) {
        SENSOR_CLAIMED.store(false, Ordering::Release);
    }
}

// smslib.h:
//   int smsStartup(id logObject, SEL logSelector);
//   int smsGetData(sms_acceleration *accel);
//   void smsShutdown(void);
#[cfg(all(target_os = "macos", feature = "native"))]
#[allow(non_snake_case)]
mod ffi {
    use std::ffi::c_void;
    use std::os::raw::c_int;

    use super::RawAcceleration;

    extern "C" {
        pub fn smsStartup(log_object: *mut c_void, log_selector: *const c_void) -> c_int;
        pub fn smsGetData(accel: *mut RawAcceleration) -> c_int;
        pub fn smsShutdown();
    }
}

/// Whether this build links the native SMSLib.
pub const fn native_available() -> bool {
    cfg!(all(target_os = "macos", feature = "native"))
}

/// [`SmsBackend`] over the native SMSLib.
#[derive(Debug)]
pub struct NativeSmsLib {
    _claim: SensorClaim,
}

impl NativeSmsLib {
    /// Claims the sensor connection for this process.
    pub fn acquire() -> Result<Self, SessionError> {
        if !native_available() {
            return Err(SessionError::Unavailable);
        }
        let claim = SensorClaim::try_claim()?;
        tracing::debug!("SMS connection claimed");
        Ok(Self { _claim: claim })
    }
}

impl SmsBackend for NativeSmsLib {
    fn startup(&mut self, log: LogFn) -> i32 {
        #[cfg(all(target_os = "macos", feature = "native"))]
        let code = unsafe { ffi::smsStartup(std::ptr::null_mut(), std::ptr::null()) };
        // Unreachable: `acquire` refuses to build one.
        #[cfg(not(all(target_os = "macos", feature = "native")))]
        let code = NOT_LINKED;

        log(&format!("smsStartup: {}", StatusCode::new(code)));
        code
    }

    fn read(&mut self, out: &mut RawAcceleration) -> i32 {
        #[cfg(all(target_os = "macos", feature = "native"))]
        {
            unsafe { ffi::smsGetData(out as *mut RawAcceleration) }
        }
        #[cfg(not(all(target_os = "macos", feature = "native")))]
        {
            let _ = out;
            NOT_LINKED
        }
    }

    fn shutdown(&mut self) {
        #[cfg(all(target_os = "macos", feature = "native"))]
        unsafe {
            ffi::smsShutdown()
        };
        tracing::debug!("SMS connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive_until_dropped() {
        let first = SensorClaim::try_claim().unwrap();
        assert_eq!(
            SensorClaim::try_claim().unwrap_err(),
            SessionError::AlreadyClaimed
        );
        drop(first);
        let again = SensorClaim::try_claim();
        assert!(again.is_ok());
    }

    #[test]
    fn test_raw_acceleration_matches_sms_acceleration_layout() {
        // struct sms_acceleration { float x; float y; float z; }
        assert_eq!(std::mem::size_of::<RawAcceleration>(), 12);
        assert_eq!(std::mem::align_of::<RawAcceleration>(), 4);
    }

    #[cfg(all(target_os = "macos", feature = "native"))]
    #[test]
    fn test_ffi_signatures_match_smslib_header() {
        use std::ffi::c_void;
        use std::os::raw::c_int;

        let _: unsafe extern "C" fn(*mut c_void, *const c_void) -> c_int = ffi::smsStartup;
        let _: unsafe extern "C" fn(*mut RawAcceleration) -> c_int = ffi::smsGetData;
        let _: unsafe extern "C" fn() = ffi::smsShutdown;
    }

    #[cfg(not(all(target_os = "macos", feature = "native")))]
    #[test]
    fn test_acquire_without_native_library() {
        assert!(!native_available());
        assert_eq!(
            NativeSmsLib::acquire().unwrap_err(),
            SessionError::Unavailable
        );
    }
}

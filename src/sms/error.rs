use thiserror::Error;

/// Status codes returned by the native SMSLib, one case per `SMS_*` constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmsLibError {
    /// `SMS_SUCCESS` (0). Never carried by a failure, only produced by the mapping.
    Success,

    /// `SMS_FAIL_ACCESS` (-1)
    ///
    /// The connection could not be accessed with the expected function and
    /// structure size. A change in Apple's driver interface usually lands here,
    /// as do most driver problems.
    FailAccess,

    /// `SMS_FAIL_CONNECTION` (-2): the device opened but no connection was made.
    FailConnection,

    /// `SMS_FAIL_OPENING` (-3)
    ///
    /// Opening the device failed. Typically the entitlements don't allow
    /// `IOServiceOpen`.
    FailOpening,

    /// `SMS_FAIL_NO_SERVICES` (-4)
    ///
    /// The list of matching services is empty: the machine has no Sudden Motion
    /// Sensor.
    FailNoService,

    /// `SMS_FAIL_LIST_SERVICES` (-5): listing the services failed.
    FailListServices,

    /// `SMS_FAIL_DICTIONARY` (-6): building the matching dictionary failed.
    FailDictionary,

    /// `SMS_FAIL_MODEL` (-7): the machine model could not be determined.
    FailModel,

    /// Any code SMSLib is not documented to return.
    Unknown,
}

impl SmsLibError {
    /// Maps a native status code to its named case. Pure; unknown codes fold
    /// into [`SmsLibError::Unknown`].
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            -1 => Self::FailAccess,
            -2 => Self::FailConnection,
            -3 => Self::FailOpening,
            -4 => Self::FailNoService,
            -5 => Self::FailListServices,
            -6 => Self::FailDictionary,
            -7 => Self::FailModel,
            _ => Self::Unknown,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FailAccess => "could not access the sensor connection",
            Self::FailConnection => "device opened but no connection was made",
            Self::FailOpening => "could not open the device (missing IOServiceOpen entitlement?)",
            Self::FailNoService => "no Sudden Motion Sensor service found",
            Self::FailListServices => "could not list IOKit services",
            Self::FailDictionary => "could not build the service matching dictionary",
            Self::FailModel => "could not determine the machine model",
            Self::Unknown => "unknown SMSLib error",
        }
    }
}

impl core::fmt::Display for SmsLibError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`SmsLibError::from_code`].
pub fn map_error(code: i32) -> SmsLibError {
    SmsLibError::from_code(code)
}

/// A failed native call: the raw code alongside its mapped case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode {
    pub code: i32,
    pub kind: SmsLibError,
}

impl StatusCode {
    pub const fn new(code: i32) -> Self {
        Self {
            code,
            kind: SmsLibError::from_code(code),
        }
    }
}

impl core::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (code {})", self.kind, self.code)
    }
}

/// Raised by `SensorSession::calibrate` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalibrationError {
    #[error("calibration failed: {0}")]
    CalibrationFailed(StatusCode),
    /// Startup succeeded but the probe read right after it did not.
    #[error("sensor calibrated but read access was refused: {0}")]
    ReadAccessRefused(StatusCode),
}

impl CalibrationError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::CalibrationFailed(s) | Self::ReadAccessRefused(s) => *s,
        }
    }

    pub const fn underlying(&self) -> SmsLibError {
        self.status().kind
    }
}

/// Raised by `SensorSession::read` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The session is not calibrated or its probe read failed. No native call
    /// was made.
    #[error("sensor is not ready (calibrate first)")]
    NotReady,
    #[error("sensor read failed: {0}")]
    Read(StatusCode),
}

impl ReadError {
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotReady => None,
            Self::Read(s) => Some(*s),
        }
    }
}

/// Errors acquiring the process-wide native sensor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the Sudden Motion Sensor is already owned by another session")]
    AlreadyClaimed,
    #[error("the native SMSLib is not available in this build")]
    Unavailable,
}

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub};

use super::backend::RawAcceleration;

/// Factor from SMSLib's native scale to m·s⁻².
pub const RAW_TO_MPS2: f64 = 10.0;

/// One accelerometer sample: x/y/z in m·s⁻², `t` in seconds.
///
/// Arithmetic applies to all four components, the timestamp included.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct SmsVector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl SmsVector4 {
    pub const ZERO: SmsVector4 = SmsVector4::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Converts a raw native reading taken at `t`.
    pub fn from_raw(raw: &RawAcceleration, t: f64) -> Self {
        Self {
            x: RAW_TO_MPS2 * f64::from(raw.x),
            y: RAW_TO_MPS2 * f64::from(raw.y),
            z: RAW_TO_MPS2 * f64::from(raw.z),
            t,
        }
    }
}

impl core::fmt::Display for SmsVector4 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(x: {}, y: {}, z: {}, t: {})", self.x, self.y, self.z, self.t)
    }
}

impl Neg for SmsVector4 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.t)
    }
}

impl Add for SmsVector4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.t + rhs.t,
        )
    }
}

impl Sub for SmsVector4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul<f64> for SmsVector4 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.t * rhs)
    }
}

impl Div<f64> for SmsVector4 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}

impl AddAssign for SmsVector4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl MulAssign<f64> for SmsVector4 {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl DivAssign<f64> for SmsVector4 {
    fn div_assign(&mut self, rhs: f64) {
        *self = *self / rhs;
    }
}

use std::ops::{Add, Sub};

/// A point on the host clock, in whole milliseconds since the page (or session) started.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

/// A span of time in whole milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Timestamp {
    /// The host clock origin.
    pub const ZERO: Self = Self(0);

    /// Convert a fractional host reading (such as `performance.now()`) into a timestamp.
    ///
    /// Negative and non-finite readings clamp to zero.
    pub fn from_f64_ms(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Self::ZERO;
        }
        Self(ms.floor() as u64)
    }

    /// Time elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Timestamp) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }
}

impl Millis {
    /// Zero-length span.
    pub const ZERO: Self = Self(0);

    /// Build a span from a whole number of seconds, saturating at `u64::MAX`.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Return `true` for a zero-length span.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add<Millis> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Millis) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.0))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Millis;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.since(rhs)
    }
}

impl Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Self::Output {
        Millis(self.0.saturating_add(rhs.0))
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Build a viewport from fractional host readings, rounding to whole pixels.
    pub fn from_f64(width: f64, height: f64) -> Self {
        fn px(v: f64) -> u32 {
            if !v.is_finite() || v <= 0.0 {
                return 0;
            }
            v.round().min(f64::from(u32::MAX)) as u32
        }

        Self {
            width: px(width),
            height: px(height),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

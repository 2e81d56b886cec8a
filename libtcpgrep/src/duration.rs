use std::fmt;
use std::ops::Sub;

/// Reimplementation of std::time::Duration, but panic-free
/// and partial, only to match our needs:
///   - use micros instead of nanos, avoid casts
///   - expose fields
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Duration {
    pub secs: u32,
    pub micros: u32,
}

pub const MICROS_PER_SEC: u32 = 1_000_000;

impl Duration {
    /// Build Duration from secs and micros
    pub fn new(secs: u32, micros: u32) -> Duration {
        Duration { secs, micros }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}

impl Sub for Duration {
    type Output = Duration;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, other: Duration) -> Self::Output {
        let secs = self.secs.wrapping_sub(other.secs);
        let (secs, micros) = if self.micros >= other.micros {
            (secs, self.micros - other.micros)
        } else {
            let diff = other.micros.wrapping_sub(self.micros);
            let secs_less = diff / MICROS_PER_SEC;
            let micros = MICROS_PER_SEC - diff;
            (secs.wrapping_sub(1 + secs_less), micros)
        };

        Duration { secs, micros }
    }
}

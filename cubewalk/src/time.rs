//! Data types for simulated time.

use core::time::Duration;

/// Specifies an amount of time passing “in game”.
///
/// [`Tick`] values are passed into [`crate::movement::Ticker::tick()`] to advance all
/// active transitions. The clock producing them is owned by the caller; the movement
/// core never reads wall-clock time itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tick {
    delta_t: Duration,
    paused: bool,
}

impl Tick {
    /// Construct a non-paused [`Tick`] from a duration expressed in fractional seconds.
    #[inline]
    pub fn from_seconds(dt: f64) -> Self {
        Self {
            delta_t: Duration::from_micros((dt * 1e6) as u64),
            paused: false,
        }
    }

    /// Returns the amount of time passed, as a [`Duration`].
    #[inline]
    pub fn delta_t_duration(self) -> Duration {
        self.delta_t
    }

    /// Returns the amount of time passed, as a floating-point number of seconds.
    #[inline]
    pub fn delta_t(self) -> f64 {
        self.delta_t.as_secs_f64()
    }

    /// Set the paused flag. See [`Tick::paused()`] for more information.
    #[inline]
    #[must_use]
    pub fn pause(self) -> Self {
        Self {
            paused: true,
            ..self
        }
    }

    /// Returns the "paused" state of this Tick. If true, then active transitions do not
    /// advance, but bookkeeping-only operations (commits of already-finished
    /// transitions) still run so that state never goes stale.
    #[inline]
    pub fn paused(self) -> bool {
        self.paused
    }
}

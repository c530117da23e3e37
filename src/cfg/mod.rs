#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{
    constants::{DEFAULT_CORRECTION_LATENCY_S, DEFAULT_CORRECTION_WAIT_S},
    prelude::{Duration, Error},
};

mod mode;
pub use mode::Mode;

/// What to do with an observation that is older than the most recent
/// open epoch.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum LatePolicy {
    /// Discard it (historical behavior).
    #[default]
    Drop,
    /// Open an epoch at its sorted position, as long as it is strictly
    /// later than the last released epoch.
    Insert,
}

fn default_wait_timeout() -> Duration {
    Duration::from_seconds(DEFAULT_CORRECTION_WAIT_S)
}

fn default_latency() -> Duration {
    Duration::from_seconds(DEFAULT_CORRECTION_LATENCY_S)
}

fn default_max_ephemeris_jump() -> Option<f64> {
    Some(10.0)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Session [Mode].
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: Mode,
    /// Rover (station) identifier. Observations from other stations
    /// are ignored when defined.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rover: Option<String>,
    /// Correction source mountpoint. Real-time epochs only wait for
    /// corrections when a source is defined. Correction lines whose
    /// last token differs from it are discarded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub correction_mount: Option<String>,
    /// Longest we hold an epoch while waiting for clock corrections
    /// to catch up.
    #[cfg_attr(feature = "serde", serde(default = "default_wait_timeout"))]
    pub correction_wait_timeout: Duration,
    /// Clock corrections no older than this (relative to the epoch)
    /// release the epoch right away.
    #[cfg_attr(feature = "serde", serde(default = "default_latency"))]
    pub correction_latency: Duration,
    /// [LatePolicy] for out of order observations.
    #[cfg_attr(feature = "serde", serde(default))]
    pub late_policy: LatePolicy,
    /// Maximal number of pending epochs. Oldest epochs are
    /// discarded past that point.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_pending_epochs: Option<usize>,
    /// Current / previous ephemeris position jump (in meters) above
    /// which a discontinuity is reported.
    #[cfg_attr(feature = "serde", serde(default = "default_max_ephemeris_jump"))]
    pub max_ephemeris_jump_m: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            rover: None,
            correction_mount: None,
            late_policy: LatePolicy::default(),
            max_pending_epochs: None,
            correction_latency: default_latency(),
            correction_wait_timeout: default_wait_timeout(),
            max_ephemeris_jump_m: default_max_ephemeris_jump(),
        }
    }
}

impl Config {
    /// Returns [Config] for real-time processing, synchronized on the
    /// correction stream of given mountpoint.
    /// You can then customize [Self] as you will.
    pub fn real_time(correction_mount: &str) -> Self {
        let mut s = Self::default();
        s.mode = Mode::RealTime;
        s.correction_mount = Some(correction_mount.to_string());
        s
    }

    /// Returns [Config] for post processing: epochs are never held.
    pub fn post_processing() -> Self {
        let mut s = Self::default();
        s.mode = Mode::PostProcessing;
        s
    }

    /// Copies and returns [Config] restricted to this rover.
    pub fn with_rover(&self, rover: &str) -> Self {
        let mut s = self.clone();
        s.rover = Some(rover.to_string());
        s
    }

    /// True when epochs should be synchronized on external corrections.
    pub(crate) fn expects_corrections(&self) -> bool {
        self.mode == Mode::RealTime && self.correction_mount.is_some()
    }

    /// Sanity checks, performed once at session start.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.correction_wait_timeout.to_seconds() <= 0.0 {
            return Err(Error::Config("correction wait timeout must be positive"));
        }
        if self.correction_latency.to_seconds() < 0.0 {
            return Err(Error::Config("correction latency must not be negative"));
        }
        if let Some(mount) = &self.correction_mount {
            if mount.trim().is_empty() {
                return Err(Error::Config("empty correction mountpoint"));
            }
        }
        if self.max_pending_epochs == Some(0) {
            return Err(Error::Config("pending epoch queue cannot be null"));
        }
        Ok(())
    }
}

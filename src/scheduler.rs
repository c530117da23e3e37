//! Epoch release policy
use log::debug;

use crate::prelude::{Config, Duration, Epoch};

/// Decides whether the oldest pending epoch should be held, waiting for
/// the correction stream to catch up, or released downstream.
#[derive(Debug, Clone, Copy)]
pub struct EpochScheduler {
    expects_corrections: bool,
    latency: Duration,
    timeout: Duration,
}

impl EpochScheduler {
    pub fn new(cfg: &Config) -> Self {
        Self {
            expects_corrections: cfg.expects_corrections(),
            latency: cfg.correction_latency,
            timeout: cfg.correction_wait_timeout,
        }
    }

    /// Returns true when the epoch sampled at t should be held.
    /// - never hold when we do not synchronize on a correction stream
    /// - always hold until a first clock correction is received
    /// - otherwise hold while corrections lag by more than the nominal
    ///   latency, and less than the wait timeout.
    pub fn wait(&self, t: Epoch, last_clock_update: Option<Epoch>) -> bool {
        if !self.expects_corrections {
            return false;
        }

        let last = match last_clock_update {
            Some(last) => last,
            None => return true,
        };

        let dt = t - last;
        let wait = dt > self.latency && dt < self.timeout;

        if wait {
            debug!("{} - waiting for corrections (lag={})", t, dt);
        }
        wait
    }
}

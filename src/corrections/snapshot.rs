use std::collections::HashMap;

use crate::{
    corrections::{BiasCorrection, ClockCorrection, OrbitCorrection, SatelliteCorrections},
    prelude::{Ephemeris, EphemerisPair, Epoch, SV},
};

/// Correction state at epoch release time, handed to the estimator.
/// May be stale, or incomplete for some satellites.
#[derive(Debug, Clone, Default)]
pub struct CorrectionSnapshot {
    pub(crate) corrections: HashMap<SV, SatelliteCorrections>,
    pub(crate) ephemerides: HashMap<SV, EphemerisPair>,
    pub(crate) last_clock_update: Option<Epoch>,
}

impl CorrectionSnapshot {
    pub fn orbit(&self, sv: SV) -> Option<&OrbitCorrection> {
        self.corrections.get(&sv).and_then(|c| c.orbit.as_ref())
    }

    pub fn clock(&self, sv: SV) -> Option<&ClockCorrection> {
        self.corrections.get(&sv).and_then(|c| c.clock.as_ref())
    }

    pub fn bias(&self, sv: SV) -> Option<&BiasCorrection> {
        self.corrections.get(&sv).and_then(|c| c.bias.as_ref())
    }

    pub fn last_clock_update(&self) -> Option<Epoch> {
        self.last_clock_update
    }

    /// Broadcast [Ephemeris] to be used with the corrections of this
    /// satellite. When an orbit correction is on record, only the issue
    /// matching its IOD (current or previous) qualifies. Otherwise, the
    /// current issue is returned.
    pub fn ephemeris(&self, sv: SV) -> Option<&Ephemeris> {
        let pair = self.ephemerides.get(&sv)?;
        match self.orbit(sv) {
            Some(orbit) => pair.select(orbit.iod),
            None => Some(&pair.current),
        }
    }

    /// Satellites with at least one correction on record
    pub fn satellites(&self) -> impl Iterator<Item = &SV> {
        self.corrections.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

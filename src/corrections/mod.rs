//! Real-time orbit, clock and bias corrections
use log::{debug, error, warn};
use std::collections::HashMap;

use crate::prelude::{EphemerisStore, Epoch, Vector3, SV};

mod message;
mod snapshot;

pub use message::{CorrectionMessage, MessageType};
pub use snapshot::CorrectionSnapshot;

/// Orbit correction, in the radial / along-track / cross-track frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCorrection {
    pub sv: SV,
    /// Issue of Data of the broadcast ephemeris being corrected
    pub iod: u16,
    /// Reference [Epoch]
    pub t: Epoch,
    /// Radial, along, cross correction (in meters)
    pub rac_m: Vector3<f64>,
    /// Radial, along, cross rates (in m.s⁻¹)
    pub rac_rate_m_s: Vector3<f64>,
}

/// Clock correction polynomial, expressed in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockCorrection {
    pub sv: SV,
    /// Issue of Data, own or inherited from the orbit correction
    pub iod: u16,
    /// Reference [Epoch]
    pub t: Epoch,
    pub c0_m: f64,
    pub c1_m_s: f64,
    pub c2_m_s2: f64,
}

impl ClockCorrection {
    /// Evaluates the correction at t (in meters)
    pub fn value_m(&self, t: Epoch) -> f64 {
        let dt = (t - self.t).to_seconds();
        self.c0_m + self.c1_m_s * dt + self.c2_m_s2 * dt.powi(2)
    }
}

/// Code biases of one satellite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasCorrection {
    pub sv: SV,
    pub t: Epoch,
    /// (signal code, bias in meters)
    pub biases: Vec<(String, f64)>,
}

impl BiasCorrection {
    /// Bias for this signal code (in meters)
    pub fn bias_m(&self, code: &str) -> Option<f64> {
        self.biases
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, value)| *value)
    }
}

/// Latest corrections of one satellite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatelliteCorrections {
    pub orbit: Option<OrbitCorrection>,
    pub clock: Option<ClockCorrection>,
    pub bias: Option<BiasCorrection>,
}

/// Outcome of one batch of correction records
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApplySummary {
    pub orbits: usize,
    pub clocks: usize,
    pub biases: usize,
    /// Clock corrections without orbit IOD on record
    pub discarded: usize,
    /// Records from another source, or of no interest
    pub ignored: usize,
    /// Records that failed to parse
    pub invalid: usize,
}

impl ApplySummary {
    pub fn accepted(&self) -> usize {
        self.orbits + self.clocks + self.biases
    }
}

impl std::ops::AddAssign for ApplySummary {
    fn add_assign(&mut self, rhs: Self) {
        self.orbits += rhs.orbits;
        self.clocks += rhs.clocks;
        self.biases += rhs.biases;
        self.discarded += rhs.discarded;
        self.ignored += rhs.ignored;
        self.invalid += rhs.invalid;
    }
}

/// Latest correction state of each satellite
#[derive(Debug, Clone, Default)]
pub struct CorrectionStore {
    inner: HashMap<SV, SatelliteCorrections>,
    last_clock_update: Option<Epoch>,
}

impl CorrectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_clock(&mut self, clock: ClockCorrection) {
        let t = clock.t;
        self.inner.entry(clock.sv).or_default().clock = Some(clock);
        match self.last_clock_update {
            Some(last) if t <= last => {},
            _ => self.last_clock_update = Some(t),
        }
    }

    fn store_orbit(&mut self, orbit: OrbitCorrection) {
        self.inner.entry(orbit.sv).or_default().orbit = Some(orbit);
    }

    /// Applies one [CorrectionMessage]. Returns false when the message
    /// was discarded: clock only correction while no orbit IOD is on record.
    pub fn apply(&mut self, msg: CorrectionMessage) -> bool {
        match msg {
            CorrectionMessage::Orbit(orbit) => {
                debug!("{}({}) - orbit correction iod={}", orbit.t, orbit.sv, orbit.iod);
                self.store_orbit(orbit);
            },
            CorrectionMessage::Combined(orbit, clock) => {
                debug!("{}({}) - orbit+clock correction iod={}", orbit.t, orbit.sv, orbit.iod);
                self.store_orbit(orbit);
                self.store_clock(clock);
            },
            CorrectionMessage::Clock {
                sv,
                t,
                c0_m,
                c1_m_s,
                c2_m_s2,
            } => {
                let iod = match self.orbit_iod(sv) {
                    Some(iod) => iod,
                    None => {
                        debug!("{}({}) - clock correction without orbit iod: discarded", t, sv);
                        return false;
                    },
                };
                debug!("{}({}) - clock correction iod={}", t, sv, iod);
                self.store_clock(ClockCorrection {
                    sv,
                    iod,
                    t,
                    c0_m,
                    c1_m_s,
                    c2_m_s2,
                });
            },
            CorrectionMessage::Bias(bias) => {
                debug!("{}({}) - {} code biases", bias.t, bias.sv, bias.biases.len());
                let sv = bias.sv;
                self.inner.entry(sv).or_default().bias = Some(bias);
            },
        }
        true
    }

    /// Parses and applies a batch of correction records, in order.
    /// When source is defined, records whose last token (mountpoint)
    /// differs are ignored.
    pub fn apply_lines<'a, I>(&mut self, lines: I, source: Option<&str>) -> ApplySummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = ApplySummary::default();

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(source) = source {
                if message::mountpoint(line) != Some(source) {
                    summary.ignored += 1;
                    continue;
                }
            }

            let msg = match CorrectionMessage::parse(line) {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    summary.ignored += 1;
                    continue;
                },
                Err(e) => {
                    error!("invalid correction \"{}\": {}", line.trim(), e);
                    summary.invalid += 1;
                    continue;
                },
            };

            let (orbits, clocks, biases) = match &msg {
                CorrectionMessage::Orbit(_) => (1, 0, 0),
                CorrectionMessage::Clock { .. } => (0, 1, 0),
                CorrectionMessage::Combined(..) => (1, 1, 0),
                CorrectionMessage::Bias(_) => (0, 0, 1),
            };

            if self.apply(msg) {
                summary.orbits += orbits;
                summary.clocks += clocks;
                summary.biases += biases;
            } else {
                summary.discarded += 1;
            }
        }

        if summary.discarded > 0 {
            warn!(
                "{} clock corrections discarded (no orbit iod on record)",
                summary.discarded
            );
        }

        summary
    }

    /// IOD of the latest orbit correction for this satellite
    pub fn orbit_iod(&self, sv: SV) -> Option<u16> {
        self.orbit(sv).map(|orbit| orbit.iod)
    }

    pub fn orbit(&self, sv: SV) -> Option<&OrbitCorrection> {
        self.inner.get(&sv).and_then(|corr| corr.orbit.as_ref())
    }

    pub fn clock(&self, sv: SV) -> Option<&ClockCorrection> {
        self.inner.get(&sv).and_then(|corr| corr.clock.as_ref())
    }

    pub fn bias(&self, sv: SV) -> Option<&BiasCorrection> {
        self.inner.get(&sv).and_then(|corr| corr.bias.as_ref())
    }

    /// Latest clock correction value for this satellite (in meters)
    pub fn last_clock_value_m(&self, sv: SV) -> Option<f64> {
        self.clock(sv).map(|clock| clock.c0_m)
    }

    /// Reference time of the most recent clock correction, all satellites
    /// included. None until the first clock correction is accepted.
    pub fn last_clock_update(&self) -> Option<Epoch> {
        self.last_clock_update
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Copies the current state, along with the broadcast ephemerides,
    /// for the estimator.
    pub fn snapshot(&self, ephemerides: &EphemerisStore) -> CorrectionSnapshot {
        CorrectionSnapshot {
            corrections: self.inner.clone(),
            last_clock_update: self.last_clock_update,
            ephemerides: ephemerides
                .iter()
                .map(|(sv, pair)| (*sv, *pair))
                .collect(),
        }
    }
}

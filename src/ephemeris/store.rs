use log::{debug, warn};
use std::collections::HashMap;

use crate::prelude::{Ephemeris, SV};

/// Current and previous [Ephemeris] of one satellite.
/// current is always later than previous, by (week, toc).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EphemerisPair {
    pub current: Ephemeris,
    pub previous: Option<Ephemeris>,
}

impl EphemerisPair {
    /// Returns the issue matching this IOD, current issue first.
    pub fn select(&self, iod: u16) -> Option<&Ephemeris> {
        if self.current.iod == iod {
            Some(&self.current)
        } else {
            self.previous.as_ref().filter(|prev| prev.iod == iod)
        }
    }

    /// Distance between both issues (in meters), evaluated at the
    /// current time of clock.
    pub fn continuity_m(&self) -> Option<f64> {
        let prev = self.previous.as_ref()?;
        let t = self.current.toc();
        let current = self.current.position_ecef_m(t)?;
        let previous = prev.position_ecef_m(t)?;
        Some((current - previous).norm())
    }
}

/// Latest broadcast [EphemerisPair] of each satellite
#[derive(Debug, Clone, Default)]
pub struct EphemerisStore {
    inner: HashMap<SV, EphemerisPair>,
    max_jump_m: Option<f64>,
}

impl EphemerisStore {
    /// Builds a new [EphemerisStore]. Issue to issue jumps larger than
    /// max_jump_m are reported.
    pub fn new(max_jump_m: Option<f64>) -> Self {
        Self {
            max_jump_m,
            inner: HashMap::with_capacity(64),
        }
    }

    /// Proposes a new [Ephemeris]. Returns true when accepted, that is,
    /// when it is the first issue for this satellite or is strictly more
    /// recent than the current one.
    pub fn update(&mut self, eph: Ephemeris) -> bool {
        match self.inner.get_mut(&eph.sv) {
            None => {
                debug!("{} - new ephemeris", eph);
                self.inner.insert(
                    eph.sv,
                    EphemerisPair {
                        current: eph,
                        previous: None,
                    },
                );
                true
            },
            Some(pair) => {
                if !eph.is_newer_than(&pair.current) {
                    debug!("{} - outdated or duplicate ephemeris", eph);
                    return false;
                }

                debug!("{} - ephemeris update", eph);
                pair.previous = Some(pair.current);
                pair.current = eph;

                if let Some(max_jump_m) = self.max_jump_m {
                    if let Some(jump_m) = pair.continuity_m() {
                        if jump_m > max_jump_m {
                            warn!("{} - ephemeris discontinuity: {:.3} m", eph, jump_m);
                        }
                    }
                }
                true
            },
        }
    }

    pub fn pair(&self, sv: SV) -> Option<&EphemerisPair> {
        self.inner.get(&sv)
    }

    pub fn current(&self, sv: SV) -> Option<&Ephemeris> {
        self.inner.get(&sv).map(|pair| &pair.current)
    }

    pub fn previous(&self, sv: SV) -> Option<&Ephemeris> {
        self.inner.get(&sv).and_then(|pair| pair.previous.as_ref())
    }

    /// [Ephemeris] matching this IOD, if still on record
    pub fn select(&self, sv: SV, iod: u16) -> Option<&Ephemeris> {
        self.inner.get(&sv).and_then(|pair| pair.select(iod))
    }

    /// Jump between current and previous issue (in meters)
    pub fn continuity_m(&self, sv: SV) -> Option<f64> {
        self.inner.get(&sv).and_then(|pair| pair.continuity_m())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SV, &EphemerisPair)> {
        self.inner.iter()
    }
}

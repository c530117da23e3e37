use crate::prelude::{gpst, Epoch, Vector3, SV};

mod kepler;
mod store;

pub use store::{EphemerisPair, EphemerisStore};

/// Broadcast Keplerian parameters (GPS, Galileo, BeiDou, QZSS)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Keplerian {
    /// Time of Issue of [Ephemeris], in seconds of week
    pub toe_s: f64,

    /// Semi-major axis (in meters)
    pub semi_major_axis_m: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// m0 (in radians)
    pub m0_rad: f64,

    /// (in radians)
    pub i0_rad: f64,

    /// (in radians/s)
    pub idot_rad_s: f64,

    /// (in radians)
    pub dn_rad: f64,

    /// (in radians)
    pub omega0_rad: f64,

    /// (in radians)
    pub omega_rad: f64,

    /// (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Sine Cosine (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine (in meters)
    pub crs_crc_m: (f64, f64),
}

/// GLONASS broadcast state vector (PZ-90, taken as ECEF), at time of clock
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlonassState {
    pub position_m: Vector3<f64>,
    pub velocity_m_s: Vector3<f64>,
    /// Lunisolar acceleration
    pub acceleration_m_s2: Vector3<f64>,
}

impl Default for GlonassState {
    fn default() -> Self {
        Self {
            position_m: Vector3::zeros(),
            velocity_m_s: Vector3::zeros(),
            acceleration_m_s2: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OrbitalParameters {
    Keplerian(Keplerian),
    Glonass(GlonassState),
}

impl Default for OrbitalParameters {
    fn default() -> Self {
        Self::Keplerian(Keplerian::default())
    }
}

/// Broadcast [Ephemeris], as parsed by the upstream navigation decoder.
/// Week counter and seconds of week refer to GPST.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Ephemeris {
    /// [SV]
    pub sv: SV,

    /// Week counter
    pub week: u32,

    /// Time of Clock, in seconds of week
    pub toc_s: f64,

    /// Issue of Data: corrections refer to it
    pub iod: u16,

    /// Clock bias (s), drift (s.s⁻¹) and drift rate (s.s⁻²)
    pub clock: (f64, f64, f64),

    /// [OrbitalParameters]
    pub orbit: OrbitalParameters,
}

impl Ephemeris {
    /// Time of Clock as [Epoch]
    pub fn toc(&self) -> Epoch {
        gpst(self.week, self.toc_s)
    }

    /// True if (week, toc) of [Self] is strictly later than that of other
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.week > other.week || (self.week == other.week && self.toc_s > other.toc_s)
    }

    /// Onboard clock offset at t (in seconds)
    pub fn clock_bias_s(&self, t: Epoch) -> f64 {
        let dt = (t - self.toc()).to_seconds();
        let (a0, a1, a2) = self.clock;
        a0 + a1 * dt + a2 * dt.powi(2)
    }

    /// Satellite ECEF position at t (in meters)
    pub fn position_ecef_m(&self, t: Epoch) -> Option<Vector3<f64>> {
        match &self.orbit {
            OrbitalParameters::Keplerian(kepler) => kepler.position_ecef_m(self.week, t),
            OrbitalParameters::Glonass(state) => {
                let dt = (t - self.toc()).to_seconds();
                Some(
                    state.position_m
                        + state.velocity_m_s * dt
                        + state.acceleration_m_s2 * (0.5 * dt.powi(2)),
                )
            },
        }
    }
}

impl std::fmt::Display for Ephemeris {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} week={} toc={:.3} iod={}",
            self.sv, self.week, self.toc_s, self.iod
        )
    }
}

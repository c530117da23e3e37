//! Correction wire records
use std::str::{FromStr, SplitWhitespace};

use crate::{
    corrections::{BiasCorrection, ClockCorrection, OrbitCorrection},
    prelude::{gpst_checked, Constellation, Epoch, Error, Vector3, SV},
};

/// Correction message types of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Orbit(Constellation),
    Clock(Constellation),
    Combined(Constellation),
    Bias(Constellation),
}

impl MessageType {
    /// Identifies a message type, None when not relevant.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            4001 => Some(Self::Orbit(Constellation::GPS)),
            4002 => Some(Self::Clock(Constellation::GPS)),
            4004 => Some(Self::Combined(Constellation::GPS)),
            4021 => Some(Self::Orbit(Constellation::Glonass)),
            4022 => Some(Self::Clock(Constellation::Glonass)),
            4024 => Some(Self::Combined(Constellation::Glonass)),
            4998 => Some(Self::Bias(Constellation::GPS)),
            4999 => Some(Self::Bias(Constellation::Glonass)),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Orbit(Constellation::Glonass) => 4021,
            Self::Clock(Constellation::Glonass) => 4022,
            Self::Combined(Constellation::Glonass) => 4024,
            Self::Bias(Constellation::Glonass) => 4999,
            Self::Orbit(_) => 4001,
            Self::Clock(_) => 4002,
            Self::Combined(_) => 4004,
            Self::Bias(_) => 4998,
        }
    }
}

/// One parsed correction record
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionMessage {
    /// Orbit only
    Orbit(OrbitCorrection),
    /// Clock only: carries no IOD, it inherits that of the
    /// latest orbit correction.
    Clock {
        sv: SV,
        t: Epoch,
        c0_m: f64,
        c1_m_s: f64,
        c2_m_s2: f64,
    },
    /// Orbit and clock, sharing the same IOD
    Combined(OrbitCorrection, ClockCorrection),
    /// Code biases
    Bias(BiasCorrection),
}

struct Fields<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn next<T: FromStr>(&mut self, name: &'static str) -> Result<T, Error> {
        let token = self.inner.next().ok_or(Error::MissingField(name))?;
        token.parse::<T>().map_err(|_| Error::InvalidField(name))
    }

    fn vector3(&mut self, names: [&'static str; 3]) -> Result<Vector3<f64>, Error> {
        Ok(Vector3::new(
            self.next(names[0])?,
            self.next(names[1])?,
            self.next(names[2])?,
        ))
    }
}

impl CorrectionMessage {
    /// [SV] this message applies to
    pub fn sv(&self) -> SV {
        match self {
            Self::Orbit(orbit) => orbit.sv,
            Self::Clock { sv, .. } => *sv,
            Self::Combined(orbit, _) => orbit.sv,
            Self::Bias(bias) => bias.sv,
        }
    }

    /// Parses one record:
    /// `type interval week seconds sv <type specific fields> [mountpoint]`.
    /// Returns Ok(None) for message types that are not relevant here.
    pub fn parse(line: &str) -> Result<Option<Self>, Error> {
        let mut fields = Fields {
            inner: line.split_whitespace(),
        };

        let code = fields.next::<u16>("message type")?;
        let msg_type = match MessageType::from_code(code) {
            Some(msg_type) => msg_type,
            None => return Ok(None),
        };

        let _interval = fields.next::<u32>("update interval")?;
        let week = fields.next::<u32>("week")?;
        let seconds = fields.next::<f64>("seconds")?;

        let sv_str = fields.inner.next().ok_or(Error::MissingField("satellite"))?;
        let sv = SV::from_str(sv_str).map_err(|_| Error::InvalidSatellite(sv_str.to_string()))?;

        let t = gpst_checked(week, seconds).ok_or(Error::InvalidField("seconds"))?;

        let msg = match msg_type {
            MessageType::Orbit(_) => {
                let iod = fields.next::<u16>("iod")?;
                let rac_m = fields.vector3(["radial", "along", "cross"])?;
                let rac_rate_m_s = fields.vector3(["dot radial", "dot along", "dot cross"])?;
                Self::Orbit(OrbitCorrection {
                    sv,
                    iod,
                    t,
                    rac_m,
                    rac_rate_m_s,
                })
            },
            MessageType::Clock(_) => Self::Clock {
                sv,
                t,
                c0_m: fields.next("c0")?,
                c1_m_s: fields.next("c1")?,
                c2_m_s2: fields.next("c2")?,
            },
            MessageType::Combined(_) => {
                let iod = fields.next::<u16>("iod")?;
                let c0_m = fields.next("c0")?;
                let rac_m = fields.vector3(["radial", "along", "cross"])?;
                let c1_m_s = fields.next("c1")?;
                let rac_rate_m_s = fields.vector3(["dot radial", "dot along", "dot cross"])?;
                let c2_m_s2 = fields.next("c2")?;
                Self::Combined(
                    OrbitCorrection {
                        sv,
                        iod,
                        t,
                        rac_m,
                        rac_rate_m_s,
                    },
                    ClockCorrection {
                        sv,
                        iod,
                        t,
                        c0_m,
                        c1_m_s,
                        c2_m_s2,
                    },
                )
            },
            MessageType::Bias(_) => {
                let n = fields.next::<usize>("number of biases")?;
                let mut biases = Vec::with_capacity(n);
                for _ in 0..n {
                    let code = fields.next::<String>("bias code")?;
                    let value = fields.next::<f64>("bias value")?;
                    biases.push((code, value));
                }
                Self::Bias(BiasCorrection { sv, t, biases })
            },
        };

        Ok(Some(msg))
    }
}

/// Last token of a record: the source mountpoint
pub(crate) fn mountpoint(line: &str) -> Option<&str> {
    line.split_whitespace().last()
}

use crate::constants::SPEED_OF_LIGHT_M_S;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tracked frequency band. GLONASS FDMA channels are folded onto their
/// nominal band.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS/QZSS/SBAS) same frequency as E1 and B1C, GLONASS G1
    #[default]
    L1,
    /// L2 (GPS/QZSS), GLONASS G2
    L2,
    /// L5 (GPS/QZSS/SBAS) same frequency as E5A and B2A
    L5,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
        }
    }
}

impl Carrier {
    /// Nominal frequency [Hz]
    pub fn frequency(&self) -> f64 {
        match self {
            Self::L1 => 1575.42E6_f64,
            Self::L2 => 1227.60E6_f64,
            Self::L5 => 1176.45E6_f64,
        }
    }

    /// Nominal wavelength [m]
    pub fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT_M_S / self.frequency()
    }

    /// Band code as used by the signal oriented wire formats
    pub(crate) fn from_wire(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::L1),
            2 => Some(Self::L2),
            5 => Some(Self::L5),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn to_wire(&self) -> u8 {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L5 => 5,
        }
    }
}

use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session mode
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Live streams. Epochs may be held until the correction
    /// stream catches up.
    #[default]
    RealTime,

    /// Replayed data: corrections are synchronized by the reader,
    /// epochs are released as soon as they are complete.
    PostProcessing,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::RealTime => write!(fmt, "real-time"),
            Self::PostProcessing => write!(fmt, "post-processing"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rt" | "realtime" | "real-time" => Ok(Self::RealTime),
            "pp" | "postprocessing" | "post-processing" => Ok(Self::PostProcessing),
            _ => Err(Error::Config("unknown session mode")),
        }
    }
}

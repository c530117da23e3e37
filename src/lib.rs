#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod assembler;
mod carrier;
mod cfg;
mod constants;
mod corrections;
mod decoder;
mod ephemeris;
mod observation;
mod pipeline;
mod scheduler;
mod time;
mod tracker;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::assembler::{EpochAssembler, EpochData, Ingestion};
    pub use crate::carrier::Carrier;
    pub use crate::cfg::{Config, LatePolicy, Mode};
    pub use crate::corrections::{
        ApplySummary, BiasCorrection, ClockCorrection, CorrectionMessage, CorrectionSnapshot,
        CorrectionStore, MessageType, OrbitCorrection, SatelliteCorrections,
    };
    pub use crate::decoder::{Decoded, Format, StreamDecoder};
    pub use crate::ephemeris::{
        Ephemeris, EphemerisPair, EphemerisStore, GlonassState, Keplerian, OrbitalParameters,
    };
    pub use crate::observation::{Observation, SignalObservation};
    pub use crate::pipeline::{
        CorrectionFeed, EpochOutput, Estimator, LogSink, MessageSink, ObservationFeed, Pipeline,
    };
    pub use crate::scheduler::EpochScheduler;
    pub use crate::time::{gpst, gpst_checked, gpst_from_seconds, week_seconds};
    pub use crate::tracker::SlipTracker;
    pub use crate::Error;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// [crate::prelude::Config] rejected at session start.
    #[error("invalid configuration: {0}")]
    Config(&'static str),

    /// Correction line is too short for its message type.
    #[error("correction record: missing field \"{0}\"")]
    MissingField(&'static str),

    /// Correction line field failed to parse.
    #[error("correction record: invalid field \"{0}\"")]
    InvalidField(&'static str),

    #[error("invalid satellite identifier \"{0}\"")]
    InvalidSatellite(String),

    /// Observation or correction feed I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

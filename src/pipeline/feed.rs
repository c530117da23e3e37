//! Stream producers
use log::{debug, info};
use std::{
    io::{BufRead, ErrorKind, Read},
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    corrections::ApplySummary,
    prelude::{Error, Format, Pipeline, StreamDecoder},
};

const READ_CHUNK_SIZE: usize = 4096;

/// Observation producer: decodes one binary stream and feeds the
/// [Pipeline]. Decoding happens outside of the session lock.
pub struct ObservationFeed<'a> {
    pipeline: &'a Pipeline,
    station: String,
    decoder: StreamDecoder,
}

impl<'a> ObservationFeed<'a> {
    pub fn new(pipeline: &'a Pipeline, station: &str, format: Format) -> Self {
        Self {
            pipeline,
            station: station.to_string(),
            decoder: StreamDecoder::new(format),
        }
    }

    /// Reads until end of stream, I/O error or stop request.
    /// Returns the number of observations stored.
    pub fn run<R: Read>(&mut self, mut reader: R, stop: &AtomicBool) -> Result<usize, Error> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let mut stored = 0;

        while !stop.load(Ordering::Relaxed) {
            let size = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(size) => size,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            let decoded = self.decoder.feed(&chunk[..size]);
            if !decoded.records.is_empty() {
                stored += self
                    .pipeline
                    .ingest_observations(&self.station, decoded.records);
            }
        }

        if !self.decoder.pending().is_empty() {
            debug!(
                "{}({}) - {} trailing bytes left",
                self.station,
                self.decoder.format(),
                self.decoder.pending().len()
            );
        }

        info!("{} - observation stream closed", self.station);
        Ok(stored)
    }
}

/// Correction producer: one text record per line.
pub struct CorrectionFeed<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> CorrectionFeed<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Reads until end of stream, I/O error or stop request.
    pub fn run<R: BufRead>(&self, reader: R, stop: &AtomicBool) -> Result<ApplySummary, Error> {
        let mut summary = ApplySummary::default();

        for line in reader.lines() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let line = line?;
            summary += self.pipeline.apply_corrections([line.as_str()]);
        }

        info!(
            "correction stream closed: {} orbits, {} clocks, {} biases",
            summary.orbits, summary.clocks, summary.biases
        );
        Ok(summary)
    }
}

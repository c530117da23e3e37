//! Session coordinator
use log::{debug, info};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Condvar, Mutex, MutexGuard, PoisonError,
};

use crate::{
    corrections::ApplySummary,
    prelude::{
        Config, CorrectionSnapshot, CorrectionStore, Duration, Ephemeris, EphemerisStore,
        EpochAssembler, EpochData, EpochScheduler, Epoch, Error, Ingestion, Mode, Observation,
        SlipTracker, SV,
    },
};

mod feed;
mod sink;

pub use feed::{CorrectionFeed, ObservationFeed};
pub use sink::{LogSink, MessageSink};

/// Longest the drain loop sleeps before checking the stop flag again
const POLL_INTERVAL_MS: u64 = 100;

/// External position estimator, fed with released epochs.
pub trait Estimator {
    type Fix: std::fmt::Display;
    type Error: std::fmt::Display;

    /// Processes one synchronized epoch, along with the corrections
    /// known at release time. Corrections may be stale or missing.
    fn process_epoch(
        &mut self,
        epoch: &EpochData,
        corrections: &CorrectionSnapshot,
    ) -> Result<Self::Fix, Self::Error>;
}

/// Outcome of one released epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EpochOutput<F> {
    /// Sampling [Epoch]
    pub t: Epoch,
    /// Number of satellites in the epoch
    pub num_sv: usize,
    /// Estimator fix, or its error message
    pub result: Result<F, String>,
}

/// Shared session state. Only reachable through [Pipeline].
struct State {
    tracker: SlipTracker,
    assembler: EpochAssembler,
    corrections: CorrectionStore,
    ephemerides: EphemerisStore,
    /// Bumped on every update that may unblock the drain loop
    generation: u64,
}

/// One streaming session: serializes the observation, ephemeris and
/// correction producers, and releases synchronized epochs.
/// All entry points take `&self` and may be called from any thread.
pub struct Pipeline {
    cfg: Config,
    scheduler: EpochScheduler,
    state: Mutex<State>,
    updated: Condvar,
    sink: Box<dyn MessageSink>,
}

impl Pipeline {
    /// Creates a new session. Fails on invalid [Config].
    pub fn new(cfg: &Config) -> Result<Self, Error> {
        cfg.validate()?;

        info!(
            "{} session (corrections: {})",
            cfg.mode,
            cfg.correction_mount.as_deref().unwrap_or("none")
        );

        Ok(Self {
            cfg: cfg.clone(),
            scheduler: EpochScheduler::new(cfg),
            updated: Condvar::new(),
            sink: Box::new(LogSink::default()),
            state: Mutex::new(State {
                generation: 0,
                tracker: SlipTracker::new(),
                corrections: CorrectionStore::new(),
                assembler: EpochAssembler::new(cfg),
                ephemerides: EphemerisStore::new(cfg.max_ephemeris_jump_m),
            }),
        })
    }

    /// Replaces the default [LogSink].
    pub fn with_sink(mut self, sink: Box<dyn MessageSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, state: &mut State) {
        state.generation = state.generation.wrapping_add(1);
        self.updated.notify_all();
    }

    /// Ingests decoded observations of this station. Observations of
    /// other stations than the configured rover are ignored.
    /// Returns the number of observations stored.
    pub fn ingest_observations(&self, station: &str, observations: Vec<Observation>) -> usize {
        if let Some(rover) = &self.cfg.rover {
            if rover != station {
                return 0;
            }
        }

        let mut state = self.state();
        let mut stored = 0;

        for mut observation in observations {
            state.tracker.annotate(&mut observation);
            if state.assembler.ingest(observation) != Ingestion::Dropped {
                stored += 1;
            }
        }

        self.notify(&mut state);
        stored
    }

    /// Proposes a new broadcast [Ephemeris]. Returns true when accepted.
    pub fn update_ephemeris(&self, eph: Ephemeris) -> bool {
        let mut state = self.state();
        let accepted = state.ephemerides.update(eph);
        if accepted {
            self.notify(&mut state);
        }
        accepted
    }

    /// Applies a batch of correction records, filtered on the configured
    /// correction source.
    pub fn apply_corrections<'a, I>(&self, lines: I) -> ApplySummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let source = match (self.cfg.mode, self.cfg.correction_mount.as_deref()) {
            (Mode::PostProcessing, _) => None,
            (Mode::RealTime, Some(mount)) => Some(mount),
            (Mode::RealTime, None) => {
                let ignored = lines
                    .into_iter()
                    .filter(|line| !line.trim().is_empty())
                    .count();
                debug!("no correction source: {} records ignored", ignored);
                return ApplySummary {
                    ignored,
                    ..Default::default()
                };
            },
        };

        let mut state = self.state();
        let summary = state.corrections.apply_lines(lines, source);
        if summary.accepted() > 0 {
            self.notify(&mut state);
        }
        summary
    }

    /// Pops the oldest pending epoch if it should not be held any longer,
    /// along with the current corrections.
    pub fn next_ready(&self) -> Option<(EpochData, CorrectionSnapshot)> {
        let mut state = self.state();
        let t = state.assembler.head()?.t;

        if self
            .scheduler
            .wait(t, state.corrections.last_clock_update())
        {
            return None;
        }

        let epoch = state.assembler.pop()?;
        let snapshot = state.corrections.snapshot(&state.ephemerides);
        Some((epoch, snapshot))
    }

    fn process<E: Estimator>(
        &self,
        estimator: &mut E,
        epoch: EpochData,
        snapshot: CorrectionSnapshot,
    ) -> EpochOutput<E::Fix> {
        let num_sv = epoch.len();
        let result = estimator
            .process_epoch(&epoch, &snapshot)
            .map_err(|e| e.to_string());

        match &result {
            Ok(fix) => {
                let station = self.cfg.rover.as_deref().unwrap_or("rover");
                self.sink
                    .message(&format!("{} {} {}", epoch.t, station, fix), true);
            },
            Err(e) => {
                self.sink
                    .message(&format!("{} - estimator error: {}", epoch.t, e), true);
            },
        }

        EpochOutput {
            t: epoch.t,
            num_sv,
            result,
        }
    }

    /// Releases and processes every epoch that is ready, oldest first.
    /// The stop flag is checked between epochs.
    pub fn process_ready<E: Estimator>(
        &self,
        estimator: &mut E,
        stop: &AtomicBool,
    ) -> Vec<EpochOutput<E::Fix>> {
        let mut outputs = Vec::new();
        while !stop.load(Ordering::Relaxed) {
            let (epoch, snapshot) = match self.next_ready() {
                Some(ready) => ready,
                None => break,
            };
            outputs.push(self.process(estimator, epoch, snapshot));
        }
        outputs
    }

    /// Drain loop: processes epochs as they become ready until the stop
    /// flag is raised. Waiting for more input never blocks longer than
    /// the poll interval.
    pub fn run<E, F>(&self, estimator: &mut E, stop: &AtomicBool, mut on_output: F)
    where
        E: Estimator,
        F: FnMut(EpochOutput<E::Fix>),
    {
        let poll = std::time::Duration::from_millis(POLL_INTERVAL_MS);

        while !stop.load(Ordering::Relaxed) {
            let generation = self.state().generation;

            for output in self.process_ready(estimator, stop) {
                on_output(output);
            }

            let state = self.state();
            if state.generation == generation && !stop.load(Ordering::Relaxed) {
                let _ = self
                    .updated
                    .wait_timeout(state, poll)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }

        debug!("drain loop stopped");
    }

    /// Timestamps of the pending epochs, oldest first
    pub fn pending_epochs(&self) -> Vec<Epoch> {
        self.state().assembler.pending().collect()
    }

    /// Reference time of the most recent clock correction
    pub fn last_clock_update(&self) -> Option<Epoch> {
        self.state().corrections.last_clock_update()
    }

    /// Lag between the most recent pending epoch and the most recent
    /// clock correction.
    pub fn correction_lag(&self) -> Option<Duration> {
        let state = self.state();
        let last = state.corrections.last_clock_update()?;
        let newest = state.assembler.pending().last()?;
        Some(newest - last)
    }

    /// Current broadcast [Ephemeris] of this satellite
    pub fn ephemeris(&self, sv: SV) -> Option<Ephemeris> {
        self.state().ephemerides.current(sv).copied()
    }

    /// Latest orbit correction IOD of this satellite
    pub fn orbit_iod(&self, sv: SV) -> Option<u16> {
        self.state().corrections.orbit_iod(sv)
    }
}

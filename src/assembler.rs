//! Observation to epoch grouping
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};

use crate::prelude::{Config, Epoch, LatePolicy, Observation, SV};

/// All [Observation]s sharing one sampling instant
#[derive(Debug, Clone, PartialEq)]
pub struct EpochData {
    /// Sampling [Epoch]
    pub t: Epoch,
    /// One [Observation] per [SV]
    pub observations: HashMap<SV, Observation>,
}

impl EpochData {
    fn new(t: Epoch) -> Self {
        Self {
            t,
            observations: HashMap::with_capacity(32),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observation(&self, sv: SV) -> Option<&Observation> {
        self.observations.get(&sv)
    }
}

/// What became of an ingested [Observation]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingestion {
    /// Added to an existing epoch
    Merged,
    /// Opened a new epoch
    Opened,
    /// Too late: not stored
    Dropped,
}

/// Queue of open epochs, oldest first.
#[derive(Debug, Clone)]
pub struct EpochAssembler {
    queue: VecDeque<EpochData>,
    policy: LatePolicy,
    max_pending: Option<usize>,
    /// Most recent epoch that left the queue (released or discarded)
    last_passed: Option<Epoch>,
}

impl EpochAssembler {
    pub fn new(cfg: &Config) -> Self {
        Self {
            queue: VecDeque::with_capacity(16),
            policy: cfg.late_policy,
            max_pending: cfg.max_pending_epochs,
            last_passed: None,
        }
    }

    fn has_passed(&self, t: Epoch) -> bool {
        match self.last_passed {
            Some(last) => t <= last,
            None => false,
        }
    }

    /// Groups this [Observation] with the open epoch of same timestamp,
    /// or opens a new one.
    pub fn ingest(&mut self, observation: Observation) -> Ingestion {
        let t = observation.t;

        if let Some(epoch) = self.queue.iter_mut().find(|epoch| epoch.t == t) {
            epoch.observations.insert(observation.sv, observation);
            return Ingestion::Merged;
        }

        if self.has_passed(t) {
            warn!("{}({}) - epoch already released: dropped", t, observation.sv);
            return Ingestion::Dropped;
        }

        let is_newest = match self.queue.back() {
            Some(tail) => t > tail.t,
            None => true,
        };

        if is_newest {
            let mut epoch = EpochData::new(t);
            epoch.observations.insert(observation.sv, observation);
            self.queue.push_back(epoch);
        } else {
            match self.policy {
                LatePolicy::Drop => {
                    warn!("{}({}) - out of order observation: dropped", t, observation.sv);
                    return Ingestion::Dropped;
                },
                LatePolicy::Insert => {
                    let pos = self
                        .queue
                        .iter()
                        .position(|epoch| epoch.t > t)
                        .unwrap_or(self.queue.len());
                    debug!("{}({}) - late observation: new epoch #{}", t, observation.sv, pos);
                    let mut epoch = EpochData::new(t);
                    epoch.observations.insert(observation.sv, observation);
                    self.queue.insert(pos, epoch);
                },
            }
        }

        if self.enforce_capacity(t) {
            return Ingestion::Dropped;
        }
        Ingestion::Opened
    }

    /// Discards the oldest epochs past capacity. Returns true when the
    /// epoch sampled at t was one of them.
    fn enforce_capacity(&mut self, t: Epoch) -> bool {
        let max = match self.max_pending {
            Some(max) => max,
            None => return false,
        };
        let mut discarded = false;
        while self.queue.len() > max {
            if let Some(epoch) = self.queue.pop_front() {
                warn!(
                    "{} - pending queue full: discarding epoch ({} sv)",
                    epoch.t,
                    epoch.len()
                );
                discarded |= epoch.t == t;
                self.last_passed = Some(epoch.t);
            }
        }
        discarded
    }

    /// Oldest pending epoch
    pub fn head(&self) -> Option<&EpochData> {
        self.queue.front()
    }

    /// Releases the oldest pending epoch
    pub fn pop(&mut self) -> Option<EpochData> {
        let epoch = self.queue.pop_front()?;
        self.last_passed = Some(epoch.t);
        Some(epoch)
    }

    /// Timestamps of the pending epochs, oldest first
    pub fn pending(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.queue.iter().map(|epoch| epoch.t)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

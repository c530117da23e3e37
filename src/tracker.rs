use log::debug;
use std::collections::HashMap;

use crate::prelude::{Carrier, Observation, SV};

/// Loss of lock detector. Tracks the receiver slip counter of each
/// (SV, frequency) and sets the LLI flag whenever it changes.
#[derive(Debug, Clone, Default)]
pub struct SlipTracker {
    inner: HashMap<(SV, Carrier), u32>,
}

impl SlipTracker {
    pub fn new() -> Self {
        Self {
            inner: HashMap::with_capacity(64),
        }
    }

    /// Annotates this [Observation]. Only signals with a valid phase
    /// are tracked. Returns the number of slips detected.
    pub fn annotate(&mut self, observation: &mut Observation) -> usize {
        let mut slips = 0;
        for signal in observation.signals.iter_mut() {
            if signal.phase_cycles.is_none() {
                continue;
            }
            let key = (observation.sv, signal.carrier);
            if let Some(prev) = self.inner.insert(key, signal.slip_count) {
                if prev != signal.slip_count {
                    debug!(
                        "{}({}) - {} slip counter {} -> {}",
                        observation.t, observation.sv, signal.carrier, prev, signal.slip_count
                    );
                    signal.lli = true;
                    slips += 1;
                }
            }
        }
        slips
    }

    /// Last slip counter for this (SV, frequency)
    pub fn counter(&self, sv: SV, carrier: Carrier) -> Option<u32> {
        self.inner.get(&(sv, carrier)).copied()
    }

    /// Forgets all tracking states
    pub fn reset(&mut self) {
        self.inner.clear();
    }
}

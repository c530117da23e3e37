//! Satellite observations
use crate::prelude::{Carrier, Epoch, SV};

/// Measurements on one frequency. Each measurement is individually valid
/// (Some) or invalid (None).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalObservation {
    /// [Carrier] frequency.
    pub carrier: Carrier,
    /// Code (pseudo range) observation, expressed in meters.
    pub code_m: Option<f64>,
    /// Carrier phase observation, expressed in cycles.
    pub phase_cycles: Option<f64>,
    /// Doppler shift (in Hz).
    pub doppler_hz: Option<f64>,
    /// Signal to noise ratio (in dB/Hz).
    pub snr_dbhz: Option<f64>,
    /// Receiver slip counter. Any change from one epoch to the next
    /// means the phase tracking loop lost lock in between.
    pub slip_count: u32,
    /// Loss of lock indicator, set by the
    /// [SlipTracker](crate::prelude::SlipTracker).
    pub lli: bool,
}

impl SignalObservation {
    /// Creates new code [SignalObservation] (in meters).
    pub fn code(carrier: Carrier, code_m: f64) -> Self {
        Self {
            carrier,
            code_m: Some(code_m),
            ..Default::default()
        }
    }

    /// Creates new phase [SignalObservation] (in cycles), with the
    /// receiver slip counter.
    pub fn phase(carrier: Carrier, phase_cycles: f64, slip_count: u32) -> Self {
        Self {
            carrier,
            slip_count,
            phase_cycles: Some(phase_cycles),
            ..Default::default()
        }
    }

    /// Copies and returns [SignalObservation] with code observation (in meters).
    pub fn with_code_m(&self, code_m: f64) -> Self {
        let mut s = self.clone();
        s.code_m = Some(code_m);
        s
    }

    /// Copies and returns [SignalObservation] with phase observation (in cycles).
    pub fn with_phase_cycles(&self, phase_cycles: f64) -> Self {
        let mut s = self.clone();
        s.phase_cycles = Some(phase_cycles);
        s
    }

    /// Copies and returns [SignalObservation] with doppler shift (in Hz).
    pub fn with_doppler_hz(&self, doppler_hz: f64) -> Self {
        let mut s = self.clone();
        s.doppler_hz = Some(doppler_hz);
        s
    }

    /// Copies and returns [SignalObservation] with SNR (in dB/Hz).
    pub fn with_snr_dbhz(&self, snr_dbhz: f64) -> Self {
        let mut s = self.clone();
        s.snr_dbhz = Some(snr_dbhz);
        s
    }

    /// Copies and returns [SignalObservation] with updated slip counter.
    pub fn with_slip_count(&self, slip_count: u32) -> Self {
        let mut s = self.clone();
        s.slip_count = slip_count;
        s
    }

    /// Phase range (in meters), using the nominal wavelength
    pub fn phase_range_m(&self) -> Option<f64> {
        let cycles = self.phase_cycles?;
        Some(cycles * self.carrier.wavelength())
    }
}

/// All measurements of one satellite at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// [SV]
    pub sv: SV,
    /// Sampling [Epoch], in GPST
    pub t: Epoch,
    /// Per frequency [SignalObservation]s, at most one per [Carrier]
    pub signals: Vec<SignalObservation>,
}

impl Observation {
    /// Creates a new [Observation] for this [SV] at sampling [Epoch].
    pub fn new(sv: SV, t: Epoch, signals: Vec<SignalObservation>) -> Self {
        Self { sv, t, signals }
    }

    /// [SignalObservation] on this [Carrier], if any
    pub fn signal(&self, carrier: Carrier) -> Option<&SignalObservation> {
        self.signals.iter().find(|sig| sig.carrier == carrier)
    }

    /// Mutable access to the [SignalObservation] on this [Carrier].
    /// A blank one is appended when none exists yet.
    pub fn signal_mut(&mut self, carrier: Carrier) -> &mut SignalObservation {
        let pos = match self.signals.iter().position(|sig| sig.carrier == carrier) {
            Some(pos) => pos,
            None => {
                self.signals.push(SignalObservation {
                    carrier,
                    ..Default::default()
                });
                self.signals.len() - 1
            },
        };
        &mut self.signals[pos]
    }

    /// True if at least one frequency carries a loss of lock indication
    pub fn has_slip(&self) -> bool {
        self.signals.iter().any(|sig| sig.lli)
    }

    /// True if no measurement is valid on any frequency
    pub fn is_empty(&self) -> bool {
        self.signals.iter().all(|sig| {
            sig.code_m.is_none()
                && sig.phase_cycles.is_none()
                && sig.doppler_hz.is_none()
                && sig.snr_dbhz.is_none()
        })
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.t, self.sv)?;
        for sig in self.signals.iter() {
            write!(f, " {}", sig.carrier)?;
            if let Some(code) = sig.code_m {
                write!(f, " c={:.3}", code)?;
            }
            if let Some(phase) = sig.phase_cycles {
                write!(f, " l={:.3}", phase)?;
            }
            if sig.lli {
                write!(f, " (lli)")?;
            }
        }
        Ok(())
    }
}

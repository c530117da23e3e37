//! Signal oriented observation messages
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use itertools::Itertools;
use log::{debug, warn};

use crate::{
    decoder::constellation_from_wire,
    prelude::{gpst, Carrier, Epoch, Observation, SignalObservation, SV},
};

/// `week:u16 | tow_ms:u32 | num_sig:u8 | reserved:u8`
const EPOCH_HEADER_SIZE: usize = 8;

/// `sys prn carrier flags slip snr reserved:u16 | code:f64 phase:f64 doppler:f32 reserved:u32`
pub(crate) const RAW_RECORD_SIZE: usize = 32;

/// `sys prn carrier flags slip snr | code:u32 phase:i64 doppler:i32`
pub(crate) const COMPACT_RECORD_SIZE: usize = 22;

const CODE_VALID: u8 = 0x01;
const PHASE_VALID: u8 = 0x02;
const DOPPLER_VALID: u8 = 0x04;
const SNR_VALID: u8 = 0x08;

/// 0.02 m
const COMPACT_CODE_SCALING: f64 = 0.02;

/// 1/1024 cycle
const COMPACT_PHASE_SCALING: f64 = 1.0 / 1024.0;

/// mHz
const COMPACT_DOPPLER_SCALING: f64 = 1.0E-3;

/// 0.25 dB/Hz (both formats)
const SNR_SCALING: f64 = 0.25;

/// Measurements of one record, before scaling
struct Measurements {
    code: f64,
    phase: f64,
    doppler: f64,
}

fn epoch_header<B: ByteOrder>(name: &str, body: &[u8], record_size: usize) -> Option<(Epoch, usize)> {
    if body.len() < EPOCH_HEADER_SIZE {
        warn!("{} - truncated observation message ({} bytes)", name, body.len());
        return None;
    }

    let week = B::read_u16(&body[0..2]);
    let tow_ms = B::read_u32(&body[2..6]);
    let num_sig = body[6] as usize;

    let available = (body.len() - EPOCH_HEADER_SIZE) / record_size;
    if available < num_sig {
        warn!("{} - {} signals announced, only {} present", name, num_sig, available);
    }

    Some((
        gpst(week as u32, tow_ms as f64 * 1.0E-3),
        num_sig.min(available),
    ))
}

fn signal_record(
    name: &str,
    rec: &[u8],
    measurements: Measurements,
) -> Option<(SV, SignalObservation)> {
    let constellation = match constellation_from_wire(rec[0]) {
        Some(constellation) => constellation,
        None => {
            debug!("{} - unknown system {:#04x}", name, rec[0]);
            return None;
        },
    };
    let carrier = match Carrier::from_wire(rec[2]) {
        Some(carrier) => carrier,
        None => {
            debug!("{} - unknown carrier code {}", name, rec[2]);
            return None;
        },
    };

    let flags = rec[3];
    let flagged = |mask: u8, value: f64| {
        if flags & mask > 0 && value.is_finite() {
            Some(value)
        } else {
            None
        }
    };

    Some((
        SV::new(constellation, rec[1]),
        SignalObservation {
            carrier,
            code_m: flagged(CODE_VALID, measurements.code),
            phase_cycles: flagged(PHASE_VALID, measurements.phase),
            doppler_hz: flagged(DOPPLER_VALID, measurements.doppler),
            snr_dbhz: flagged(SNR_VALID, rec[5] as f64 * SNR_SCALING),
            slip_count: rec[4] as u32,
            lli: false,
        },
    ))
}

/// Gathers signal records per satellite, sorted by [SV].
fn gather(t: Epoch, signals: Vec<(SV, SignalObservation)>) -> Vec<Observation> {
    let mut observations = Vec::new();
    for (sv, chunk) in &signals
        .into_iter()
        .sorted_by_key(|(sv, _)| *sv)
        .chunk_by(|(sv, _)| *sv)
    {
        observations.push(Observation::new(sv, t, chunk.map(|(_, sig)| sig).collect()));
    }
    observations
}

pub(crate) fn decode_raw(body: &[u8]) -> Vec<Observation> {
    let (t, num_sig) = match epoch_header::<LittleEndian>("RAW", body, RAW_RECORD_SIZE) {
        Some(header) => header,
        None => return Vec::new(),
    };

    let signals = body[EPOCH_HEADER_SIZE..]
        .chunks_exact(RAW_RECORD_SIZE)
        .take(num_sig)
        .filter_map(|rec| {
            let measurements = Measurements {
                code: LittleEndian::read_f64(&rec[8..16]),
                phase: LittleEndian::read_f64(&rec[16..24]),
                doppler: LittleEndian::read_f32(&rec[24..28]) as f64,
            };
            signal_record("RAW", rec, measurements)
        })
        .collect();

    gather(t, signals)
}

pub(crate) fn decode_compact(body: &[u8]) -> Vec<Observation> {
    let (t, num_sig) = match epoch_header::<BigEndian>("COMPACT", body, COMPACT_RECORD_SIZE) {
        Some(header) => header,
        None => return Vec::new(),
    };

    let signals = body[EPOCH_HEADER_SIZE..]
        .chunks_exact(COMPACT_RECORD_SIZE)
        .take(num_sig)
        .filter_map(|rec| {
            let measurements = Measurements {
                code: BigEndian::read_u32(&rec[6..10]) as f64 * COMPACT_CODE_SCALING,
                phase: BigEndian::read_i64(&rec[10..18]) as f64 * COMPACT_PHASE_SCALING,
                doppler: BigEndian::read_i32(&rec[18..22]) as f64 * COMPACT_DOPPLER_SCALING,
            };
            signal_record("COMPACT", rec, measurements)
        })
        .collect();

    gather(t, signals)
}

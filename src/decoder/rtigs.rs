//! RTIGS like observation message
use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::{
    decoder::constellation_from_wire,
    prelude::{gpst_from_seconds, Carrier, Observation, SignalObservation, SV},
};

/// `gps_time:u32 | num_sat:u8 | reserved:u8`
const EPOCH_HEADER_SIZE: usize = 6;

/// `sys prn flags slip_l1 slip_l2 snr_l1 snr_l2 reserved | c1 p2 l1 l2 (f64)`
pub(crate) const RECORD_SIZE: usize = 40;

const C1_VALID: u8 = 0x01;
const P2_VALID: u8 = 0x02;
const L1_VALID: u8 = 0x04;
const L2_VALID: u8 = 0x08;

pub(crate) fn decode(body: &[u8]) -> Vec<Observation> {
    if body.len() < EPOCH_HEADER_SIZE {
        warn!("RTIGS - truncated observation message ({} bytes)", body.len());
        return Vec::new();
    }

    let gps_time = BigEndian::read_u32(&body[0..4]);
    let num_sat = body[4] as usize;
    let t = gpst_from_seconds(gps_time as u64);

    let available = (body.len() - EPOCH_HEADER_SIZE) / RECORD_SIZE;
    if available < num_sat {
        warn!(
            "RTIGS - {} satellites announced, only {} present",
            num_sat, available
        );
    }

    body[EPOCH_HEADER_SIZE..]
        .chunks_exact(RECORD_SIZE)
        .take(num_sat)
        .filter_map(|rec| {
            let constellation = match constellation_from_wire(rec[0]) {
                Some(constellation) => constellation,
                None => {
                    debug!("RTIGS - unknown system {:#04x}", rec[0]);
                    return None;
                },
            };

            let sv = SV::new(constellation, rec[1]);
            let flags = rec[2];

            let c1 = BigEndian::read_f64(&rec[8..16]);
            let p2 = BigEndian::read_f64(&rec[16..24]);
            let l1 = BigEndian::read_f64(&rec[24..32]);
            let l2 = BigEndian::read_f64(&rec[32..40]);

            let mut signals = Vec::with_capacity(2);

            for (carrier, code, code_mask, phase, phase_mask, slip, snr) in [
                (Carrier::L1, c1, C1_VALID, l1, L1_VALID, rec[3], rec[5]),
                (Carrier::L2, p2, P2_VALID, l2, L2_VALID, rec[4], rec[6]),
            ] {
                let signal = SignalObservation {
                    carrier,
                    code_m: valid(flags & code_mask > 0, code),
                    phase_cycles: valid(flags & phase_mask > 0, phase),
                    doppler_hz: None,
                    snr_dbhz: if snr > 0 { Some(snr as f64) } else { None },
                    slip_count: slip as u32,
                    lli: false,
                };
                if signal.code_m.is_some() || signal.phase_cycles.is_some() {
                    signals.push(signal);
                }
            }

            Some(Observation::new(sv, t, signals))
        })
        .collect()
}

/// Zero or non finite values are invalid whatever the flags say
fn valid(flagged: bool, value: f64) -> Option<f64> {
    if flagged && value.is_finite() && value != 0.0 {
        Some(value)
    } else {
        None
    }
}

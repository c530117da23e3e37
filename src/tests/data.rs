//! Wire frame and record builders
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::str::FromStr;

use crate::prelude::{gpst, Carrier, Epoch, Format, Observation, SignalObservation, SV};

/// GPS week used throughout the tests
pub const WEEK: u32 = 2_300;

pub fn sv(desc: &str) -> SV {
    SV::from_str(desc).unwrap_or_else(|_| panic!("bad sv description \"{}\"", desc))
}

/// Test epoch at this second of [WEEK]
pub fn t(sow: f64) -> Epoch {
    gpst(WEEK, sow)
}

/// Dual frequency satellite record of the RTIGS format
#[derive(Debug, Clone, Copy, Default)]
pub struct RtigsSat {
    pub sys: u8,
    pub prn: u8,
    pub slip: (u8, u8),
    pub snr: (u8, u8),
    pub c1: Option<f64>,
    pub p2: Option<f64>,
    pub l1: Option<f64>,
    pub l2: Option<f64>,
}

impl RtigsSat {
    pub fn gps(prn: u8, c1: f64, l1: f64) -> Self {
        Self {
            prn,
            sys: b'G',
            c1: Some(c1),
            l1: Some(l1),
            snr: (45, 0),
            ..Default::default()
        }
    }
}

/// One signal record of the signal oriented formats
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalRecord {
    pub sys: u8,
    pub prn: u8,
    pub carrier: Carrier,
    pub slip: u8,
    /// Raw SNR, 0.25 dB/Hz units
    pub snr: Option<u8>,
    pub code: Option<f64>,
    pub phase: Option<f64>,
    pub doppler: Option<f64>,
}

impl SignalRecord {
    pub fn new(sys: u8, prn: u8, carrier: Carrier, code: f64, phase: f64) -> Self {
        Self {
            sys,
            prn,
            carrier,
            code: Some(code),
            phase: Some(phase),
            ..Default::default()
        }
    }

    pub fn with_doppler(&self, doppler: f64) -> Self {
        let mut s = *self;
        s.doppler = Some(doppler);
        s
    }

    pub fn with_snr(&self, snr: u8) -> Self {
        let mut s = *self;
        s.snr = Some(snr);
        s
    }

    pub fn with_slip(&self, slip: u8) -> Self {
        let mut s = *self;
        s.slip = slip;
        s
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.code.is_some() {
            flags |= 0x01;
        }
        if self.phase.is_some() {
            flags |= 0x02;
        }
        if self.doppler.is_some() {
            flags |= 0x04;
        }
        if self.snr.is_some() {
            flags |= 0x08;
        }
        flags
    }
}

fn frame_header<B: ByteOrder>(format: Format, msg_type: u16, station: u16, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(8 + body.len());
    frame.write_u16::<B>(format.sync()).unwrap();
    frame.write_u16::<B>(msg_type).unwrap();
    frame.write_u16::<B>((8 + body.len()) as u16).unwrap();
    frame.write_u16::<B>(station).unwrap();
    frame.extend_from_slice(body);
    frame
}

/// Builds a complete frame, of any message type, around this body
pub fn frame(format: Format, msg_type: u16, station: u16, body: &[u8]) -> Vec<u8> {
    match format {
        Format::Raw => frame_header::<LittleEndian>(format, msg_type, station, body),
        Format::Rtigs | Format::Compact => {
            frame_header::<BigEndian>(format, msg_type, station, body)
        },
    }
}

pub fn rtigs_frame(station: u16, gps_time: u32, sats: &[RtigsSat]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u32::<BigEndian>(gps_time).unwrap();
    body.push(sats.len() as u8);
    body.push(0);

    for sat in sats {
        let mut flags = 0;
        for (mask, value) in [(0x01, sat.c1), (0x02, sat.p2), (0x04, sat.l1), (0x08, sat.l2)] {
            if value.is_some() {
                flags |= mask;
            }
        }
        body.extend_from_slice(&[
            sat.sys, sat.prn, flags, sat.slip.0, sat.slip.1, sat.snr.0, sat.snr.1, 0,
        ]);
        for value in [sat.c1, sat.p2, sat.l1, sat.l2] {
            body.write_f64::<BigEndian>(value.unwrap_or(0.0)).unwrap();
        }
    }

    frame(Format::Rtigs, 200, station, &body)
}

pub fn raw_frame(station: u16, week: u16, tow_ms: u32, records: &[SignalRecord]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u16::<LittleEndian>(week).unwrap();
    body.write_u32::<LittleEndian>(tow_ms).unwrap();
    body.push(records.len() as u8);
    body.push(0);

    for rec in records {
        body.extend_from_slice(&[
            rec.sys,
            rec.prn,
            rec.carrier.to_wire(),
            rec.flags(),
            rec.slip,
            rec.snr.unwrap_or(0),
        ]);
        body.write_u16::<LittleEndian>(0).unwrap();
        body.write_f64::<LittleEndian>(rec.code.unwrap_or(0.0)).unwrap();
        body.write_f64::<LittleEndian>(rec.phase.unwrap_or(0.0)).unwrap();
        body.write_f32::<LittleEndian>(rec.doppler.unwrap_or(0.0) as f32)
            .unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();
    }

    frame(Format::Raw, 0x0101, station, &body)
}

pub fn compact_frame(station: u16, week: u16, tow_ms: u32, records: &[SignalRecord]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u16::<BigEndian>(week).unwrap();
    body.write_u32::<BigEndian>(tow_ms).unwrap();
    body.push(records.len() as u8);
    body.push(0);

    for rec in records {
        body.extend_from_slice(&[
            rec.sys,
            rec.prn,
            rec.carrier.to_wire(),
            rec.flags(),
            rec.slip,
            rec.snr.unwrap_or(0),
        ]);
        body.write_u32::<BigEndian>((rec.code.unwrap_or(0.0) / 0.02).round() as u32)
            .unwrap();
        body.write_i64::<BigEndian>((rec.phase.unwrap_or(0.0) * 1024.0).round() as i64)
            .unwrap();
        body.write_i32::<BigEndian>((rec.doppler.unwrap_or(0.0) * 1.0E3).round() as i32)
            .unwrap();
    }

    frame(Format::Compact, 0x0011, station, &body)
}

/// Observation frame of this format at second of [WEEK], one record
/// per (prn, carrier)
pub fn observation_frame(format: Format, sow: u32, prns: &[u8]) -> Vec<u8> {
    match format {
        Format::Rtigs => {
            let sats = prns
                .iter()
                .map(|prn| {
                    let mut sat = RtigsSat::gps(*prn, 20_000_000.0 + *prn as f64, 1.0E8);
                    sat.p2 = Some(20_000_010.0 + *prn as f64);
                    sat.l2 = Some(0.8E8);
                    sat
                })
                .collect::<Vec<_>>();
            let gps_time = WEEK * 604_800 + sow;
            rtigs_frame(1, gps_time, &sats)
        },
        Format::Raw | Format::Compact => {
            let records = prns
                .iter()
                .flat_map(|prn| {
                    [
                        SignalRecord::new(b'G', *prn, Carrier::L1, 20_000_000.0, 1.0E8)
                            .with_snr(180),
                        SignalRecord::new(b'E', *prn, Carrier::L5, 21_000_000.0, 0.9E8)
                            .with_snr(160),
                    ]
                })
                .collect::<Vec<_>>();
            if format == Format::Raw {
                raw_frame(1, WEEK as u16, sow * 1000, &records)
            } else {
                compact_frame(1, WEEK as u16, sow * 1000, &records)
            }
        },
    }
}

/// L1 phase observation with this receiver slip counter
pub fn phase_observation(sv: SV, t: Epoch, slip_count: u32) -> Observation {
    Observation::new(
        sv,
        t,
        vec![SignalObservation::phase(Carrier::L1, 1.0E8, slip_count).with_code_m(2.0E7)],
    )
}

pub fn orbit_line(sow: f64, sv: &str, iod: u16, radial: f64, mount: &str) -> String {
    let code = if sv.starts_with('R') { 4021 } else { 4001 };
    format!(
        "{} 5 {} {:.1} {} {} {} 0.2 0.3 0.0 0.0 0.0 {}",
        code, WEEK, sow, sv, iod, radial, mount
    )
}

pub fn clock_line(sow: f64, sv: &str, c0: f64, mount: &str) -> String {
    let code = if sv.starts_with('R') { 4022 } else { 4002 };
    format!("{} 5 {} {:.1} {} {} 0.001 0.0 {}", code, WEEK, sow, sv, c0, mount)
}

pub fn combined_line(sow: f64, sv: &str, iod: u16, c0: f64, mount: &str) -> String {
    let code = if sv.starts_with('R') { 4024 } else { 4004 };
    format!(
        "{} 5 {} {:.1} {} {} {} 0.5 0.1 0.2 0.01 0.0 0.0 0.0 0.0 {}",
        code, WEEK, sow, sv, iod, c0, mount
    )
}

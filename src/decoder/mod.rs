//! Resynchronizing binary frame decoder
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, info};

use crate::prelude::{Constellation, Observation};

mod rtigs;
mod signal;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Every format starts with
/// `sync:u16 | msg_type:u16 | length:u16 | station:u16`,
/// `length` counting the whole frame from the first sync byte.
pub(crate) const HEADER_SIZE: usize = 8;

/// Stream wire format, selected once per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum Format {
    /// RTIGS like, big endian, satellite oriented dual frequency records.
    Rtigs,
    /// Little endian, one raw (IEEE754) record per tracked signal.
    Raw,
    /// Big endian, one scaled integer record per tracked signal.
    Compact,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Rtigs => write!(f, "RTIGS"),
            Self::Raw => write!(f, "RAW"),
            Self::Compact => write!(f, "COMPACT"),
        }
    }
}

/// Output of one decoding pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// Decoded [Observation]s, in stream order
    pub records: Vec<Observation>,
    /// Number of bytes removed from the buffer (garbage included)
    pub consumed: usize,
    /// Number of complete frames consumed
    pub frames: usize,
    /// Station identifiers of the observation frames, in order of appearance
    pub stations: Vec<u16>,
}

impl Format {
    /// Sync marker value
    pub fn sync(&self) -> u16 {
        match self {
            Self::Rtigs => 200,
            Self::Raw => 0xA55A,
            Self::Compact => 0x4E43,
        }
    }

    /// Message type carrying observations
    pub fn observation_message(&self) -> u16 {
        match self {
            Self::Rtigs => 200,
            Self::Raw => 0x0101,
            Self::Compact => 0x0011,
        }
    }

    pub(crate) fn read_u16(&self, buf: &[u8]) -> u16 {
        match self {
            Self::Rtigs | Self::Compact => BigEndian::read_u16(buf),
            Self::Raw => LittleEndian::read_u16(buf),
        }
    }

    /// Sync marker, as it appears on the wire
    pub(crate) fn sync_bytes(&self) -> [u8; 2] {
        let mut bytes = [0u8; 2];
        match self {
            Self::Rtigs | Self::Compact => BigEndian::write_u16(&mut bytes, self.sync()),
            Self::Raw => LittleEndian::write_u16(&mut bytes, self.sync()),
        }
        bytes
    }

    fn find_sync(&self, buffer: &[u8]) -> Option<usize> {
        let sync = self.sync_bytes();
        buffer.windows(2).position(|w| w == sync)
    }

    fn decode_body(&self, body: &[u8]) -> Vec<Observation> {
        match self {
            Self::Rtigs => rtigs::decode(body),
            Self::Raw => signal::decode_raw(body),
            Self::Compact => signal::decode_compact(body),
        }
    }

    /// Decodes all complete frames at the start of this buffer.
    /// Consumed bytes (frames and garbage) are removed from the buffer,
    /// incomplete trailing frames are left untouched.
    pub fn decode(&self, buffer: &mut Vec<u8>) -> Decoded {
        let mut decoded = Decoded::default();

        while !buffer.is_empty() {
            let offset = match self.find_sync(buffer) {
                Some(offset) => offset,
                None => {
                    // a sync marker may be split across two reads
                    let keep = buffer.last() == Some(&self.sync_bytes()[0]);
                    let discarded = if keep {
                        buffer.len() - 1
                    } else {
                        buffer.len()
                    };
                    if discarded > 0 {
                        info!("{} - message not found ({} bytes discarded)", self, discarded);
                        buffer.drain(..discarded);
                        decoded.consumed += discarded;
                    }
                    break;
                },
            };

            if offset > 0 {
                debug!("{} - resync: skipping {} bytes", self, offset);
                buffer.drain(..offset);
                decoded.consumed += offset;
            }

            if buffer.len() < HEADER_SIZE {
                break;
            }

            let msg_type = self.read_u16(&buffer[2..4]);
            let length = self.read_u16(&buffer[4..6]) as usize;

            if length < HEADER_SIZE {
                debug!("{} - spurious sync (declared length {})", self, length);
                buffer.drain(..1);
                decoded.consumed += 1;
                continue;
            }

            if buffer.len() < length {
                // wait for more data
                break;
            }

            if msg_type == self.observation_message() {
                let station = self.read_u16(&buffer[6..8]);
                let records = self.decode_body(&buffer[HEADER_SIZE..length]);
                debug!(
                    "{} - station #{}: {} observations",
                    self,
                    station,
                    records.len()
                );
                decoded.records.extend(records);
                if !decoded.stations.contains(&station) {
                    decoded.stations.push(station);
                }
            } else {
                debug!("{} - ignored message type {}", self, msg_type);
            }

            buffer.drain(..length);
            decoded.consumed += length;
            decoded.frames += 1;
        }

        decoded
    }
}

/// Constellation letter as used by all wire formats
pub(crate) fn constellation_from_wire(sys: u8) -> Option<Constellation> {
    match sys {
        b'G' => Some(Constellation::GPS),
        b'R' => Some(Constellation::Glonass),
        b'E' => Some(Constellation::Galileo),
        b'C' => Some(Constellation::BeiDou),
        b'J' => Some(Constellation::QZSS),
        b'S' => Some(Constellation::SBAS),
        _ => None,
    }
}

/// Per stream decoder: [Format] and its pending byte buffer.
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    format: Format,
    buffer: Vec<u8>,
}

impl StreamDecoder {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            buffer: Vec::with_capacity(4096),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Appends newly received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Decodes what is currently buffered.
    pub fn decode(&mut self) -> Decoded {
        self.format.decode(&mut self.buffer)
    }

    /// Appends newly received bytes and decodes.
    pub fn feed(&mut self, bytes: &[u8]) -> Decoded {
        self.push(bytes);
        self.decode()
    }

    /// Bytes awaiting completion.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops pending bytes, for example after the stream reconnected.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

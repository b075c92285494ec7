use std::num::NonZeroU32;

use super::AccessUnit;
use super::au_header::{self, HEADERS_LEN_SIZE};
use super::rtp::{RTP_HEADER_LEN, RtpPacket};
use crate::clock::{self, TickTracker};
use crate::error::{AacError, Result};

/// Tick spacing assigned between consecutive AUs of one packet.
///
/// AU-index-delta does not carry enough information to place aggregated AUs
/// in time, so they are spread by this fixed step from the packet timestamp.
const AU_SPACING_TICKS: u64 = 1000;

/// mpeg4-generic (AAC-hbr) RTP depacketizer.
///
/// The first successfully decoded packet primes the decoder: its RTP
/// timestamp becomes the epoch and its first AU gets timestamp zero. Later
/// packets are placed relative to it through the wrapping RTP clock, so
/// lost packets never shift the timeline.
///
/// Payload type and SSRC are not checked; matching them to the negotiated
/// session is up to the caller. A failed call leaves the decoder untouched.
#[derive(Debug, Clone)]
pub struct Decoder {
    ticks: TickTracker,
    last_sequence: Option<u16>,
    lost_packets: u64,
}

impl Decoder {
    pub fn new(clock_rate: u32) -> Result<Self> {
        let rate = NonZeroU32::new(clock_rate)
            .ok_or_else(|| AacError::unsupported_config("clock rate must be non-zero"))?;
        tracing::debug!(clock_rate, "AAC decoder created");
        Ok(Self {
            ticks: TickTracker::new(rate),
            last_sequence: None,
            lost_packets: 0,
        })
    }

    /// Extract every access unit carried by `packet`, in payload order.
    pub fn decode(&mut self, packet: &[u8]) -> Result<Vec<AccessUnit>> {
        if packet.len() < RTP_HEADER_LEN + HEADERS_LEN_SIZE {
            return Err(AacError::PacketTooShort { len: packet.len() });
        }
        let pkt = RtpPacket::parse(packet)?;
        // a payload shrunk below the length field by CSRCs, extension or
        // padding is reported by read_section as MalformedHeaderTable
        let section = au_header::read_section(pkt.payload)?;

        let mut payloads = Vec::with_capacity(section.headers.len());
        let mut offset = section.data_offset;
        for (index, h) in section.headers.iter().enumerate() {
            let size = usize::from(h.size);
            let remaining = pkt.payload.len() - offset;
            if size > remaining {
                tracing::debug!(
                    seq = pkt.sequence,
                    index,
                    size,
                    remaining,
                    "AU exceeds packet"
                );
                return Err(AacError::TruncatedAccessUnit {
                    index,
                    size,
                    remaining,
                });
            }
            payloads.push(&pkt.payload[offset..offset + size]);
            offset += size;
        }
        if offset < pkt.payload.len() {
            tracing::trace!(
                seq = pkt.sequence,
                trailing = pkt.payload.len() - offset,
                "ignoring bytes after last AU"
            );
        }

        // Everything below mutates state; the packet is known good from here.
        self.track_sequence(pkt.sequence);
        if !self.ticks.is_primed() {
            tracing::debug!(
                seq = pkt.sequence,
                ts = pkt.timestamp,
                "AAC decoder primed"
            );
        }
        let base = self.ticks.observe(pkt.timestamp);

        let clock_rate = self.ticks.clock_rate();
        let aus: Vec<AccessUnit> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                let offset = clock::duration_from_ticks(i as u64 * AU_SPACING_TICKS, clock_rate);
                AccessUnit::new(payload, base + offset)
            })
            .collect();

        tracing::trace!(
            seq = pkt.sequence,
            ts = pkt.timestamp,
            au_count = aus.len(),
            "AAC packet decoded"
        );

        Ok(aus)
    }

    fn track_sequence(&mut self, sequence: u16) {
        let Some(last) = self.last_sequence else {
            self.last_sequence = Some(sequence);
            return;
        };
        let expected = last.wrapping_add(1);
        let gap = sequence.wrapping_sub(expected);
        if gap == 0 {
            self.last_sequence = Some(sequence);
        } else if gap < 0x8000 {
            self.lost_packets += u64::from(gap);
            tracing::warn!(expected, got = sequence, lost = gap, "RTP packets lost");
            self.last_sequence = Some(sequence);
        } else {
            tracing::debug!(expected, got = sequence, "late or duplicate RTP packet");
        }
    }

    /// Whether a packet has established the timestamp epoch.
    pub fn is_primed(&self) -> bool {
        self.ticks.is_primed()
    }

    pub fn clock_rate(&self) -> u32 {
        self.ticks.clock_rate().get()
    }

    /// Sequence number of the newest packet seen.
    pub fn last_sequence(&self) -> Option<u16> {
        self.last_sequence
    }

    /// Packets inferred lost from sequence number gaps.
    pub fn lost_packets(&self) -> u64 {
        self.lost_packets
    }
}

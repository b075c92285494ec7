use crate::error::{AacError, Result, RtpHeaderErrorKind};

/// Size of the RTP fixed header without CSRC entries or extension.
pub const RTP_HEADER_LEN: usize = 12;

const RTP_VERSION: u8 = 2;

/// Generic RTP fixed header builder (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Owns the sender-side sequence counter: 16-bit, wrapping, incremented on
/// every written header. Timestamps are supplied per packet because they are
/// derived from each access unit's presentation offset.
///
/// Version is always 2. Padding, extension, and CSRC count are always 0.
#[derive(Debug)]
pub struct RtpHeader {
    /// RTP payload type (7-bit, RFC 3551).
    pub pt: u8,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
    sequence: u16,
}

impl RtpHeader {
    pub fn new(pt: u8, ssrc: u32, sequence: u16) -> Self {
        tracing::debug!(
            pt,
            ssrc = format_args!("{:#010X}", ssrc),
            sequence,
            "RTP header state created"
        );
        Self { pt, ssrc, sequence }
    }

    /// Sequence number the next [`write`](Self::write) will use.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Serialize a 12-byte RTP fixed header and advance the sequence number.
    pub fn write(&mut self, marker: bool, timestamp: u32) -> [u8; RTP_HEADER_LEN] {
        let first_byte: u8 = RTP_VERSION << 6;
        let second_byte: u8 = ((marker as u8) << 7) | (self.pt & 0x7f);

        let mut header = [0u8; RTP_HEADER_LEN];
        header[0] = first_byte;
        header[1] = second_byte;
        header[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        header[4..8].copy_from_slice(&timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        self.sequence = self.sequence.wrapping_add(1);
        header
    }
}

/// A received RTP packet, borrowed from the datagram it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpPacket<'a> {
    pub marker: bool,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    /// Payload with CSRC list, header extension and padding removed.
    pub payload: &'a [u8],
}

impl<'a> RtpPacket<'a> {
    /// Parses the RTP header of `buf`.
    ///
    /// CSRC entries and a header extension (RFC 3550 §5.3.1) are skipped;
    /// trailing padding is stripped when the P bit is set.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < RTP_HEADER_LEN {
            return Err(AacError::PacketTooShort { len: buf.len() });
        }

        let version = buf[0] >> 6;
        if version != RTP_VERSION {
            return Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::UnsupportedVersion(version),
            });
        }
        let has_padding = buf[0] & 0x20 != 0;
        let has_extension = buf[0] & 0x10 != 0;
        let csrc_count = usize::from(buf[0] & 0x0f);

        let mut offset = RTP_HEADER_LEN + 4 * csrc_count;
        if buf.len() < offset {
            return Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::TruncatedCsrcList,
            });
        }

        if has_extension {
            let ext = buf.get(offset..offset + 4).ok_or(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::TruncatedExtension,
            })?;
            let words = usize::from(u16::from_be_bytes([ext[2], ext[3]]));
            offset += 4 + 4 * words;
            if buf.len() < offset {
                return Err(AacError::RtpHeader {
                    kind: RtpHeaderErrorKind::TruncatedExtension,
                });
            }
        }

        let mut end = buf.len();
        if has_padding {
            let pad = usize::from(buf[end - 1]);
            if pad == 0 || pad > end - offset {
                return Err(AacError::RtpHeader {
                    kind: RtpHeaderErrorKind::InvalidPadding,
                });
            }
            end -= pad;
        }

        Ok(Self {
            marker: buf[1] & 0x80 != 0,
            payload_type: buf[1] & 0x7f,
            sequence: u16::from_be_bytes([buf[2], buf[3]]),
            timestamp: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            ssrc: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            payload: &buf[offset..end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_header() -> RtpHeader {
        RtpHeader::new(96, 0xAABBCCDD, 0)
    }

    #[test]
    fn version_is_2() {
        let mut h = make_header();
        let buf = h.write(false, 0);
        assert_eq!(buf[0] >> 6, 2);
        assert_eq!(buf[0] & 0x3f, 0);
    }

    #[test]
    fn marker_bit() {
        let mut h = make_header();
        let no_marker = h.write(false, 0);
        assert_eq!(no_marker[1] & 0x80, 0);

        let with_marker = h.write(true, 0);
        assert_eq!(with_marker[1] & 0x80, 0x80);
        assert_eq!(with_marker[1] & 0x7f, 96);
    }

    #[test]
    fn sequence_wraps() {
        let mut h = RtpHeader::new(96, 0xAABBCCDD, u16::MAX);
        let buf = h.write(false, 0);
        let seq = u16::from_be_bytes([buf[2], buf[3]]);
        assert_eq!(seq, u16::MAX);
        assert_eq!(h.sequence(), 0);
    }

    #[test]
    fn fields_written() {
        let mut h = make_header();
        let buf = h.write(true, 0x01020304);
        assert_eq!(&buf[4..8], &[1, 2, 3, 4]);
        assert_eq!(&buf[8..12], &[0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn parse_reads_written_header() {
        let mut h = RtpHeader::new(97, 0x9dbb7812, 0x44ed);
        let mut buf = h.write(true, 0x88776655).to_vec();
        buf.extend_from_slice(&[0xde, 0xad]);

        let p = RtpPacket::parse(&buf).unwrap();
        assert!(p.marker);
        assert_eq!(p.payload_type, 97);
        assert_eq!(p.sequence, 0x44ed);
        assert_eq!(p.timestamp, 0x88776655);
        assert_eq!(p.ssrc, 0x9dbb7812);
        assert_eq!(p.payload, &[0xde, 0xad]);
    }

    #[test]
    fn parse_skips_csrc_and_extension() {
        let mut buf = vec![0x80 | 0x10 | 0x01, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1];
        buf.extend_from_slice(&[9, 9, 9, 9]); // one CSRC
        buf.extend_from_slice(&[0xbe, 0xde, 0x00, 0x01, 7, 7, 7, 7]); // one-word extension
        buf.extend_from_slice(&[0x42]);
        let p = RtpPacket::parse(&buf).unwrap();
        assert_eq!(p.payload, &[0x42]);
    }

    #[test]
    fn parse_strips_padding() {
        let mut buf = vec![0x80 | 0x20, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1];
        buf.extend_from_slice(&[0x42, 0x43, 0, 0, 3]);
        let p = RtpPacket::parse(&buf).unwrap();
        assert_eq!(p.payload, &[0x42, 0x43]);
    }

    #[test]
    fn parse_rejects_bad_headers() {
        assert_eq!(
            RtpPacket::parse(&[0x80; 11]),
            Err(AacError::PacketTooShort { len: 11 })
        );

        let v1 = [0x40, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(
            RtpPacket::parse(&v1),
            Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::UnsupportedVersion(1)
            })
        );

        let csrc = [0x82, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 9, 9, 9, 9];
        assert_eq!(
            RtpPacket::parse(&csrc),
            Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::TruncatedCsrcList
            })
        );

        let ext = [0x90, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0xbe, 0xde, 0, 2, 1, 2, 3, 4];
        assert_eq!(
            RtpPacket::parse(&ext),
            Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::TruncatedExtension
            })
        );

        let pad = [0xa0, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0x42, 5];
        assert_eq!(
            RtpPacket::parse(&pad),
            Err(AacError::RtpHeader {
                kind: RtpHeaderErrorKind::InvalidPadding
            })
        );
    }
}

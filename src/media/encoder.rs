use super::AccessUnit;
use super::au_header::{self, AuHeader, MAX_AU_HEADERS, MAX_AU_SIZE};
use super::rtp::{RTP_HEADER_LEN, RtpHeader};
use crate::clock;
use crate::error::{AacError, Result};

/// Session parameters for an [`Encoder`], normally taken from SDP/RTSP negotiation.
///
/// Fields left as `None` are chosen randomly at construction, as RFC 3550
/// §5.1 recommends for the initial sequence number and timestamp and §8.1
/// for the SSRC.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// RTP payload type. Dynamic types use 96–127.
    pub payload_type: u8,
    /// RTP clock rate in Hz, usually the audio sample rate.
    pub clock_rate: u32,
    pub initial_sequence: Option<u16>,
    pub ssrc: Option<u32>,
    /// RTP timestamp corresponding to a presentation offset of zero.
    pub initial_timestamp: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            payload_type: 96,
            clock_rate: 48_000,
            initial_sequence: None,
            ssrc: None,
            initial_timestamp: None,
        }
    }
}

/// mpeg4-generic (AAC-hbr) RTP packetizer.
///
/// Every call to [`encode`](Self::encode) or
/// [`encode_aggregated`](Self::encode_aggregated) emits exactly one packet
/// and advances the sequence number by one. The packet timestamp is the
/// initial timestamp plus the first AU's presentation offset in clock ticks.
///
/// A failed call leaves the sequence number untouched.
#[derive(Debug)]
pub struct Encoder {
    header: RtpHeader,
    clock_rate: u32,
    initial_timestamp: u32,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        if config.clock_rate == 0 {
            return Err(AacError::unsupported_config("clock rate must be non-zero"));
        }
        if config.payload_type > 0x7f {
            return Err(AacError::unsupported_config(format!(
                "payload type {} does not fit in 7 bits",
                config.payload_type
            )));
        }

        let sequence = config.initial_sequence.unwrap_or_else(rand::random);
        let ssrc = config.ssrc.unwrap_or_else(rand::random);
        let initial_timestamp = config.initial_timestamp.unwrap_or_else(rand::random);

        tracing::debug!(
            clock_rate = config.clock_rate,
            initial_timestamp = format_args!("{:#010X}", initial_timestamp),
            "AAC encoder created"
        );

        Ok(Self {
            header: RtpHeader::new(config.payload_type, ssrc, sequence),
            clock_rate: config.clock_rate,
            initial_timestamp,
        })
    }

    /// Create with random sequence number, SSRC and initial timestamp.
    pub fn with_random_params(payload_type: u8, clock_rate: u32) -> Result<Self> {
        Self::new(EncoderConfig {
            payload_type,
            clock_rate,
            ..EncoderConfig::default()
        })
    }

    /// Packetize a single access unit.
    pub fn encode(&mut self, au: &AccessUnit) -> Result<Vec<u8>> {
        self.encode_aggregated(std::slice::from_ref(au))
    }

    /// Packetize several access units into one packet.
    ///
    /// The AUs are taken to be consecutive: the first header carries AU-index 0
    /// and the others AU-index-delta 0. Only the first AU's timestamp is used.
    pub fn encode_aggregated(&mut self, aus: &[AccessUnit]) -> Result<Vec<u8>> {
        let first = match aus {
            [] => return Err(AacError::TooManyAccessUnits { count: 0 }),
            [first, ..] => first,
        };
        if aus.len() > MAX_AU_HEADERS {
            return Err(AacError::TooManyAccessUnits { count: aus.len() });
        }

        let mut headers = Vec::with_capacity(aus.len());
        let mut data_len = 0;
        for au in aus {
            let size = au.payload.len();
            if size == 0 {
                return Err(AacError::EmptyAccessUnit);
            }
            if size > MAX_AU_SIZE {
                return Err(AacError::AuTooLarge { size });
            }
            headers.push(AuHeader {
                size: size as u16,
                index: 0,
            });
            data_len += size;
        }

        let mut section = Vec::with_capacity(au_header::HEADERS_LEN_SIZE + 2 * headers.len());
        au_header::write_section(&headers, &mut section)?;

        let timestamp = clock::tick_at(self.initial_timestamp, first.timestamp, self.clock_rate);
        let sequence = self.header.sequence();

        let mut packet = Vec::with_capacity(RTP_HEADER_LEN + section.len() + data_len);
        packet.extend_from_slice(&self.header.write(true, timestamp));
        packet.extend_from_slice(&section);
        for au in aus {
            packet.extend_from_slice(&au.payload);
        }

        tracing::trace!(
            seq = sequence,
            ts = timestamp,
            au_count = aus.len(),
            packet_bytes = packet.len(),
            "AAC packet encoded"
        );

        Ok(packet)
    }

    /// Sequence number of the next packet.
    pub fn next_sequence(&self) -> u16 {
        self.header.sequence()
    }

    pub fn ssrc(&self) -> u32 {
        self.header.ssrc
    }

    pub fn payload_type(&self) -> u8 {
        self.header.pt
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// RTP timestamp of presentation offset zero.
    pub fn initial_timestamp(&self) -> u32 {
        self.initial_timestamp
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn make_encoder(sequence: u16) -> Encoder {
        Encoder::new(EncoderConfig {
            payload_type: 96,
            clock_rate: 48_000,
            initial_sequence: Some(sequence),
            ssrc: Some(0x9dbb7812),
            initial_timestamp: Some(0x88776655),
        })
        .unwrap()
    }

    fn seq_of(packet: &[u8]) -> u16 {
        u16::from_be_bytes([packet[2], packet[3]])
    }

    fn ts_of(packet: &[u8]) -> u32 {
        u32::from_be_bytes([packet[4], packet[5], packet[6], packet[7]])
    }

    #[test]
    fn single_au_layout() {
        let mut e = make_encoder(0x44ed);
        let au = AccessUnit::new(vec![0xAB; 347], Duration::from_millis(20));
        let packet = e.encode(&au).unwrap();

        assert_eq!(packet.len(), 12 + 2 + 2 + 347);
        assert_eq!(&packet[..4], &[0x80, 0xe0, 0x44, 0xed]);
        assert_eq!(ts_of(&packet), 0x88776655 + 960);
        assert_eq!(&packet[8..12], &[0x9d, 0xbb, 0x78, 0x12]);
        assert_eq!(&packet[12..16], &[0x00, 0x10, 0x0a, 0xd8]);
        assert!(packet[16..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn sequence_advances_once_per_packet() {
        let mut e = make_encoder(65534);
        let au = AccessUnit::new(vec![1, 2, 3], Duration::ZERO);
        assert_eq!(seq_of(&e.encode(&au).unwrap()), 65534);
        assert_eq!(seq_of(&e.encode(&au).unwrap()), 65535);
        assert_eq!(seq_of(&e.encode(&au).unwrap()), 0);

        let aus = vec![au.clone(), au.clone(), au];
        assert_eq!(seq_of(&e.encode_aggregated(&aus).unwrap()), 1);
        assert_eq!(e.next_sequence(), 2);
    }

    #[test]
    fn aggregated_layout() {
        let mut e = make_encoder(7);
        let aus = vec![
            AccessUnit::new(vec![0x11; 3], Duration::from_millis(40)),
            AccessUnit::new(vec![0x22; 1], Duration::from_millis(60)),
        ];
        let packet = e.encode_aggregated(&aus).unwrap();
        assert_eq!(ts_of(&packet), 0x88776655 + 1920);
        assert_eq!(&packet[12..18], &[0x00, 0x20, 0x00, 0x18, 0x00, 0x08]);
        assert_eq!(&packet[18..], &[0x11, 0x11, 0x11, 0x22]);
    }

    #[test]
    fn timestamp_wraps() {
        let mut e = Encoder::new(EncoderConfig {
            initial_sequence: Some(0),
            initial_timestamp: Some(u32::MAX),
            ..EncoderConfig::default()
        })
        .unwrap();
        let packet = e
            .encode(&AccessUnit::new(vec![1], Duration::from_millis(20)))
            .unwrap();
        assert_eq!(ts_of(&packet), 959);
    }

    #[test]
    fn failures_leave_sequence_untouched() {
        let mut e = make_encoder(100);
        assert_eq!(
            e.encode(&AccessUnit::new(Vec::new(), Duration::ZERO)),
            Err(AacError::EmptyAccessUnit)
        );
        assert_eq!(
            e.encode(&AccessUnit::new(vec![0; MAX_AU_SIZE + 1], Duration::ZERO)),
            Err(AacError::AuTooLarge {
                size: MAX_AU_SIZE + 1
            })
        );
        let ok = AccessUnit::new(vec![1], Duration::ZERO);
        let bad = AccessUnit::new(Vec::new(), Duration::ZERO);
        assert_eq!(
            e.encode_aggregated(&[ok.clone(), bad]),
            Err(AacError::EmptyAccessUnit)
        );
        assert_eq!(
            e.encode_aggregated(&[]),
            Err(AacError::TooManyAccessUnits { count: 0 })
        );
        assert_eq!(e.next_sequence(), 100);
        assert_eq!(seq_of(&e.encode(&ok).unwrap()), 100);
    }

    #[test]
    fn largest_au_fits() {
        let mut e = make_encoder(0);
        let packet = e
            .encode(&AccessUnit::new(vec![0; MAX_AU_SIZE], Duration::ZERO))
            .unwrap();
        assert_eq!(&packet[14..16], &[0xff, 0xf8]);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(matches!(
            Encoder::with_random_params(96, 0),
            Err(AacError::UnsupportedConfig { .. })
        ));
        assert!(matches!(
            Encoder::with_random_params(128, 48_000),
            Err(AacError::UnsupportedConfig { .. })
        ));
    }

    #[test]
    fn random_params_are_filled() {
        let e = Encoder::with_random_params(97, 44_100).unwrap();
        assert_eq!(e.payload_type(), 97);
        assert_eq!(e.clock_rate(), 44_100);
        let e2 = Encoder::with_random_params(97, 44_100).unwrap();
        assert_ne!(e.ssrc(), e2.ssrc());
    }
}

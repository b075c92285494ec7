//! MPEG-4 audio configuration blob (the `config=` value of an mpeg4-generic `fmtp` line).
//!
//! Bit layout, most significant bit first (ISO/IEC 14496-3 §1.6.2.1, leading fields only):
//!
//! ```text
//! objectType            5 bits
//! samplingFrequencyIdx  4 bits   (0xF = explicit frequency follows)
//! samplingFrequency    24 bits   (only when the index is 0xF)
//! channelConfiguration  4 bits
//! ```
//!
//! The blob is zero-padded to a whole number of bytes on encode.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::error::{AacError, Result};

/// Sampling frequencies indexed by `samplingFrequencyIndex` 0x0..=0xC (ISO/IEC 14496-3 §1.6.3.3).
pub const SAMPLE_RATES: [u32; 13] = [
    96_000, 88_200, 64_000, 48_000, 44_100, 32_000, 24_000, 22_050, 16_000, 12_000, 11_025,
    8_000, 7_350,
];

/// Index value announcing an explicit 24-bit sampling frequency.
const EXPLICIT_RATE_INDEX: u8 = 0xf;

/// `channelConfiguration` 7 is the 7.1 layout.
const MULTICHANNEL_CONFIG: u8 = 7;
const MULTICHANNEL_COUNT: u8 = 8;

const MAX_OBJECT_TYPE: u8 = (1 << 5) - 1;
const MAX_EXPLICIT_RATE: u32 = (1 << 24) - 1;

/// Looks up the table index of a standard sampling frequency.
pub fn sample_rate_index(rate: u32) -> Option<u8> {
    SAMPLE_RATES
        .iter()
        .position(|&r| r == rate)
        .map(|i| i as u8)
}

/// Decoded audio configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Audio object type (2 = AAC LC).
    pub object_type: u8,
    /// Sampling frequency in Hz.
    pub sample_rate: u32,
    /// Channel count. Configuration 7 decodes as 8 channels.
    pub channel_count: u8,
}

impl AudioConfig {
    /// Parses a configuration blob.
    ///
    /// Trailing bits after the channel configuration (e.g. GASpecificConfig) are ignored.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = BitReader::endian(raw, BigEndian);

        let object_type = r
            .read::<u8>(5)
            .map_err(|e| AacError::malformed_config(format!("unable to read object type: {e}")))?;

        let sample_rate = match r.read::<u8>(4).map_err(|e| {
            AacError::malformed_config(format!("unable to read sample rate index: {e}"))
        })? {
            EXPLICIT_RATE_INDEX => {
                let rate = r.read::<u32>(24).map_err(|e| {
                    AacError::malformed_config(format!("unable to read explicit sample rate: {e}"))
                })?;
                if rate == 0 {
                    return Err(AacError::malformed_config("explicit sample rate is zero"));
                }
                rate
            }
            idx => *SAMPLE_RATES.get(usize::from(idx)).ok_or_else(|| {
                AacError::malformed_config(format!("reserved sample rate index 0x{idx:x}"))
            })?,
        };

        let channel_count = match r.read::<u8>(4).map_err(|e| {
            AacError::malformed_config(format!("unable to read channel configuration: {e}"))
        })? {
            c @ 0..=6 => c,
            MULTICHANNEL_CONFIG => MULTICHANNEL_COUNT,
            c => {
                return Err(AacError::malformed_config(format!(
                    "reserved channel configuration 0x{c:x}"
                )));
            }
        };

        Ok(Self {
            object_type,
            sample_rate,
            channel_count,
        })
    }

    /// Serializes into a configuration blob.
    ///
    /// Standard rates use their table index; any other rate is written through the
    /// explicit-frequency escape.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.object_type > MAX_OBJECT_TYPE {
            return Err(AacError::unsupported_config(format!(
                "object type {} does not fit in 5 bits",
                self.object_type
            )));
        }
        let channel_config = match self.channel_count {
            c @ 0..=6 => c,
            MULTICHANNEL_COUNT => MULTICHANNEL_CONFIG,
            c => {
                return Err(AacError::unsupported_config(format!(
                    "no channel configuration for {c} channels"
                )));
            }
        };
        let rate_index = sample_rate_index(self.sample_rate);
        if rate_index.is_none() && (self.sample_rate == 0 || self.sample_rate > MAX_EXPLICIT_RATE)
        {
            return Err(AacError::unsupported_config(format!(
                "sample rate {} does not fit in 24 bits",
                self.sample_rate
            )));
        }

        let mut buf = Vec::with_capacity(5);
        {
            let mut w = BitWriter::endian(&mut buf, BigEndian);
            let fields = |w: &mut BitWriter<&mut Vec<u8>, BigEndian>| -> std::io::Result<()> {
                w.write(5, self.object_type)?;
                match rate_index {
                    Some(idx) => w.write(4, idx)?,
                    None => {
                        w.write(4, EXPLICIT_RATE_INDEX)?;
                        w.write(24, self.sample_rate)?;
                    }
                }
                w.write(4, channel_config)?;
                w.byte_align()
            };
            fields(&mut w).map_err(|e| AacError::unsupported_config(e.to_string()))?;
        }
        Ok(buf)
    }

    /// Parses the hexadecimal form used in SDP (`config=1190`).
    pub fn decode_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s.trim())
            .map_err(|e| AacError::malformed_config(format!("invalid hex: {e}")))?;
        Self::decode(&raw)
    }

    /// Serializes into lowercase hex.
    pub fn encode_hex(&self) -> Result<String> {
        Ok(hex::encode(self.encode()?))
    }
}

//! AU-header section of an mpeg4-generic payload (RFC 3640 §3.2.1), AAC-hbr mode.
//!
//! ```text
//! +---------------------+----------------+-----+----------------+
//! | AU-headers-length   | AU-header (1)  | ... | AU-header (n)  |
//! | 16 bits, in *bits*  | 13 size, 3 idx |     | 13 size, 3 Δ   |
//! +---------------------+----------------+-----+----------------+
//! ```
//!
//! AAC-hbr fixes `sizeLength=13`, `indexLength=3` and `indexDeltaLength=3`
//! (RFC 3640 §3.3.6), so every AU-header is exactly 16 bits and the section
//! never needs padding.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::error::{AacError, Result};

/// Size of the AU-headers-length field.
pub const HEADERS_LEN_SIZE: usize = 2;

const SIZE_LENGTH: u32 = 13;
const INDEX_LENGTH: u32 = 3;
const AU_HEADER_BITS: u16 = (SIZE_LENGTH + INDEX_LENGTH) as u16;

/// Largest AU the 13-bit size field can describe.
pub const MAX_AU_SIZE: usize = (1 << SIZE_LENGTH) - 1;

/// Most AU-headers the 16-bit AU-headers-length field can describe.
pub const MAX_AU_HEADERS: usize = (u16::MAX / AU_HEADER_BITS) as usize;

/// One AU-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuHeader {
    /// AU size in bytes.
    pub size: u16,
    /// AU-index for the first header of a packet, AU-index-delta for the rest.
    pub index: u8,
}

/// Appends the AU-headers-length field and the headers to `out`.
///
/// Nothing is written unless every header fits its fields.
pub fn write_section(headers: &[AuHeader], out: &mut Vec<u8>) -> Result<()> {
    if headers.is_empty() || headers.len() > MAX_AU_HEADERS {
        return Err(AacError::TooManyAccessUnits {
            count: headers.len(),
        });
    }
    if let Some(h) = headers.iter().find(|h| usize::from(h.size) > MAX_AU_SIZE) {
        return Err(AacError::AuTooLarge {
            size: usize::from(h.size),
        });
    }
    let bits = headers.len() as u16 * AU_HEADER_BITS;

    let mut w = BitWriter::endian(out, BigEndian);
    let mut fields = || -> std::io::Result<()> {
        w.write(16, bits)?;
        for h in headers {
            w.write(SIZE_LENGTH, h.size)?;
            w.write(INDEX_LENGTH, h.index & 0x07)?;
        }
        Ok(())
    };
    // writes into a Vec only fail on out-of-range values, ruled out above
    fields().map_err(|e| AacError::unsupported_config(format!("AU header: {e}")))
}

/// Parsed AU-header section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub headers: Vec<AuHeader>,
    /// Offset of the first AU byte within the payload.
    pub data_offset: usize,
}

/// Parses the AU-header section at the start of `payload`.
///
/// The section must hold at least one header and fit inside the payload.
pub fn read_section(payload: &[u8]) -> Result<Section> {
    let Some(len_field) = payload.get(..HEADERS_LEN_SIZE) else {
        return Err(AacError::MalformedHeaderTable {
            bits: 0,
            available: payload.len(),
        });
    };
    let bits = u16::from_be_bytes([len_field[0], len_field[1]]);
    let available = payload.len() - HEADERS_LEN_SIZE;

    if bits == 0 || bits % AU_HEADER_BITS != 0 {
        return Err(AacError::MalformedHeaderTable { bits, available });
    }
    let table_len = usize::from(bits / 8);
    let table = payload
        .get(HEADERS_LEN_SIZE..HEADERS_LEN_SIZE + table_len)
        .ok_or(AacError::MalformedHeaderTable { bits, available })?;

    let count = usize::from(bits / AU_HEADER_BITS);
    let mut r = BitReader::endian(table, BigEndian);
    let mut headers = Vec::with_capacity(count);
    for _ in 0..count {
        let size = r
            .read::<u16>(SIZE_LENGTH)
            .map_err(|_| AacError::MalformedHeaderTable { bits, available })?;
        let index = r
            .read::<u8>(INDEX_LENGTH)
            .map_err(|_| AacError::MalformedHeaderTable { bits, available })?;
        headers.push(AuHeader { size, index });
    }

    Ok(Section {
        headers,
        data_offset: HEADERS_LEN_SIZE + table_len,
    })
}

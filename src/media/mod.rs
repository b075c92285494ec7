//! RTP packetization of MPEG-4 audio access units.
//!
//! This module implements the mpeg4-generic payload format of
//! [RFC 3640](https://tools.ietf.org/html/rfc3640) in its AAC-hbr mode
//! (§3.3.6) in both directions.
//!
//! ## Packet layout
//!
//! ```text
//! +------------------+-------------------+----------------+-------------+
//! | RTP header (12)  | AU-headers-length | AU-headers     | AU payloads |
//! | RFC 3550 §5.1    | 16 bits, in bits  | 16 bits per AU | concatenated|
//! +------------------+-------------------+----------------+-------------+
//! ```
//!
//! - **RTP header** ([`rtp`]): version 2, marker set on every packet since
//!   each packet carries complete AUs only.
//! - **AU-header section** ([`au_header`]): 13-bit AU-size and 3-bit
//!   AU-index / AU-index-delta per AU.
//!
//! [`Encoder`] turns access units into packets, [`Decoder`] turns packets
//! back into access units with presentation timestamps reconstructed from
//! the RTP clock (see [`crate::clock`]).

pub mod au_header;
pub mod decoder;
pub mod encoder;
pub mod rtp;

use std::time::Duration;

pub use decoder::Decoder;
pub use encoder::{Encoder, EncoderConfig};

/// One compressed audio access unit.
///
/// The payload is opaque: nothing here inspects the raw AAC data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessUnit {
    pub payload: Vec<u8>,
    /// Presentation offset from the stream epoch.
    pub timestamp: Duration,
}

impl AccessUnit {
    pub fn new(payload: impl Into<Vec<u8>>, timestamp: Duration) -> Self {
        Self {
            payload: payload.into(),
            timestamp,
        }
    }
}

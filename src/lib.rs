//! RTP payload codec for MPEG-4 audio access units (RFC 3640 mpeg4-generic, AAC-hbr mode).
//!
//! - [`AudioConfig`]: the `config=` blob carrying object type, sample rate and channels.
//! - [`Encoder`]: access units in, RTP packets out.
//! - [`Decoder`]: RTP packets in, access units with presentation timestamps out.
//!
//! Transport, session negotiation and AAC decoding are left to the caller.
//!
//! ```
//! use std::time::Duration;
//! use rtpaac::{AccessUnit, Decoder, Encoder, EncoderConfig};
//!
//! let mut encoder = Encoder::new(EncoderConfig::default()).unwrap();
//! let mut decoder = Decoder::new(48_000).unwrap();
//!
//! let packet = encoder
//!     .encode(&AccessUnit::new(vec![0x21, 0x1a], Duration::ZERO))
//!     .unwrap();
//! let aus = decoder.decode(&packet).unwrap();
//! assert_eq!(aus[0].payload, vec![0x21, 0x1a]);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod media;

pub use config::AudioConfig;
pub use error::{AacError, Result, RtpHeaderErrorKind};
pub use media::{AccessUnit, Decoder, Encoder, EncoderConfig};

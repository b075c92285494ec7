//! Error types for the RTP/AAC codec.

use std::fmt;

/// Errors returned by the configuration codec, the packetizer and the depacketizer.
///
/// Every error is local to a single call. The [`Encoder`](crate::Encoder) and
/// [`Decoder`](crate::Decoder) leave their state untouched when a call fails.
///
/// - **Config**: [`MalformedConfig`](Self::MalformedConfig),
///   [`UnsupportedConfig`](Self::UnsupportedConfig).
/// - **Encoder**: [`EmptyAccessUnit`](Self::EmptyAccessUnit),
///   [`AuTooLarge`](Self::AuTooLarge), [`TooManyAccessUnits`](Self::TooManyAccessUnits).
/// - **Decoder**: [`PacketTooShort`](Self::PacketTooShort),
///   [`RtpHeader`](Self::RtpHeader), [`MalformedHeaderTable`](Self::MalformedHeaderTable),
///   [`TruncatedAccessUnit`](Self::TruncatedAccessUnit).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AacError {
    /// The configuration blob is truncated or carries a reserved field value.
    #[error("malformed audio config: {reason}")]
    MalformedConfig { reason: String },

    /// A value cannot be represented in the configuration blob, or a clock rate is unusable.
    #[error("unsupported config: {reason}")]
    UnsupportedConfig { reason: String },

    /// Zero-length access units are rejected rather than emitting degenerate packets.
    #[error("empty access unit")]
    EmptyAccessUnit,

    /// The AU does not fit the 13-bit AU-size field.
    #[error("access unit too large: {size} bytes (max 8191)")]
    AuTooLarge { size: usize },

    /// The AU-headers-length field cannot describe this many AU headers.
    #[error("cannot aggregate {count} access units into one packet")]
    TooManyAccessUnits { count: usize },

    /// Shorter than the fixed RTP header plus the AU-headers-length field.
    #[error("packet too short: {len} bytes")]
    PacketTooShort { len: usize },

    /// The RTP header itself is invalid (RFC 3550 §5.1).
    #[error("invalid RTP header: {kind}")]
    RtpHeader { kind: RtpHeaderErrorKind },

    /// AU-headers-length is zero, not a multiple of 16, or larger than the payload.
    #[error("malformed AU header table: {bits} bits with {available} payload bytes")]
    MalformedHeaderTable { bits: u16, available: usize },

    /// An AU-header declares more bytes than the packet still holds.
    #[error("access unit {index} declares {size} bytes but only {remaining} remain")]
    TruncatedAccessUnit {
        index: usize,
        size: usize,
        remaining: usize,
    },

    /// Reserved for decoders that require an explicit priming packet.
    #[error("decoder not primed")]
    DecoderNotPrimed,
}

/// Specific kind of RTP fixed-header failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtpHeaderErrorKind {
    /// Version field was not 2.
    UnsupportedVersion(u8),
    /// CC announces more CSRC entries than the packet holds.
    TruncatedCsrcList,
    /// X bit set but the extension header or body is cut short.
    TruncatedExtension,
    /// P bit set with a padding count of zero or larger than the payload.
    InvalidPadding,
}

impl fmt::Display for RtpHeaderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion(v) => write!(f, "unsupported version {v}"),
            Self::TruncatedCsrcList => write!(f, "truncated CSRC list"),
            Self::TruncatedExtension => write!(f, "truncated header extension"),
            Self::InvalidPadding => write!(f, "invalid padding"),
        }
    }
}

impl AacError {
    pub(crate) fn malformed_config(reason: impl Into<String>) -> Self {
        Self::MalformedConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_config(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfig {
            reason: reason.into(),
        }
    }
}

/// Convenience alias for `Result<T, AacError>`.
pub type Result<T> = std::result::Result<T, AacError>;

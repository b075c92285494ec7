//! Conversions between the 32-bit RTP clock and presentation durations.
//!
//! RTP timestamps (RFC 3550 §5.1) are a wrapping `u32` counting ticks of the
//! payload clock rate. At 48 kHz the counter rolls over after `2^32 / 48000`
//! seconds (about 24.9 days), so all subtraction is modular.

use std::num::NonZeroU32;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Ticks elapsed during `d`, truncated toward zero.
///
/// The result is not reduced into the 32-bit domain; callers wrap it with
/// modular addition (see [`tick_at`]).
pub fn ticks_from_duration(d: Duration, clock_rate: u32) -> u64 {
    (d.as_nanos() * u128::from(clock_rate) / NANOS_PER_SEC) as u64
}

/// Duration spanned by `ticks`, truncated to whole nanoseconds.
///
/// Splits whole seconds out first so the intermediate product stays within 64 bits.
pub fn duration_from_ticks(ticks: u64, clock_rate: NonZeroU32) -> Duration {
    let rate = u64::from(clock_rate.get());
    let secs = ticks / rate;
    let rem = ticks % rate;
    let nanos = rem * NANOS_PER_SEC as u64 / rate;
    Duration::new(secs, nanos as u32)
}

/// Elapsed ticks from `earlier` to `later`, modulo 2^32.
pub fn tick_delta(later: u32, earlier: u32) -> u32 {
    later.wrapping_sub(earlier)
}

/// Absolute RTP timestamp of a presentation offset `d` from `reference`.
pub fn tick_at(reference: u32, d: Duration, clock_rate: u32) -> u32 {
    reference.wrapping_add(ticks_from_duration(d, clock_rate) as u32)
}

/// Receive-side timestamp mapper.
///
/// The first observed tick becomes the epoch (duration zero). Every later tick
/// is placed at `(tick - epoch) mod 2^32` ticks after it, so each packet's
/// duration depends only on its own timestamp.
#[derive(Debug, Clone)]
pub struct TickTracker {
    clock_rate: NonZeroU32,
    reference_tick: Option<u32>,
}

impl TickTracker {
    pub fn new(clock_rate: NonZeroU32) -> Self {
        Self {
            clock_rate,
            reference_tick: None,
        }
    }

    pub fn clock_rate(&self) -> NonZeroU32 {
        self.clock_rate
    }

    pub fn is_primed(&self) -> bool {
        self.reference_tick.is_some()
    }

    /// Tick captured from the first observation, if any.
    pub fn reference_tick(&self) -> Option<u32> {
        self.reference_tick
    }

    /// Records the epoch on first use and returns the presentation duration of `tick`.
    pub fn observe(&mut self, tick: u32) -> Duration {
        let reference = *self.reference_tick.get_or_insert(tick);
        duration_from_ticks(u64::from(tick_delta(tick, reference)), self.clock_rate)
    }
}

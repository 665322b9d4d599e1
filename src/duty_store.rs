//! Per-channel target duty values, clamped into per-channel bounds.
//!
//! The [`DutyStore`] is the only state shared between the foreground command loop and the
//! interrupt-priority [`Multiplexer`](crate::multiplexer::Multiplexer). Each channel lives in
//! its own [`AtomicU16`], so the multiplexer can never observe a half-written value.
//!
//! Ownership is single-writer: only the foreground context calls [`DutyStore::set`],
//! [`DutyStore::adjust`] and [`DutyStore::revalidate`]. The multiplexer only calls
//! [`DutyStore::get`]. Because no field has two writers, a load/clamp/store sequence needs no
//! lock.
//!
//! # Example
//!
//! ```rust
//! use servo_mux::config::ARM_CHANNELS;
//! use servo_mux::duty_store::{ChannelId, DutyStore};
//!
//! static DUTY_STORE: DutyStore = DutyStore::new(ARM_CHANNELS);
//!
//! // Base servo: bounds [142, 592], starts at 312.
//! assert_eq!(DUTY_STORE.adjust(ChannelId::CH0, 50), 362);
//! assert_eq!(DUTY_STORE.set(ChannelId::CH0, 10_000), 592);
//! ```

use derive_more::Display;
use portable_atomic::{AtomicU16, Ordering};

use crate::config::CHANNEL_COUNT;
use crate::{Error, Result};

/// Identity of one of the four multiplexed channels (`0..=3`).
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
#[display("{_0}")]
pub struct ChannelId(u8);

impl ChannelId {
    /// Channel 0.
    pub const CH0: Self = Self(0);
    /// Channel 1.
    pub const CH1: Self = Self(1);
    /// Channel 2.
    pub const CH2: Self = Self(2);
    /// Channel 3.
    pub const CH3: Self = Self(3);

    /// All channels in round order.
    pub const ALL: [Self; CHANNEL_COUNT] = [Self::CH0, Self::CH1, Self::CH2, Self::CH3];

    /// Create a channel identity from a raw index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] if `index >= CHANNEL_COUNT`.
    pub const fn new(index: u8) -> Result<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Ok(Self(index))
        } else {
            Err(Error::ChannelOutOfRange(index))
        }
    }

    /// Position of this channel in the store.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        Self::new(index)
    }
}

impl From<ChannelId> for usize {
    fn from(channel: ChannelId) -> Self {
        channel.index()
    }
}

/// Clamp bounds and start-up value for one channel, in duty units.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct ChannelLimits {
    /// Smallest accepted duty value (inclusive).
    pub min: u16,
    /// Largest accepted duty value (inclusive).
    pub max: u16,
    /// Value loaded at start-up, before clamping.
    pub initial: u16,
    /// Human-readable name shown in the console menu.
    pub name: &'static str,
}

impl ChannelLimits {
    /// Describe one channel's limits.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `min > max`.
    #[must_use]
    pub const fn new(name: &'static str, min: u16, max: u16, initial: u16) -> Self {
        assert!(min <= max, "min must not exceed max");
        Self {
            min,
            max,
            initial,
            name,
        }
    }

    /// Clamp any integer into `[min, max]`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the final branch only sees values inside [min, max]"
    )]
    pub const fn clamp(&self, value: i32) -> u16 {
        if value < self.min as i32 {
            self.min
        } else if value > self.max as i32 {
            self.max
        } else {
            value as u16
        }
    }

    /// Whether `value` already lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, value: u16) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Target duty values for all channels.
///
/// See the [module documentation](mod@crate::duty_store) for the ownership rules.
pub struct DutyStore {
    limits: [ChannelLimits; CHANNEL_COUNT],
    duties: [AtomicU16; CHANNEL_COUNT],
}

impl DutyStore {
    /// Create a store whose channels start at their (clamped) initial values.
    ///
    /// This is a `const fn` so the store can be placed in a `static`.
    #[must_use]
    pub const fn new(limits: [ChannelLimits; CHANNEL_COUNT]) -> Self {
        Self {
            duties: [
                AtomicU16::new(limits[0].clamp(limits[0].initial as i32)),
                AtomicU16::new(limits[1].clamp(limits[1].initial as i32)),
                AtomicU16::new(limits[2].clamp(limits[2].initial as i32)),
                AtomicU16::new(limits[3].clamp(limits[3].initial as i32)),
            ],
            limits,
        }
    }

    /// Current target duty of `channel`.
    ///
    /// Safe to call from interrupt context while the foreground writes.
    #[must_use]
    pub fn get(&self, channel: ChannelId) -> u16 {
        self.cell(channel).load(Ordering::Acquire)
    }

    /// Clamp `value` into the channel's bounds and store it. Returns the stored value.
    ///
    /// Never fails: out-of-range input is silently clamped.
    pub fn set(&self, channel: ChannelId, value: i32) -> u16 {
        let clamped = self.limits(channel).clamp(value);
        self.cell(channel).store(clamped, Ordering::Release);
        clamped
    }

    /// Add `delta` to the channel's current value, then clamp. Returns the stored value.
    ///
    /// The sum saturates, so any `delta` lands on a bound rather than wrapping.
    pub fn adjust(&self, channel: ChannelId, delta: i32) -> u16 {
        self.set(channel, i32::from(self.get(channel)).saturating_add(delta))
    }

    /// Re-clamp every channel into its bounds in one pass.
    pub fn revalidate(&self) {
        for channel in ChannelId::ALL {
            let current = self.get(channel);
            if !self.limits(channel).contains(current) {
                self.set(channel, i32::from(current));
            }
        }
    }

    /// Limits configured for `channel`.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "ChannelId is always < CHANNEL_COUNT")]
    pub const fn limits(&self, channel: ChannelId) -> &ChannelLimits {
        &self.limits[channel.index()]
    }

    #[expect(clippy::indexing_slicing, reason = "ChannelId is always < CHANNEL_COUNT")]
    const fn cell(&self, channel: ChannelId) -> &AtomicU16 {
        &self.duties[channel.index()]
    }

    /// All current target duties, indexed by channel.
    #[must_use]
    pub fn snapshot(&self) -> [u16; CHANNEL_COUNT] {
        ChannelId::ALL.map(|channel| self.get(channel))
    }
}

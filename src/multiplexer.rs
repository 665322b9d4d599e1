//! Round-robin multiplexing of one PWM carrier onto four servo outputs.
//!
//! The [`Multiplexer`] is driven by a tick source running at twice the carrier frequency.
//! Each call to [`Multiplexer::on_tick`] is one tick:
//!
//! - **Even tick** (phase advance, mid-period): move to the next slot of the round. For a
//!   channel slot, read its duty from the [`DutyStore`], program the carrier duty, and steer the
//!   carrier to that channel's output. Both writes land at the next period start.
//! - **Odd tick** (period boundary): the steering change has just taken effect, so drive the
//!   previously active output low. Otherwise it would stay asserted.
//!
//! A round is `CH0, CH1, CH2, CH3, BLANK`. The blank slot steers the carrier nowhere. This
//! stretches four active sub-periods into a fixed five-sub-period frame, so every servo gets
//! the same refresh interval.
//!
//! ```text
//! tick:   0    1    2    3    4    5    6    7    8      -1   | 0 ...
//! event:  CH0  clr  CH1  clr  CH2  clr  CH3  clr  BLANK  clr  | CH0
//! ```
//!
//! The blank advance rewinds `tick` to -2, so the odd tick after it reads -1 and every
//! frame's `CH0` advance happens at `tick == 0`.
//!
//! The multiplexer never blocks and has no error path. Missed ticks are a hardware
//! precondition violation and are not detected here.

mod carrier;

pub use carrier::{Carrier, Output, compare_value};

use crate::config::TICKS_PER_SUB_PERIOD;
use crate::duty_store::{ChannelId, DutyStore};

/// `tick` value written at the blank slot so that the next frame's `CH0` advance lands on 0.
const FRAME_RESYNC_TICK: i16 = -TICKS_PER_SUB_PERIOD;

/// Which slot of the round is active, or about to become active.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Phase {
    /// The idle slot that pads the round to five sub-periods.
    Blank,
    /// Channel 0.
    Ch0,
    /// Channel 1.
    Ch1,
    /// Channel 2.
    Ch2,
    /// Channel 3.
    Ch3,
}

impl Phase {
    /// The slot that follows this one in the round.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Blank => Self::Ch0,
            Self::Ch0 => Self::Ch1,
            Self::Ch1 => Self::Ch2,
            Self::Ch2 => Self::Ch3,
            Self::Ch3 => Self::Blank,
        }
    }

    /// The channel served in this slot, or `None` for [`Phase::Blank`].
    #[must_use]
    pub const fn channel(self) -> Option<ChannelId> {
        match self {
            Self::Blank => None,
            Self::Ch0 => Some(ChannelId::CH0),
            Self::Ch1 => Some(ChannelId::CH1),
            Self::Ch2 => Some(ChannelId::CH2),
            Self::Ch3 => Some(ChannelId::CH3),
        }
    }
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum TickEvent {
    /// The round advanced to this phase (even tick).
    Advanced(Phase),
    /// The stale output was driven low (odd tick).
    Cleared(Output),
    /// Odd tick with nothing to clear.
    Idle,
}

/// The interrupt-level multiplexing state machine.
///
/// Owns the carrier and the tick/phase counters. Create it once at start-up and call
/// [`on_tick`](Self::on_tick) from the tick interrupt for the rest of the program.
pub struct Multiplexer<C> {
    carrier: C,
    tick: i16,
    phase: Phase,
    active: Option<Output>,
    pending_clear: Option<Output>,
}

impl<C: Carrier> Multiplexer<C> {
    /// Start in the blank phase at tick 0; the first tick advances to channel 0.
    #[must_use]
    pub const fn new(carrier: C) -> Self {
        Self {
            carrier,
            tick: 0,
            phase: Phase::Blank,
            active: None,
            pending_clear: None,
        }
    }

    /// Handle one tick of the tick source.
    pub fn on_tick(&mut self, duty_store: &DutyStore) -> TickEvent {
        let event = if self.tick.rem_euclid(TICKS_PER_SUB_PERIOD) == 0 {
            self.advance(duty_store)
        } else {
            self.clear_stale()
        };
        self.tick = self.tick.wrapping_add(1);
        event
    }

    fn advance(&mut self, duty_store: &DutyStore) -> TickEvent {
        let next = self.phase.next();
        let previous = self.active;

        match next.channel() {
            Some(channel) => {
                let output = Output::for_channel(channel);
                self.carrier.set_duty(duty_store.get(channel));
                self.carrier.set_steering(Some(output));
                self.active = Some(output);
            }
            None => {
                self.carrier.set_duty(0);
                self.carrier.set_steering(None);
                self.active = None;
                self.tick = FRAME_RESYNC_TICK;
            }
        }

        self.pending_clear = previous;
        self.phase = next;
        TickEvent::Advanced(next)
    }

    fn clear_stale(&mut self) -> TickEvent {
        match self.pending_clear.take() {
            Some(output) => {
                self.carrier.clear_output(output);
                TickEvent::Cleared(output)
            }
            None => TickEvent::Idle,
        }
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The tick counter, as it will be seen by the next [`on_tick`](Self::on_tick).
    #[must_use]
    pub const fn tick(&self) -> i16 {
        self.tick
    }

    /// The output the carrier is (or is about to be) steered to.
    #[must_use]
    pub const fn active_output(&self) -> Option<Output> {
        self.active
    }

    /// The output waiting to be cleared on the next odd tick.
    #[must_use]
    pub const fn pending_clear(&self) -> Option<Output> {
        self.pending_clear
    }

    /// Borrow the carrier.
    #[must_use]
    pub const fn carrier(&self) -> &C {
        &self.carrier
    }

    /// Mutably borrow the carrier.
    pub const fn carrier_mut(&mut self) -> &mut C {
        &mut self.carrier
    }

    /// Give back the carrier.
    #[must_use]
    pub fn into_carrier(self) -> C {
        self.carrier
    }
}

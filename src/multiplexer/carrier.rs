//! The shared PWM generator and its output-steering selector, as seen by the multiplexer.

use crate::config::pulse_width_us;
use crate::duty_store::ChannelId;

/// One physical output line the carrier can be steered onto.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Output {
    /// Output for channel 0.
    A,
    /// Output for channel 1.
    B,
    /// Output for channel 2.
    C,
    /// Output for channel 3.
    D,
}

impl Output {
    /// All outputs, in channel order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// The output wired to `channel`.
    #[must_use]
    pub const fn for_channel(channel: ChannelId) -> Self {
        match channel.index() {
            0 => Self::A,
            1 => Self::B,
            2 => Self::C,
            _ => Self::D,
        }
    }

    /// Position of this output in [`Output::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Compare value for `output` when the carrier is steered to `steering` with `duty`.
///
/// The steered output gets the pulse width in µs (one counter step per µs), capped at `top`.
/// Every other output gets 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "the pulse is at most `top` after the cap"
)]
pub const fn compare_value(
    duty: u16,
    steering: Option<Output>,
    output: Output,
    top: u16,
) -> u16 {
    match steering {
        Some(steered) if steered.index() == output.index() => {
            let pulse = pulse_width_us(duty);
            if pulse > top as u32 { top } else { pulse as u16 }
        }
        _ => 0,
    }
}

/// A single PWM generator whose output can be steered to one of several pins.
///
/// [`set_duty`](Carrier::set_duty) and [`set_steering`](Carrier::set_steering) take effect at
/// the start of the *next* carrier period. [`clear_output`](Carrier::clear_output) is called
/// on the period boundary where a steering change has just landed, and must leave that
/// output low for the rest of the period. Hardware whose steering write already silences a
/// deselected output (per-output compare registers latched at wrap) meets this through
/// `set_steering`, and `clear_output` only rewrites the inactive state.
///
/// Implementations run in interrupt context: every method must be a fixed-latency register
/// write and must never block.
pub trait Carrier {
    /// Program the pulse width, in duty units, for the next period.
    fn set_duty(&mut self, duty: u16);

    /// Route the carrier to `output` alone, or to no output at all, from the next period on.
    ///
    /// Replaces the previous selection.
    fn set_steering(&mut self, output: Option<Output>);

    /// Drive `output` inactive (low).
    fn clear_output(&mut self, output: Output);
}

impl<T: Carrier + ?Sized> Carrier for &mut T {
    fn set_duty(&mut self, duty: u16) {
        (**self).set_duty(duty);
    }

    fn set_steering(&mut self, output: Option<Output>) {
        (**self).set_steering(output);
    }

    fn clear_output(&mut self, output: Output) {
        (**self).clear_output(output);
    }
}

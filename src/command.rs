//! Single-symbol commands: select a channel, or nudge its duty up or down.
//!
//! See [`Dispatcher`] for usage.

use derive_more::Display;

use crate::config::DUTY_STEP;
use crate::duty_store::{ChannelId, DutyStore};

/// A decoded input symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Command {
    /// Make `ChannelId` the target of later adjustments.
    Select(ChannelId),
    /// Raise the selected channel's duty by one step.
    Increase,
    /// Lower the selected channel's duty by one step.
    Decrease,
    /// A symbol outside the command alphabet.
    Invalid(u8),
}

impl Command {
    /// Decode one input byte.
    ///
    /// The menu labels are not in channel order: `2` selects channel 2 and `3` selects
    /// channel 1.
    #[must_use]
    pub const fn parse(symbol: u8) -> Self {
        match symbol {
            b'1' => Self::Select(ChannelId::CH0),
            b'2' => Self::Select(ChannelId::CH2),
            b'3' => Self::Select(ChannelId::CH1),
            b'4' => Self::Select(ChannelId::CH3),
            b'a' => Self::Increase,
            b'd' => Self::Decrease,
            other => Self::Invalid(other),
        }
    }
}

impl From<u8> for Command {
    fn from(symbol: u8) -> Self {
        Self::parse(symbol)
    }
}

/// The user-visible outcome of one command. `Display` yields the exact console line
/// (without the line terminator).
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Feedback {
    /// A channel was selected.
    #[display("controlling channel {_0}")]
    Selected(ChannelId),
    /// The selected channel's duty changed (or was already at a bound).
    #[display("channel {channel} duty {duty}")]
    Adjusted {
        /// The adjusted channel.
        channel: ChannelId,
        /// The value stored after clamping.
        duty: u16,
    },
    /// `a` or `d` arrived before any channel was selected.
    #[display("please select a channel")]
    NoChannelSelected,
    /// The symbol is not a command.
    #[display("invalid command: {}", char::from(*_0))]
    Invalid(u8),
}

impl Feedback {
    /// Whether the command was rejected without touching any state.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::NoChannelSelected | Self::Invalid(_))
    }
}

/// Turns input symbols into selections and duty adjustments.
///
/// Owns the selected channel. Starts with no channel selected.
///
/// # Example
///
/// ```rust
/// use servo_mux::command::{Dispatcher, Feedback};
/// use servo_mux::config::ARM_CHANNELS;
/// use servo_mux::duty_store::{ChannelId, DutyStore};
///
/// let duty_store = DutyStore::new(ARM_CHANNELS);
/// let mut dispatcher = Dispatcher::new();
///
/// assert_eq!(dispatcher.dispatch(&duty_store, b'a'), Feedback::NoChannelSelected);
/// assert_eq!(dispatcher.dispatch(&duty_store, b'1'), Feedback::Selected(ChannelId::CH0));
/// let feedback = dispatcher.dispatch(&duty_store, b'a');
/// assert_eq!(feedback.to_string(), "channel 0 duty 322");
/// ```
#[derive(Debug, Default)]
pub struct Dispatcher {
    selected: Option<ChannelId>,
}

impl Dispatcher {
    /// A dispatcher with no channel selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// The channel `a`/`d` currently act on.
    #[must_use]
    pub const fn selected(&self) -> Option<ChannelId> {
        self.selected
    }

    /// Re-clamp every channel, then apply one input symbol.
    pub fn dispatch(&mut self, duty_store: &DutyStore, symbol: u8) -> Feedback {
        duty_store.revalidate();
        self.apply(duty_store, Command::parse(symbol))
    }

    /// Apply an already-decoded command. Does not revalidate.
    pub fn apply(&mut self, duty_store: &DutyStore, command: Command) -> Feedback {
        let delta = match command {
            Command::Select(channel) => {
                self.selected = Some(channel);
                return Feedback::Selected(channel);
            }
            Command::Invalid(symbol) => return Feedback::Invalid(symbol),
            Command::Increase => DUTY_STEP,
            Command::Decrease => DUTY_STEP.saturating_neg(),
        };

        let Some(channel) = self.selected else {
            return Feedback::NoChannelSelected;
        };
        let duty = duty_store.adjust(channel, delta);
        Feedback::Adjusted { channel, duty }
    }
}

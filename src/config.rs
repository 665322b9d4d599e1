//! Timing constants and the robot arm's channel table.
//!
//! One carrier period (a *sub-period*) carries one channel's pulse. A frame is
//! [`SUB_PERIODS_PER_FRAME`] sub-periods: four active slots and one blank slot, so every
//! channel is refreshed once per [`FRAME_PERIOD_US`] (~49 Hz, close to the 50 Hz hobby
//! servos expect).

use crate::duty_store::ChannelLimits;

/// Number of multiplexed channels.
pub const CHANNEL_COUNT: usize = 4;

/// Pulse width represented by one duty unit (microseconds).
pub const DUTY_UNIT_US: u16 = 4;

/// Carrier (sub-period) length in microseconds (~244 Hz).
pub const CARRIER_PERIOD_US: u16 = 4_096;

/// Tick interrupts per carrier period. Even ticks advance the phase, odd ticks clear.
pub const TICKS_PER_SUB_PERIOD: i16 = 2;

/// Tick interval in microseconds: twice the carrier frequency.
pub const TICK_PERIOD_US: u16 = CARRIER_PERIOD_US / TICKS_PER_SUB_PERIOD as u16;

/// Sub-periods per frame: one per channel plus the blank slot.
pub const SUB_PERIODS_PER_FRAME: i16 = CHANNEL_COUNT as i16 + 1;

/// Ticks per frame.
pub const TICKS_PER_FRAME: i16 = SUB_PERIODS_PER_FRAME * TICKS_PER_SUB_PERIOD;

/// Frame length in microseconds; each channel's refresh interval.
pub const FRAME_PERIOD_US: u32 = CARRIER_PERIOD_US as u32 * SUB_PERIODS_PER_FRAME as u32;

/// Duty units added or removed by one `a`/`d` command.
pub const DUTY_STEP: i32 = 10;

/// Baud rate of the command console.
pub const CONSOLE_BAUD: u32 = 9_600;

/// Limits for the four servos of the robot arm, in duty units (4 µs each).
pub const ARM_CHANNELS: [ChannelLimits; CHANNEL_COUNT] = [
    ChannelLimits::new("Base", 142, 592, 312),
    ChannelLimits::new("Left (large arm)", 342, 502, 341),
    ChannelLimits::new("Right (small arm)", 292, 602, 542),
    ChannelLimits::new("Gripper", 202, 322, 310),
];

/// Pulse width in microseconds for a duty value.
#[must_use]
pub const fn pulse_width_us(duty: u16) -> u32 {
    (duty as u32).saturating_mul(DUTY_UNIT_US as u32)
}

// Four active slots and one blank slot, two ticks each. The widest pulse fits the carrier.
const _: () = assert!(TICKS_PER_FRAME == 10);
const _: () = assert!(FRAME_PERIOD_US == TICK_PERIOD_US as u32 * TICKS_PER_FRAME as u32);
const _: () = assert!(pulse_width_us(602) < CARRIER_PERIOD_US as u32);

#![cfg(feature = "host")]
#![allow(missing_docs, reason = "integration tests")]
//! Host-level tests for the duty store and channel limits.

use servo_mux::Error;
use servo_mux::config::{ARM_CHANNELS, CHANNEL_COUNT, DUTY_STEP, pulse_width_us};
use servo_mux::duty_store::{ChannelId, ChannelLimits, DutyStore};

#[test]
fn starts_at_clamped_initial_values() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    // Channel 1's configured initial value (341) sits one below its minimum.
    assert_eq!(duty_store.snapshot(), [312, 342, 542, 310]);
}

#[test]
fn set_clamps_to_bounds() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    assert_eq!(duty_store.set(ChannelId::CH0, 10_000), 592);
    assert_eq!(duty_store.get(ChannelId::CH0), 592);
    assert_eq!(duty_store.set(ChannelId::CH0, -10_000), 142);
    assert_eq!(duty_store.get(ChannelId::CH0), 142);
    assert_eq!(duty_store.set(ChannelId::CH0, 400), 400);
}

#[test]
fn set_is_idempotent_after_clamping() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    for channel in ChannelId::ALL {
        for value in [i32::MIN, -1, 0, 141, 200, 333, 500, 601, 1_000, i32::MAX] {
            let first = duty_store.set(channel, value);
            let second = duty_store.set(channel, i32::from(duty_store.get(channel)));
            assert_eq!(first, second, "channel {channel} value {value}");
        }
    }
}

#[test]
fn every_write_stays_in_bounds() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    for channel in ChannelId::ALL {
        let limits = *duty_store.limits(channel);
        for delta in [-1_000, -DUTY_STEP, -1, 0, 1, DUTY_STEP, 1_000] {
            for _ in 0..60 {
                let stored = duty_store.adjust(channel, delta);
                assert!(limits.contains(stored), "channel {channel} stored {stored}");
            }
        }
    }
}

#[test]
fn five_steps_up_from_start() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    for _ in 0..5 {
        duty_store.adjust(ChannelId::CH0, DUTY_STEP);
    }
    assert_eq!(duty_store.get(ChannelId::CH0), 362);
}

#[test]
fn thirty_steps_up_saturates_at_max() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    for _ in 0..30 {
        duty_store.adjust(ChannelId::CH0, DUTY_STEP);
    }
    assert_eq!(duty_store.get(ChannelId::CH0), 592);
}

#[test]
fn revalidate_leaves_in_range_values_alone() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    duty_store.set(ChannelId::CH2, 400);
    let before = duty_store.snapshot();
    duty_store.revalidate();
    assert_eq!(duty_store.snapshot(), before);
}

#[test]
fn channel_id_rejects_out_of_range_index() {
    assert_eq!(ChannelId::new(3_u8).map(ChannelId::index).ok(), Some(3));
    assert!(matches!(
        ChannelId::try_from(4_u8),
        Err(Error::ChannelOutOfRange(4))
    ));
    assert_eq!(ChannelId::ALL.len(), CHANNEL_COUNT);
    assert_eq!(usize::from(ChannelId::CH2), 2);
}

#[test]
fn limits_clamp_and_contain() {
    const LIMITS: ChannelLimits = ChannelLimits::new("test", 100, 200, 150);
    assert_eq!(LIMITS.clamp(99), 100);
    assert_eq!(LIMITS.clamp(201), 200);
    assert_eq!(LIMITS.clamp(150), 150);
    assert!(LIMITS.contains(100));
    assert!(LIMITS.contains(200));
    assert!(!LIMITS.contains(201));
}

#[test]
fn store_is_usable_from_a_static() {
    static DUTY_STORE: DutyStore = DutyStore::new(ARM_CHANNELS);
    let reader = std::thread::spawn(|| DUTY_STORE.get(ChannelId::CH3));
    let seen = reader.join().expect("reader thread panicked");
    assert!(DUTY_STORE.limits(ChannelId::CH3).contains(seen));
}

#[test]
fn duty_unit_is_four_microseconds() {
    assert_eq!(pulse_width_us(0), 0);
    assert_eq!(pulse_width_us(312), 1_248);
    assert_eq!(pulse_width_us(592), 2_368);
}

#[test]
fn extreme_adjustments_saturate_at_the_bounds() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    assert_eq!(duty_store.adjust(ChannelId::CH0, i32::MAX), 592);
    assert_eq!(duty_store.adjust(ChannelId::CH0, i32::MAX), 592);
    assert_eq!(duty_store.adjust(ChannelId::CH0, i32::MIN), 142);
    assert_eq!(duty_store.adjust(ChannelId::CH0, i32::MIN), 142);
    assert_eq!(duty_store.adjust(ChannelId::CH3, i32::MAX), 322);
}

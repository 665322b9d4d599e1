//! The RP2040/RP2350 realization of the shared carrier, plus the task that drives it.
//!
//! The chip has no single PWM generator with a steerable output, so [`RpCarrier`] emulates
//! one with two PWM slices started together. Outputs `A`/`B` are the A/B pins of the first
//! slice and `C`/`D` are the A/B pins of the second. Steering writes the scaled duty into
//! the selected output's compare register and 0 into every other one. Compare registers
//! latch at counter wrap, so both writes take effect at the next carrier period.
//!
//! # Example
//!
//! ```rust,no_run
//! # #![no_std]
//! # #![no_main]
//! use servo_mux::config::ARM_CHANNELS;
//! use servo_mux::duty_store::DutyStore;
//! use servo_mux::rp_carrier::{RpCarrier, spawn_multiplexer};
//! # use core::panic::PanicInfo;
//! # #[panic_handler]
//! # fn panic(_info: &PanicInfo) -> ! { loop {} }
//! static DUTY_STORE: DutyStore = DutyStore::new(ARM_CHANNELS);
//!
//! fn example(
//!     p: embassy_rp::Peripherals,
//!     spawner: embassy_executor::SendSpawner,
//! ) -> servo_mux::Result<()> {
//!     let carrier = RpCarrier::new(
//!         p.PWM_SLICE2, p.PIN_4, p.PIN_5, // outputs A and B
//!         p.PWM_SLICE3, p.PIN_6, p.PIN_7, // outputs C and D
//!     );
//!     spawn_multiplexer(spawner, &DUTY_STORE, carrier)
//! }
//! ```

use defmt::{info, trace};
use embassy_executor::SendSpawner;
use embassy_rp::Peri;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{ChannelAPin, ChannelBPin, Config, Pwm, Slice};
use embassy_time::{Duration, Ticker};

use crate::Result;
use crate::config::{CARRIER_PERIOD_US, FRAME_PERIOD_US, TICK_PERIOD_US};
use crate::duty_store::DutyStore;
use crate::multiplexer::{Carrier, Multiplexer, Output, Phase, TickEvent, compare_value};

/// Two PWM slices acting as one steerable carrier with four outputs.
pub struct RpCarrier<'d> {
    pwm_ab: Pwm<'d>,
    pwm_cd: Pwm<'d>,
    cfg_ab: Config, // set_config rewrites the divider too
    cfg_cd: Config,
    top: u16,
    duty: u16,
    steering: Option<Output>,
}

impl<'d> RpCarrier<'d> {
    /// Configure both slices for a [`CARRIER_PERIOD_US`] carrier with all outputs low.
    #[must_use]
    pub fn new<AB: Slice, CD: Slice>(
        slice_ab: Peri<'d, AB>,
        pin_a: Peri<'d, impl ChannelAPin<AB>>,
        pin_b: Peri<'d, impl ChannelBPin<AB>>,
        slice_cd: Peri<'d, CD>,
        pin_c: Peri<'d, impl ChannelAPin<CD>>,
        pin_d: Peri<'d, impl ChannelBPin<CD>>,
    ) -> Self {
        let clk = u64::from(clk_sys_freq()); // Hz
        // Aim for one count per µs, so compare values are pulse widths in µs.
        let div_int = u8::try_from((clk / 1_000_000).max(1)).unwrap_or(u8::MAX);
        let top = CARRIER_PERIOD_US.saturating_sub(1);

        let mut cfg = Config::default();
        cfg.top = top;
        cfg.phase_correct = false;
        cfg.divider = div_int.into();
        cfg.compare_a = 0;
        cfg.compare_b = 0;
        cfg.enable = true;

        let pwm_ab = Pwm::new_output_ab(slice_ab, pin_a, pin_b, cfg.clone());
        let pwm_cd = Pwm::new_output_ab(slice_cd, pin_c, pin_d, cfg.clone());

        info!("carrier clk={}Hz div={} top={}", clk, div_int, top);

        Self {
            pwm_ab,
            pwm_cd,
            cfg_ab: cfg.clone(),
            cfg_cd: cfg,
            top,
            duty: 0,
            steering: None,
        }
    }

    /// Restart both slices from the beginning of a period, so they stay in phase.
    pub fn restart(&mut self) {
        self.pwm_ab.set_counter(0);
        self.pwm_cd.set_counter(0);
    }

    fn write_compare(&mut self, output: Output, compare: u16) {
        match output {
            Output::A => self.cfg_ab.compare_a = compare,
            Output::B => self.cfg_ab.compare_b = compare,
            Output::C => self.cfg_cd.compare_a = compare,
            Output::D => self.cfg_cd.compare_b = compare,
        }
    }

    fn apply(&mut self) {
        for output in Output::ALL {
            let compare = compare_value(self.duty, self.steering, output, self.top);
            self.write_compare(output, compare);
        }
        self.pwm_ab.set_config(&self.cfg_ab);
        self.pwm_cd.set_config(&self.cfg_cd);
    }
}

impl Carrier for RpCarrier<'_> {
    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
        self.apply();
    }

    fn set_steering(&mut self, output: Option<Output>) {
        self.steering = output;
        self.apply();
    }

    fn clear_output(&mut self, output: Output) {
        self.write_compare(output, 0);
        match output {
            Output::A | Output::B => self.pwm_ab.set_config(&self.cfg_ab),
            Output::C | Output::D => self.pwm_cd.set_config(&self.cfg_cd),
        }
    }
}

/// Drive `carrier` from a [`TICK_PERIOD_US`] ticker forever.
///
/// Run this at interrupt priority. It never awaits anything but the ticker.
pub async fn multiplexer_loop(
    duty_store: &'static DutyStore,
    mut carrier: RpCarrier<'static>,
) -> ! {
    info!(
        "multiplexer: tick every {}µs, frame every {}µs",
        TICK_PERIOD_US, FRAME_PERIOD_US
    );
    // First tick lands mid-period.
    carrier.restart();
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(TICK_PERIOD_US)));
    let mut multiplexer = Multiplexer::new(carrier);
    loop {
        ticker.next().await;
        if multiplexer.on_tick(duty_store) == TickEvent::Advanced(Phase::Blank) {
            trace!("multiplexer: frame end");
        }
    }
}

#[embassy_executor::task]
async fn multiplexer_task(duty_store: &'static DutyStore, carrier: RpCarrier<'static>) -> ! {
    multiplexer_loop(duty_store, carrier).await
}

/// Spawn the multiplexer on `spawner`, normally an `InterruptExecutor`'s.
///
/// # Errors
///
/// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task is already running.
pub fn spawn_multiplexer(
    spawner: SendSpawner,
    duty_store: &'static DutyStore,
    carrier: RpCarrier<'static>,
) -> Result<()> {
    let token = multiplexer_task(duty_store, carrier);
    spawner.spawn(token)?;
    Ok(())
}

//! Serial console for a four-servo robot arm, multiplexed from one PWM carrier.
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::convert::Infallible;
use core::panic;

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use servo_mux::{
    Result,
    config::{ARM_CHANNELS, CONSOLE_BAUD},
    console,
    duty_store::DutyStore,
    rp_carrier::{RpCarrier, spawn_multiplexer},
};
use static_cell::StaticCell;
use {defmt::info, defmt_rtt as _, panic_probe as _};

static DUTY_STORE: DutyStore = DutyStore::new(ARM_CHANNELS);

static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

// The multiplexer preempts the console.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

#[cfg(feature = "pico1")]
#[interrupt]
#[allow(unsafe_code, reason = "executor interrupt handler")]
unsafe fn SWI_IRQ_1() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[cfg(feature = "pico2")]
#[interrupt]
#[allow(unsafe_code, reason = "executor interrupt handler")]
unsafe fn SPARE_IRQ_1() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    #[cfg(feature = "pico1")]
    let high_irq = interrupt::SWI_IRQ_1;
    #[cfg(feature = "pico2")]
    let high_irq = interrupt::SPARE_IRQ_1;
    high_irq.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(high_irq);

    // GPIO 4/5 → slice 2 (A, B); GPIO 6/7 → slice 3 (C, D)
    let carrier = RpCarrier::new(
        p.PWM_SLICE2,
        p.PIN_4,
        p.PIN_5,
        p.PWM_SLICE3,
        p.PIN_6,
        p.PIN_7,
    );
    spawn_multiplexer(high_spawner, &DUTY_STORE, carrier)?;

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = CONSOLE_BAUD;
    let mut uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        TX_BUF.init([0; 256]),
        RX_BUF.init([0; 16]),
        uart_config,
    );

    info!("console on UART0 at {} baud", CONSOLE_BAUD);
    console::run(&mut uart, &DUTY_STORE).await
}

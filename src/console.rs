//! A byte-at-a-time command console over any async serial transport.
//!
//! The console prints a menu once, then reads one symbol at a time, hands it to the
//! [`Dispatcher`] and writes the resulting [`Feedback`] as a `\r\n`-terminated line.
//!
//! It blocks only on the transport. The multiplexer keeps running while it waits.

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_io_async::{Error as _, Read, Write};
use heapless::String;

use crate::command::{Command, Dispatcher, Feedback};
use crate::duty_store::DutyStore;
use crate::{Error, Result};

/// Capacity of one formatted console line, terminator included.
const LINE_CAPACITY: usize = 64;

/// Lines printed before the channel list.
pub const MENU_HEADER: [&str; 2] = ["Welcome to Robo-Control", "Select Servo:"];

/// Lines printed after the channel list.
pub const MENU_FOOTER: [&str; 3] = ["Controls are:", "(a) - Forward", "(d) - Backward"];

/// Symbols that select a channel, in menu order.
pub const SELECT_SYMBOLS: [u8; 4] = [b'1', b'2', b'3', b'4'];

/// Write the start-up menu, naming each channel by its configured name.
///
/// # Errors
///
/// Returns [`Error::Serial`] if the transport fails, or [`Error::FormatError`] if a channel
/// name does not fit on one line.
pub async fn write_menu<W: Write>(out: &mut W, duty_store: &DutyStore) -> Result<()> {
    for line in MENU_HEADER {
        write_line(out, format_args!("{line}")).await?;
    }
    for symbol in SELECT_SYMBOLS {
        if let Command::Select(channel) = Command::parse(symbol) {
            let name = duty_store.limits(channel).name;
            write_line(out, format_args!("({}) - {name} servo", char::from(symbol))).await?;
        }
    }
    for line in MENU_FOOTER {
        write_line(out, format_args!("{line}")).await?;
    }
    Ok(())
}

/// Write one feedback line.
///
/// # Errors
///
/// Returns [`Error::Serial`] if the transport fails.
pub async fn write_feedback<W: Write>(out: &mut W, feedback: &Feedback) -> Result<()> {
    write_line(out, format_args!("{feedback}")).await
}

async fn write_line<W: Write>(out: &mut W, args: core::fmt::Arguments<'_>) -> Result<()> {
    let mut line = String::<LINE_CAPACITY>::new();
    line.write_fmt(args).map_err(|_| Error::FormatError)?;
    line.push_str("\r\n").map_err(|()| Error::FormatError)?;
    out.write_all(line.as_bytes())
        .await
        .map_err(|err| Error::Serial(err.kind()))?;
    out.flush().await.map_err(|err| Error::Serial(err.kind()))
}

/// Read one symbol, dispatch it, and write its feedback.
///
/// # Errors
///
/// Returns [`Error::SerialClosed`] when the input reaches end of stream, and
/// [`Error::Serial`] on any transport failure.
pub async fn serve_next<IO: Read + Write>(
    io: &mut IO,
    dispatcher: &mut Dispatcher,
    duty_store: &DutyStore,
) -> Result<Feedback> {
    let mut symbol = [0u8; 1];
    let read = io
        .read(&mut symbol)
        .await
        .map_err(|err| Error::Serial(err.kind()))?;
    if read == 0 {
        return Err(Error::SerialClosed);
    }

    let feedback = dispatcher.dispatch(duty_store, symbol[0]);
    log_feedback(symbol[0], &feedback);
    write_feedback(io, &feedback).await?;
    Ok(feedback)
}

#[cfg(not(feature = "host"))]
fn log_feedback(symbol: u8, feedback: &Feedback) {
    if feedback.is_rejection() {
        defmt::warn!("console: {=u8:#x} rejected: {}", symbol, feedback);
    } else {
        defmt::debug!("console: {=u8:#x} -> {}", symbol, feedback);
    }
}

#[cfg(feature = "host")]
const fn log_feedback(_symbol: u8, _feedback: &Feedback) {}

/// Print the menu, then serve commands until the transport fails.
///
/// # Errors
///
/// Returns the first transport error. Never returns `Ok`.
pub async fn run<IO: Read + Write>(io: &mut IO, duty_store: &DutyStore) -> Result<Infallible> {
    #[cfg(not(feature = "host"))]
    defmt::info!("console: started");

    write_menu(io, duty_store).await?;
    let mut dispatcher = Dispatcher::new();
    loop {
        serve_next(io, &mut dispatcher, duty_store).await?;
    }
}

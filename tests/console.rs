#![cfg(feature = "host")]
#![allow(missing_docs, reason = "integration tests")]
//! Host-level tests for the command console over in-memory transports.

use std::collections::VecDeque;
use std::convert::Infallible;

use embassy_futures::block_on;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use servo_mux::Error;
use servo_mux::command::{Dispatcher, Feedback};
use servo_mux::config::ARM_CHANNELS;
use servo_mux::console::{run, serve_next, write_feedback, write_menu};
use servo_mux::duty_store::{ChannelId, DutyStore};

/// Replays scripted input, records output, then reports end of stream.
#[derive(Default)]
struct ScriptedIo {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedIo {
    fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    fn output_text(&self) -> &str {
        std::str::from_utf8(&self.output).expect("console output is ASCII")
    }
}

impl ErrorType for ScriptedIo {
    type Error = Infallible;
}

impl Read for ScriptedIo {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            let Some(byte) = self.input.pop_front() else {
                break;
            };
            *slot = byte;
            count += 1;
        }
        Ok(count)
    }
}

impl Write for ScriptedIo {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A transport whose every operation fails.
struct BrokenIo;

impl ErrorType for BrokenIo {
    type Error = ErrorKind;
}

impl Read for BrokenIo {
    async fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Err(ErrorKind::Other)
    }
}

impl Write for BrokenIo {
    async fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
        Err(ErrorKind::Other)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

#[test]
fn select_then_increase_writes_two_lines() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut dispatcher = Dispatcher::new();
    let mut io = ScriptedIo::new(b"1a");

    let first = block_on(serve_next(&mut io, &mut dispatcher, &duty_store));
    let second = block_on(serve_next(&mut io, &mut dispatcher, &duty_store));

    assert!(matches!(first, Ok(Feedback::Selected(ChannelId::CH0))));
    assert!(matches!(
        second,
        Ok(Feedback::Adjusted {
            channel: ChannelId::CH0,
            duty: 322
        })
    ));
    assert_eq!(
        io.output_text(),
        "controlling channel 0\r\nchannel 0 duty 322\r\n"
    );
    assert_eq!(duty_store.get(ChannelId::CH0), 322);
}

#[test]
fn rejected_commands_still_get_feedback() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut dispatcher = Dispatcher::new();
    let mut io = ScriptedIo::new(b"dx");

    for _ in 0..2 {
        assert!(block_on(serve_next(&mut io, &mut dispatcher, &duty_store)).is_ok());
    }
    assert_eq!(
        io.output_text(),
        "please select a channel\r\ninvalid command: x\r\n"
    );
}

#[test]
fn end_of_input_is_reported() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut dispatcher = Dispatcher::new();
    let mut io = ScriptedIo::new(b"");

    let result = block_on(serve_next(&mut io, &mut dispatcher, &duty_store));
    assert!(matches!(result, Err(Error::SerialClosed)));
    assert!(io.output.is_empty());
}

#[test]
fn transport_errors_are_reduced_to_their_kind() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut dispatcher = Dispatcher::new();

    let result = block_on(serve_next(&mut BrokenIo, &mut dispatcher, &duty_store));
    assert!(matches!(result, Err(Error::Serial(ErrorKind::Other))));

    let result = block_on(write_feedback(&mut BrokenIo, &Feedback::NoChannelSelected));
    assert!(matches!(result, Err(Error::Serial(ErrorKind::Other))));
}

#[test]
fn menu_lists_channels_by_select_symbol() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut io = ScriptedIo::default();
    assert!(block_on(write_menu(&mut io, &duty_store)).is_ok());

    let lines: Vec<&str> = io.output_text().split_terminator("\r\n").collect();
    assert_eq!(
        lines,
        [
            "Welcome to Robo-Control",
            "Select Servo:",
            "(1) - Base servo",
            "(2) - Right (small arm) servo",
            "(3) - Left (large arm) servo",
            "(4) - Gripper servo",
            "Controls are:",
            "(a) - Forward",
            "(d) - Backward",
        ]
    );
}

#[test]
fn run_prints_menu_then_serves_until_input_ends() {
    let duty_store = DutyStore::new(ARM_CHANNELS);
    let mut io = ScriptedIo::new(b"3dd4a");

    let result = block_on(run(&mut io, &duty_store));
    assert!(matches!(result, Err(Error::SerialClosed)));

    let text = io.output_text();
    assert!(text.starts_with("Welcome to Robo-Control\r\n"));
    assert!(text.ends_with(
        "controlling channel 1\r\n\
         channel 1 duty 342\r\n\
         channel 1 duty 342\r\n\
         controlling channel 3\r\n\
         channel 3 duty 320\r\n"
    ));
    assert_eq!(duty_store.snapshot(), [312, 342, 542, 320]);
}

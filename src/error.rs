//! Error and result types shared by every module.

use derive_more::{Debug, Display, Error, From};
#[cfg(not(feature = "host"))]
use embassy_executor::SpawnError;
use embedded_io_async::ErrorKind;

/// Result type used throughout servo-mux.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced by servo-mux.
///
/// Duty values out of range, missing selections and unknown command symbols are
/// *not* errors; they are reported to the user as [`Feedback`](crate::command::Feedback).
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A raw channel index outside `0..CHANNEL_COUNT` was used.
    #[display("channel index {_0} is out of range")]
    #[from(ignore)]
    ChannelOutOfRange(#[error(not(source))] u8),

    /// The console's byte transport reported an error.
    #[display("serial transport error: {_0:?}")]
    Serial(#[error(not(source))] ErrorKind),

    /// The console's input transport reached end of stream.
    #[display("serial transport closed")]
    #[from(ignore)]
    SerialClosed,

    /// A feedback line did not fit its fixed-capacity buffer.
    #[display("feedback line too long")]
    #[from(ignore)]
    FormatError,

    /// Spawning an embassy task failed.
    #[cfg(not(feature = "host"))]
    #[display("task spawn failed: {_0:?}")]
    TaskSpawn(#[error(not(source))] SpawnError),
}

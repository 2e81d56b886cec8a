use std::io;

use thiserror::Error;

/// Errors surfaced by frame sources and the dispatch loop.
///
/// Only `CaptureUnavailable` is fatal to the process. `CaptureError`
/// is a transient per-frame fault (the loop skips the frame), and
/// `CaptureClosed` is the normal end-of-capture signal. An unparseable
/// frame is not an error at all: decoding is total and represents
/// absent layers as absent fields.
#[derive(Debug, Error)]
pub enum Error {
    /// The capture device could not be opened
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),
    /// Transient fault while capturing a frame
    #[error("capture error: {0}")]
    CaptureError(String),
    /// Normal end of capture
    #[error("capture closed")]
    CaptureClosed,
    #[error("{0}")]
    Generic(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("pcap parsing error: {0}")]
    Pcap(String),
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error::Generic(s)
    }
}

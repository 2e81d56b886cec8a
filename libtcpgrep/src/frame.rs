use pcap_parser::Linktype;

use crate::duration::Duration;

/// One captured link-layer frame.
///
/// The buffer is owned by the `FrameSource` that produced the frame
/// and remains valid until the next call to `next_frame`. Decoding
/// borrows it and never mutates it.
pub struct RawFrame<'a> {
    /// Name of the capture interface (or input file)
    pub interface: &'a str,
    /// Capture timestamp
    pub ts: Duration,
    /// Link-layer type of `data`
    pub link_type: Linktype,
    /// Captured bytes
    pub data: &'a [u8],
    /// Number of bytes captured off the wire
    pub caplen: u32,
    /// Original frame length on the wire
    pub origlen: u32,
    /// Index of the frame in the capture, starting at 1
    pub index: usize,
}

use std::io::Read;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::*;

use crate::config::Config;
use crate::duration::{Duration, MICROS_PER_SEC};
use crate::error::Error;
use crate::frame::RawFrame;

/// A producer of captured frames.
///
/// `next_frame` blocks the caller until a frame is available. The
/// returned frame borrows the source's internal buffer and stays
/// valid until the next call. End of capture (or cancellation) is
/// signalled with `Error::CaptureClosed`, a transient fault with
/// `Error::CaptureError`.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<RawFrame<'_>, Error>;
}

/// Information related to a network interface used for capture
struct InterfaceInfo {
    link_type: Linktype,
    if_tsoffset: u64,
    ts_unit: u64,
}

fn build_interface_info(idb: &InterfaceDescriptionBlock) -> InterfaceInfo {
    let mut if_tsoffset = 0;
    let mut ts_unit: u64 = MICROS_PER_SEC as u64;
    for opt in idb.options.iter() {
        match opt.code {
            OptionCode::IfTsresol => {
                if !opt.value.is_empty() {
                    if let Some(unit) = build_ts_resolution(opt.value[0]) {
                        ts_unit = unit;
                    }
                }
            }
            OptionCode::IfTsoffset => {
                if opt.value.len() >= 8 {
                    if let Ok(bytes) = <[u8; 8]>::try_from(&opt.value[..8]) {
                        if_tsoffset = u64::from_le_bytes(bytes);
                    }
                }
            }
            _ => (),
        }
    }
    InterfaceInfo {
        link_type: idb.linktype,
        if_tsoffset,
        ts_unit,
    }
}

/// Frame source reading pcap or pcap-ng data from any reader.
///
/// This is the offline counterpart of the live capture source: the
/// same dispatch loop runs over a recorded trace. `Eof` maps to
/// `CaptureClosed` so the loop terminates cleanly.
pub struct PcapFileSource {
    name: String,
    reader: Box<dyn PcapReaderIterator>,
    interfaces: Vec<InterfaceInfo>,
    buf: Vec<u8>,
    index: usize,
    last_incomplete: usize,
}

impl PcapFileSource {
    pub fn new<R: Read + Send + 'static>(
        name: &str,
        input: R,
        config: &Config,
    ) -> Result<Self, Error> {
        let capacity = config
            .get_usize("buffer_initial_capacity")
            .unwrap_or(128 * 1024);
        let reader = pcap_parser::create_reader(capacity, input)
            .map_err(|e| Error::Pcap(format!("{e:?}")))?;
        Ok(PcapFileSource {
            name: name.to_owned(),
            reader,
            interfaces: Vec::new(),
            buf: Vec::new(),
            index: 0,
            last_incomplete: 0,
        })
    }
}

impl FrameSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<RawFrame<'_>, Error> {
        loop {
            match self.reader.next() {
                Ok((offset, block)) => {
                    // copy the frame out so the reader can be advanced
                    // before the frame is handed to the caller
                    let mut meta = None;
                    match block {
                        PcapBlockOwned::LegacyHeader(ref hdr) => {
                            debug!("legacy pcap, link type {:?}", hdr.network);
                            self.interfaces.push(InterfaceInfo {
                                link_type: hdr.network,
                                if_tsoffset: 0,
                                ts_unit: MICROS_PER_SEC as u64,
                            });
                        }
                        PcapBlockOwned::Legacy(ref b) => {
                            if let Some(if_info) = self.interfaces.first() {
                                self.buf.clear();
                                self.buf.extend_from_slice(b.data);
                                meta = Some((
                                    Duration::new(b.ts_sec, b.ts_usec),
                                    if_info.link_type,
                                    b.caplen,
                                    b.origlen,
                                ));
                            } else {
                                warn!("legacy packet block before file header");
                            }
                        }
                        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                            debug!("pcap-ng: new section");
                            self.interfaces.clear();
                        }
                        PcapBlockOwned::NG(Block::InterfaceDescription(ref idb)) => {
                            self.interfaces.push(build_interface_info(idb));
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(ref epb)) => {
                            if let Some(if_info) = self.interfaces.get(epb.if_id as usize) {
                                let unit = if_info.ts_unit;
                                let (ts_sec, ts_frac) = pcap_parser::build_ts(
                                    epb.ts_high,
                                    epb.ts_low,
                                    if_info.if_tsoffset,
                                    unit,
                                );
                                let ts_usec = match unit as u32 {
                                    0 | MICROS_PER_SEC => ts_frac,
                                    u if u > MICROS_PER_SEC => ts_frac / (u / MICROS_PER_SEC),
                                    u => ts_frac * (MICROS_PER_SEC / u),
                                };
                                self.buf.clear();
                                self.buf.extend_from_slice(epb.data);
                                meta = Some((
                                    Duration::new(ts_sec, ts_usec),
                                    if_info.link_type,
                                    epb.caplen,
                                    epb.origlen,
                                ));
                            } else {
                                warn!("packet block for unknown interface id {}", epb.if_id);
                            }
                        }
                        PcapBlockOwned::NG(_) => {
                            trace!("ignoring pcap-ng block");
                        }
                    }
                    self.reader.consume(offset);
                    if let Some((ts, link_type, caplen, origlen)) = meta {
                        self.index += 1;
                        return Ok(RawFrame {
                            interface: &self.name,
                            ts,
                            link_type,
                            data: &self.buf,
                            caplen,
                            origlen,
                            index: self.index,
                        });
                    }
                }
                Err(PcapError::Eof) => return Err(Error::CaptureClosed),
                Err(PcapError::Incomplete(_)) => {
                    if self.last_incomplete == self.index && self.reader.reader_exhausted() {
                        warn!("could not read complete data block");
                        warn!("Hint: the reader buffer size may be too small, or the input file may be truncated.");
                        return Err(Error::CaptureClosed);
                    }
                    self.last_incomplete = self.index;
                    self.reader
                        .refill()
                        .map_err(|e| Error::Pcap(format!("{e:?}")))?;
                }
                Err(e) => return Err(Error::Pcap(format!("{e:?}"))),
            }
        }
    }
}
